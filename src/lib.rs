//! Mailsmith composes an email into a single MIME document and delivers it over SMTP.
//!
//! A [`Message`] is populated through setters (recipients, subject, sender,
//! custom headers, plain and HTML bodies, attachments). Every header-bound
//! string has its line breaks stripped when it is assigned, so reading the
//! value back always yields what will be written into the document.
//!
//! The document is assembled on demand, either for export with
//! [`Message::formatted`] or as the first step of a delivery through a
//! [`Transport`]. The nesting of the document depends on what was set:
//!
//! * one body variant and no attachments: a single part
//! * plain and HTML bodies, no attachments: `multipart/alternative`
//! * attachments: `multipart/mixed`, with the body (or the alternative pair)
//!   first and one part per attachment
//!
//! ## Example
//!
//! ```rust,no_run
//! use mailsmith::{Message, SmtpTransport, Transport};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut email = Message::new();
//! email
//!     .set_from("nobody@domain.tld")
//!     .set_from_name("NoBody")
//!     .set_to(["hei@domain.tld"])
//!     .set_subject("Happy new year")
//!     .set_plain("Be happy!")
//!     .set_html("<p>Be <b>happy</b>!</p>");
//!
//! let mailer = SmtpTransport::builder("smtp.domain.tld").build();
//! let response = mailer.send(&email)?;
//! println!("{}", response.code());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * `smtp-transport` (default): the SMTP delivery driver
//! * `native-tls` (default): opportunistic `STARTTLS` through `native-tls`
//! * `hostname` (default): use the machine hostname in `EHLO`
//! * `tracing` (default): log the SMTP exchange with `tracing`

#![doc(html_root_url = "https://docs.rs/crate/mailsmith/0.1.0")]
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    missing_debug_implementations,
    missing_docs,
    clippy::string_add,
    clippy::string_add_assign,
    clippy::clone_on_ref_ptr,
    clippy::verbose_file_reads,
    clippy::unnecessary_self_imports
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
pub mod error;
pub mod message;
pub mod transport;

pub use crate::{
    address::Envelope,
    error::Error,
    message::{Attachment, BodyPart, BuildError, Message},
    transport::Transport,
};
#[cfg(feature = "smtp-transport")]
pub use crate::transport::smtp::{SmtpTransport, SmtpTransportBuilder};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
