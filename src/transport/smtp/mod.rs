//! The SMTP transport sends emails using the SMTP protocol.
//!
//! This SMTP client follows [RFC
//! 5321](https://tools.ietf.org/html/rfc5321), and is designed to hand messages from an
//! application to a relay email server.
//!
//! Each send opens its own connection and runs one short session:
//!
//! 1. connect, read the greeting, `EHLO`
//! 2. `STARTTLS` when the server advertises it (see [`Tls`])
//! 3. `AUTH` when an [`Authenticator`](authentication::Authenticator) is configured
//!    and the server advertises it
//! 4. `MAIL FROM`, one `RCPT TO` per envelope recipient, `DATA`
//! 5. the dot-stuffed document, then the final reply is returned
//!
//! The first failure ends the session and is returned, nothing is retried.
//! The connection is closed on every path.
//!
//! It implements the following extensions:
//!
//! * 8BITMIME ([RFC 6152](https://tools.ietf.org/html/rfc6152))
//! * SMTPUTF8 ([RFC 6531](https://tools.ietf.org/html/rfc6531))
//! * AUTH ([RFC 4954](http://tools.ietf.org/html/rfc4954)) with PLAIN, LOGIN, CRAM-MD5 and
//!   XOAUTH2 mechanisms
//! * STARTTLS ([RFC 2487](http://tools.ietf.org/html/rfc2487))
//!
//! #### Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "smtp-transport")]
//! # {
//! use mailsmith::{
//!     transport::smtp::{authentication::Credentials, SUBMISSION_PORT},
//!     Message, SmtpTransport, Transport,
//! };
//!
//! let mut email = Message::new();
//! email
//!     .set_from("nobody@domain.tld")
//!     .set_to(["hei@domain.tld"])
//!     .set_subject("Happy new year")
//!     .set_plain("Be happy!");
//!
//! let mailer = SmtpTransport::builder("smtp.domain.tld")
//!     .port(SUBMISSION_PORT)
//!     .credentials(Credentials::new("username".to_owned(), "password".to_owned()))
//!     .build();
//!
//! match mailer.send(&email) {
//!     Ok(response) => println!("Email sent: {response}"),
//!     Err(e) if e.is_response_read() => println!("Email may have been sent: {e}"),
//!     Err(e) => println!("Could not send email: {e}"),
//! }
//! # }
//! ```
//!
//! #### Lower level
//!
//! [`client::SmtpConnection`] runs single commands, see the [`client`] module.

use std::time::Duration;

#[cfg(feature = "native-tls")]
pub use self::client::{TlsParameters, TlsParametersBuilder};
pub use self::{
    client::Tls,
    error::{Error, Stage},
    transport::{SmtpTransport, SmtpTransportBuilder, Summary},
};

pub mod authentication;
pub mod client;
pub mod commands;
mod error;
pub mod extension;
pub mod response;
mod transport;

// Registered port numbers:
// https://www.iana.org/assignments/service-names-port-numbers/service-names-port-numbers.xhtml

/// Default smtp port
pub const SMTP_PORT: u16 = 25;
/// Default submission port
pub const SUBMISSION_PORT: u16 = 587;

/// Default timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
