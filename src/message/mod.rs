//! Compose an email and render it into a MIME document
//!
//! ## Usage
//!
//! A [`Message`] is filled through setters, then rendered with
//! [`Message::formatted`] or handed to a [`Transport`](crate::Transport).
//!
//! ```rust
//! use mailsmith::Message;
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut email = Message::new();
//! email
//!     .set_from("nobody@domain.tld")
//!     .set_from_name("NoBody")
//!     .set_reply_to("yuin@domain.tld")
//!     .set_to(["hei@domain.tld"])
//!     .set_subject("Happy new year")
//!     .set_plain("Be happy!");
//!
//! let document = email.formatted()?;
//! # assert!(document.starts_with(b"Date: "));
//! # Ok(())
//! # }
//! ```
//!
//! Which produces:
//!
//! ```sh
//! Date: Sat, 12 Dec 2020 16:33:19 +0000
//! From: "NoBody" <nobody@domain.tld>
//! To: hei@domain.tld
//! Reply-To: yuin@domain.tld
//! Subject: Happy new year
//! MIME-Version: 1.0
//! Content-Type: text/plain; charset=utf-8
//! Content-Transfer-Encoding: 7bit
//!
//! Be happy!
//! ```
//!
//! ## Structure
//!
//! The part tree depends on what the message holds:
//!
//! * one body and no attachment: a single part
//! * plain and HTML bodies: `multipart/alternative`, plain first
//! * attachments: `multipart/mixed`, the text content first (a single
//!   part or the `multipart/alternative` above, if any), then one part
//!   per attachment
//!
//! Header text is free of line breaks: every setter strips them when the
//! value is stored, see [`strip_line_breaks`]. Non-ASCII header text is
//! written as RFC 2047 encoded words.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    time::SystemTime,
};

use mime::Mime;

pub use self::{
    attachment::{Attachment, AttachmentSource, FileSource},
    body::{BodyKind, BodyPart},
    error::BuildError,
    mimebody::{MultiPart, MultiPartKind, Part, SinglePart},
    sanitize::strip_line_breaks,
};
use self::{
    assembler::MimeAssembler,
    header::{Header, HeaderName},
    sanitize::strip_all,
};
use crate::address::Envelope;

mod assembler;
mod attachment;
mod body;
mod error;
pub mod header;
mod mimebody;
mod sanitize;

trait EmailFormat {
    fn format(&self, out: &mut Vec<u8>);
}

/// An email, from its addresses to its attachments
///
/// Every string stored through a setter has its line breaks removed at
/// assignment, so getters return exactly what will be written.
#[derive(Debug, Clone)]
pub struct Message {
    from: String,
    from_name: String,
    reply_to: String,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    subject: String,
    headers: BTreeMap<String, String>,
    date: SystemTime,
    plain: Option<BodyPart>,
    html: Option<BodyPart>,
    attachments: Vec<Attachment>,
    write_bcc: bool,
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Message {
    /// Create an empty message dated now
    pub fn new() -> Self {
        Self {
            from: String::new(),
            from_name: String::new(),
            reply_to: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            headers: BTreeMap::new(),
            date: SystemTime::now(),
            plain: None,
            html: None,
            attachments: Vec::new(),
            write_bcc: false,
        }
    }

    /// Set the primary recipients, replacing any previous ones
    pub fn set_to<I, S>(&mut self, addresses: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to = strip_all(addresses);
        self
    }

    /// Set the carbon copy recipients, replacing any previous ones
    pub fn set_cc<I, S>(&mut self, addresses: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cc = strip_all(addresses);
        self
    }

    /// Set the blind carbon copy recipients, replacing any previous ones
    ///
    /// They are not written into the document unless
    /// [`write_bcc_header`](Self::write_bcc_header) is enabled.
    pub fn set_bcc<I, S>(&mut self, addresses: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bcc = strip_all(addresses);
        self
    }

    /// Set the sender address
    pub fn set_from(&mut self, address: &str) -> &mut Self {
        self.from = strip_line_breaks(address);
        self
    }

    /// Set the sender display name
    pub fn set_from_name(&mut self, name: &str) -> &mut Self {
        self.from_name = strip_line_breaks(name);
        self
    }

    /// Set the `Reply-To` address, an empty string removes it
    pub fn set_reply_to(&mut self, address: &str) -> &mut Self {
        self.reply_to = strip_line_breaks(address);
        self
    }

    /// Set the subject
    pub fn set_subject(&mut self, subject: &str) -> &mut Self {
        self.subject = strip_line_breaks(subject);
        self
    }

    /// Set a custom header, replacing a previous value for the same name
    ///
    /// Custom headers are written after the standard ones, sorted by name.
    /// Only printable ASCII without `:` is kept from `name`. Names the
    /// library writes itself, like `Content-Type` or `From` (see
    /// [`header::RESERVED_NAMES`]), are ignored, as is an empty name.
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        let name = HeaderName::new(name);
        if name.as_str().is_empty() || name.is_reserved() {
            #[cfg(feature = "tracing")]
            tracing::warn!("ignoring custom header {:?}", name.as_str());
            return self;
        }

        self.headers
            .insert(name.as_str().to_owned(), strip_line_breaks(value));
        self
    }

    /// Remove a custom header
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(HeaderName::new(name).as_str())
    }

    /// Set the `Date` header, which defaults to the creation time
    ///
    /// The header can only express the years 1970 to 9999: an earlier
    /// date is stored as the epoch, a later one as the last second of 9999.
    pub fn set_date(&mut self, date: SystemTime) -> &mut Self {
        self.date = header::clamp_date(date);
        self
    }

    /// Write the `Bcc` header into the document.
    ///
    /// Off by default. Turning it on shows every blind recipient to
    /// everyone who receives the message, which defeats the point of Bcc.
    pub fn write_bcc_header(&mut self, write: bool) -> &mut Self {
        self.write_bcc = write;
        self
    }

    /// Set the plain text body
    pub fn set_plain<S: Into<String>>(&mut self, content: S) -> &mut Self {
        self.plain_mut().set(content);
        self
    }

    /// Set the HTML body
    pub fn set_html<S: Into<String>>(&mut self, content: S) -> &mut Self {
        self.html_mut().set(content);
        self
    }

    /// The plain text body, created empty on first access
    pub fn plain_mut(&mut self) -> &mut BodyPart {
        self.plain
            .get_or_insert_with(|| BodyPart::new(BodyKind::Plain))
    }

    /// The HTML body, created empty on first access
    pub fn html_mut(&mut self) -> &mut BodyPart {
        self.html.get_or_insert_with(|| BodyPart::new(BodyKind::Html))
    }

    /// Remove the plain text body
    pub fn clear_plain(&mut self) -> &mut Self {
        self.plain = None;
        self
    }

    /// Remove the HTML body
    pub fn clear_html(&mut self) -> &mut Self {
        self.html = None;
        self
    }

    /// Attach `source` as `filename`, the `Content-Type` is guessed from the extension
    pub fn attach<S>(&mut self, filename: &str, source: S) -> &mut Self
    where
        S: AttachmentSource + 'static,
    {
        self.attachments.push(Attachment::new(filename, source));
        self
    }

    /// Attach `source` as `filename` with an explicit `Content-Type`
    pub fn attach_with_mime_type<S: AttachmentSource + 'static>(
        &mut self,
        filename: &str,
        source: S,
        content_type: Mime,
    ) -> &mut Self {
        self.attachments
            .push(Attachment::with_mime_type(filename, source, content_type));
        self
    }

    /// Remove every attachment
    pub fn clear_attachments(&mut self) -> &mut Self {
        self.attachments.clear();
        self
    }

    /// Primary recipients
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// Carbon copy recipients
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Blind carbon copy recipients
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// Sender address
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Sender display name
    pub fn from_name(&self) -> &str {
        &self.from_name
    }

    /// `Reply-To` address, empty if unset
    pub fn reply_to(&self) -> &str {
        &self.reply_to
    }

    /// Subject
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Custom headers
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Value of the `Date` header
    pub fn date(&self) -> SystemTime {
        self.date
    }

    /// Returns `true` if the `Bcc` header is written into the document
    pub fn writes_bcc_header(&self) -> bool {
        self.write_bcc
    }

    /// The plain text body, if set
    pub fn plain(&self) -> Option<&BodyPart> {
        self.plain.as_ref()
    }

    /// The HTML body, if set
    pub fn html(&self) -> Option<&BodyPart> {
        self.html.as_ref()
    }

    /// Attachments in the order they were added
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Render the complete MIME document
    ///
    /// Attachment sources are read now, every time this is called. The
    /// output can be sent over SMTP or handed to any API accepting raw
    /// MIME documents.
    pub fn formatted(&self) -> Result<Vec<u8>, BuildError> {
        MimeAssembler::new(self).assemble()
    }

    /// SMTP envelope for this message: the sender and the `To` recipients
    ///
    /// `Cc` and `Bcc` recipients are not part of it, see
    /// [`full_envelope`](Self::full_envelope).
    ///
    /// The message must have a `From` address. To send with the null
    /// reverse-path, build an [`Envelope`] by hand.
    pub fn envelope(&self) -> Result<Envelope, crate::Error> {
        Envelope::new(self.sender()?, self.to.clone())
    }

    /// SMTP envelope with every `To`, `Cc` and `Bcc` recipient, without duplicates
    pub fn full_envelope(&self) -> Result<Envelope, crate::Error> {
        let mut recipients: Vec<String> = Vec::new();
        for address in self.to.iter().chain(&self.cc).chain(&self.bcc) {
            if !recipients.contains(address) {
                recipients.push(address.clone());
            }
        }

        Envelope::new(self.sender()?, recipients)
    }

    fn sender(&self) -> Result<&str, crate::Error> {
        if self.from.trim().is_empty() {
            return Err(crate::Error::MissingFrom);
        }
        Ok(&self.from)
    }
}

/// Redacted description of the message state, for logging
impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attachments: Vec<&str> = self.attachments.iter().map(|a| a.filename()).collect();

        write!(
            f,
            "Message {{ date: {:?}, from: {:?}, from_name: {:?}, html: {} bytes, plain: {} bytes, \
             to: {:?}, cc: {:?}, bcc: {:?}, subject: {:?}, ",
            header::Date::new(self.date).display(),
            self.from,
            self.from_name,
            self.html.as_ref().map_or(0, BodyPart::len),
            self.plain.as_ref().map_or(0, BodyPart::len),
            self.to,
            self.cc,
            self.bcc,
            self.subject,
        )?;
        for (name, value) in &self.headers {
            write!(f, "{name}: {value:?}, ")?;
        }
        write!(
            f,
            "attachments ({}): {:?} }}",
            attachments.len(),
            attachments
        )
    }
}
