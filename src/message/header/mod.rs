//! Headers written into email documents
// https://tools.ietf.org/html/rfc5322#section-2.2

use std::{
    borrow::Cow,
    fmt::{self, Display},
};

mod content;
mod date;
mod mailbox;
mod textual;

pub(crate) use self::{date::clamp as clamp_date, textual::encode_text};
pub use self::{content::*, date::Date, mailbox::*, textual::Subject};

/// Names the library writes itself, a custom header can't use them
pub const RESERVED_NAMES: [&str; 11] = [
    "Date",
    "From",
    "To",
    "Cc",
    "Bcc",
    "Reply-To",
    "Subject",
    "MIME-Version",
    "Content-Type",
    "Content-Transfer-Encoding",
    "Content-Disposition",
];

/// A typed header that renders into a single header line.
///
/// The rendered value must already be free of line breaks, see
/// [`strip_line_breaks`](crate::message::strip_line_breaks).
pub trait Header {
    /// Name of the header, like `Subject`
    fn name() -> HeaderName;

    /// Value written after `Name: `
    fn display(&self) -> String;
}

/// Name of a header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderName(Cow<'static, str>);

impl HeaderName {
    /// Clean a caller supplied name
    ///
    /// Only printable ASCII is kept, without `:`, so the name can't end
    /// the line early or smuggle in a value.
    pub fn new(name: &str) -> Self {
        Self(Cow::Owned(
            name.chars()
                .filter(|&c| c.is_ascii_graphic() && c != ':')
                .collect(),
        ))
    }

    pub(crate) const fn known(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The name as written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is one of [`RESERVED_NAMES`], ignoring case
    pub fn is_reserved(&self) -> bool {
        RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&self.0))
    }
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Header lines of a document or part, written in the order they were pushed
#[derive(Debug, Clone, Default)]
pub struct Headers(Vec<(HeaderName, String)>);

impl Headers {
    /// Add a typed header
    pub fn push<H: Header>(&mut self, header: H) {
        self.0.push((H::name(), header.display()));
    }

    /// Add a line with an already rendered value
    pub fn push_raw(&mut self, name: HeaderName, value: String) {
        self.0.push((name, value));
    }
}

impl Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.0 {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{HeaderName, Headers, Subject};

    #[test]
    fn names_lose_separators() {
        assert_eq!(HeaderName::new("X-Evil:\r\nBcc").as_str(), "X-EvilBcc");
        assert_eq!(HeaderName::new("Date ").as_str(), "Date");
        assert_eq!(HeaderName::new("X-Duck").as_str(), "X-Duck");
    }

    #[test]
    fn reserved_names_ignore_case() {
        assert!(HeaderName::new("content-type").is_reserved());
        assert!(HeaderName::new("MIME-Version").is_reserved());
        assert!(HeaderName::new(" From ").is_reserved());
        assert!(!HeaderName::new("X-Mailer").is_reserved());
    }

    #[test]
    fn lines_keep_push_order() {
        let mut headers = Headers::default();
        headers.push_raw(HeaderName::new("X-Two"), "2".into());
        headers.push(Subject::from("Hi".to_owned()));
        headers.push_raw(HeaderName::new("X-One"), "1".into());

        assert_eq!(headers.to_string(), "X-Two: 2\r\nSubject: Hi\r\nX-One: 1\r\n");
    }
}
