//! Headers describing a MIME part

use std::fmt::{self, Display};

use mime::Mime;

use super::{
    textual::{encode_text, is_plain_text},
    Header, HeaderName,
};

/// `MIME-Version: 1.0`, the only version there is
///
/// Defined in [RFC2045](https://tools.ietf.org/html/rfc2045#section-4)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MimeVersion;

impl Header for MimeVersion {
    fn name() -> HeaderName {
        HeaderName::known("MIME-Version")
    }

    fn display(&self) -> String {
        "1.0".to_owned()
    }
}

/// `Content-Type` of a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType(String);

impl ContentType {
    /// `text/plain; charset=utf-8`
    pub fn plain() -> Self {
        mime::TEXT_PLAIN_UTF_8.into()
    }

    /// `text/html; charset=utf-8`
    pub fn html() -> Self {
        mime::TEXT_HTML_UTF_8.into()
    }

    pub(crate) fn multipart(subtype: &str, boundary: &str) -> Self {
        Self(format!("multipart/{subtype}; boundary=\"{boundary}\""))
    }
}

impl From<Mime> for ContentType {
    fn from(mime: Mime) -> Self {
        Self(mime.to_string())
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Header for ContentType {
    fn name() -> HeaderName {
        HeaderName::known("Content-Type")
    }

    fn display(&self) -> String {
        self.0.clone()
    }
}

/// `Content-Transfer-Encoding` of a part body
///
/// Chosen from the content, every choice keeps the document 7-bit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentTransferEncoding {
    /// ASCII with short lines, written as is
    SevenBit,
    /// Mostly ASCII text
    QuotedPrintable,
    /// Anything else, including every attachment
    Base64,
}

impl Display for ContentTransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SevenBit => "7bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
        })
    }
}

impl Header for ContentTransferEncoding {
    fn name() -> HeaderName {
        HeaderName::known("Content-Transfer-Encoding")
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

/// `Content-Disposition: attachment` with the file name
///
/// See [RFC2183](https://tools.ietf.org/html/rfc2183). The name is a
/// quoted string: `"` and `\` are escaped, and non-ASCII names become
/// RFC 2047 encoded words inside the quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    file_name: String,
}

impl ContentDisposition {
    /// Disposition of an attached file
    pub fn attachment(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
        }
    }
}

impl Header for ContentDisposition {
    fn name() -> HeaderName {
        HeaderName::known("Content-Disposition")
    }

    fn display(&self) -> String {
        let quoted = if is_plain_text(&self.file_name) {
            self.file_name.replace('\\', "\\\\").replace('"', "\\\"")
        } else {
            // no folding inside a quoted string
            encode_text(&self.file_name).replace("\r\n ", " ")
        };
        format!("attachment; filename=\"{quoted}\"")
    }
}
