use std::{
    fmt, io, mem,
    ops::Deref,
    str::{self, Utf8Error},
};

use email_encoding::body::Encoding;

use crate::message::header::{ContentTransferEncoding, ContentType};

/// Which textual variant a [`BodyPart`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `text/plain`
    Plain,
    /// `text/html`
    Html,
}

impl BodyKind {
    /// `Content-Type` written for this variant, always `utf-8`
    pub fn content_type(self) -> ContentType {
        match self {
            Self::Plain => ContentType::plain(),
            Self::Html => ContentType::html(),
        }
    }
}

/// One textual body variant of a [`Message`](super::Message)
///
/// A `BodyPart` is a growable text buffer: it can be filled through
/// [`set`](BodyPart::set), [`push_str`](BodyPart::push_str), or the
/// [`std::fmt::Write`] and [`std::io::Write`] implementations.
///
/// ```
/// use std::fmt::Write;
///
/// use mailsmith::Message;
///
/// # fn main() -> Result<(), std::fmt::Error> {
/// let mut email = Message::new();
/// write!(email.plain_mut(), "Hello {}!", "Kayo")?;
/// assert_eq!(email.plain().map(|part| part.as_str()), Some("Hello Kayo!"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPart {
    kind: BodyKind,
    content: String,
}

impl BodyPart {
    /// Create an empty body of the given variant
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            content: String::new(),
        }
    }

    /// The variant of this body
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Replace the content
    pub fn set<S: Into<String>>(&mut self, content: S) {
        self.content = content.into();
    }

    /// Append to the content
    pub fn push_str(&mut self, s: &str) {
        self.content.push_str(s);
    }

    /// The raw, unencoded content
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Length of the raw content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if nothing was written
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Encode the content for the wire
    pub(crate) fn encoded(&self) -> Body {
        Body::new_text(self.content.clone())
    }
}

impl fmt::Write for BodyPart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.content.push_str(s);
        Ok(())
    }
}

/// Every call to `write` must contain complete UTF-8 sequences.
impl io::Write for BodyPart {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = str::from_utf8(buf).map_err(invalid_utf8)?;
        self.content.push_str(s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn invalid_utf8(err: Utf8Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// A part body that has already been encoded.
#[derive(Debug, Clone)]
pub(crate) struct Body {
    buf: Vec<u8>,
    encoding: ContentTransferEncoding,
}

impl Body {
    /// Encode text, choosing the most efficient encoding between
    /// `7bit`, `quoted-printable` and `base64`.
    ///
    /// Line endings are converted to `CRLF` first.
    pub(crate) fn new_text(mut text: String) -> Self {
        // with `false` the chooser never picks 8bit
        let choice = Encoding::choose(text.as_str(), false);
        in_place_crlf_line_endings(&mut text);

        match choice {
            Encoding::QuotedPrintable => Self {
                buf: quoted_printable::encode(text.as_bytes()),
                encoding: ContentTransferEncoding::QuotedPrintable,
            },
            Encoding::Base64 => Self::base64(text.as_bytes()),
            Encoding::SevenBit | Encoding::EightBit => Self {
                buf: text.into_bytes(),
                encoding: ContentTransferEncoding::SevenBit,
            },
        }
    }

    /// Encode raw bytes as `base64`, wrapped at 76 columns
    pub(crate) fn base64(bytes: &[u8]) -> Self {
        let len = email_encoding::body::base64::encoded_len(bytes.len());

        let mut out = String::with_capacity(len);
        // fmt::Write for String never fails
        let _ = email_encoding::body::base64::encode(bytes, &mut out);

        Self {
            buf: out.into_bytes(),
            encoding: ContentTransferEncoding::Base64,
        }
    }

    /// Returns the `Content-Transfer-Encoding` of this `Body`.
    #[inline]
    pub(crate) fn encoding(&self) -> ContentTransferEncoding {
        self.encoding
    }

    /// Consumes `Body` and returns the inner `Vec<u8>`
    #[inline]
    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl Deref for Body {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

/// In place conversion to CRLF line endings
fn in_place_crlf_line_endings(string: &mut String) {
    let indices = find_all_lf_char_indices(string);

    for i in indices {
        // this relies on `indices` being in reverse order
        string.insert(i, '\r');
    }
}

/// Find indices to all places where `\r` should be inserted
/// in order to make `s` have CRLF line endings
///
/// The list is reversed, which is more efficient.
fn find_all_lf_char_indices(s: &str) -> Vec<usize> {
    let mut indices = Vec::new();

    let mut found_lf = false;
    for (i, c) in s.char_indices().rev() {
        if mem::take(&mut found_lf) && c != '\r' {
            // the previous character was `\n`, but this isn't a `\r`
            indices.push(i + c.len_utf8());
        }

        found_lf = c == '\n';
    }

    if found_lf {
        // the first character is `\n`
        indices.push(0);
    }

    indices
}

#[cfg(test)]
mod test {
    use std::io::Write as _;

    use pretty_assertions::assert_eq;

    use super::{in_place_crlf_line_endings, Body, BodyKind, BodyPart, ContentTransferEncoding};

    #[test]
    fn seven_bit_detect() {
        let encoded = Body::new_text(String::from("Hello, world!"));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::SevenBit);
        assert_eq!(&*encoded, b"Hello, world!");
    }

    #[test]
    fn seven_bit_too_long_detect() {
        let encoded = Body::new_text("Hello, world!".repeat(10));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::QuotedPrintable);
        assert_eq!(
            &*encoded,
            concat!(
                "Hello, world!Hello, world!Hello, world!Hello, world!Hello, world!Hello, wor=\r\n",
                "ld!Hello, world!Hello, world!Hello, world!Hello, world!"
            )
            .as_bytes()
        );
    }

    #[test]
    fn quoted_printable_detect() {
        let encoded = Body::new_text(String::from("Questo messaggio è corto"));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::QuotedPrintable);
        assert_eq!(&*encoded, b"Questo messaggio =C3=A8 corto");
    }

    #[test]
    fn quoted_printable_encode_line_wrap() {
        let encoded = Body::new_text(String::from(
            "Se lo standard 📬 fosse stato più semplice avremmo finito molto prima.",
        ));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::QuotedPrintable);
        assert_eq!(
            &*encoded,
            concat!(
                "Se lo standard =F0=9F=93=AC fosse stato pi=C3=B9 semplice avremmo finito mo=\r\n",
                "lto prima."
            )
            .as_bytes()
        );
    }

    #[test]
    fn base64_detect() {
        let encoded = Body::new_text(String::from("Привет, мир!"));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::Base64);
        assert_eq!(&*encoded, b"0J/RgNC40LLQtdGCLCDQvNC40YAh");
    }

    #[test]
    fn base64_encode_bytes_wrapping() {
        let encoded = Body::base64(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9].repeat(20));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::Base64);
        assert_eq!(
            &*encoded,
            concat!(
                "AAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUG\r\n",
                "BwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQID\r\n",
                "BAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkAAQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAkA\r\n",
                "AQIDBAUGBwgJAAECAwQFBgcICQABAgMEBQYHCAk="
            )
            .as_bytes()
        );
    }

    #[test]
    fn text_bodies_get_crlf() {
        let encoded = Body::new_text(String::from("one\ntwo\r\nthree"));

        assert_eq!(encoded.encoding(), ContentTransferEncoding::SevenBit);
        assert_eq!(encoded.into_vec(), b"one\r\ntwo\r\nthree".to_vec());
    }

    #[test]
    fn crlf() {
        let mut string = String::from("Send me a ✉️\nwith\nmailsmith!\n😀");

        in_place_crlf_line_endings(&mut string);
        assert_eq!(string, "Send me a ✉️\r\nwith\r\nmailsmith!\r\n😀");
    }

    #[test]
    fn harsh_crlf() {
        let mut string = String::from("\n\nSend me a ✉️\r\n\nwith\n\nmailsmith!\n\r\n😀");

        in_place_crlf_line_endings(&mut string);
        assert_eq!(
            string,
            "\r\n\r\nSend me a ✉️\r\n\r\nwith\r\n\r\nmailsmith!\r\n\r\n😀"
        );
    }

    #[test]
    fn body_part_is_a_writer() {
        let mut part = BodyPart::new(BodyKind::Html);
        part.set("<p>");
        std::fmt::Write::write_fmt(&mut part, format_args!("{}", 42)).unwrap();
        part.write_all(b"</p>").unwrap();
        part.push_str("\n");

        assert_eq!(part.kind(), BodyKind::Html);
        assert_eq!(part.as_str(), "<p>42</p>\n");
        assert_eq!(part.len(), 10);
        assert!(!part.is_empty());
    }

    #[test]
    fn body_part_rejects_invalid_utf8() {
        let mut part = BodyPart::new(BodyKind::Plain);
        let err = part.write(&[0xff, 0xfe]).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert!(part.is_empty());
    }
}
