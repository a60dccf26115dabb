use super::{Header, HeaderName};
use base64::{engine::general_purpose::STANDARD, Engine};

// https://tools.ietf.org/html/rfc2047#section-2
const MAX_WORD_INPUT: usize = 45;

fn allowed_char(c: char) -> bool {
    c >= 1 as char && c <= 9 as char
        || c == 11 as char
        || c == 12 as char
        || c >= 14 as char && c <= 127 as char
}

/// Returns `true` if `s` can be written into a header line as is
pub(crate) fn is_plain_text(s: &str) -> bool {
    s.chars().all(allowed_char)
}

/// Encode header text as RFC 2047 `utf-8` encoded words when needed.
///
/// Plain ASCII is returned unchanged. Anything else is cut on char
/// boundaries into chunks short enough to keep every encoded word under
/// 75 chars, and the words are folded onto continuation lines.
pub(crate) fn encode_text(s: &str) -> String {
    if is_plain_text(s) {
        return s.to_owned();
    }

    let mut words = Vec::new();
    let mut start = 0;
    let mut end = 0;
    for (i, c) in s.char_indices() {
        let next = i + c.len_utf8();
        if next - start > MAX_WORD_INPUT {
            words.push(encoded_word(&s[start..end]));
            start = end;
        }
        end = next;
    }
    if start < end {
        words.push(encoded_word(&s[start..end]));
    }

    words.join("\r\n ")
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?b?{}?=", STANDARD.encode(chunk))
}

/// `Subject` of the message, see [RFC5322](https://tools.ietf.org/html/rfc5322#section-3.6.5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(String);

impl Header for Subject {
    fn name() -> HeaderName {
        HeaderName::known("Subject")
    }

    fn display(&self) -> String {
        encode_text(&self.0)
    }
}

impl From<String> for Subject {
    fn from(text: String) -> Self {
        Self(text)
    }
}
