//! Server replies: a three digit code and one or more text lines

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use nom::{
    bytes::streaming::{tag, take_until, take_while_m_n},
    character::streaming::one_of,
    combinator::map_res,
    sequence::terminated,
    IResult, Parser,
};

use crate::transport::smtp::{error, Error};

/// A complete reply
///
/// A multiline reply repeats its code on every line, only the text of
/// each line is kept.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Response {
    code: u16,
    lines: Vec<String>,
}

impl Response {
    /// Creates a reply from its code and text lines
    pub fn new(code: u16, lines: Vec<String>) -> Response {
        Response { code, lines }
    }

    /// The reply code, like `250`
    pub fn code(&self) -> u16 {
        self.code
    }

    /// `2yz` and `3yz` replies
    pub fn is_positive(&self) -> bool {
        matches!(self.code / 100, 2 | 3)
    }

    /// `4yz` replies: the command may succeed later
    pub fn is_transient(&self) -> bool {
        self.code / 100 == 4
    }

    /// Tests code equality
    pub fn has_code(&self, code: u16) -> bool {
        self.code == code
    }

    /// First word of the first line, the server name in an `EHLO` reply
    pub fn first_word(&self) -> Option<&str> {
        self.first_line()?.split_whitespace().next()
    }

    /// Text of the first line
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// Text of every line
    pub fn message(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Every line joined with spaces, for error messages
    pub(crate) fn text(&self) -> String {
        self.lines.join(" ")
    }
}

impl FromStr for Response {
    type Err = Error;

    fn from_str(s: &str) -> Result<Response, Error> {
        parse_response(s)
            .map(|(_, response)| response)
            .map_err(|e| error::response(e.to_owned()))
    }
}

impl Display for Response {
    /// The reply as the server wrote it, without the final line break
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Some((last, others)) = self.lines.split_last() else {
            return write!(f, "{}", self.code);
        };
        for line in others {
            writeln!(f, "{}-{}", self.code, line)?;
        }
        write!(f, "{} {}", self.code, last)
    }
}

/// `code separator text CRLF`
fn reply_line(i: &str) -> IResult<&str, (u16, char, &str)> {
    (
        map_res(
            take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
            str::parse::<u16>,
        ),
        one_of(" -"),
        terminated(take_until("\r\n"), tag("\r\n")),
    )
        .parse(i)
}

fn malformed(i: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(i, nom::error::ErrorKind::Verify))
}

/// Parse one complete reply, `Incomplete` means more input is needed
///
/// Codes outside `2yz` to `5yz`, or a line whose code differs from the
/// first one, are a failure.
pub(crate) fn parse_response(mut i: &str) -> IResult<&str, Response> {
    let mut code = None;
    let mut lines = Vec::new();

    loop {
        let (rest, (line_code, separator, text)) = reply_line(i)?;
        if !(200..600).contains(&line_code) || *code.get_or_insert(line_code) != line_code {
            return Err(malformed(i));
        }
        lines.push(text.to_owned());
        i = rest;

        if separator == ' ' {
            return Ok((
                i,
                Response {
                    code: line_code,
                    lines,
                },
            ));
        }
    }
}
