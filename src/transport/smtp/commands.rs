//! SMTP commands

use std::fmt::{self, Display, Formatter};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::transport::smtp::extension::{ClientId, MailParameter};

/// EHLO command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Ehlo {
    client_id: ClientId,
}

impl Display for Ehlo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EHLO {}\r\n", self.client_id)
    }
}

impl Ehlo {
    /// Creates a EHLO command
    pub fn new(client_id: ClientId) -> Ehlo {
        Ehlo { client_id }
    }
}

/// HELO command, for servers rejecting `EHLO`
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Helo {
    client_id: ClientId,
}

impl Display for Helo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "HELO {}\r\n", self.client_id)
    }
}

impl Helo {
    /// Creates a HELO command
    pub fn new(client_id: ClientId) -> Helo {
        Helo { client_id }
    }
}

/// STARTTLS command
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub struct Starttls;

impl Display for Starttls {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("STARTTLS\r\n")
    }
}

/// MAIL command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Mail {
    sender: String,
    parameters: Vec<MailParameter>,
}

impl Display for Mail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MAIL FROM:<{}>", self.sender)?;
        for parameter in &self.parameters {
            write!(f, " {parameter}")?;
        }
        f.write_str("\r\n")
    }
}

impl Mail {
    /// Creates a MAIL command
    pub fn new(sender: String, parameters: Vec<MailParameter>) -> Mail {
        Mail { sender, parameters }
    }
}

/// RCPT command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Rcpt {
    recipient: String,
}

impl Display for Rcpt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RCPT TO:<{}>\r\n", self.recipient)
    }
}

impl Rcpt {
    /// Creates an RCPT command
    pub fn new(recipient: String) -> Rcpt {
        Rcpt { recipient }
    }
}

/// DATA command
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub struct Data;

impl Display for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("DATA\r\n")
    }
}

/// QUIT command
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub struct Quit;

impl Display for Quit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("QUIT\r\n")
    }
}

/// NOOP command
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub struct Noop;

impl Display for Noop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("NOOP\r\n")
    }
}

/// AUTH command, with its optional initial response
///
/// `Debug` never shows the response.
#[derive(PartialEq, Eq, Clone)]
pub struct Auth {
    mechanism: String,
    response: Option<String>,
}

impl Display for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AUTH {}", self.mechanism)?;
        if let Some(response) = &self.response {
            write!(f, " {}", STANDARD.encode(response))?;
        }
        f.write_str("\r\n")
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl Auth {
    /// Creates an AUTH command
    pub fn new(mechanism: &str, response: Option<String>) -> Auth {
        Auth {
            mechanism: mechanism.to_owned(),
            response,
        }
    }

    /// The command with the response hidden, for logging
    pub(crate) fn redacted(&self) -> String {
        match self.response {
            Some(_) => format!("AUTH {} <redacted>", self.mechanism),
            None => format!("AUTH {}", self.mechanism),
        }
    }
}

/// Answer to an `AUTH` challenge, base64 encoded on the wire
///
/// `Debug` never shows the answer.
#[derive(PartialEq, Eq, Clone)]
pub struct AuthResponse(String);

impl Display for AuthResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", STANDARD.encode(&self.0))
    }
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl AuthResponse {
    /// Creates the answer line
    pub fn new(response: String) -> AuthResponse {
        AuthResponse(response)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_display() {
        let id = ClientId::Domain("localhost".to_owned());
        assert_eq!(format!("{}", Ehlo::new(id.clone())), "EHLO localhost\r\n");
        assert_eq!(format!("{}", Helo::new(id)), "HELO localhost\r\n");
        assert_eq!(
            format!("{}", Mail::new("test@example.com".to_owned(), vec![])),
            "MAIL FROM:<test@example.com>\r\n"
        );
        assert_eq!(
            format!(
                "{}",
                Mail::new(
                    "test@example.com".to_owned(),
                    vec![
                        MailParameter::EightBitMime,
                        MailParameter::SmtpUtfEight,
                    ]
                )
            ),
            "MAIL FROM:<test@example.com> BODY=8BITMIME SMTPUTF8\r\n"
        );
        assert_eq!(
            format!("{}", Rcpt::new("test@example.com".to_owned())),
            "RCPT TO:<test@example.com>\r\n"
        );
        assert_eq!(format!("{Quit}"), "QUIT\r\n");
        assert_eq!(format!("{Data}"), "DATA\r\n");
        assert_eq!(format!("{Noop}"), "NOOP\r\n");
        assert_eq!(format!("{Starttls}"), "STARTTLS\r\n");
    }

    #[test]
    fn test_auth_display_and_redaction() {
        let plain = Auth::new("PLAIN", Some("\u{0}username\u{0}password".to_owned()));
        assert_eq!(format!("{plain}"), "AUTH PLAIN AHVzZXJuYW1lAHBhc3N3b3Jk\r\n");
        assert_eq!(format!("{plain:?}"), "AUTH PLAIN <redacted>");

        let login = Auth::new("LOGIN", None);
        assert_eq!(format!("{login}"), "AUTH LOGIN\r\n");
        assert_eq!(login.redacted(), "AUTH LOGIN");

        let answer = AuthResponse::new("alice".to_owned());
        assert_eq!(format!("{answer}"), "YWxpY2U=\r\n");
        assert_eq!(format!("{answer:?}"), "<redacted>");
    }
}
