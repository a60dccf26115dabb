//! SMTP client
//!
//! `SmtpConnection` allows manually sending SMTP commands.
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mailsmith::transport::smtp::{
//!     client::SmtpConnection, commands::*, extension::ClientId, Stage, SMTP_PORT,
//! };
//!
//! let hello = ClientId::Domain("my_hostname".to_owned());
//! let mut client = SmtpConnection::connect(&("localhost", SMTP_PORT), None, &hello)?;
//! client.command(Stage::MailFrom, Mail::new("user@example.com".to_owned(), vec![]))?;
//! client.command(Stage::RcptTo, Rcpt::new("user@example.org".to_owned()))?;
//! client.command(Stage::Data, Data)?;
//! client.message("Test email".as_bytes())?;
//! client.quit()?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "tracing")]
use std::borrow::Cow;

pub use self::{connection::SmtpConnection, net::NetworkStream, tls::Tls};
#[cfg(feature = "native-tls")]
pub use self::tls::{TlsParameters, TlsParametersBuilder};

mod connection;
mod net;
mod tls;

/// The codec used for transparency
///
/// A line starting with `.` gets a second one, so that the data can't
/// end before the terminator.
#[derive(Debug, Copy, Clone)]
struct ClientCodec {
    status: CodecStatus,
}

impl ClientCodec {
    /// Creates a new client codec
    pub(crate) fn new() -> Self {
        Self {
            status: CodecStatus::StartOfNewLine,
        }
    }

    /// Adds transparency
    pub(crate) fn encode(&mut self, frame: &[u8], buf: &mut Vec<u8>) {
        for &b in frame {
            buf.push(b);
            match (b, self.status) {
                (b'\r', _) => {
                    self.status = CodecStatus::StartingNewLine;
                }
                (b'\n', CodecStatus::StartingNewLine) => {
                    self.status = CodecStatus::StartOfNewLine;
                }
                (_, CodecStatus::StartingNewLine) => {
                    self.status = CodecStatus::Normal;
                }
                (b'.', CodecStatus::StartOfNewLine) => {
                    self.status = CodecStatus::Normal;
                    buf.push(b'.');
                }
                (_, CodecStatus::StartOfNewLine) => {
                    self.status = CodecStatus::Normal;
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum CodecStatus {
    /// Normal status
    Normal,
    /// If the next char is `\n`, we're starting a new line
    StartingNewLine,
    /// We're at the start of a new line
    StartOfNewLine,
}

/// Returns the string replacing all the CRLF with "\<CRLF\>"
/// Used for debug displays
#[cfg(feature = "tracing")]
pub(super) fn escape_crlf(string: &str) -> Cow<'_, str> {
    if string.contains("\r\n") {
        Cow::Owned(string.replace("\r\n", "<CRLF>"))
    } else {
        Cow::Borrowed(string)
    }
}
