//! Error and result type for SMTP clients

use std::{error::Error as StdError, fmt};

use crate::{message::BuildError, transport::smtp::response::Response, BoxError};

// Inspired by https://github.com/seanmonstar/reqwest/blob/a8566383168c0ef06c21f38cbc9213af6ff6db31/src/error.rs

/// The Errors that may occur when sending an email over SMTP
///
/// Every error is final: the session is closed before it is returned
/// and nothing is retried.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    /// The negative reply behind the error, if any
    reply: Option<(Stage, u16)>,
    source: Option<BoxError>,
}

/// Step of the SMTP session a reply answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Stage {
    /// The banner sent by the server after connecting
    Greeting,
    /// `EHLO`, or `HELO` when falling back
    Hello,
    /// `STARTTLS`
    StartTls,
    /// `AUTH` and its challenges
    Auth,
    /// `MAIL FROM`
    MailFrom,
    /// `RCPT TO`
    RcptTo,
    /// `DATA`
    Data,
    /// The reply to the end of the message data
    Message,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Greeting => "greeting",
            Stage::Hello => "EHLO",
            Stage::StartTls => "STARTTLS",
            Stage::Auth => "AUTH",
            Stage::MailFrom => "MAIL FROM",
            Stage::RcptTo => "RCPT TO",
            Stage::Data => "DATA",
            Stage::Message => "message data",
        })
    }
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                reply: None,
                source: source.map(Into::into),
            }),
        }
    }

    fn with_reply(mut self, stage: Stage, code: u16) -> Error {
        self.inner.reply = Some((stage, code));
        self
    }

    /// Returns true if the message could not be assembled
    pub fn is_build(&self) -> bool {
        matches!(self.inner.kind, Kind::Build)
    }

    /// Returns true if the session could not be set up or broke down
    ///
    /// This covers dialing, a greeting or `EHLO` the server refused, network
    /// failures and TLS failures (see [`Error::is_tls`]).
    pub fn is_connection(&self) -> bool {
        match self.inner.kind {
            Kind::Connection | Kind::Network => true,
            #[cfg(feature = "native-tls")]
            Kind::Tls => true,
            _ => false,
        }
    }

    /// Returns true if the server rejected the credentials, or does not
    /// offer the chosen mechanism
    pub fn is_auth(&self) -> bool {
        matches!(self.inner.kind, Kind::Authentication)
    }

    /// Returns true if the server rejected part of the mail transaction
    ///
    /// [`Error::stage`] tells which command.
    pub fn is_protocol(&self) -> bool {
        matches!(self.inner.kind, Kind::Rejected)
    }

    /// Returns true if the reply to the end of the message data could
    /// not be read
    ///
    /// The server may have accepted the message: retrying may deliver
    /// it twice.
    pub fn is_response_read(&self) -> bool {
        matches!(self.inner.kind, Kind::ResponseRead)
    }

    /// Returns true if a reply could not be understood
    pub fn is_response(&self) -> bool {
        matches!(self.inner.kind, Kind::Response)
    }

    /// Returns true if the client refused to go on, like for 8-bit data
    /// the server can't take
    pub fn is_client(&self) -> bool {
        matches!(self.inner.kind, Kind::Client)
    }

    /// Returns true if the server answered with a `4yz` code
    pub fn is_transient(&self) -> bool {
        self.status().is_some_and(|code| code / 100 == 4)
    }

    /// Returns true if the server answered with a `5yz` code
    pub fn is_permanent(&self) -> bool {
        self.status().is_some_and(|code| code / 100 == 5)
    }

    /// Returns true if the error is caused by a timeout
    pub fn is_timeout(&self) -> bool {
        let mut source = self.source();

        while let Some(err) = source {
            if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
                return io_err.kind() == std::io::ErrorKind::TimedOut;
            }

            source = err.source();
        }

        false
    }

    /// Returns true if TLS could not be set up, including a refused
    /// `STARTTLS`
    #[cfg(feature = "native-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
    pub fn is_tls(&self) -> bool {
        matches!(self.inner.kind, Kind::Tls)
    }

    /// The step the server answered negatively, if it did
    pub fn stage(&self) -> Option<Stage> {
        self.inner.reply.map(|(stage, _)| stage)
    }

    /// The negative reply code, if the server sent one
    pub fn status(&self) -> Option<u16> {
        self.inner.reply.map(|(_, code)| code)
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// The document could not be assembled
    Build,
    /// A command of the mail transaction got a 4xx or 5xx reply
    ///
    /// [RFC 5321, section 4.2.1](https://tools.ietf.org/html/rfc5321#section-4.2.1)
    Rejected,
    /// Credentials rejected, or no usable mechanism
    Authentication,
    /// The final reply after the message data could not be read
    ResponseRead,
    /// Error parsing a response
    Response,
    /// Internal client error
    Client,
    /// Dial failure, or the server refused the session
    Connection,
    /// Underlying network i/o error
    Network,
    /// TLS error
    #[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
    #[cfg(feature = "native-tls")]
    Tls,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("mailsmith::transport::smtp::Error");

        builder.field("kind", &self.inner.kind);

        if let Some((stage, code)) = self.inner.reply {
            builder.field("stage", &stage).field("code", &code);
        }
        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.inner.kind, self.inner.reply) {
            (Kind::Authentication, Some((_, code))) => {
                write!(f, "authentication failed ({code})")?
            }
            (_, Some((stage, code))) => write!(f, "{stage} rejected ({code})")?,
            (Kind::Build, None) => f.write_str("message build error")?,
            (Kind::Rejected, None) => f.write_str("command rejected")?,
            (Kind::Authentication, None) => f.write_str("authentication failed")?,
            (Kind::ResponseRead, None) => {
                f.write_str("could not read the final response, the message may have been sent")?
            }
            (Kind::Response, None) => f.write_str("response error")?,
            (Kind::Client, None) => f.write_str("internal client error")?,
            (Kind::Network, None) => f.write_str("network error")?,
            (Kind::Connection, None) => f.write_str("connection error")?,
            #[cfg(feature = "native-tls")]
            (Kind::Tls, None) => f.write_str("tls error")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn std::error::Error + 'static) = &**e;
            r
        })
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::new(Kind::Build, Some(err))
    }
}

impl From<crate::Error> for Error {
    fn from(err: crate::Error) -> Self {
        client(err)
    }
}

/// A reply to `stage` that is not positive
///
/// Refusals while setting up the session are connection errors, a refused
/// `STARTTLS` is a TLS error, the rest are rejections of the transaction.
pub(crate) fn reply(stage: Stage, response: &Response) -> Error {
    if response.code() < 400 {
        return self::response(format!("unexpected reply {} to {stage}", response.code()));
    }

    let kind = match stage {
        Stage::Greeting | Stage::Hello => Kind::Connection,
        #[cfg(feature = "native-tls")]
        Stage::StartTls => Kind::Tls,
        Stage::Auth => Kind::Authentication,
        _ => Kind::Rejected,
    };
    Error::new(kind, Some(response.text())).with_reply(stage, response.code())
}

pub(crate) fn auth<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Authentication, Some(e))
}

pub(crate) fn response_read<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::ResponseRead, Some(e))
}

pub(crate) fn response<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Response, Some(e))
}

pub(crate) fn client<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Client, Some(e))
}

pub(crate) fn network<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Network, Some(e))
}

pub(crate) fn connection<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connection, Some(e))
}

#[cfg(feature = "native-tls")]
pub(crate) fn tls<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Tls, Some(e))
}
