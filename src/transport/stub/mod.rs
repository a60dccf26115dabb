//! The stub transport records the messages it is given and returns a
//! configured result. It is useful for testing code that sends email
//! without talking to a server.
//!
//! #### Stub Transport
//!
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use mailsmith::{transport::stub::StubTransport, Message, Transport};
//!
//! let mut email = Message::new();
//! email
//!     .set_from("nobody@domain.tld")
//!     .set_to(["hei@domain.tld"])
//!     .set_subject("Happy new year")
//!     .set_plain("Be happy!");
//!
//! let sender = StubTransport::new_ok();
//! sender.send(&email)?;
//!
//! let messages = sender.messages();
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].0.to(), ["hei@domain.tld"]);
//! # Ok(())
//! # }
//! ```

use std::{
    error::Error as StdError,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{message::BuildError, Envelope, Transport};

/// An error returned by the stub transport
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The transport was configured to fail
    Stub,
    /// The message could not be assembled
    Build(BuildError),
    /// The message has no usable envelope
    Envelope(crate::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Stub => f.write_str("stub error"),
            Error::Build(_) => f.write_str("could not build the message"),
            Error::Envelope(_) => f.write_str("invalid envelope"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Stub => None,
            Error::Build(err) => Some(err),
            Error::Envelope(err) => Some(err),
        }
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::Build(err)
    }
}

impl From<crate::Error> for Error {
    fn from(err: crate::Error) -> Self {
        Error::Envelope(err)
    }
}

/// This transport logs messages and always returns the given response
#[derive(Debug, Clone)]
pub struct StubTransport {
    fail: bool,
    message_log: Arc<Mutex<Vec<(Envelope, String)>>>,
}

impl StubTransport {
    /// Creates a new transport that always returns the given Result
    pub fn new(response: Result<(), ()>) -> Self {
        Self {
            fail: response.is_err(),
            message_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a new transport that always returns a success response
    pub fn new_ok() -> Self {
        Self::new(Ok(()))
    }

    /// Creates a new transport that always returns an error
    pub fn new_error() -> Self {
        Self::new(Err(()))
    }

    /// Return all logged messages sent using [`Transport::send_raw`]
    pub fn messages(&self) -> Vec<(Envelope, String)> {
        self.message_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for StubTransport {
    type Ok = ();
    type Error = Error;

    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            from = envelope.from(),
            to = ?envelope.to(),
            bytes = email.len(),
            "stub transport received a message"
        );

        self.message_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((envelope.clone(), String::from_utf8_lossy(email).into_owned()));

        if self.fail {
            Err(Error::Stub)
        } else {
            Ok(())
        }
    }
}
