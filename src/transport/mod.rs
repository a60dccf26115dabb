//! ### Sending Messages
//!
//! A [`Transport`] takes an assembled document and its envelope and
//! delivers it. The document is self contained: any transport accepting
//! raw MIME bytes can carry it.
//!
//! The following transports are available:
//!
//! * The `SmtpTransport` drives an SMTP session to hand the message to a
//!   relay.
//! * The `StubTransport` records what it was given and returns a fixed
//!   result. It is useful for testing code that sends email.

use crate::{message::BuildError, Envelope, Message};

#[cfg(feature = "smtp-transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "smtp-transport")))]
pub mod smtp;
pub mod stub;

/// Blocking Transport method for emails
pub trait Transport {
    /// Response produced by the Transport
    type Ok;
    /// Error produced by the Transport
    type Error: From<BuildError> + From<crate::Error>;

    /// Build the message and send it to its [`Message::envelope`]
    fn send(&self, message: &Message) -> Result<Self::Ok, Self::Error> {
        let envelope = message.envelope()?;
        let raw = message.formatted()?;
        self.send_raw(&envelope, &raw)
    }

    /// Send an already assembled document to an explicit envelope
    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error>;
}
