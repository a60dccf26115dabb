//! Email addresses and SMTP envelopes

mod envelope;

pub use self::envelope::Envelope;
