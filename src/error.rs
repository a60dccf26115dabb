//! Error type for envelopes derived from a message

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
};

/// Error type for envelope construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The message has no `From` address
    MissingFrom,
    /// Missing recipients in envelope
    MissingTo,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::MissingFrom => "missing source address, invalid envelope",
            Error::MissingTo => "missing destination address, invalid envelope",
        })
    }
}

impl StdError for Error {}
