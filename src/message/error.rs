//! Error type for email document assembly

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    io,
};

/// An attachment could not be read while assembling the document
///
/// Assembly is otherwise a pure transformation, so this is the only way
/// building a [`Message`](super::Message) can fail.
#[derive(Debug)]
pub struct BuildError {
    filename: String,
    source: io::Error,
}

impl BuildError {
    pub(crate) fn new(filename: &str, source: io::Error) -> Self {
        Self {
            filename: filename.to_owned(),
            source,
        }
    }

    /// Filename of the attachment which failed
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The underlying I/O error
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "could not read attachment `{}`", self.filename)
    }
}

impl StdError for BuildError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
