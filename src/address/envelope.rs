use crate::Error;

/// Simple email envelope representation
///
/// The envelope is what the SMTP server routes on (`MAIL FROM` and
/// `RCPT TO`). It is independent from the `From`/`To`/`Cc` headers
/// written into the document.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Envelope {
    /// The envelope recipients' addresses
    ///
    /// This can not be empty.
    forward_path: Vec<String>,
    /// The envelope sender address
    reverse_path: String,
}

impl Envelope {
    /// Creates a new envelope, which fails if `to` is empty
    ///
    /// An empty `from` is the null reverse-path, sent as `MAIL FROM:<>`,
    /// which is what delivery status notifications use.
    ///
    /// # Examples
    ///
    /// ```
    /// use mailsmith::Envelope;
    ///
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let envelope = Envelope::new("from@email.com", vec!["to@email.com".to_owned()])?;
    /// assert_eq!(envelope.to(), ["to@email.com"]);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// If `to` has no elements in it.
    pub fn new<S: Into<String>>(from: S, to: Vec<String>) -> Result<Envelope, Error> {
        let from = from.into();
        if to.is_empty() {
            return Err(Error::MissingTo);
        }
        Ok(Envelope {
            forward_path: to,
            reverse_path: from,
        })
    }

    /// Gets the destination addresses of the envelope.
    pub fn to(&self) -> &[String] {
        self.forward_path.as_slice()
    }

    /// Gets the sender of the envelope.
    pub fn from(&self) -> &str {
        &self.reverse_path
    }

    /// Check if any of the contained addresses contains non-ascii chars
    #[cfg_attr(not(feature = "smtp-transport"), allow(dead_code))]
    pub(crate) fn has_non_ascii_addresses(&self) -> bool {
        !self.reverse_path.is_ascii() || self.forward_path.iter().any(|a| !a.is_ascii())
    }
}

#[cfg(test)]
mod test {
    use super::Envelope;
    use crate::Error;

    #[test]
    fn envelope_requires_recipients() {
        assert_eq!(
            Envelope::new("from@example.com", vec![]),
            Err(Error::MissingTo)
        );
    }

    #[test]
    fn empty_sender_is_the_null_reverse_path() {
        let envelope = Envelope::new("", vec!["to@example.com".to_owned()]).unwrap();
        assert_eq!(envelope.from(), "");
        assert_eq!(envelope.to(), ["to@example.com"]);
    }

    #[test]
    fn non_ascii_detection() {
        let ascii = Envelope::new("a@example.com", vec!["b@example.com".to_owned()]).unwrap();
        assert!(!ascii.has_non_ascii_addresses());

        let utf8 = Envelope::new("a@example.com", vec!["jörg@example.com".to_owned()]).unwrap();
        assert!(utf8.has_non_ascii_addresses());
    }
}
