use super::{
    textual::{encode_text, is_plain_text},
    Header, HeaderName,
};

/// `From` header: the sender address and an optional display name
///
/// ASCII display names are written as a quoted string with `"` and `\`
/// escaped, anything else as RFC 2047 encoded words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct From {
    address: String,
    name: Option<String>,
}

impl From {
    /// Build the header from an address and an optional display name
    pub fn new(address: String, name: Option<String>) -> Self {
        Self {
            address,
            name: name.filter(|name| !name.is_empty()),
        }
    }
}

impl Header for From {
    fn name() -> HeaderName {
        HeaderName::known("From")
    }

    fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", display_name(name), self.address),
            None => self.address.clone(),
        }
    }
}

fn display_name(name: &str) -> String {
    if !is_plain_text(name) {
        return encode_text(name);
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

macro_rules! address_list_header {
    ($(#[$doc:meta])*($type_name: ident, $header_name: expr)) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $type_name(Vec<String>);

        impl Header for $type_name {
            fn name() -> HeaderName {
                HeaderName::known($header_name)
            }

            fn display(&self) -> String {
                self.0.join(", ")
            }
        }

        impl std::convert::From<Vec<String>> for $type_name {
            #[inline]
            fn from(addresses: Vec<String>) -> Self {
                Self(addresses)
            }
        }
    };
}

address_list_header! {
    /**
    `To` header

    This header contains the addresses of the primary recipients.
    */
    (To, "To")
}

address_list_header! {
    /**
    `Cc` header

    This header contains the addresses of secondary recipients.
    */
    (Cc, "Cc")
}

address_list_header! {
    /**
    `Bcc` header

    Only written into the document when explicitly requested, since it
    reveals the blind recipients to everyone who reads the message.
    */
    (Bcc, "Bcc")
}

address_list_header! {
    /// `Reply-To` header
    (ReplyTo, "Reply-To")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Cc, From, ReplyTo, To};
    use crate::message::header::Headers;

    #[test]
    fn format_single_without_name() {
        let mut headers = Headers::default();
        headers.push(From::new("kayo@example.com".into(), None));

        assert_eq!(headers.to_string(), "From: kayo@example.com\r\n");
    }

    #[test]
    fn format_single_with_name() {
        let mut headers = Headers::default();
        headers.push(From::new("kayo@example.com".into(), Some("K.".into())));

        assert_eq!(headers.to_string(), "From: \"K.\" <kayo@example.com>\r\n");
    }

    #[test]
    fn format_name_is_escaped() {
        let mut headers = Headers::default();
        headers.push(From::new(
            "kayo@example.com".into(),
            Some("Kayo \"the\" \\cat\\".into()),
        ));

        assert_eq!(
            headers.to_string(),
            "From: \"Kayo \\\"the\\\" \\\\cat\\\\\" <kayo@example.com>\r\n"
        );
    }

    #[test]
    fn format_utf8_name() {
        let mut headers = Headers::default();
        headers.push(From::new(
            "kayo@example.com".into(),
            Some("Кайо".into()),
        ));

        assert_eq!(
            headers.to_string(),
            "From: =?utf-8?b?0JrQsNC50L4=?= <kayo@example.com>\r\n"
        );
    }

    #[test]
    fn empty_name_is_dropped() {
        let mut headers = Headers::default();
        headers.push(From::new("kayo@example.com".into(), Some(String::new())));

        assert_eq!(headers.to_string(), "From: kayo@example.com\r\n");
    }

    #[test]
    fn format_address_lists() {
        let mut headers = Headers::default();
        headers.push(To::from(vec![
            "kayo@example.com".to_owned(),
            "pony@domain.tld".to_owned(),
        ]));
        headers.push(Cc::from(vec!["cc@example.com".to_owned()]));
        headers.push(ReplyTo::from(vec!["reply@example.com".to_owned()]));

        assert_eq!(
            headers.to_string(),
            concat!(
                "To: kayo@example.com, pony@domain.tld\r\n",
                "Cc: cc@example.com\r\n",
                "Reply-To: reply@example.com\r\n"
            )
        );
    }
}
