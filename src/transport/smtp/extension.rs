//! What the client announces in `EHLO` and what the server answers

use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr},
};

use crate::transport::smtp::{
    error::{self, Error},
    response::Response,
};

/// Client identifier, the parameter to `EHLO`
///
/// This is the local host name announced to the server.
#[derive(PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub enum ClientId {
    /// A fully-qualified domain name
    Domain(String),
    /// An IPv4 address literal
    Ipv4(Ipv4Addr),
    /// An IPv6 address literal
    Ipv6(Ipv6Addr),
}

impl Default for ClientId {
    /// The machine hostname, or the `[127.0.0.1]` literal when it is
    /// unknown (RFC 5321, section 4.1.4)
    fn default() -> Self {
        let localhost = ClientId::Ipv4(Ipv4Addr::LOCALHOST);
        #[cfg(feature = "hostname")]
        {
            hostname::get()
                .ok()
                .and_then(|name| name.into_string().ok())
                .map_or(localhost, ClientId::Domain)
        }
        #[cfg(not(feature = "hostname"))]
        localhost
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(name) => f.write_str(name),
            Self::Ipv4(address) => write!(f, "[{address}]"),
            Self::Ipv6(address) => write!(f, "[IPv6:{address}]"),
        }
    }
}

/// ESMTP keywords the client acts on
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum Extension {
    /// `8BITMIME`, [RFC 6152](https://tools.ietf.org/html/rfc6152)
    EightBitMime,
    /// `SMTPUTF8`, [RFC 6531](https://tools.ietf.org/html/rfc6531)
    SmtpUtfEight,
    /// `STARTTLS`, [RFC 3207](https://tools.ietf.org/html/rfc3207)
    StartTls,
    /// `AUTH`, [RFC 4954](https://tools.ietf.org/html/rfc4954), the
    /// mechanisms are kept apart
    Authentication,
}

impl Extension {
    const KNOWN: [Extension; 4] = [
        Extension::EightBitMime,
        Extension::SmtpUtfEight,
        Extension::StartTls,
        Extension::Authentication,
    ];

    /// The keyword as it appears in the `EHLO` reply
    pub fn keyword(self) -> &'static str {
        match self {
            Extension::EightBitMime => "8BITMIME",
            Extension::SmtpUtfEight => "SMTPUTF8",
            Extension::StartTls => "STARTTLS",
            Extension::Authentication => "AUTH",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Extension> {
        Self::KNOWN
            .into_iter()
            .find(|extension| extension.keyword().eq_ignore_ascii_case(keyword))
    }
}

/// What the server announced in its `EHLO` reply
///
/// Unknown keywords are dropped.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct ServerInfo {
    name: String,
    features: HashSet<Extension>,
    /// Upper case, in announcement order
    auth_mechanisms: Vec<String>,
}

impl ServerInfo {
    /// Reads an `EHLO` (or `HELO`) reply
    ///
    /// The first line starts with the server name, every following line
    /// is a keyword and its parameters.
    pub fn from_response(response: &Response) -> Result<ServerInfo, Error> {
        let name = response
            .first_word()
            .ok_or_else(|| error::response("Could not read server name"))?;
        let mut info = ServerInfo {
            name: name.to_owned(),
            ..ServerInfo::default()
        };

        for line in response.message().skip(1) {
            let mut words = line.split_whitespace();
            let Some(extension) = words.next().and_then(Extension::from_keyword) else {
                continue;
            };
            info.features.insert(extension);

            if extension == Extension::Authentication {
                for mechanism in words.map(str::to_ascii_uppercase) {
                    if !info.auth_mechanisms.contains(&mechanism) {
                        info.auth_mechanisms.push(mechanism);
                    }
                }
            }
        }

        Ok(info)
    }

    /// Checks if the server announced `extension`
    pub fn supports_feature(&self, extension: Extension) -> bool {
        self.features.contains(&extension)
    }

    /// Checks if the server announced an `AUTH` mechanism, ignoring case
    pub fn supports_auth_mechanism(&self, mechanism: &str) -> bool {
        self.auth_mechanisms
            .iter()
            .any(|announced| announced.eq_ignore_ascii_case(mechanism))
    }

    /// Announced `AUTH` mechanisms, upper case
    pub fn auth_mechanisms(&self) -> &[String] {
        &self.auth_mechanisms
    }

    /// The name the server gave for itself
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A `MAIL FROM` parameter
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MailParameter {
    /// `BODY=8BITMIME`, the document is not 7-bit clean
    EightBitMime,
    /// `SMTPUTF8`, an envelope address is not ASCII
    SmtpUtfEight,
}

impl Display for MailParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MailParameter::EightBitMime => "BODY=8BITMIME",
            MailParameter::SmtpUtfEight => "SMTPUTF8",
        })
    }
}
