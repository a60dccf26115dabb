//! Provides limited SASL authentication mechanisms
//!
//! A mechanism is an [`Authenticator`]: the transport only drives the
//! `AUTH` exchange, the authenticator decides what to answer.

use std::{
    fmt::{self, Debug, Formatter},
    str,
};

use hmac::{Hmac, Mac};
use md5::Md5;

use crate::transport::smtp::error::{self, Error};

/// Maximum number of `334` challenges answered during one `AUTH` exchange
pub(crate) const MAX_CHALLENGES: u8 = 10;

/// Contains user credentials
#[derive(PartialEq, Eq, Clone, Hash)]
pub struct Credentials {
    authentication_identity: String,
    secret: String,
}

impl Credentials {
    /// Create a `Credentials` struct from username and password
    pub fn new(username: String, password: String) -> Credentials {
        Credentials {
            authentication_identity: username,
            secret: password,
        }
    }
}

impl<S, T> From<(S, T)> for Credentials
where
    S: Into<String>,
    T: Into<String>,
{
    fn from((username, password): (S, T)) -> Self {
        Credentials::new(username.into(), password.into())
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

/// A SASL mechanism usable with `AUTH`
///
/// Responses are returned unencoded, the transport takes care of the
/// base64 framing. Challenges are given already decoded.
pub trait Authenticator: Send + Sync {
    /// Mechanism name as sent in `AUTH`, like `PLAIN`
    fn mechanism(&self) -> &str;

    /// Response sent along with the `AUTH` command, if the mechanism has one
    fn initial_response(&self) -> Result<Option<String>, Error>;

    /// Answer a `334` challenge
    fn respond(&self, challenge: &[u8]) -> Result<String, Error>;
}

/// PLAIN authentication mechanism, defined in
/// [RFC 4616](https://tools.ietf.org/html/rfc4616)
#[derive(Debug, Clone)]
pub struct Plain(Credentials);

impl Plain {
    /// Authenticate with `credentials`
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl Authenticator for Plain {
    fn mechanism(&self) -> &str {
        "PLAIN"
    }

    fn initial_response(&self) -> Result<Option<String>, Error> {
        Ok(Some(format!(
            "\u{0}{}\u{0}{}",
            self.0.authentication_identity, self.0.secret
        )))
    }

    fn respond(&self, _challenge: &[u8]) -> Result<String, Error> {
        Err(error::client("This mechanism does not expect a challenge"))
    }
}

/// LOGIN authentication mechanism
/// Obsolete but needed for some providers (like office365)
///
/// Defined in [draft-murchison-sasl-login-00](https://www.ietf.org/archive/id/draft-murchison-sasl-login-00.txt).
#[derive(Debug, Clone)]
pub struct Login(Credentials);

impl Login {
    /// Authenticate with `credentials`
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl Authenticator for Login {
    fn mechanism(&self) -> &str {
        "LOGIN"
    }

    fn initial_response(&self) -> Result<Option<String>, Error> {
        Ok(None)
    }

    fn respond(&self, challenge: &[u8]) -> Result<String, Error> {
        let decoded_challenge = str::from_utf8(challenge).map_err(error::client)?;

        if ["User Name", "Username:", "Username"].contains(&decoded_challenge) {
            return Ok(self.0.authentication_identity.clone());
        }

        if ["Password", "Password:"].contains(&decoded_challenge) {
            return Ok(self.0.secret.clone());
        }

        Err(error::client("Unrecognized challenge"))
    }
}

/// CRAM-MD5 authentication mechanism, defined in
/// [RFC 2195](https://tools.ietf.org/html/rfc2195)
#[derive(Debug, Clone)]
pub struct CramMd5(Credentials);

impl CramMd5 {
    /// Authenticate with `credentials`
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl Authenticator for CramMd5 {
    fn mechanism(&self) -> &str {
        "CRAM-MD5"
    }

    fn initial_response(&self) -> Result<Option<String>, Error> {
        Ok(None)
    }

    fn respond(&self, challenge: &[u8]) -> Result<String, Error> {
        let mut mac = Hmac::<Md5>::new_from_slice(self.0.secret.as_bytes())
            .map_err(|_| error::client("invalid CRAM-MD5 key"))?;
        mac.update(challenge);
        let digest = mac.finalize().into_bytes();

        Ok(format!(
            "{} {}",
            self.0.authentication_identity,
            hex::encode(digest)
        ))
    }
}

/// Non-standard XOAUTH2 mechanism, defined in
/// [xoauth2-protocol](https://developers.google.com/gmail/imap/xoauth2-protocol)
///
/// The secret of the credentials is the OAuth bearer token.
#[derive(Debug, Clone)]
pub struct Xoauth2(Credentials);

impl Xoauth2 {
    /// Authenticate with `credentials`, the secret being the access token
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl Authenticator for Xoauth2 {
    fn mechanism(&self) -> &str {
        "XOAUTH2"
    }

    fn initial_response(&self) -> Result<Option<String>, Error> {
        Ok(Some(format!(
            "user={}\x01auth=Bearer {}\x01\x01",
            self.0.authentication_identity, self.0.secret
        )))
    }

    fn respond(&self, _challenge: &[u8]) -> Result<String, Error> {
        // the server sends an error description, answering with an
        // empty line makes it send the final reply
        Ok(String::new())
    }
}
