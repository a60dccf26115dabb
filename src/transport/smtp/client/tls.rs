//! TLS policy and the native-tls connector used for `STARTTLS`

use std::fmt::{self, Debug};

#[cfg(feature = "native-tls")]
use native_tls::{Certificate, Protocol, TlsConnector};

#[cfg(feature = "native-tls")]
use crate::transport::smtp::error::{self, Error};

/// When the session switches to TLS
///
/// Without a TLS backend only [`Tls::None`] exists and `STARTTLS` is
/// never sent.
#[derive(Clone)]
#[allow(missing_copy_implementations)]
pub enum Tls {
    /// Stay in clear text, even if `STARTTLS` is advertised
    ///
    /// Only suitable for a trusted local relay.
    None,
    /// Upgrade with `STARTTLS` when the server advertises it, otherwise
    /// carry on in clear text
    ///
    /// A TLS failure after `STARTTLS` was accepted is fatal. An attacker
    /// able to remove the keyword from the `EHLO` reply keeps the session
    /// in clear text.
    #[cfg(feature = "native-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
    Opportunistic(TlsParameters),
    /// Require `STARTTLS`, failing before anything sensitive is sent if
    /// the server does not advertise it
    #[cfg(feature = "native-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
    Required(TlsParameters),
}

impl Debug for Tls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::None => "None",
            #[cfg(feature = "native-tls")]
            Self::Opportunistic(_) => "Opportunistic",
            #[cfg(feature = "native-tls")]
            Self::Required(_) => "Required",
        })
    }
}

/// A ready connector and the name the server certificate must carry
#[cfg(feature = "native-tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
#[derive(Clone)]
pub struct TlsParameters {
    connector: TlsConnector,
    domain: String,
}

#[cfg(feature = "native-tls")]
impl Debug for TlsParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsParameters")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "native-tls")]
impl TlsParameters {
    /// Verifies the server against the system roots and `domain`
    pub fn new(domain: String) -> Result<Self, Error> {
        Self::builder(domain).build()
    }

    /// Starts from the defaults of [`TlsParameters::new`]
    pub fn builder(domain: String) -> TlsParametersBuilder {
        TlsParametersBuilder {
            domain,
            extra_roots: Vec::new(),
            skip_hostname_check: false,
            skip_certificate_check: false,
        }
    }

    pub(crate) fn connector(&self) -> &TlsConnector {
        &self.connector
    }

    /// Name checked against the server certificate
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

/// Adjusts how the server certificate is verified
///
/// Made by [`TlsParameters::builder`]. TLS 1.2 is always the minimum.
#[cfg(feature = "native-tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
#[derive(Clone)]
pub struct TlsParametersBuilder {
    domain: String,
    extra_roots: Vec<Certificate>,
    skip_hostname_check: bool,
    skip_certificate_check: bool,
}

#[cfg(feature = "native-tls")]
impl Debug for TlsParametersBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsParametersBuilder")
            .field("domain", &self.domain)
            .field("extra_roots", &self.extra_roots.len())
            .field("skip_hostname_check", &self.skip_hostname_check)
            .field("skip_certificate_check", &self.skip_certificate_check)
            .finish()
    }
}

#[cfg(feature = "native-tls")]
impl TlsParametersBuilder {
    /// Trusts one more root, PEM encoded, like a private CA or a self
    /// signed server certificate
    pub fn add_root_certificate(mut self, pem: &[u8]) -> Result<Self, Error> {
        self.extra_roots
            .push(Certificate::from_pem(pem).map_err(error::tls)?);
        Ok(self)
    }

    /// Accepts a certificate issued for another name
    ///
    /// Any server with a certificate from a trusted root can then
    /// impersonate the relay.
    pub fn dangerous_accept_invalid_hostnames(mut self, accept: bool) -> Self {
        self.skip_hostname_check = accept;
        self
    }

    /// Accepts any certificate at all: self signed, expired, or for
    /// another name
    ///
    /// The session is then encrypted but not authenticated.
    pub fn dangerous_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.skip_certificate_check = accept;
        self
    }

    /// Builds the native-tls connector
    pub fn build(self) -> Result<TlsParameters, Error> {
        let mut connector = TlsConnector::builder();
        connector
            .min_protocol_version(Some(Protocol::Tlsv12))
            .danger_accept_invalid_hostnames(self.skip_hostname_check)
            .danger_accept_invalid_certs(self.skip_certificate_check);
        for root in self.extra_roots {
            connector.add_root_certificate(root);
        }

        Ok(TlsParameters {
            connector: connector.build().map_err(error::tls)?,
            domain: self.domain,
        })
    }
}
