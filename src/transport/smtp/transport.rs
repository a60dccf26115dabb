use std::{
    fmt::{self, Display},
    sync::Arc,
    time::Duration,
};

#[cfg(feature = "native-tls")]
use super::TlsParameters;
use super::{
    authentication::{Authenticator, Credentials, Plain},
    client::{SmtpConnection, Tls},
    error::Error,
    extension::{ClientId, Extension},
    response::Response,
    DEFAULT_TIMEOUT, SMTP_PORT,
};
use crate::{address::Envelope, Message, Transport};

/// Sends emails using the SMTP protocol
///
/// Every send opens a new connection, owned by that send only. A transport
/// can be shared between threads, each send is independent.
#[cfg_attr(docsrs, doc(cfg(feature = "smtp-transport")))]
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    inner: SmtpClient,
}

impl Transport for SmtpTransport {
    type Ok = Response;
    type Error = Error;

    /// Sends an email, returning the reply to the end of the data
    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        let mut conn = self.inner.connection()?;

        let result = conn.send(envelope, email)?;

        // the message is accepted at this point
        if let Err(_err) = conn.quit() {
            #[cfg(feature = "tracing")]
            tracing::warn!("QUIT failed after delivery: {}", _err);
        }

        Ok(result)
    }
}

impl SmtpTransport {
    /// Creates a new SMTP client
    ///
    /// Defaults are:
    ///
    /// * Port 25
    /// * Opportunistic `STARTTLS`, verified against `server`, when a TLS
    ///   backend is enabled
    /// * No authentication
    /// * A 60-seconds timeout for smtp commands
    pub fn builder<T: Into<String>>(server: T) -> SmtpTransportBuilder {
        SmtpTransportBuilder::new(server)
    }

    /// Tests the SMTP connection
    ///
    /// `test_connection()` tests the connection by using the SMTP NOOP command.
    /// The connection is closed afterward.
    pub fn test_connection(&self) -> Result<bool, Error> {
        let mut conn = self.inner.connection()?;

        let is_connected = conn.test_connected();

        conn.quit()?;

        Ok(is_connected)
    }

    /// Describes `message` and where it would be sent, for logs
    ///
    /// Credentials never appear, only whether authentication is configured.
    pub fn summary<'a>(&'a self, message: &'a Message) -> Summary<'a> {
        Summary {
            message,
            info: &self.inner.info,
        }
    }
}

/// Diagnostic rendering of a message and of the transport carrying it
///
/// Built by [`SmtpTransport::summary`].
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    message: &'a Message,
    info: &'a SmtpInfo,
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tls = match &self.info.tls {
            Some(tls) => format!("{tls:?}"),
            None if cfg!(feature = "native-tls") => "Opportunistic".to_owned(),
            None => "None".to_owned(),
        };
        write!(
            f,
            "Summary {{ host: {:?}, port: {}, tls: {}, auth set: {}, message: {} }}",
            self.info.server,
            self.info.port,
            tls,
            self.info.authenticator.is_some(),
            self.message
        )
    }
}

#[derive(Clone)]
struct SmtpInfo {
    /// Name sent during EHLO
    hello_name: ClientId,
    /// Server we are connecting to
    server: String,
    /// Port to connect to
    port: u16,
    /// TLS security configuration, opportunistic with the server name
    /// when not set
    tls: Option<Tls>,
    /// Mechanism and credentials, if any
    authenticator: Option<Arc<dyn Authenticator>>,
    /// Define network timeout
    timeout: Option<Duration>,
}

impl Default for SmtpInfo {
    fn default() -> Self {
        Self {
            server: "localhost".to_owned(),
            port: SMTP_PORT,
            hello_name: ClientId::default(),
            tls: None,
            authenticator: None,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl fmt::Debug for SmtpInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpInfo")
            .field("hello_name", &self.hello_name)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field(
                "authenticator",
                &self.authenticator.as_ref().map(|a| a.mechanism()),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Contains client configuration.
/// Instances of this struct can be created using [`SmtpTransport::builder`].
#[derive(Debug, Clone)]
pub struct SmtpTransportBuilder {
    info: SmtpInfo,
}

/// Builder for the SMTP `SmtpTransport`
impl SmtpTransportBuilder {
    // Create new builder with default parameters
    pub(crate) fn new<T: Into<String>>(server: T) -> Self {
        let info = SmtpInfo {
            server: server.into(),
            ..Default::default()
        };

        Self { info }
    }

    /// Set the name used during EHLO
    pub fn hello_name(mut self, name: ClientId) -> Self {
        self.info.hello_name = name;
        self
    }

    /// Authenticate with `PLAIN` and these credentials
    pub fn credentials(self, credentials: Credentials) -> Self {
        self.authenticator(Plain::new(credentials))
    }

    /// Set the authentication mechanism to use
    ///
    /// It is only used if the server advertises `AUTH`, and must be one
    /// of the advertised mechanisms.
    pub fn authenticator<A: Authenticator + 'static>(mut self, authenticator: A) -> Self {
        self.info.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Set the timeout duration
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.info.timeout = timeout;
        self
    }

    /// Set the port to use
    pub fn port(mut self, port: u16) -> Self {
        self.info.port = port;
        self
    }

    /// Set the TLS settings to use
    pub fn tls(mut self, tls: Tls) -> Self {
        self.info.tls = Some(tls);
        self
    }

    /// Build the transport
    pub fn build(self) -> SmtpTransport {
        let client = SmtpClient { info: self.info };
        SmtpTransport { inner: client }
    }
}

/// Build client
#[derive(Debug, Clone)]
struct SmtpClient {
    info: SmtpInfo,
}

impl SmtpClient {
    /// Creates a new connection directly usable to send emails
    ///
    /// Handles encryption and authentication
    fn connection(&self) -> Result<SmtpConnection, Error> {
        let mut conn = SmtpConnection::connect::<(&str, u16)>(
            (self.info.server.as_ref(), self.info.port),
            self.info.timeout,
            &self.info.hello_name,
        )?;

        self.negotiate_tls(&mut conn)?;

        if let Some(authenticator) = &self.info.authenticator {
            if conn
                .server_info()
                .supports_feature(Extension::Authentication)
            {
                conn.auth(authenticator.as_ref())?;
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "server does not advertise AUTH, skipping {} authentication",
                    authenticator.mechanism()
                );
            }
        }
        Ok(conn)
    }

    #[cfg(feature = "native-tls")]
    fn negotiate_tls(&self, conn: &mut SmtpConnection) -> Result<(), Error> {
        match self.info.tls {
            Some(Tls::None) => {
                #[cfg(feature = "tracing")]
                {
                    if conn.can_starttls() {
                        tracing::debug!("STARTTLS disabled, staying in clear text");
                    }
                }
            }
            Some(Tls::Opportunistic(ref tls_parameters)) => {
                if conn.can_starttls() {
                    conn.starttls(tls_parameters, &self.info.hello_name)?;
                } else {
                    no_starttls();
                }
            }
            Some(Tls::Required(ref tls_parameters)) => {
                conn.starttls(tls_parameters, &self.info.hello_name)?;
            }
            None => {
                if conn.can_starttls() {
                    let tls_parameters = TlsParameters::new(self.info.server.clone())?;
                    conn.starttls(&tls_parameters, &self.info.hello_name)?;
                } else {
                    no_starttls();
                }
            }
        }
        Ok(())
    }

    #[cfg(not(feature = "native-tls"))]
    fn negotiate_tls(&self, _conn: &mut SmtpConnection) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        {
            if _conn.can_starttls() {
                tracing::debug!("no TLS backend, ignoring STARTTLS");
            }
        }
        Ok(())
    }
}

#[cfg(feature = "native-tls")]
fn no_starttls() {
    #[cfg(feature = "tracing")]
    tracing::debug!("server does not advertise STARTTLS, continuing in clear text");
}

#[cfg(test)]
mod test {
    use std::time::SystemTime;

    use super::SmtpTransport;
    use crate::{
        transport::smtp::{authentication::Credentials, client::Tls, DEFAULT_TIMEOUT},
        Message,
    };

    #[test]
    fn builder_defaults() {
        let builder = SmtpTransport::builder("smtp.example.com");

        assert_eq!(builder.info.server, "smtp.example.com");
        assert_eq!(builder.info.port, 25);
        assert_eq!(builder.info.timeout, Some(DEFAULT_TIMEOUT));
        assert!(builder.info.tls.is_none());
        assert!(builder.info.authenticator.is_none());

        let builder = builder
            .port(2525)
            .tls(Tls::None)
            .timeout(None)
            .credentials(Credentials::new("user".to_owned(), "pass".to_owned()));
        assert_eq!(builder.info.port, 2525);
        assert!(matches!(builder.info.tls, Some(Tls::None)));
        assert_eq!(builder.info.timeout, None);
        assert_eq!(
            builder.info.authenticator.as_ref().map(|a| a.mechanism()),
            Some("PLAIN")
        );
    }

    #[test]
    fn summary_hides_credentials() {
        let transport = SmtpTransport::builder("smtp.example.com")
            .credentials(Credentials::new("user".to_owned(), "hunter2".to_owned()))
            .tls(Tls::None)
            .build();
        let mut message = Message::new();
        message
            .set_from("a@x.com")
            .set_to(["b@x.com"])
            .set_subject("Hi")
            .set_date(SystemTime::UNIX_EPOCH);

        let summary = transport.summary(&message).to_string();
        assert!(summary.starts_with(
            "Summary { host: \"smtp.example.com\", port: 25, tls: None, auth set: true, message: Message {"
        ));
        assert!(summary.contains("subject: \"Hi\""));
        assert!(!summary.contains("hunter2"));
        assert!(!summary.contains("user"));
        assert!(!format!("{transport:?}").contains("hunter2"));
    }
}
