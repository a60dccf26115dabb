use std::{
    fmt::{self, Display},
    io::{self, BufRead, BufReader, Write},
    net::{Shutdown, ToSocketAddrs},
    time::Duration,
};

use base64::{engine::general_purpose::STANDARD, Engine};

#[cfg(feature = "tracing")]
use super::escape_crlf;
#[cfg(feature = "native-tls")]
use super::TlsParameters;
use super::{ClientCodec, NetworkStream};
#[cfg(feature = "native-tls")]
use crate::transport::smtp::commands::Starttls;
use crate::{
    address::Envelope,
    transport::smtp::{
        authentication::{Authenticator, MAX_CHALLENGES},
        commands::{Auth, AuthResponse, Data, Ehlo, Helo, Mail, Noop, Quit, Rcpt},
        error::{self, Error, Stage},
        extension::{ClientId, Extension, MailParameter, ServerInfo},
        response::{parse_response, Response},
    },
};

macro_rules! try_smtp (
    ($err: expr, $client: ident) => ({
        match $err {
            Ok(val) => val,
            Err(err) => {
                $client.abort();
                return Err(From::from(err))
            },
        }
    })
);

/// Structure that implements the SMTP client
///
/// The connection is owned by a single transaction. Dropping it before
/// [`SmtpConnection::quit`] aborts the session.
pub struct SmtpConnection {
    /// TCP stream between client and server
    stream: BufReader<NetworkStream>,
    /// The session failed and the stream was shut down
    panic: bool,
    /// Whether QUIT has been sent
    sent_quit: bool,
    /// Information about the server
    server_info: ServerInfo,
}

impl fmt::Debug for SmtpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConnection")
            .field("server_info", &self.server_info)
            .field("encrypted", &self.is_encrypted())
            .field("broken", &self.has_broken())
            .finish()
    }
}

impl SmtpConnection {
    /// Get information about the server
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Connects to the configured server
    ///
    /// Reads the greeting, then sends EHLO and parses server information.
    pub fn connect<A: ToSocketAddrs>(
        server: A,
        timeout: Option<Duration>,
        hello_name: &ClientId,
    ) -> Result<SmtpConnection, Error> {
        let stream = NetworkStream::connect(server, timeout)?;
        let mut conn = SmtpConnection {
            stream: BufReader::new(stream),
            panic: false,
            sent_quit: false,
            server_info: ServerInfo::default(),
        };
        try_smtp!(conn.set_timeout(timeout).map_err(error::network), conn);
        try_smtp!(conn.read_response(Stage::Greeting), conn);

        conn.ehlo(hello_name)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("server {:?}", conn.server_info);
        Ok(conn)
    }

    /// Runs one mail transaction: `MAIL FROM`, one `RCPT TO` per
    /// recipient, `DATA` and the document
    ///
    /// The first rejected command aborts the session.
    pub fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<Response, Error> {
        let mut mail_options = vec![];

        // Internationalization handling
        //
        // * 8BITMIME: https://tools.ietf.org/html/rfc6152
        // * SMTPUTF8: https://tools.ietf.org/html/rfc6531
        if envelope.has_non_ascii_addresses() {
            if !self.server_info.supports_feature(Extension::SmtpUtfEight) {
                self.abort();
                return Err(error::client(
                    "Envelope contains non-ascii chars but server does not support SMTPUTF8",
                ));
            }
            mail_options.push(MailParameter::SmtpUtfEight);
        }

        if !email.is_ascii() {
            if !self.server_info.supports_feature(Extension::EightBitMime) {
                self.abort();
                return Err(error::client(
                    "Message contains non-ascii chars but server does not support 8BITMIME",
                ));
            }
            mail_options.push(MailParameter::EightBitMime);
        }

        try_smtp!(
            self.command(
                Stage::MailFrom,
                Mail::new(envelope.from().to_owned(), mail_options)
            ),
            self
        );

        for to_address in envelope.to() {
            try_smtp!(
                self.command(Stage::RcptTo, Rcpt::new(to_address.clone())),
                self
            );
        }

        try_smtp!(self.command(Stage::Data, Data), self);

        let result = try_smtp!(self.message(email), self);
        Ok(result)
    }

    /// Tells if the session was aborted or closed
    pub fn has_broken(&self) -> bool {
        self.panic || self.sent_quit
    }

    /// Tells if the server offers `STARTTLS` on a clear text stream
    pub fn can_starttls(&self) -> bool {
        !self.is_encrypted() && self.server_info.supports_feature(Extension::StartTls)
    }

    /// Upgrades the session with `STARTTLS`, then says hello again
    #[cfg(feature = "native-tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
    pub fn starttls(
        &mut self,
        tls_parameters: &TlsParameters,
        hello_name: &ClientId,
    ) -> Result<(), Error> {
        if !self.server_info.supports_feature(Extension::StartTls) {
            self.abort();
            return Err(error::tls("STARTTLS is not supported on this server"));
        }

        try_smtp!(self.command(Stage::StartTls, Starttls), self);
        try_smtp!(self.stream.get_mut().upgrade_tls(tls_parameters), self);
        #[cfg(feature = "tracing")]
        tracing::debug!("connection encrypted");
        // the capabilities may differ once encrypted
        self.ehlo(hello_name)
    }

    /// Send EHLO and update server info, falling back to HELO when the
    /// server does not know EHLO
    fn ehlo(&mut self, hello_name: &ClientId) -> Result<(), Error> {
        let response = match self.command(Stage::Hello, Ehlo::new(hello_name.clone())) {
            Ok(response) => response,
            Err(err) if err.is_permanent() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("EHLO rejected, trying HELO");
                try_smtp!(
                    self.command(Stage::Hello, Helo::new(hello_name.clone())),
                    self
                )
            }
            Err(err) => {
                self.abort();
                return Err(err);
            }
        };
        self.server_info = try_smtp!(ServerInfo::from_response(&response), self);
        Ok(())
    }

    /// Sends `QUIT` and returns the reply, whatever its code
    pub fn quit(&mut self) -> Result<Response, Error> {
        self.sent_quit = true;
        self.write(Quit.to_string().as_bytes())?;
        self.read_reply()
    }

    /// Ends a failed session: `QUIT` if still possible, then shutdown
    pub fn abort(&mut self) {
        if self.panic {
            return;
        }
        self.panic = true;

        if !self.sent_quit {
            if let Err(_err) = self.quit() {
                #[cfg(feature = "tracing")]
                tracing::debug!("QUIT failed while aborting: {}", _err);
            }
        }
        let _ = self.stream.get_ref().shutdown(Shutdown::Both);
    }

    /// Tells if the underlying stream is currently encrypted
    pub fn is_encrypted(&self) -> bool {
        self.stream.get_ref().is_encrypted()
    }

    /// Set timeout
    pub fn set_timeout(&mut self, duration: Option<Duration>) -> io::Result<()> {
        self.stream.get_mut().set_read_timeout(duration)?;
        self.stream.get_mut().set_write_timeout(duration)
    }

    /// Checks if the server is connected using the NOOP SMTP command
    pub fn test_connected(&mut self) -> bool {
        self.write(Noop.to_string().as_bytes())
            .and_then(|()| self.read_reply())
            .is_ok_and(|response| response.is_positive())
    }

    /// Runs an `AUTH` exchange with `authenticator`, answering up to ten
    /// challenges
    ///
    /// Neither the initial response nor the answers are logged.
    pub fn auth(&mut self, authenticator: &dyn Authenticator) -> Result<Response, Error> {
        let mechanism = authenticator.mechanism();
        if !self.server_info.supports_auth_mechanism(mechanism) {
            self.abort();
            return Err(error::auth(format!(
                "the server does not support the {mechanism} mechanism"
            )));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("authenticating with {}", mechanism);

        let auth = Auth::new(mechanism, try_smtp!(authenticator.initial_response(), self));
        try_smtp!(
            self.write_secret(auth.to_string().as_bytes(), &auth.redacted()),
            self
        );
        let mut response = try_smtp!(self.read_reply(), self);

        let mut challenges = 0;
        while response.has_code(334) {
            if challenges == MAX_CHALLENGES {
                self.abort();
                return Err(error::auth("Unexpected number of challenges"));
            }
            challenges += 1;

            let challenge = try_smtp!(
                STANDARD.decode(response.first_line().unwrap_or_default())
                    .map_err(error::response),
                self
            );
            let answer = AuthResponse::new(try_smtp!(authenticator.respond(&challenge), self));
            try_smtp!(
                self.write_secret(answer.to_string().as_bytes(), "<redacted>"),
                self
            );
            response = try_smtp!(self.read_reply(), self);
        }

        if response.is_positive() {
            Ok(response)
        } else {
            self.abort();
            Err(error::reply(Stage::Auth, &response))
        }
    }

    /// Sends the message content, dot-stuffed, and the terminator
    ///
    /// A reply that can't be read is reported apart from a rejection: the
    /// server may have taken the message.
    pub fn message(&mut self, message: &[u8]) -> Result<Response, Error> {
        let mut codec = ClientCodec::new();
        let mut out_buf = Vec::with_capacity(message.len() + 5);
        codec.encode(message, &mut out_buf);
        if out_buf.ends_with(b"\r\n") {
            out_buf.extend_from_slice(b".\r\n");
        } else {
            out_buf.extend_from_slice(b"\r\n.\r\n");
        }
        self.write(&out_buf)?;

        let response = self.read_reply().map_err(error::response_read)?;
        if response.is_positive() {
            Ok(response)
        } else {
            Err(error::reply(Stage::Message, &response))
        }
    }

    /// Sends an SMTP command, a negative reply is an error for `stage`
    pub fn command<C: Display>(&mut self, stage: Stage, command: C) -> Result<Response, Error> {
        self.write(command.to_string().as_bytes())?;
        self.read_response(stage)
    }

    /// Writes a string to the server
    fn write(&mut self, string: &[u8]) -> Result<(), Error> {
        self.write_raw(string)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Wrote: {}", escape_crlf(&String::from_utf8_lossy(string)));
        Ok(())
    }

    /// Writes a command carrying credentials, logging `shown` instead
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn write_secret(&mut self, string: &[u8], shown: &str) -> Result<(), Error> {
        self.write_raw(string)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Wrote: {}<CRLF>", shown);
        Ok(())
    }

    fn write_raw(&mut self, string: &[u8]) -> Result<(), Error> {
        let stream = self.stream.get_mut();
        stream.write_all(string).map_err(error::network)?;
        stream.flush().map_err(error::network)
    }

    /// Reads a reply, a negative one is an error for `stage`
    pub fn read_response(&mut self, stage: Stage) -> Result<Response, Error> {
        let response = self.read_reply()?;
        if response.is_positive() {
            Ok(response)
        } else {
            Err(error::reply(stage, &response))
        }
    }

    /// Reads a complete, possibly multiline, reply
    fn read_reply(&mut self) -> Result<Response, Error> {
        let mut buffer = String::with_capacity(100);

        while self
            .stream
            .read_line(&mut buffer)
            .map_err(error::network)?
            > 0
        {
            #[cfg(feature = "tracing")]
            tracing::debug!("<< {}", escape_crlf(&buffer));
            match parse_response(&buffer) {
                Ok((_remaining, response)) => return Ok(response),
                Err(nom::Err::Incomplete(_)) => { /* read more */ }
                Err(nom::Err::Failure(e)) | Err(nom::Err::Error(e)) => {
                    return Err(error::response(e.to_string()));
                }
            }
        }

        Err(error::network(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by the server",
        )))
    }
}

impl Drop for SmtpConnection {
    fn drop(&mut self) {
        if !self.sent_quit {
            self.abort();
        }
    }
}
