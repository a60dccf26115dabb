#[cfg(test)]
#[cfg(feature = "smtp-transport")]
mod test {
    use std::{
        io::{BufRead, BufReader, Write},
        net::{TcpListener, TcpStream},
        thread::{self, JoinHandle},
        time::Duration,
    };

    use mailsmith::{
        transport::smtp::{
            authentication::{Credentials, Login},
            extension::ClientId,
            Stage, Tls,
        },
        Envelope, Message, SmtpTransport, Transport,
    };
    use pretty_assertions::assert_eq;

    /// Pseudo command handed to the script once the data terminator is read
    const END_OF_DATA: &str = "<end of data>";

    /// A one-connection SMTP server answering with `reply`
    ///
    /// An empty reply drops the connection. Returns the port and a handle
    /// yielding every line the client wrote.
    fn serve<F>(reply: F) -> (u16, JoinHandle<Vec<String>>)
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(10)))
                .unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;
            let mut transcript = Vec::new();

            writer.write_all(b"220 test.local ESMTP ready\r\n").unwrap();

            let mut in_data = false;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    break;
                }
                transcript.push(line.clone());

                let answer = if in_data {
                    if line != ".\r\n" {
                        continue;
                    }
                    in_data = false;
                    reply(END_OF_DATA)
                } else {
                    reply(line.trim_end())
                };

                if answer.is_empty() {
                    break;
                }
                if writer.write_all(answer.as_bytes()).is_err() {
                    break;
                }
                if line.starts_with("DATA") && answer.starts_with("354") {
                    in_data = true;
                }
                if line.starts_with("QUIT") {
                    break;
                }
            }
            transcript
        });

        (port, handle)
    }

    fn standard_reply(command: &str) -> String {
        if command == END_OF_DATA {
            return "250 2.0.0 Ok: queued as 12345\r\n".to_owned();
        }
        match command.split(' ').next().unwrap_or_default() {
            "EHLO" => "250-test.local\r\n250-8BITMIME\r\n250 SIZE 1000000\r\n",
            "MAIL" | "RCPT" | "NOOP" => "250 2.1.0 Ok\r\n",
            "DATA" => "354 End data with <CR><LF>.<CR><LF>\r\n",
            "QUIT" => "221 2.0.0 Bye\r\n",
            _ => "502 5.5.2 Error: command not recognized\r\n",
        }
        .to_owned()
    }

    fn auth_reply(command: &str) -> String {
        match command {
            "EHLO client.local" => "250-test.local\r\n250 AUTH PLAIN LOGIN\r\n".to_owned(),
            "AUTH PLAIN AHVzZXIAcGFzcw==" => "235 2.7.0 Authentication successful\r\n".to_owned(),
            "AUTH PLAIN AHVzZXIAd3Jvbmc=" => {
                "535 5.7.8 Authentication credentials invalid\r\n".to_owned()
            }
            "AUTH LOGIN" => "334 VXNlcm5hbWU6\r\n".to_owned(),
            "dXNlcg==" => "334 UGFzc3dvcmQ6\r\n".to_owned(),
            "cGFzcw==" => "235 2.7.0 Authentication successful\r\n".to_owned(),
            _ => standard_reply(command),
        }
    }

    fn transport(port: u16) -> SmtpTransport {
        SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .timeout(Some(Duration::from_secs(10)))
            .build()
    }

    fn message() -> Message {
        let mut message = Message::new();
        message
            .set_from("a@x.com")
            .set_to(["b@x.com"])
            .set_subject("Hi")
            .set_plain("Hello there");
        message
    }

    #[test]
    fn clear_text_delivery_without_starttls() {
        let (port, server) = serve(standard_reply);

        let response = transport(port).send(&message()).unwrap();
        let transcript = server.join().unwrap();

        assert_eq!(response.code(), 250);
        assert_eq!(response.first_line(), Some("2.0.0 Ok: queued as 12345"));

        assert_eq!(transcript[0], "EHLO client.local\r\n");
        assert_eq!(transcript[1], "MAIL FROM:<a@x.com>\r\n");
        assert_eq!(transcript[2], "RCPT TO:<b@x.com>\r\n");
        assert_eq!(transcript[3], "DATA\r\n");
        assert!(transcript.contains(&"Subject: Hi\r\n".to_owned()));
        assert!(transcript.contains(&"Hello there\r\n".to_owned()));
        assert_eq!(transcript[transcript.len() - 2], ".\r\n");
        assert_eq!(transcript[transcript.len() - 1], "QUIT\r\n");
    }

    #[test]
    fn second_recipient_rejection_aborts_before_data() {
        let (port, server) = serve(|command| {
            if command == "RCPT TO:<c@x.com>" {
                "550 5.1.1 <c@x.com>: Recipient address rejected\r\n".to_owned()
            } else {
                standard_reply(command)
            }
        });

        let envelope =
            Envelope::new("a@x.com", vec!["b@x.com".to_owned(), "c@x.com".to_owned()]).unwrap();
        let raw = message().formatted().unwrap();
        let err = transport(port).send_raw(&envelope, &raw).unwrap_err();
        let transcript = server.join().unwrap();

        assert!(err.is_protocol());
        assert!(err.is_permanent());
        assert_eq!(err.stage(), Some(Stage::RcptTo));
        assert_eq!(err.status(), Some(550));
        assert_eq!(
            transcript,
            [
                "EHLO client.local\r\n",
                "MAIL FROM:<a@x.com>\r\n",
                "RCPT TO:<b@x.com>\r\n",
                "RCPT TO:<c@x.com>\r\n",
                "QUIT\r\n",
            ]
        );
    }

    #[test]
    fn rejected_sender() {
        let (port, server) = serve(|command| {
            if command.starts_with("MAIL") {
                "451 4.3.0 Try again later\r\n".to_owned()
            } else {
                standard_reply(command)
            }
        });

        let err = transport(port).send(&message()).unwrap_err();
        server.join().unwrap();

        assert!(err.is_protocol());
        assert!(err.is_transient());
        assert_eq!(err.stage(), Some(Stage::MailFrom));
        assert_eq!(err.to_string(), "MAIL FROM rejected (451): 4.3.0 Try again later");
    }

    #[test]
    fn rejected_message_data() {
        let (port, server) = serve(|command| {
            if command == END_OF_DATA {
                "554 5.7.1 Message rejected as spam\r\n".to_owned()
            } else {
                standard_reply(command)
            }
        });

        let err = transport(port).send(&message()).unwrap_err();
        server.join().unwrap();

        assert!(err.is_protocol());
        assert!(!err.is_response_read());
        assert_eq!(err.stage(), Some(Stage::Message));
    }

    #[test]
    fn lost_final_reply_is_reported_apart() {
        let (port, server) = serve(|command| {
            if command == END_OF_DATA {
                String::new()
            } else {
                standard_reply(command)
            }
        });

        let err = transport(port).send(&message()).unwrap_err();
        server.join().unwrap();

        assert!(err.is_response_read());
        assert!(!err.is_protocol());
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn lines_starting_with_a_dot_are_stuffed() {
        let (port, server) = serve(standard_reply);
        let mut message = message();
        message.set_plain("first\n.second\n..third");

        transport(port).send(&message).unwrap();
        let transcript = server.join().unwrap();

        assert!(transcript.contains(&"first\r\n".to_owned()));
        assert!(transcript.contains(&"..second\r\n".to_owned()));
        assert!(transcript.contains(&"...third\r\n".to_owned()));
        assert_eq!(
            transcript.iter().filter(|line| line.as_str() == ".\r\n").count(),
            1
        );
    }

    #[test]
    fn plain_authentication() {
        let (port, server) = serve(auth_reply);

        SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .credentials(Credentials::new("user".to_owned(), "pass".to_owned()))
            .build()
            .send(&message())
            .unwrap();
        let transcript = server.join().unwrap();

        assert_eq!(transcript[1], "AUTH PLAIN AHVzZXIAcGFzcw==\r\n");
        assert_eq!(transcript[2], "MAIL FROM:<a@x.com>\r\n");
    }

    #[test]
    fn login_authentication_answers_challenges() {
        let (port, server) = serve(auth_reply);

        SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .authenticator(Login::new(Credentials::new(
                "user".to_owned(),
                "pass".to_owned(),
            )))
            .build()
            .send(&message())
            .unwrap();
        let transcript = server.join().unwrap();

        assert_eq!(
            &transcript[1..5],
            [
                "AUTH LOGIN\r\n",
                "dXNlcg==\r\n",
                "cGFzcw==\r\n",
                "MAIL FROM:<a@x.com>\r\n"
            ]
        );
    }

    #[test]
    fn rejected_credentials_stop_the_session() {
        let (port, server) = serve(auth_reply);

        let err = SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .credentials(Credentials::new("user".to_owned(), "wrong".to_owned()))
            .build()
            .send(&message())
            .unwrap_err();
        let transcript = server.join().unwrap();

        assert!(err.is_auth());
        assert_eq!(err.status(), Some(535));
        assert!(!transcript.iter().any(|line| line.starts_with("MAIL")));
    }

    #[test]
    fn authentication_is_skipped_when_not_advertised() {
        let (port, server) = serve(standard_reply);

        SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .credentials(Credentials::new("user".to_owned(), "pass".to_owned()))
            .build()
            .send(&message())
            .unwrap();
        let transcript = server.join().unwrap();

        assert!(!transcript.iter().any(|line| line.starts_with("AUTH")));
    }

    #[test]
    fn helo_fallback() {
        let (port, server) = serve(|command| {
            if command.starts_with("EHLO") {
                "502 5.5.2 Error: command not recognized\r\n".to_owned()
            } else if command.starts_with("HELO") {
                "250 test.local\r\n".to_owned()
            } else {
                standard_reply(command)
            }
        });

        transport(port).send(&message()).unwrap();
        let transcript = server.join().unwrap();

        assert_eq!(transcript[0], "EHLO client.local\r\n");
        assert_eq!(transcript[1], "HELO client.local\r\n");
        assert_eq!(transcript[2], "MAIL FROM:<a@x.com>\r\n");
    }

    #[test]
    fn eight_bit_data_needs_8bitmime() {
        let (port, server) = serve(|command| {
            if command.starts_with("EHLO") {
                "250 test.local\r\n".to_owned()
            } else {
                standard_reply(command)
            }
        });

        let envelope = Envelope::new("a@x.com", vec!["b@x.com".to_owned()]).unwrap();
        let err = transport(port)
            .send_raw(&envelope, "Subject: ça va\r\n\r\nbody\r\n".as_bytes())
            .unwrap_err();
        let transcript = server.join().unwrap();

        assert!(err.is_client());
        assert_eq!(transcript, ["EHLO client.local\r\n", "QUIT\r\n"]);
    }

    #[test]
    fn eight_bit_data_is_announced() {
        let (port, server) = serve(standard_reply);

        let envelope = Envelope::new("a@x.com", vec!["b@x.com".to_owned()]).unwrap();
        transport(port)
            .send_raw(&envelope, "Subject: ça va\r\n\r\nbody\r\n".as_bytes())
            .unwrap();
        let transcript = server.join().unwrap();

        assert_eq!(transcript[1], "MAIL FROM:<a@x.com> BODY=8BITMIME\r\n");
    }

    #[test]
    fn unicode_envelope_needs_smtputf8() {
        let (port, server) = serve(standard_reply);

        let envelope = Envelope::new("a@x.com", vec!["δοκιμή@x.com".to_owned()]).unwrap();
        let err = transport(port)
            .send_raw(&envelope, b"Subject: hi\r\n\r\nbody\r\n")
            .unwrap_err();
        server.join().unwrap();

        assert!(err.is_client());
    }

    #[test]
    fn connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = transport(port).send(&message()).unwrap_err();

        assert!(err.is_connection());
        assert!(!err.is_protocol());
    }

    #[test]
    fn rejected_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _): (TcpStream, _) = listener.accept().unwrap();
            stream
                .write_all(b"554 5.3.2 No service for you\r\n")
                .unwrap();
        });

        let err = transport(port).send(&message()).unwrap_err();
        server.join().unwrap();

        assert!(err.is_connection());
        assert!(!err.is_protocol());
        assert!(err.is_permanent());
        assert_eq!(err.stage(), Some(Stage::Greeting));
        assert_eq!(err.status(), Some(554));
    }

    #[test]
    fn null_reverse_path() {
        let (port, server) = serve(standard_reply);

        let envelope = Envelope::new("", vec!["b@x.com".to_owned()]).unwrap();
        transport(port)
            .send_raw(&envelope, b"Subject: bounce\r\n\r\nbody\r\n")
            .unwrap();
        let transcript = server.join().unwrap();

        assert_eq!(transcript[1], "MAIL FROM:<>\r\n");
        assert_eq!(transcript[2], "RCPT TO:<b@x.com>\r\n");
    }

    #[test]
    fn test_connection_uses_noop() {
        let (port, server) = serve(standard_reply);

        assert!(transport(port).test_connection().unwrap());
        let transcript = server.join().unwrap();

        assert_eq!(
            transcript,
            ["EHLO client.local\r\n", "NOOP\r\n", "QUIT\r\n"]
        );
    }

    #[test]
    #[cfg(feature = "native-tls")]
    fn required_tls_without_starttls_fails_before_the_envelope() {
        let (port, server) = serve(standard_reply);

        let err = SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .tls(Tls::Required(
                mailsmith::transport::smtp::TlsParameters::new("127.0.0.1".to_owned()).unwrap(),
            ))
            .build()
            .send(&message())
            .unwrap_err();
        let transcript = server.join().unwrap();

        assert!(err.is_tls());
        assert!(err.is_connection());
        assert_eq!(transcript, ["EHLO client.local\r\n", "QUIT\r\n"]);
    }

    #[test]
    fn disabled_tls_ignores_starttls() {
        let (port, server) = serve(|command| {
            if command.starts_with("EHLO") {
                "250-test.local\r\n250 STARTTLS\r\n".to_owned()
            } else {
                standard_reply(command)
            }
        });

        SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .tls(Tls::None)
            .build()
            .send(&message())
            .unwrap();
        let transcript = server.join().unwrap();

        assert!(!transcript.iter().any(|line| line.starts_with("STARTTLS")));
    }

    #[cfg(feature = "native-tls")]
    fn starttls_reply(starttls_answer: &'static str) -> impl Fn(&str) -> String {
        move |command: &str| match command {
            "EHLO client.local" => "250-test.local\r\n250 STARTTLS\r\n".to_owned(),
            "STARTTLS" => starttls_answer.to_owned(),
            _ => standard_reply(command),
        }
    }

    #[cfg(feature = "native-tls")]
    fn opportunistic(port: u16) -> SmtpTransport {
        SmtpTransport::builder("127.0.0.1")
            .port(port)
            .hello_name(ClientId::Domain("client.local".to_owned()))
            .timeout(Some(Duration::from_secs(10)))
            .tls(Tls::Opportunistic(
                mailsmith::transport::smtp::TlsParameters::new("localhost".to_owned()).unwrap(),
            ))
            .build()
    }

    #[test]
    #[cfg(feature = "native-tls")]
    fn refused_starttls_is_a_tls_error() {
        let (port, server) = serve(starttls_reply("454 4.7.0 TLS not available\r\n"));

        let err = opportunistic(port).send(&message()).unwrap_err();
        let transcript = server.join().unwrap();

        assert!(err.is_tls());
        assert!(err.is_connection());
        assert!(err.is_transient());
        assert!(!err.is_protocol());
        assert_eq!(err.stage(), Some(Stage::StartTls));
        assert_eq!(
            transcript,
            ["EHLO client.local\r\n", "STARTTLS\r\n", "QUIT\r\n"]
        );
    }

    #[test]
    #[cfg(feature = "native-tls")]
    fn failed_handshake_after_starttls_is_fatal() {
        // accepts STARTTLS, then answers the client hello in clear text
        let (port, server) =
            serve(starttls_reply("220 2.0.0 Ready to start TLS\r\nnot tls\r\n"));

        let err = opportunistic(port).send(&message()).unwrap_err();
        let transcript = server.join().unwrap();

        assert!(err.is_tls());
        assert!(err.is_connection());
        assert_eq!(err.stage(), None);
        assert_eq!(transcript[1], "STARTTLS\r\n");
        assert!(!transcript.iter().any(|line| line.starts_with("MAIL")));
    }
}
