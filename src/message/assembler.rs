use crate::message::{
    body::Body,
    header::{self, ContentType, HeaderName, Headers, MimeVersion},
    mimebody::{Boundaries, MultiPart, MultiPartKind, Part, SinglePart},
    BodyPart, BuildError, EmailFormat, Message,
};

/// Renders one [`Message`] into a MIME document
///
/// An assembler is used for a single build: the boundaries it hands out
/// are only unique within that document.
pub(crate) struct MimeAssembler<'a> {
    message: &'a Message,
    boundaries: Boundaries,
}

impl<'a> MimeAssembler<'a> {
    pub(crate) fn new(message: &'a Message) -> Self {
        Self {
            message,
            boundaries: Boundaries::default(),
        }
    }

    /// Build the complete document
    pub(crate) fn assemble(mut self) -> Result<Vec<u8>, BuildError> {
        let body = self.body()?;

        let mut out = Vec::new();
        out.extend_from_slice(self.headers().to_string().as_bytes());
        body.format(&mut out);
        Ok(out)
    }

    /// Message level headers, the top-level part adds its own `Content-Type`
    fn headers(&self) -> Headers {
        let message = self.message;
        let mut headers = Headers::default();

        headers.push(header::Date::new(message.date()));
        headers.push(header::From::new(
            message.from().to_owned(),
            Some(message.from_name().to_owned()),
        ));
        if !message.to().is_empty() {
            headers.push(header::To::from(message.to().to_vec()));
        }
        if !message.cc().is_empty() {
            headers.push(header::Cc::from(message.cc().to_vec()));
        }
        if message.writes_bcc_header() && !message.bcc().is_empty() {
            headers.push(header::Bcc::from(message.bcc().to_vec()));
        }
        if !message.reply_to().is_empty() {
            headers.push(header::ReplyTo::from(vec![message.reply_to().to_owned()]));
        }
        headers.push(header::Subject::from(message.subject().to_owned()));
        headers.push(MimeVersion);

        // names were cleaned and checked by `Message::set_header`
        for (name, value) in message.headers() {
            headers.push_raw(HeaderName::new(name), header::encode_text(value));
        }

        headers
    }

    /// Pick the part tree for the bodies and attachments present
    fn body(&mut self) -> Result<Part, BuildError> {
        let message = self.message;
        let text = self.text();

        if message.attachments().is_empty() {
            return Ok(text.unwrap_or_else(empty_text));
        }

        let mut mixed = MultiPart::new(MultiPartKind::Mixed, self.boundaries.next());
        if let Some(text) = text {
            mixed.push(text);
        }
        for attachment in message.attachments() {
            mixed.push(attachment.to_part()?);
        }

        Ok(Part::Multi(mixed))
    }

    /// The textual content: one body directly, or both as `multipart/alternative`
    fn text(&mut self) -> Option<Part> {
        match (self.message.plain(), self.message.html()) {
            (None, None) => None,
            (Some(body), None) | (None, Some(body)) => Some(Part::Single(text_part(body))),
            (Some(plain), Some(html)) => {
                let mut alternative =
                    MultiPart::new(MultiPartKind::Alternative, self.boundaries.next());
                alternative.push(text_part(plain));
                alternative.push(text_part(html));
                Some(Part::Multi(alternative))
            }
        }
    }
}

fn text_part(body: &BodyPart) -> SinglePart {
    SinglePart::new(body.kind().content_type(), body.encoded())
}

fn empty_text() -> Part {
    Part::Single(SinglePart::new(
        ContentType::plain(),
        Body::new_text(String::new()),
    ))
}
