use std::fmt;

use crate::message::{
    body::Body,
    header::{ContentType, Header, Headers},
    EmailFormat,
};

/// Length of generated boundaries
const BOUNDARY_LEN: usize = 40;

/// A node of the document tree
#[derive(Debug, Clone)]
pub enum Part {
    /// Headers and an encoded body
    Single(SinglePart),
    /// Headers and child parts between boundaries
    Multi(MultiPart),
}

impl EmailFormat for Part {
    fn format(&self, out: &mut Vec<u8>) {
        match self {
            Part::Single(part) => part.format(out),
            Part::Multi(part) => part.format(out),
        }
    }
}

impl From<SinglePart> for Part {
    fn from(part: SinglePart) -> Self {
        Part::Single(part)
    }
}

impl From<MultiPart> for Part {
    fn from(part: MultiPart) -> Self {
        Part::Multi(part)
    }
}

/// Leaf part: its headers and an already encoded body
#[derive(Debug, Clone)]
pub struct SinglePart {
    headers: Headers,
    body: Vec<u8>,
}

impl SinglePart {
    pub(crate) fn new(content_type: ContentType, body: Body) -> Self {
        let mut headers = Headers::default();
        headers.push(content_type);
        headers.push(body.encoding());

        Self {
            headers,
            body: body.into_vec(),
        }
    }

    pub(crate) fn with_header<H: Header>(mut self, header: H) -> Self {
        self.headers.push(header);
        self
    }

    /// The part as it is written into the document
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

impl EmailFormat for SinglePart {
    fn format(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.headers.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out.extend_from_slice(b"\r\n");
    }
}

/// `multipart/*` subtypes the assembler writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiPartKind {
    /// Unrelated parts, the text content then the attachments
    Mixed,
    /// The same content in several formats, the preferred one last
    Alternative,
}

impl MultiPartKind {
    fn subtype(self) -> &'static str {
        match self {
            MultiPartKind::Mixed => "mixed",
            MultiPartKind::Alternative => "alternative",
        }
    }
}

impl fmt::Display for MultiPartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "multipart/{}", self.subtype())
    }
}

/// Container part, each child is opened by `--boundary` and the list is
/// closed by `--boundary--`
#[derive(Debug, Clone)]
pub struct MultiPart {
    kind: MultiPartKind,
    boundary: String,
    parts: Vec<Part>,
}

impl MultiPart {
    pub(crate) fn new(kind: MultiPartKind, boundary: String) -> Self {
        Self {
            kind,
            boundary,
            parts: Vec::new(),
        }
    }

    pub(crate) fn push<P: Into<Part>>(&mut self, part: P) {
        self.parts.push(part.into());
    }

    /// Subtype of this container
    pub fn kind(&self) -> MultiPartKind {
        self.kind
    }

    /// Children in writing order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The part as it is written into the document
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }
}

impl EmailFormat for MultiPart {
    fn format(&self, out: &mut Vec<u8>) {
        let mut headers = Headers::default();
        headers.push(ContentType::multipart(self.kind.subtype(), &self.boundary));
        out.extend_from_slice(headers.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");

        let delimiter = format!("--{}", self.boundary);
        for part in &self.parts {
            out.extend_from_slice(delimiter.as_bytes());
            out.extend_from_slice(b"\r\n");
            part.format(out);
        }
        out.extend_from_slice(delimiter.as_bytes());
        out.extend_from_slice(b"--\r\n");
    }
}

/// Hands out boundaries for one document, never the same one twice
#[derive(Debug, Default)]
pub(crate) struct Boundaries {
    issued: Vec<String>,
}

impl Boundaries {
    pub(crate) fn next(&mut self) -> String {
        loop {
            let boundary: String = std::iter::repeat_with(fastrand::alphanumeric)
                .take(BOUNDARY_LEN)
                .collect();
            if !self.issued.contains(&boundary) {
                self.issued.push(boundary.clone());
                return boundary;
            }
        }
    }
}
