use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use mime::Mime;

use crate::message::{
    body::Body,
    header::{ContentDisposition, ContentType},
    sanitize::strip_line_breaks,
    BuildError, SinglePart,
};

/// Something that yields the bytes of an attachment when the message is built
///
/// Sources are read every time the document is assembled, so a file
/// attached once and sent twice is read twice.
pub trait AttachmentSource: Send + Sync {
    /// Read the whole content
    fn read_content(&self) -> io::Result<Vec<u8>>;
}

impl AttachmentSource for Vec<u8> {
    fn read_content(&self) -> io::Result<Vec<u8>> {
        Ok(self.clone())
    }
}

impl AttachmentSource for &'static [u8] {
    fn read_content(&self) -> io::Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl AttachmentSource for String {
    fn read_content(&self) -> io::Result<Vec<u8>> {
        Ok(self.clone().into_bytes())
    }
}

/// A file on disk, read when the message is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource(PathBuf);

impl FileSource {
    /// Attach the file at `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl AttachmentSource for FileSource {
    fn read_content(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.0)
    }
}

/// A file attached to a [`Message`](super::Message)
#[derive(Clone)]
pub struct Attachment {
    filename: String,
    content_type: Option<Mime>,
    source: Arc<dyn AttachmentSource>,
}

impl Attachment {
    /// Attach `source` as `filename`
    ///
    /// Line breaks are stripped from the filename.
    pub fn new<S: AttachmentSource + 'static>(filename: &str, source: S) -> Self {
        Self {
            filename: strip_line_breaks(filename),
            content_type: None,
            source: Arc::new(source),
        }
    }

    /// Attach `source` as `filename` with an explicit `Content-Type`
    pub fn with_mime_type<S: AttachmentSource + 'static>(
        filename: &str,
        source: S,
        content_type: Mime,
    ) -> Self {
        Self {
            content_type: Some(content_type),
            ..Self::new(filename, source)
        }
    }

    /// The sanitized filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The explicit `Content-Type`, if one was given
    pub fn explicit_content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// The `Content-Type` written into the document
    ///
    /// Either the explicit one, or one guessed from the filename
    /// extension, or `application/octet-stream`.
    pub fn content_type(&self) -> Mime {
        match &self.content_type {
            Some(content_type) => content_type.clone(),
            None => mime_guess::from_path(&self.filename).first_or_octet_stream(),
        }
    }

    /// Read the attachment bytes from its source
    pub fn read(&self) -> Result<Vec<u8>, BuildError> {
        self.source
            .read_content()
            .map_err(|err| BuildError::new(&self.filename, err))
    }

    pub(crate) fn to_part(&self) -> Result<SinglePart, BuildError> {
        let content = self.read()?;

        Ok(
            SinglePart::new(ContentType::from(self.content_type()), Body::base64(&content))
                .with_header(ContentDisposition::attachment(&self.filename)),
        )
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
