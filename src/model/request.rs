//! Conversion input.

use crate::detect::{classify, FormatKind};

/// One document to convert.
///
/// Empty content is allowed; each format decides how to degrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    content: Vec<u8>,
    declared_mime: String,
    file_name: String,
}

impl ConversionRequest {
    /// Create a request from raw bytes, the declared MIME type and the file name.
    pub fn new(
        content: impl Into<Vec<u8>>,
        declared_mime: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            declared_mime: declared_mime.into(),
            file_name: file_name.into(),
        }
    }

    /// Raw document bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Declared MIME type.
    pub fn declared_mime(&self) -> &str {
        &self.declared_mime
    }

    /// Declared file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Format family of this request.
    pub fn kind(&self) -> FormatKind {
        classify(&self.declared_mime, &self.file_name)
    }

    /// Take the content out of the request.
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}
