//! Conversion output.

use serde::{Deserialize, Serialize};

use crate::detect::FormatKind;

/// A produced PDF plus size metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The PDF document
    #[serde(skip)]
    pub pdf_bytes: Vec<u8>,

    /// Length of the input content in bytes
    pub original_size: usize,

    /// Length of `pdf_bytes`
    pub output_size: usize,

    /// Format the input was handled as
    pub kind: FormatKind,
}

impl ConversionResult {
    /// Build a result; `output_size` is taken from `pdf_bytes`.
    pub fn new(pdf_bytes: Vec<u8>, original_size: usize, kind: FormatKind) -> Self {
        Self {
            output_size: pdf_bytes.len(),
            pdf_bytes,
            original_size,
            kind,
        }
    }

    /// Replace the PDF bytes, keeping `output_size` in step.
    pub fn with_pdf_bytes(mut self, pdf_bytes: Vec<u8>) -> Self {
        self.output_size = pdf_bytes.len();
        self.pdf_bytes = pdf_bytes;
        self
    }

    /// Output size divided by input size, if the input was non-empty.
    pub fn size_ratio(&self) -> Option<f64> {
        (self.original_size > 0).then(|| self.output_size as f64 / self.original_size as f64)
    }
}
