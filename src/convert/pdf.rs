//! PDF passthrough.

use crate::detect::{is_pdf_bytes, FormatKind};
use crate::error::{Error, Result};

use super::{Extraction, Extractor};

/// Returns PDF input unchanged.
///
/// Only the `%PDF-` header is checked; the body is not parsed.
#[derive(Debug, Clone, Default)]
pub struct PassthroughExtractor {
    _private: (),
}

impl PassthroughExtractor {
    /// Create a new passthrough extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for PassthroughExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::PassthroughPdf
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        if !is_pdf_bytes(content) {
            return Err(Error::extraction(
                FormatKind::PassthroughPdf,
                "missing %PDF- header",
            ));
        }
        Ok(Extraction::Passthrough(content.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_identical() {
        let data = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF".to_vec();
        let extraction = PassthroughExtractor::new().extract(&data).unwrap();
        assert_eq!(extraction, Extraction::Passthrough(data));
    }

    #[test]
    fn test_passthrough_rejects_non_pdf() {
        let err = PassthroughExtractor::new().extract(b"hello").unwrap_err();
        assert!(matches!(
            err,
            Error::ExtractionFailed {
                kind: FormatKind::PassthroughPdf,
                ..
            }
        ));
    }
}
