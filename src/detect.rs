//! Input format classification.
//!
//! A request is classified by its declared MIME type first; the file
//! extension is only consulted when the MIME type is not in the known
//! table.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format family of a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// UTF-8 plain text
    PlainText,
    /// Comma separated values
    Csv,
    /// HTML markup
    Html,
    /// Rich Text Format
    Rtf,
    /// Word (OOXML)
    Docx,
    /// Excel (OOXML)
    Xlsx,
    /// PowerPoint (OOXML)
    Pptx,
    /// Already a PDF, returned as-is
    PassthroughPdf,
    /// No known handler
    Unsupported,
}

impl FormatKind {
    /// Every kind that has a handler, in dispatch table order.
    pub const SUPPORTED: [FormatKind; 8] = [
        FormatKind::PlainText,
        FormatKind::Csv,
        FormatKind::Html,
        FormatKind::Rtf,
        FormatKind::Docx,
        FormatKind::Xlsx,
        FormatKind::Pptx,
        FormatKind::PassthroughPdf,
    ];

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            FormatKind::PlainText => "TXT",
            FormatKind::Csv => "CSV",
            FormatKind::Html => "HTML",
            FormatKind::Rtf => "RTF",
            FormatKind::Docx => "DOCX",
            FormatKind::Xlsx => "XLSX",
            FormatKind::Pptx => "PPTX",
            FormatKind::PassthroughPdf => "PDF",
            FormatKind::Unsupported => "unsupported",
        }
    }

    /// Whether this kind produces output through the render surface.
    pub fn is_rendered(self) -> bool {
        !matches!(self, FormatKind::PassthroughPdf | FormatKind::Unsupported)
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const MIME_TABLE: &[(&str, FormatKind)] = &[
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        FormatKind::Docx,
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        FormatKind::Xlsx,
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        FormatKind::Pptx,
    ),
    ("text/csv", FormatKind::Csv),
    ("text/plain", FormatKind::PlainText),
    ("text/html", FormatKind::Html),
    ("application/rtf", FormatKind::Rtf),
    ("text/rtf", FormatKind::Rtf),
    ("application/pdf", FormatKind::PassthroughPdf),
];

const EXTENSION_TABLE: &[(&str, FormatKind)] = &[
    ("docx", FormatKind::Docx),
    ("xlsx", FormatKind::Xlsx),
    ("pptx", FormatKind::Pptx),
    ("csv", FormatKind::Csv),
    ("txt", FormatKind::PlainText),
    ("html", FormatKind::Html),
    ("htm", FormatKind::Html),
    ("rtf", FormatKind::Rtf),
    ("pdf", FormatKind::PassthroughPdf),
];

/// Classify a request by declared MIME type, then by file extension.
///
/// Total and deterministic: anything not found in either table is
/// [`FormatKind::Unsupported`].
///
/// # Example
/// ```
/// use topdf::detect::{classify, FormatKind};
///
/// assert_eq!(classify("text/csv", "data.bin"), FormatKind::Csv);
/// assert_eq!(classify("application/octet-stream", "Report.DOCX"), FormatKind::Docx);
/// assert_eq!(classify("application/zzz", "file.zzz"), FormatKind::Unsupported);
/// ```
pub fn classify(mime: &str, file_name: &str) -> FormatKind {
    classify_mime(mime)
        .or_else(|| classify_extension(file_name))
        .unwrap_or(FormatKind::Unsupported)
}

/// Look up a MIME type in the known table.
///
/// Parameters (`; charset=...`) and case are ignored.
pub fn classify_mime(mime: &str) -> Option<FormatKind> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == essence)
        .map(|(_, kind)| *kind)
}

/// Look up a file name's extension in the known table (case-insensitive).
pub fn classify_extension(file_name: &str) -> Option<FormatKind> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, kind)| *kind)
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept the header anywhere in the first kilobyte.
const PDF_HEADER_WINDOW: usize = 1024;

/// Check if bytes carry a PDF header.
///
/// # Returns
/// * `true` if `%PDF-` appears within the first 1024 bytes
/// * `false` otherwise
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}
