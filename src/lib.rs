//! # topdf
//!
//! Convert heterogeneous documents into normalized PDF.
//!
//! Plain text, CSV, HTML, RTF, DOCX, XLSX and PPTX inputs are reduced to
//! a stream of render events and laid out on a simple PDF page surface;
//! existing PDFs pass through unchanged. Characters the standard PDF fonts
//! cannot show are replaced, never rejected.
//!
//! ## Quick Start
//!
//! ```no_run
//! use topdf::convert_file;
//!
//! fn main() -> topdf::Result<()> {
//!     let result = convert_file("report.docx")?;
//!     std::fs::write("report.pdf", &result.pdf_bytes)?;
//!     println!("{} -> {} bytes", result.original_size, result.output_size);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Format dispatch**: MIME type first, file extension as fallback
//! - **Capability registry**: optional formats are queryable before use
//! - **Lossy encoding policy**: unrepresentable characters become `?`
//! - **Bounded tool calls**: external filters run under a wall-clock limit
//! - **Compression**: optional Ghostscript or qpdf post-pass

pub mod capability;
pub mod compress;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod render;
pub mod tool;

// Re-export commonly used types
pub use capability::CapabilityRegistry;
pub use compress::{
    compress_pdf, CompressOptions, CompressionEngine, CompressionLevel, CompressionResult,
};
pub use convert::{ConvertOptions, Converter, Extraction, Extractor, ExtractorRegistry};
pub use detect::{classify, is_pdf_bytes, FormatKind};
pub use error::{Error, Result, ToolFailure};
pub use model::{ConversionRequest, ConversionResult};
pub use render::{render_events, sanitize, LayoutOptions, PdfSurface, RenderEvent, RenderState};

use std::path::Path;

/// Convert in-memory content with the default converter.
///
/// # Example
///
/// ```
/// let result = topdf::convert_bytes(b"a,b\n1,2\n", "text/csv", "data.csv")?;
/// assert!(result.pdf_bytes.starts_with(b"%PDF-"));
/// # Ok::<(), topdf::Error>(())
/// ```
pub fn convert_bytes(content: &[u8], mime: &str, file_name: &str) -> Result<ConversionResult> {
    Converter::new().convert_bytes(content, mime, file_name)
}

/// Convert a file, classifying it by extension.
///
/// # Example
///
/// ```no_run
/// let result = topdf::convert_file("slides.pptx").unwrap();
/// std::fs::write("slides.pdf", &result.pdf_bytes).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConversionResult> {
    let path = path.as_ref();
    let content = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Converter::new().convert(ConversionRequest::new(content, "", file_name))
}

/// Availability of every format in this process.
pub fn capabilities() -> &'static CapabilityRegistry {
    CapabilityRegistry::global()
}
