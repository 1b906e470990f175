//! Format dispatch and the per-format extractors.
//!
//! [`Converter`] classifies a request, checks the [`CapabilityRegistry`],
//! runs the matching [`Extractor`] and feeds its events to a fresh
//! [`PdfSurface`](crate::render::PdfSurface).
//!
//! # Example
//!
//! ```
//! use topdf::{ConversionRequest, Converter};
//!
//! let converter = Converter::new();
//! let request = ConversionRequest::new(b"Hello\nWorld".to_vec(), "text/plain", "a.txt");
//! let result = converter.convert(request)?;
//! assert_eq!(result.original_size, 11);
//! assert!(result.output_size > 0);
//! # Ok::<(), topdf::Error>(())
//! ```

#[cfg(feature = "csv")]
mod csv;
#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "html")]
mod html;
#[cfg(any(feature = "docx", feature = "pptx"))]
mod ooxml;
mod pdf;
#[cfg(feature = "pptx")]
mod pptx;
mod rtf;
mod text;
#[cfg(feature = "xlsx")]
mod xlsx;

#[cfg(feature = "csv")]
pub use self::csv::CsvExtractor;
#[cfg(feature = "docx")]
pub use docx::DocxExtractor;
#[cfg(feature = "html")]
pub use html::HtmlExtractor;
pub use pdf::PassthroughExtractor;
#[cfg(feature = "pptx")]
pub use pptx::{PptxExtractor, ShapeKind};
pub use rtf::RtfExtractor;
pub use text::TextExtractor;
#[cfg(feature = "xlsx")]
pub use xlsx::XlsxExtractor;

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::capability::CapabilityRegistry;
use crate::detect::{classify, FormatKind};
use crate::error::{Error, Result};
use crate::model::{ConversionRequest, ConversionResult};
use crate::render::{render_events, LayoutOptions, RenderEvent};
use crate::tool::{timeout_from_secs, DEFAULT_PANDOC, DEFAULT_TIMEOUT};

/// Size of the heading that opens a document.
pub const DOCUMENT_TITLE_SIZE: f32 = 16.0;

/// Size of worksheet titles and document headings.
pub const SECTION_TITLE_SIZE: f32 = 14.0;

/// Size of normal body text.
pub const BODY_SIZE: f32 = 12.0;

/// Output of an extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Content to be laid out by the render surface.
    Events(Vec<RenderEvent>),
    /// A finished PDF that bypasses rendering.
    Passthrough(Vec<u8>),
}

impl Extraction {
    /// Render events, if this extraction has any.
    pub fn events(&self) -> Option<&[RenderEvent]> {
        match self {
            Extraction::Events(events) => Some(events),
            Extraction::Passthrough(_) => None,
        }
    }
}

/// A format-specific content extractor.
///
/// Implementations turn raw bytes into render events and report malformed
/// input as [`Error::ExtractionFailed`] tagged with their [`FormatKind`].
pub trait Extractor: Send + Sync {
    /// Format family handled by this extractor.
    fn kind(&self) -> FormatKind;

    /// Short name for logs.
    fn name(&self) -> &str;

    /// Extract the content of `content`.
    fn extract(&self, content: &[u8]) -> Result<Extraction>;
}

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Page layout of rendered documents
    pub layout: LayoutOptions,

    /// Wall-clock limit for external filters
    pub tool_timeout: Duration,

    /// RTF filter binary
    pub pandoc: PathBuf,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TOPDF_PANDOC` and `TOPDF_TOOL_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(path) = std::env::var_os("TOPDF_PANDOC") {
            options.pandoc = PathBuf::from(path);
        }
        if let Some(timeout) = timeout_from_env() {
            options.tool_timeout = timeout;
        }
        options
    }

    /// Set page layout.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Set the external filter timeout.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Set the RTF filter binary.
    pub fn with_pandoc(mut self, path: impl Into<PathBuf>) -> Self {
        self.pandoc = path.into();
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            tool_timeout: DEFAULT_TIMEOUT,
            pandoc: PathBuf::from(DEFAULT_PANDOC),
        }
    }
}

/// Read `TOPDF_TOOL_TIMEOUT_SECS`, ignoring unusable values.
pub(crate) fn timeout_from_env() -> Option<Duration> {
    let raw = std::env::var("TOPDF_TOOL_TIMEOUT_SECS").ok()?;
    parse_timeout(&raw)
}

fn parse_timeout(raw: &str) -> Option<Duration> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::InvalidInput(e.to_string()))
        .and_then(timeout_from_secs);
    match parsed {
        Ok(timeout) => Some(timeout),
        Err(e) => {
            log::warn!("ignoring TOPDF_TOOL_TIMEOUT_SECS={:?}: {}", raw, e);
            None
        }
    }
}

/// Registry of extractors keyed by format.
pub struct ExtractorRegistry {
    extractors: HashMap<FormatKind, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create a registry with every extractor compiled into this build.
    pub fn with_defaults(options: &ConvertOptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextExtractor::new()));
        registry.register(Arc::new(PassthroughExtractor::new()));
        registry.register(Arc::new(RtfExtractor::new(
            options.pandoc.clone(),
            options.tool_timeout,
        )));
        #[cfg(feature = "csv")]
        registry.register(Arc::new(CsvExtractor::new()));
        #[cfg(feature = "html")]
        registry.register(Arc::new(HtmlExtractor::new()));
        #[cfg(feature = "docx")]
        registry.register(Arc::new(DocxExtractor::new()));
        #[cfg(feature = "xlsx")]
        registry.register(Arc::new(XlsxExtractor::new()));
        #[cfg(feature = "pptx")]
        registry.register(Arc::new(PptxExtractor::new()));
        registry
    }

    /// Register an extractor, replacing any previous one for its kind.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(extractor.kind(), extractor);
    }

    /// Get the extractor for a kind.
    pub fn get(&self, kind: FormatKind) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&kind).cloned()
    }

    /// Check if a kind has an extractor.
    pub fn supports(&self, kind: FormatKind) -> bool {
        self.extractors.contains_key(&kind)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults(&ConvertOptions::default())
    }
}

/// Format dispatcher.
///
/// Holds only immutable configuration; each call to [`Converter::convert`]
/// allocates its own render surface, so one converter can serve concurrent
/// requests.
pub struct Converter {
    options: ConvertOptions,
    capabilities: CapabilityRegistry,
    extractors: ExtractorRegistry,
}

impl Converter {
    /// Converter with default options and the process-wide capability registry.
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// Converter with custom options.
    ///
    /// A non-default RTF filter path is probed here, once.
    pub fn with_options(options: ConvertOptions) -> Self {
        let capabilities = if options.pandoc.as_os_str() == DEFAULT_PANDOC {
            CapabilityRegistry::global().clone()
        } else {
            CapabilityRegistry::probe(&options.pandoc)
        };
        let extractors = ExtractorRegistry::with_defaults(&options);
        Self {
            options,
            capabilities,
            extractors,
        }
    }

    /// Replace the capability registry.
    pub fn with_capabilities(mut self, capabilities: CapabilityRegistry) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Register an additional or replacement extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.register(extractor);
        self
    }

    /// Capability registry in use.
    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    /// Options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Classify a MIME type and file name.
    pub fn classify(&self, mime: &str, file_name: &str) -> FormatKind {
        classify(mime, file_name)
    }

    /// Run the extractor for a request without rendering.
    pub fn extract(&self, request: &ConversionRequest) -> Result<Extraction> {
        let kind = request.kind();
        log::debug!(
            "{} classified as {} (mime {:?})",
            request.file_name(),
            kind,
            request.declared_mime()
        );

        if kind == FormatKind::Unsupported {
            return Err(Error::UnsupportedFormat {
                mime: request.declared_mime().to_string(),
                file_name: request.file_name().to_string(),
            });
        }
        if !self.capabilities.is_available(kind) {
            return Err(Error::CapabilityUnavailable(kind));
        }
        let extractor = self
            .extractors
            .get(kind)
            .ok_or(Error::CapabilityUnavailable(kind))?;

        log::debug!("extracting with {}", extractor.name());
        extractor.extract(request.content())
    }

    /// Convert a request into a PDF.
    pub fn convert(&self, request: ConversionRequest) -> Result<ConversionResult> {
        let kind = request.kind();
        let original_size = request.content().len();

        let pdf = match self.extract(&request)? {
            Extraction::Passthrough(bytes) => bytes,
            Extraction::Events(events) => {
                log::debug!("rendering {} events", events.len());
                render_events(&events, &self.options.layout)?
            }
        };

        let result = ConversionResult::new(pdf, original_size, kind);
        log::info!(
            "converted {} ({}): {} -> {} bytes",
            request.file_name(),
            kind,
            result.original_size,
            result.output_size
        );
        Ok(result)
    }

    /// Convert raw bytes with a declared MIME type and file name.
    pub fn convert_bytes(
        &self,
        content: &[u8],
        mime: &str,
        file_name: &str,
    ) -> Result<ConversionResult> {
        self.convert(ConversionRequest::new(content, mime, file_name))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences and dropping a BOM.
pub(crate) fn decode_text(content: &[u8]) -> Cow<'_, str> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    String::from_utf8_lossy(content)
}
