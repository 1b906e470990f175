//! PDF compression through Ghostscript or qpdf.
//!
//! Both engines run as external processes on files in a private temporary
//! directory, under the same wall-clock limit as every other tool.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::convert::timeout_from_env;
use crate::error::{Error, Result};
use crate::tool::{ToolCommand, DEFAULT_TIMEOUT};

/// Default Ghostscript binary.
pub const DEFAULT_GS: &str = "gs";

/// Default qpdf binary.
pub const DEFAULT_QPDF: &str = "qpdf";

/// How aggressively to compress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Print quality, smallest change
    Light,
    /// Screen reading quality
    #[default]
    Medium,
    /// Smallest output
    High,
}

impl CompressionLevel {
    /// Ghostscript `-dPDFSETTINGS` preset for this level.
    pub fn ghostscript_preset(self) -> &'static str {
        match self {
            CompressionLevel::Light => "/prepress",
            CompressionLevel::Medium => "/ebook",
            CompressionLevel::High => "/screen",
        }
    }

    /// Extra qpdf flags for the second pass.
    pub fn qpdf_flags(self) -> &'static [&'static str] {
        match self {
            CompressionLevel::Light => &["--preserve-unreferenced=y"],
            CompressionLevel::Medium => &["--object-streams=generate", "--recompress-flate"],
            CompressionLevel::High => &[
                "--object-streams=generate",
                "--recompress-flate",
                "--compression-level=9",
                "--min-version=1.5",
                "--remove-unreferenced",
            ],
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(CompressionLevel::Light),
            "medium" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            _ => Err(Error::InvalidInput(format!(
                "unknown compression level '{}' (expected light, medium or high)",
                s
            ))),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompressionLevel::Light => "light",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        };
        f.write_str(name)
    }
}

/// Which external tool performs compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionEngine {
    /// Ghostscript `pdfwrite` re-distillation
    #[default]
    Ghostscript,
    /// qpdf structural optimization
    Qpdf,
}

impl FromStr for CompressionEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gs" | "ghostscript" => Ok(CompressionEngine::Ghostscript),
            "qpdf" => Ok(CompressionEngine::Qpdf),
            _ => Err(Error::InvalidInput(format!(
                "unknown compression engine '{}' (expected gs or qpdf)",
                s
            ))),
        }
    }
}

/// Settings for [`compress_pdf`].
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Compression level
    pub level: CompressionLevel,

    /// Compression engine
    pub engine: CompressionEngine,

    /// Ghostscript binary
    pub gs: PathBuf,

    /// qpdf binary
    pub qpdf: PathBuf,

    /// Wall-clock limit per tool invocation
    pub timeout: Duration,
}

impl CompressOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TOPDF_GS`, `TOPDF_QPDF` and
    /// `TOPDF_TOOL_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(path) = std::env::var_os("TOPDF_GS") {
            options.gs = PathBuf::from(path);
        }
        if let Some(path) = std::env::var_os("TOPDF_QPDF") {
            options.qpdf = PathBuf::from(path);
        }
        if let Some(timeout) = timeout_from_env() {
            options.timeout = timeout;
        }
        options
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the compression engine.
    pub fn with_engine(mut self, engine: CompressionEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set the Ghostscript binary.
    pub fn with_gs(mut self, path: impl Into<PathBuf>) -> Self {
        self.gs = path.into();
        self
    }

    /// Set the qpdf binary.
    pub fn with_qpdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.qpdf = path.into();
        self
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: CompressionLevel::default(),
            engine: CompressionEngine::default(),
            gs: PathBuf::from(DEFAULT_GS),
            qpdf: PathBuf::from(DEFAULT_QPDF),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Output of [`compress_pdf`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionResult {
    /// Compressed document
    #[serde(skip)]
    pub pdf_bytes: Vec<u8>,

    /// Input size in bytes
    pub original_size: usize,

    /// Output size in bytes
    pub compressed_size: usize,
}

impl CompressionResult {
    /// Bytes saved; zero if the output grew.
    pub fn saved(&self) -> usize {
        self.original_size.saturating_sub(self.compressed_size)
    }
}

/// Compress a finished PDF.
///
/// # Example
///
/// ```no_run
/// use topdf::{compress_pdf, CompressOptions, CompressionLevel};
///
/// let pdf = std::fs::read("report.pdf")?;
/// let options = CompressOptions::new().with_level(CompressionLevel::High);
/// let result = compress_pdf(&pdf, &options)?;
/// println!("{} -> {} bytes", result.original_size, result.compressed_size);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compress_pdf(pdf: &[u8], options: &CompressOptions) -> Result<CompressionResult> {
    let dir = tempfile::Builder::new().prefix("topdf-").tempdir()?;
    let input = dir.path().join("input.pdf");
    let output = dir.path().join("output.pdf");
    fs::write(&input, pdf)?;

    match options.engine {
        CompressionEngine::Ghostscript => run_ghostscript(&input, &output, options)?,
        CompressionEngine::Qpdf => {
            let optimized = dir.path().join("optimized.pdf");
            run_qpdf(&input, &optimized, &["--object-streams=generate"], options)?;
            run_qpdf(&optimized, &output, options.level.qpdf_flags(), options)?;
        }
    }

    let pdf_bytes = fs::read(&output)?;
    let result = CompressionResult {
        original_size: pdf.len(),
        compressed_size: pdf_bytes.len(),
        pdf_bytes,
    };
    log::info!(
        "compressed ({:?}, {}): {} -> {} bytes",
        options.engine,
        options.level,
        result.original_size,
        result.compressed_size
    );
    Ok(result)
}

fn run_ghostscript(input: &Path, output: &Path, options: &CompressOptions) -> Result<()> {
    let preset = format!("-dPDFSETTINGS={}", options.level.ghostscript_preset());
    let mut output_arg = std::ffi::OsString::from("-sOutputFile=");
    output_arg.push(output);
    ToolCommand::new(&options.gs)
        .args(["-sDEVICE=pdfwrite", "-dCompatibilityLevel=1.4"])
        .arg(preset)
        .args(["-dNOPAUSE", "-dQUIET", "-dBATCH"])
        .arg(output_arg)
        .arg(input)
        .run(None, options.timeout)?;
    Ok(())
}

fn run_qpdf(input: &Path, output: &Path, extra: &[&str], options: &CompressOptions) -> Result<()> {
    ToolCommand::new(&options.qpdf)
        .args(["--linearize", "--compress-streams=y"])
        .args(extra)
        .arg(input)
        .arg(output)
        .run(None, options.timeout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("light".parse::<CompressionLevel>().unwrap(), CompressionLevel::Light);
        assert_eq!(" HIGH ".parse::<CompressionLevel>().unwrap(), CompressionLevel::High);
        assert!(matches!(
            "extreme".parse::<CompressionLevel>(),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(CompressionLevel::default(), CompressionLevel::Medium);
    }

    #[test]
    fn test_parse_engine() {
        assert_eq!("gs".parse::<CompressionEngine>().unwrap(), CompressionEngine::Ghostscript);
        assert_eq!("qpdf".parse::<CompressionEngine>().unwrap(), CompressionEngine::Qpdf);
        assert!("pdftk".parse::<CompressionEngine>().is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(CompressionLevel::Light.ghostscript_preset(), "/prepress");
        assert_eq!(CompressionLevel::Medium.ghostscript_preset(), "/ebook");
        assert_eq!(CompressionLevel::High.ghostscript_preset(), "/screen");
        assert!(CompressionLevel::High
            .qpdf_flags()
            .contains(&"--compression-level=9"));
    }

    #[test]
    fn test_level_serde() {
        assert_eq!(serde_json::to_string(&CompressionLevel::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_missing_tool() {
        let options = CompressOptions::new().with_gs("/nonexistent/gs");
        let err = compress_pdf(b"%PDF-1.4", &options).unwrap_err();
        assert!(matches!(err, Error::ExternalToolFailure { .. }));
    }

    #[test]
    fn test_result_saved() {
        let result = CompressionResult {
            pdf_bytes: Vec::new(),
            original_size: 100,
            compressed_size: 60,
        };
        assert_eq!(result.saved(), 40);
    }
}
