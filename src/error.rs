//! Error types for the topdf library.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::detect::FormatKind;

/// Result type alias for topdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by [`Error::ExtractionFailed`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither the MIME type nor the file extension is known.
    #[error("Unsupported file type: {mime} ({file_name})")]
    UnsupportedFormat {
        /// Declared MIME type
        mime: String,
        /// Declared file name
        file_name: String,
    },

    /// The format is recognized but its handler is not available in this process.
    #[error("Support for {0} is not available")]
    CapabilityUnavailable(FormatKind),

    /// The content of a recognized format is malformed.
    #[error("{kind} extraction failed: {source}")]
    ExtractionFailed {
        /// Format being extracted
        kind: FormatKind,
        /// Original cause
        #[source]
        source: BoxError,
    },

    /// The render surface was already finalized.
    #[error("Render surface has already been finalized")]
    ResourceAlreadyConsumed,

    /// An external tool failed to run, exited non-zero, or timed out.
    #[error("{tool} failed: {reason}")]
    ExternalToolFailure {
        /// Program name
        tool: String,
        /// What went wrong
        reason: ToolFailure,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error while writing the PDF structure.
    #[error("PDF writing error: {0}")]
    Pdf(String),

    /// Caller supplied an invalid argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Reason an external tool invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// The program could not be started.
    Spawn(String),
    /// The program exited with a non-zero status.
    Exit {
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Trimmed standard error output
        stderr: String,
    },
    /// The program exceeded its wall-clock limit and was killed.
    TimedOut {
        /// The limit that was exceeded
        after: Duration,
    },
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolFailure::Spawn(msg) => write!(f, "could not start: {}", msg),
            ToolFailure::Exit { code: Some(code), stderr } if stderr.is_empty() => {
                write!(f, "exited with status {}", code)
            }
            ToolFailure::Exit { code: Some(code), stderr } => {
                write!(f, "exited with status {}: {}", code, stderr)
            }
            ToolFailure::Exit { code: None, .. } => write!(f, "terminated by signal"),
            ToolFailure::TimedOut { after } => {
                write!(f, "timed out after {:.1}s", after.as_secs_f64())
            }
        }
    }
}

impl Error {
    /// Wrap a cause with the format it was raised in.
    pub fn extraction(kind: FormatKind, source: impl Into<BoxError>) -> Self {
        Error::ExtractionFailed {
            kind,
            source: source.into(),
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Only tool timeouts are retryable, including ones raised while
    /// extracting a format through an external filter.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ExternalToolFailure {
                reason: ToolFailure::TimedOut { .. },
                ..
            } => true,
            Error::ExtractionFailed { source, .. } => source
                .downcast_ref::<Error>()
                .is_some_and(Error::is_retryable),
            _ => false,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedFormat {
            mime: "application/zzz".into(),
            file_name: "file.zzz".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported file type: application/zzz (file.zzz)"
        );

        let err = Error::CapabilityUnavailable(FormatKind::Xlsx);
        assert_eq!(err.to_string(), "Support for XLSX is not available");
    }

    #[test]
    fn test_tool_failure_display() {
        let err = Error::ExternalToolFailure {
            tool: "gs".into(),
            reason: ToolFailure::Exit {
                code: Some(1),
                stderr: String::new(),
            },
        };
        assert_eq!(err.to_string(), "gs failed: exited with status 1");
    }

    #[test]
    fn test_retryable() {
        let timeout = Error::ExternalToolFailure {
            tool: "pandoc".into(),
            reason: ToolFailure::TimedOut {
                after: Duration::from_secs(5),
            },
        };
        assert!(timeout.is_retryable());

        let wrapped = Error::extraction(FormatKind::Rtf, timeout);
        assert!(wrapped.is_retryable());

        assert!(!Error::ResourceAlreadyConsumed.is_retryable());
        let exit = Error::ExternalToolFailure {
            tool: "qpdf".into(),
            reason: ToolFailure::Exit {
                code: Some(2),
                stderr: "bad".into(),
            },
        };
        assert!(!exit.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
