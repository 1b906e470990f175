//! RTF extraction through an external text filter.

use std::path::PathBuf;
use std::time::Duration;

use crate::detect::FormatKind;
use crate::error::{Error, Result};
use crate::tool::ToolCommand;

use super::text::titled_lines;
use super::{decode_text, Extraction, Extractor};

/// Heading placed above RTF content.
pub const RTF_TITLE: &str = "RTF Document";

/// RTF extractor backed by `pandoc --from rtf --to plain`.
///
/// The document is piped through stdin; the plain text output is split
/// into paragraphs the same way as plain text input.
#[derive(Debug, Clone)]
pub struct RtfExtractor {
    pandoc: PathBuf,
    timeout: Duration,
}

impl RtfExtractor {
    /// Create an extractor using the given filter binary and time limit.
    pub fn new(pandoc: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            pandoc: pandoc.into(),
            timeout,
        }
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new(&self.pandoc).args(["--from", "rtf", "--to", "plain", "--wrap=none"])
    }
}

impl Extractor for RtfExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Rtf
    }

    fn name(&self) -> &str {
        "rtf"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let output = self
            .command()
            .run(Some(content), self.timeout)
            .map_err(|e| Error::extraction(FormatKind::Rtf, e))?;
        let text = decode_text(&output.stdout);
        Ok(Extraction::Events(titled_lines(RTF_TITLE, &text)))
    }
}
