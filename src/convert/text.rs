//! Plain text extraction.

use crate::detect::FormatKind;
use crate::error::Result;
use crate::render::RenderEvent;

use super::{decode_text, Extraction, Extractor, DOCUMENT_TITLE_SIZE};

/// Heading placed above plain text content.
pub const TEXT_TITLE: &str = "Text Document";

/// Plain text extractor: one paragraph per line.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    _private: (),
}

impl TextExtractor {
    /// Create a new text extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for TextExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::PlainText
    }

    fn name(&self) -> &str {
        "text"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let text = decode_text(content);
        Ok(Extraction::Events(titled_lines(TEXT_TITLE, &text)))
    }
}

/// A title followed by one paragraph per line of `text`.
///
/// Blank lines are kept as events; the surface skips them.
pub(crate) fn titled_lines(title: &str, text: &str) -> Vec<RenderEvent> {
    let mut events = vec![RenderEvent::title(title, DOCUMENT_TITLE_SIZE)];
    events.extend(text.lines().map(RenderEvent::paragraph));
    events
}
