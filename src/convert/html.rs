//! HTML extraction.
//!
//! Markup is flattened: every non-blank text node becomes one paragraph
//! with its whitespace collapsed. Lists, emphasis and links are not kept.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Node, Selector};

use crate::detect::FormatKind;
use crate::error::Result;
use crate::render::RenderEvent;

use super::{decode_text, Extraction, Extractor, DOCUMENT_TITLE_SIZE};

/// Heading used when the document has no `<title>`.
pub const HTML_TITLE: &str = "HTML Document";

/// Elements whose text is never rendered.
const SKIPPED: &[&str] = &["head", "script", "style", "template", "noscript"];

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn collapse(text: &str) -> String {
    whitespace().replace_all(text, " ").trim().to_string()
}

/// HTML extractor.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor {
    _private: (),
}

impl HtmlExtractor {
    /// Create a new HTML extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let text = collapse(&title.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

impl Extractor for HtmlExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Html
    }

    fn name(&self) -> &str {
        "html"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let source = decode_text(content);
        let document = Html::parse_document(&source);

        let title = document_title(&document).unwrap_or_else(|| HTML_TITLE.to_string());
        let mut events = vec![RenderEvent::title(title, DOCUMENT_TITLE_SIZE)];

        for node in document.tree.root().descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let skipped = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| SKIPPED.contains(&e.name()))
            });
            if skipped {
                continue;
            }
            let line = collapse(text);
            if !line.is_empty() {
                events.push(RenderEvent::paragraph(line));
            }
        }
        Ok(Extraction::Events(events))
    }
}
