//! DOCX extraction.
//!
//! Body paragraphs are emitted in document order, then every table row.
//! A paragraph whose style name starts with "Heading" is set in bold at
//! [`SECTION_TITLE_SIZE`]; all others use regular [`BODY_SIZE`] text.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, Node};

use crate::detect::FormatKind;
use crate::error::{BoxError, Error, Result};
use crate::render::RenderEvent;

use super::ooxml::{attribute, child_named, children_named, open_package, read_part, require_part};
use super::{Extraction, Extractor, BODY_SIZE, SECTION_TITLE_SIZE};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// DOCX extractor.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor {
    _private: (),
}

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for DocxExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Docx
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let events = docx_events(content).map_err(|e| Error::extraction(FormatKind::Docx, e))?;
        Ok(Extraction::Events(events))
    }
}

fn docx_events(content: &[u8]) -> std::result::Result<Vec<RenderEvent>, BoxError> {
    let mut package = open_package(content)?;
    let document_xml = require_part(&mut package, DOCUMENT_PART)?;
    let style_names = match read_part(&mut package, STYLES_PART)? {
        Some(xml) => read_style_names(&xml)?,
        None => HashMap::new(),
    };

    let document = Document::parse(&document_xml)?;
    let body = document
        .root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "body")
        .ok_or("document has no body")?;

    let mut events = Vec::new();
    let mut heading_style = false;
    for paragraph in children_named(body, "p") {
        let is_heading = paragraph_style_id(paragraph)
            .map(|id| style_names.get(id).map(String::as_str).unwrap_or(id))
            .is_some_and(is_heading_style);
        if is_heading != heading_style {
            let size = if is_heading { SECTION_TITLE_SIZE } else { BODY_SIZE };
            events.push(RenderEvent::style(is_heading, size));
            heading_style = is_heading;
        }
        events.push(RenderEvent::paragraph(paragraph_text(paragraph)));
    }

    for table in children_named(body, "tbl") {
        for row in children_named(table, "tr") {
            let cells = children_named(row, "tc").map(cell_text).collect();
            events.push(RenderEvent::row(cells, false));
        }
    }

    log::debug!("docx: {} events", events.len());
    Ok(events)
}

/// Map of style id to display name from `word/styles.xml`.
fn read_style_names(xml: &str) -> std::result::Result<HashMap<String, String>, BoxError> {
    let mut names = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut current_id: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"w:style" => {
                current_id = attribute(e, b"w:styleId")?;
            }
            Event::Empty(ref e) if e.name().as_ref() == b"w:name" => {
                if let (Some(id), Some(name)) = (current_id.as_ref(), attribute(e, b"w:val")?) {
                    names.insert(id.clone(), name);
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"w:style" => current_id = None,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(names)
}

/// Built-in heading styles are named "heading 1" to "heading 9"; custom
/// ones usually keep the capitalized prefix.
fn is_heading_style(name: &str) -> bool {
    name.get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("heading"))
}

fn paragraph_style_id<'a>(paragraph: Node<'a, '_>) -> Option<&'a str> {
    let properties = child_named(paragraph, "pPr")?;
    let style = child_named(properties, "pStyle")?;
    style
        .attributes()
        .find(|a| a.name() == "val")
        .map(|a| a.value())
}

/// Text of a paragraph: runs concatenated, tabs and breaks kept.
///
/// Text boxes anchored in the paragraph are not part of its text.
fn paragraph_text(paragraph: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in paragraph.descendants().filter(Node::is_element) {
        if node.ancestors().any(|a| a.tag_name().name() == "txbxContent") {
            continue;
        }
        match node.tag_name().name() {
            "t" => text.push_str(node.text().unwrap_or_default()),
            "tab" if node.parent().is_some_and(|p| p.tag_name().name() == "r") => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

fn cell_text(cell: Node<'_, '_>) -> String {
    children_named(cell, "p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}
