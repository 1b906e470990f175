//! PPTX extraction.
//!
//! Slides are read in the order of `p:sldIdLst`. Each slide starts a new
//! page with a "Slide N" title; every shape carrying text becomes a
//! paragraph, in the order shapes appear in the slide tree.

use roxmltree::{Document, Node};

use crate::detect::FormatKind;
use crate::error::{BoxError, Error, Result};
use crate::render::RenderEvent;

use super::ooxml::{child_named, children_named, open_package, read_relationships, require_part};
use super::{Extraction, Extractor, DOCUMENT_TITLE_SIZE};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Namespace of relationship id attributes (`r:id`).
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Kind of a top-level element of a slide's shape tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:sp`, a shape that may hold a text body
    AutoShape {
        /// Paragraphs of the text body joined by newlines
        text: String,
    },
    /// `p:grpSp`
    Group,
    /// `p:pic`
    Picture,
    /// `p:graphicFrame` (tables, charts, diagrams)
    GraphicFrame,
    /// `p:cxnSp`
    Connector,
    /// Any other element
    Other,
}

impl ShapeKind {
    /// Classify a shape tree element.
    fn from_node(node: Node<'_, '_>) -> Self {
        match node.tag_name().name() {
            "sp" => ShapeKind::AutoShape {
                text: child_named(node, "txBody").map(text_body).unwrap_or_default(),
            },
            "grpSp" => ShapeKind::Group,
            "pic" => ShapeKind::Picture,
            "graphicFrame" => ShapeKind::GraphicFrame,
            "cxnSp" => ShapeKind::Connector,
            _ => ShapeKind::Other,
        }
    }

    /// Text carried by this shape, if any.
    ///
    /// Only auto shapes carry text; blank text counts as none.
    pub fn text(&self) -> Option<&str> {
        match self {
            ShapeKind::AutoShape { text } if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

/// PPTX extractor.
#[derive(Debug, Clone, Default)]
pub struct PptxExtractor {
    _private: (),
}

impl PptxExtractor {
    /// Create a new PPTX extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for PptxExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Pptx
    }

    fn name(&self) -> &str {
        "pptx"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let events = pptx_events(content).map_err(|e| Error::extraction(FormatKind::Pptx, e))?;
        Ok(Extraction::Events(events))
    }
}

fn pptx_events(content: &[u8]) -> std::result::Result<Vec<RenderEvent>, BoxError> {
    let mut package = open_package(content)?;
    let presentation_xml = require_part(&mut package, PRESENTATION_PART)?;
    let relationships = read_relationships(&mut package, PRESENTATION_PART)?;

    let presentation = Document::parse(&presentation_xml)?;
    let slide_parts: Vec<String> = match child_named(presentation.root_element(), "sldIdLst") {
        Some(list) => children_named(list, "sldId")
            .map(|slide_id| -> std::result::Result<String, BoxError> {
                let rel_id = slide_id
                    .attribute((RELATIONSHIPS_NS, "id"))
                    .ok_or("slide entry without relationship id")?;
                relationships
                    .get(rel_id)
                    .cloned()
                    .ok_or_else(|| format!("unknown slide relationship {}", rel_id).into())
            })
            .collect::<std::result::Result<_, _>>()?,
        None => Vec::new(),
    };

    let mut events = Vec::new();
    for (index, part) in slide_parts.iter().enumerate() {
        if index > 0 {
            events.push(RenderEvent::AddPage);
        }
        events.push(RenderEvent::title(format!("Slide {}", index + 1), DOCUMENT_TITLE_SIZE));

        let slide_xml = require_part(&mut package, part)?;
        for shape in slide_shapes(&slide_xml)? {
            if let Some(text) = shape.text() {
                events.push(RenderEvent::paragraph(text));
            }
        }
    }

    log::debug!("pptx: {} slides", slide_parts.len());
    Ok(events)
}

/// Top-level shapes of a slide, in tree order.
fn slide_shapes(xml: &str) -> std::result::Result<Vec<ShapeKind>, BoxError> {
    let slide = Document::parse(xml)?;
    let tree = child_named(slide.root_element(), "cSld").and_then(|c| child_named(c, "spTree"));
    Ok(tree
        .into_iter()
        .flat_map(|tree| tree.children().filter(Node::is_element))
        .filter(|node| !matches!(node.tag_name().name(), "nvGrpSpPr" | "grpSpPr" | "extLst"))
        .map(ShapeKind::from_node)
        .collect())
}

/// Paragraphs of a `txBody`, joined with newlines.
fn text_body(body: Node<'_, '_>) -> String {
    children_named(body, "p")
        .map(|paragraph| {
            let mut text = String::new();
            for node in paragraph.children().filter(Node::is_element) {
                match node.tag_name().name() {
                    "r" | "fld" => {
                        if let Some(t) = child_named(node, "t") {
                            text.push_str(t.text().unwrap_or_default());
                        }
                    }
                    "br" => text.push('\n'),
                    _ => {}
                }
            }
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}
