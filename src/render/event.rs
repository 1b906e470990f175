//! Render events produced by extractors.

/// One content-emission instruction for the render surface.
///
/// Extractors produce a finite, ordered sequence of events; the surface
/// applies them strictly in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Start a new page.
    AddPage,

    /// Change the style used for subsequent paragraphs.
    SetStyle {
        /// Bold weight
        bold: bool,
        /// Font size in points
        size: f32,
    },

    /// Bold heading line; the style reverts to normal body text afterwards.
    Title {
        /// Heading text
        text: String,
        /// Font size in points
        size: f32,
    },

    /// Wrapped body text in the current style.
    Paragraph(String),

    /// One row of equal-width bordered cells.
    TableRow {
        /// Cell texts, left to right
        cells: Vec<String>,
        /// Render in header style
        is_header: bool,
    },
}

impl RenderEvent {
    /// Paragraph event.
    pub fn paragraph(text: impl Into<String>) -> Self {
        RenderEvent::Paragraph(text.into())
    }

    /// Title event.
    pub fn title(text: impl Into<String>, size: f32) -> Self {
        RenderEvent::Title {
            text: text.into(),
            size,
        }
    }

    /// Table row event.
    pub fn row(cells: Vec<String>, is_header: bool) -> Self {
        RenderEvent::TableRow { cells, is_header }
    }

    /// Style change event.
    pub fn style(bold: bool, size: f32) -> Self {
        RenderEvent::SetStyle { bold, size }
    }

    /// Check if this is a table row.
    pub fn is_table_row(&self) -> bool {
        matches!(self, RenderEvent::TableRow { .. })
    }

    /// Get the text if this is a paragraph.
    pub fn paragraph_text(&self) -> Option<&str> {
        match self {
            RenderEvent::Paragraph(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            RenderEvent::paragraph("hi"),
            RenderEvent::Paragraph("hi".to_string())
        );
        assert!(RenderEvent::row(vec![], true).is_table_row());
        assert_eq!(RenderEvent::paragraph("x").paragraph_text(), Some("x"));
        assert_eq!(RenderEvent::AddPage.paragraph_text(), None);
    }
}
