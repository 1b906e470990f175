//! Page geometry and typography settings.

const MM: f32 = 72.0 / 25.4;

/// Options controlling page layout of rendered documents.
///
/// All lengths are in PDF points (1/72 inch).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Page width
    pub page_width: f32,

    /// Page height
    pub page_height: f32,

    /// Left and right margin
    pub margin_x: f32,

    /// Top margin
    pub margin_top: f32,

    /// Distance from the bottom edge at which a new page begins
    pub margin_bottom: f32,

    /// Body text size
    pub body_size: f32,

    /// Header row text size
    pub header_size: f32,

    /// Data row text size
    pub cell_size: f32,

    /// Line height as a multiple of the font size
    pub line_spacing: f32,

    /// Height of one table row
    pub row_height: f32,

    /// Space after a title and before a table
    pub block_gap: f32,
}

impl LayoutOptions {
    /// Create options with A4 defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// US Letter page with the default margins.
    pub fn letter() -> Self {
        Self::default().with_page_size(612.0, 792.0)
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set all margins; `bottom` is the auto page-break margin.
    pub fn with_margins(mut self, x: f32, top: f32, bottom: f32) -> Self {
        self.margin_x = x;
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }

    /// Set the body text size.
    pub fn with_body_size(mut self, size: f32) -> Self {
        self.body_size = size;
        self
    }

    /// Set the line spacing factor.
    pub fn with_line_spacing(mut self, factor: f32) -> Self {
        self.line_spacing = factor;
        self
    }

    /// Set the table row height.
    pub fn with_row_height(mut self, height: f32) -> Self {
        self.row_height = height;
        self
    }

    /// Width available for text.
    pub fn printable_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin_x).max(1.0)
    }

    /// Lowest cursor position (from the top edge) that content may reach.
    pub fn printable_bottom(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Line height for text of `size` points.
    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin_x: 10.0 * MM,
            margin_top: 10.0 * MM,
            margin_bottom: 15.0 * MM,
            body_size: 12.0,
            header_size: 12.0,
            cell_size: 10.0,
            line_spacing: 1.4,
            row_height: 20.0,
            block_gap: 5.0 * MM,
        }
    }
}
