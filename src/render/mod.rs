//! PDF rendering: events, layout, text sanitizing and the page surface.

mod event;
mod metrics;
mod options;
mod sanitize;
mod surface;

pub use event::RenderEvent;
pub use options::LayoutOptions;
pub use sanitize::{is_representable, sanitize, SUBSTITUTE};
pub use surface::{truncate_cell, PdfSurface, RenderState, CELL_KEEP_CHARS, CELL_MAX_CHARS, ELLIPSIS};

use crate::error::Result;

/// Render a complete event sequence on a fresh surface.
pub fn render_events(events: &[RenderEvent], layout: &LayoutOptions) -> Result<Vec<u8>> {
    let mut surface = PdfSurface::new(layout.clone());
    surface.apply_all(events)?;
    surface.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_events() {
        let events = vec![
            RenderEvent::title("Title", 16.0),
            RenderEvent::paragraph("Body"),
            RenderEvent::row(vec!["a".into(), "b".into()], true),
            RenderEvent::AddPage,
            RenderEvent::paragraph("Second page"),
        ];
        let pdf = render_events(&events, &LayoutOptions::default()).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
