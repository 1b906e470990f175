//! Stateful PDF page accumulator.
//!
//! [`PdfSurface`] owns one [`RenderState`] and the content of every page
//! written so far. It is created per conversion and consumed by
//! [`PdfSurface::finalize`]; nothing in it is shared between calls.

use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::error::{Error, Result};

use super::metrics::text_width;
use super::sanitize::{encode_win_ansi, sanitize};
use super::{LayoutOptions, RenderEvent};

/// Cell text longer than this many characters is truncated.
pub const CELL_MAX_CHARS: usize = 15;

/// Characters kept from a truncated cell.
pub const CELL_KEEP_CHARS: usize = 12;

/// Marker appended to a truncated cell.
pub const ELLIPSIS: &str = "...";

const PRODUCER: &str = concat!("topdf ", env!("CARGO_PKG_VERSION"));
const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const CELL_PADDING: f32 = 2.0;
const BORDER_WIDTH: f32 = 0.5;
const TAB: &str = "    ";

/// Mutable cursor of a render surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Zero-based index of the page being written
    pub page_index: usize,
    /// Distance from the top edge of the page to the next line
    pub cursor: f32,
    /// Whether paragraphs are set in bold
    pub bold: bool,
    /// Paragraph font size in points
    pub size: f32,
}

/// PDF render surface.
///
/// # Example
///
/// ```
/// use topdf::render::{LayoutOptions, PdfSurface};
///
/// let mut surface = PdfSurface::new(LayoutOptions::default());
/// surface.title("Report", 16.0)?;
/// surface.paragraph("First line of the body.")?;
/// let pdf = surface.finalize()?;
/// assert!(pdf.starts_with(b"%PDF-"));
/// # Ok::<(), topdf::Error>(())
/// ```
#[derive(Debug)]
pub struct PdfSurface {
    layout: LayoutOptions,
    state: RenderState,
    pages: Vec<Vec<Operation>>,
    in_table: bool,
    consumed: bool,
}

impl PdfSurface {
    /// Create a surface with one empty page open.
    pub fn new(layout: LayoutOptions) -> Self {
        let state = RenderState {
            page_index: 0,
            cursor: layout.margin_top,
            bold: false,
            size: layout.body_size,
        };
        Self {
            layout,
            state,
            pages: vec![Vec::new()],
            in_table: false,
            consumed: false,
        }
    }

    /// Current render state.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Number of pages written so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Layout in use.
    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    /// Apply one event.
    pub fn apply(&mut self, event: &RenderEvent) -> Result<()> {
        match event {
            RenderEvent::AddPage => self.add_page(),
            RenderEvent::SetStyle { bold, size } => self.set_style(*bold, *size),
            RenderEvent::Title { text, size } => self.title(text, *size),
            RenderEvent::Paragraph(text) => self.paragraph(text),
            RenderEvent::TableRow { cells, is_header } => self.table_row(cells, *is_header),
        }
    }

    /// Apply events in order.
    pub fn apply_all<'a, I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a RenderEvent>,
    {
        events.into_iter().try_for_each(|event| self.apply(event))
    }

    /// Start a new page.
    pub fn add_page(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.new_page();
        self.in_table = false;
        Ok(())
    }

    /// Set weight and size for subsequent paragraphs.
    pub fn set_style(&mut self, bold: bool, size: f32) -> Result<()> {
        self.ensure_live()?;
        self.state.bold = bold;
        self.state.size = size;
        Ok(())
    }

    /// Write a bold heading, then revert to the normal body style.
    pub fn title(&mut self, text: &str, size: f32) -> Result<()> {
        self.ensure_live()?;
        self.in_table = false;
        let text = normalize_line_text(&sanitize(text));
        for line in text.split('\n') {
            self.write_wrapped(line, true, size);
        }
        self.state.cursor += self.layout.block_gap;
        self.state.bold = false;
        self.state.size = self.layout.body_size;
        Ok(())
    }

    /// Write wrapped text in the current style.
    ///
    /// Blank text is ignored and does not move the cursor.
    pub fn paragraph(&mut self, text: &str) -> Result<()> {
        self.ensure_live()?;
        if text.trim().is_empty() {
            return Ok(());
        }
        self.in_table = false;
        let text = normalize_line_text(&sanitize(text));
        let (bold, size) = (self.state.bold, self.state.size);
        for line in text.split('\n') {
            self.write_wrapped(line, bold, size);
        }
        Ok(())
    }

    /// Write one row of equal-width bordered cells.
    ///
    /// Each cell is `printable width / max(1, cells)` wide; cell text is
    /// cut by [`truncate_cell`].
    pub fn table_row(&mut self, cells: &[String], is_header: bool) -> Result<()> {
        self.ensure_live()?;
        if !self.in_table {
            self.state.cursor += self.layout.block_gap;
            self.in_table = true;
        }

        let row_height = self.layout.row_height;
        self.ensure_room(row_height);

        let size = if is_header {
            self.layout.header_size
        } else {
            self.layout.cell_size
        };
        let font = if is_header { FONT_BOLD } else { FONT_REGULAR };
        let columns = cells.len().max(1);
        let cell_width = self.layout.printable_width() / columns as f32;
        let bottom = self.layout.page_height - (self.state.cursor + row_height);
        let text_y = bottom + (row_height - size) / 2.0 + size * 0.22;

        let mut ops = vec![Operation::new("w", vec![Object::Real(BORDER_WIDTH)])];
        for index in 0..columns {
            let x = self.layout.margin_x + index as f32 * cell_width;
            let rect = vec![
                Object::Real(x),
                Object::Real(bottom),
                Object::Real(cell_width),
                Object::Real(row_height),
            ];
            ops.push(Operation::new("re", rect.clone()));
            ops.push(Operation::new("S", vec![]));

            let Some(cell) = cells.get(index) else {
                continue;
            };
            let text = truncate_cell(&sanitize(cell).replace(['\n', '\r', '\t'], " "));
            if text.trim().is_empty() {
                continue;
            }
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("re", rect));
            ops.push(Operation::new("W", vec![]));
            ops.push(Operation::new("n", vec![]));
            ops.extend(text_ops(
                font,
                size,
                x + CELL_PADDING,
                text_y,
                encode_win_ansi(&text),
            ));
            ops.push(Operation::new("Q", vec![]));
        }
        self.current_page().extend(ops);
        self.state.cursor += row_height;
        Ok(())
    }

    /// Serialize all pages into a PDF document.
    ///
    /// May be called once; afterwards every method of this surface fails
    /// with [`Error::ResourceAlreadyConsumed`].
    pub fn finalize(&mut self) -> Result<Vec<u8>> {
        self.ensure_live()?;
        self.consumed = true;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font_dictionary("Helvetica"));
        let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular_id,
                FONT_BOLD => bold_id,
            },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in std::mem::take(&mut self.pages) {
            let raw = Content { operations }.encode()?;
            let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, deflate(&raw)?);
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.layout.page_width),
                Object::Real(self.layout.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(pdf_date(Utc::now())),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        log::debug!("finalized {} page(s), {} bytes", count, buffer.len());
        Ok(buffer)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.consumed {
            return Err(Error::ResourceAlreadyConsumed);
        }
        Ok(())
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.state.page_index = self.pages.len() - 1;
        self.state.cursor = self.layout.margin_top;
    }

    fn current_page(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Break the page if `height` does not fit below the cursor.
    ///
    /// A block taller than the whole printable area is written at the top
    /// of a fresh page rather than looping.
    fn ensure_room(&mut self, height: f32) {
        let at_top = self.state.cursor <= self.layout.margin_top;
        if !at_top && self.state.cursor + height > self.layout.printable_bottom() {
            log::debug!("page break at cursor {:.1}", self.state.cursor);
            self.new_page();
        }
    }

    fn write_wrapped(&mut self, line: &str, bold: bool, size: f32) {
        let line_height = self.layout.line_height(size);
        let encoded = encode_win_ansi(line);
        if encoded.is_empty() {
            self.ensure_room(line_height);
            self.state.cursor += line_height;
            return;
        }
        for chunk in wrap(&encoded, bold, size, self.layout.printable_width()) {
            self.ensure_room(line_height);
            let baseline = self.state.cursor + (line_height + size * 0.7) / 2.0;
            let y = self.layout.page_height - baseline;
            let font = if bold { FONT_BOLD } else { FONT_REGULAR };
            let ops = text_ops(font, size, self.layout.margin_x, y, chunk);
            self.current_page().extend(ops);
            self.state.cursor += line_height;
        }
    }
}

/// Apply the fixed cell legibility policy.
///
/// Text longer than 15 characters keeps its first 12 characters followed
/// by `...`.
pub fn truncate_cell(text: &str) -> String {
    if text.chars().count() > CELL_MAX_CHARS {
        let mut cut: String = text.chars().take(CELL_KEEP_CHARS).collect();
        cut.push_str(ELLIPSIS);
        cut
    } else {
        text.to_string()
    }
}

fn normalize_line_text(text: &str) -> String {
    text.replace('\r', "").replace('\t', TAB)
}

fn text_ops(font: &str, size: f32, x: f32, y: f32, bytes: Vec<u8>) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), Object::Real(size)]),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new("Tj", vec![Object::string_literal(bytes)]),
        Operation::new("ET", vec![]),
    ]
}

/// Greedy word wrap over WinAnsi bytes. Words wider than the line are
/// split between characters.
fn wrap(bytes: &[u8], bold: bool, size: f32, max_width: f32) -> Vec<Vec<u8>> {
    let fits = |candidate: &[u8]| text_width(candidate, bold, size) <= max_width;
    let mut lines = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for word in bytes.split(|b| *b == b' ') {
        let mut candidate = current.clone();
        if !candidate.is_empty() {
            candidate.push(b' ');
        }
        candidate.extend_from_slice(word);
        if fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for &byte in word {
            current.push(byte);
            if !fits(&current) && current.len() > 1 {
                current.pop();
                lines.push(std::mem::replace(&mut current, vec![byte]));
            }
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

fn pdf_date(at: DateTime<Utc>) -> String {
    format!("D:{}Z", at.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> PdfSurface {
        PdfSurface::new(LayoutOptions::default())
    }

    #[test]
    fn test_truncate_cell() {
        assert_eq!(truncate_cell("short"), "short");
        assert_eq!(truncate_cell("exactly15chars!"), "exactly15chars!");
        let cut = truncate_cell("abcdefghijklmnopqrst");
        assert_eq!(cut, "abcdefghijkl...");
        assert_eq!(cut.chars().count(), 15);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let cut = truncate_cell("éééééééééééééééééééé");
        assert_eq!(cut.chars().count(), 15);
        assert!(cut.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_blank_paragraph_is_noop() {
        let mut s = surface();
        let before = s.state().clone();
        s.paragraph("").unwrap();
        s.paragraph("   \t  ").unwrap();
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_paragraph_advances_cursor() {
        let mut s = surface();
        let start = s.state().cursor;
        s.paragraph("Hello").unwrap();
        let expected = s.layout().line_height(12.0);
        assert!((s.state().cursor - start - expected).abs() < 1e-3);
    }

    #[test]
    fn test_title_resets_style() {
        let mut s = surface();
        s.set_style(true, 20.0).unwrap();
        s.title("Heading", 16.0).unwrap();
        assert!(!s.state().bold);
        assert_eq!(s.state().size, 12.0);
    }

    #[test]
    fn test_automatic_page_break() {
        let mut s = surface();
        for i in 0..200 {
            s.paragraph(&format!("line {}", i)).unwrap();
        }
        assert!(s.page_count() > 1);
        assert_eq!(s.state().page_index, s.page_count() - 1);
        assert!(s.state().cursor <= s.layout().printable_bottom());
    }

    #[test]
    fn test_add_page_resets_cursor() {
        let mut s = surface();
        s.paragraph("text").unwrap();
        s.add_page().unwrap();
        assert_eq!(s.page_count(), 2);
        assert_eq!(s.state().cursor, s.layout().margin_top);
    }

    #[test]
    fn test_finalize_once() {
        let mut s = surface();
        let pdf = s.finalize().unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        assert!(matches!(s.finalize(), Err(Error::ResourceAlreadyConsumed)));
        assert!(matches!(
            s.paragraph("late"),
            Err(Error::ResourceAlreadyConsumed)
        ));
    }

    #[test]
    fn test_wrap_long_text() {
        let text = "word ".repeat(200);
        let lines = wrap(text.trim().as_bytes(), false, 12.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, false, 12.0) <= 200.0);
        }
    }

    #[test]
    fn test_wrap_breaks_long_word() {
        let word = "x".repeat(500);
        let lines = wrap(word.as_bytes(), true, 12.0, 100.0);
        assert!(lines.len() > 1);
        let total: usize = lines.iter().map(Vec::len).sum();
        assert_eq!(total, 500);
    }

    #[test]
    fn test_empty_table_row() {
        let mut s = surface();
        s.table_row(&[], false).unwrap();
        assert!(s.state().cursor > s.layout().margin_top);
    }

    #[test]
    fn test_pdf_date_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T07:08:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(pdf_date(at), "D:20240305070809Z");
    }
}
