//! XLSX extraction.

use std::io::Cursor;

use calamine::{Data, ExcelDateTime, ExcelDateTimeType, Reader, Xlsx};
use chrono::NaiveTime;

use crate::detect::FormatKind;
use crate::error::{Error, Result};
use crate::render::RenderEvent;

use super::{Extraction, Extractor, SECTION_TITLE_SIZE};

/// XLSX extractor.
///
/// Every worksheet gets a "Sheet: name" title and a page of its own. All
/// rows, including a visual header row, are rendered as plain data rows.
#[derive(Debug, Clone, Default)]
pub struct XlsxExtractor {
    _private: (),
}

impl XlsxExtractor {
    /// Create a new XLSX extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => date_text(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Date cells print as dates, with the time only when it is not midnight.
/// Durations print as `H:MM:SS`.
fn date_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(duration) = dt.as_duration() {
            let secs = duration.num_seconds();
            let sign = if secs < 0 { "-" } else { "" };
            let secs = secs.abs();
            return format!("{}{}:{:02}:{:02}", sign, secs / 3600, secs / 60 % 60, secs % 60);
        }
    } else if let Some(datetime) = dt.as_datetime() {
        if datetime.time() == NaiveTime::MIN {
            return datetime.format("%Y-%m-%d").to_string();
        }
        return datetime.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    dt.to_string()
}

impl Extractor for XlsxExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Xlsx
    }

    fn name(&self) -> &str {
        "xlsx"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(content))
            .map_err(|e| Error::extraction(FormatKind::Xlsx, e))?;

        let sheet_names = workbook.sheet_names();
        let mut events = Vec::new();
        for (index, name) in sheet_names.iter().enumerate() {
            if index > 0 {
                events.push(RenderEvent::AddPage);
            }
            events.push(RenderEvent::title(format!("Sheet: {}", name), SECTION_TITLE_SIZE));

            let range = workbook
                .worksheet_range(name)
                .map_err(|e| Error::extraction(FormatKind::Xlsx, e))?;
            for row in range.rows() {
                events.push(RenderEvent::row(row.iter().map(cell_text).collect(), false));
            }
        }

        log::debug!("xlsx: {} sheets", sheet_names.len());
        Ok(Extraction::Events(events))
    }
}
