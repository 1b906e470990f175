//! CSV extraction.

use csv::ReaderBuilder;

use crate::detect::FormatKind;
use crate::error::{Error, Result};
use crate::render::RenderEvent;

use super::{decode_text, Extraction, Extractor, DOCUMENT_TITLE_SIZE};

/// Heading placed above CSV tables.
pub const CSV_TITLE: &str = "CSV Data";

/// CSV extractor: the first record is the header row.
///
/// Short records are padded with empty cells so every row has the same
/// number of columns.
#[derive(Debug, Clone)]
pub struct CsvExtractor {
    delimiter: u8,
}

impl CsvExtractor {
    /// Create a comma-separated extractor.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Use a different field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn read_records(&self, text: &str) -> Result<Vec<Vec<String>>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .has_headers(false)
            .from_reader(text.as_bytes());

        reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| Error::extraction(FormatKind::Csv, e))
            })
            .collect()
    }
}

impl Default for CsvExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for CsvExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Csv
    }

    fn name(&self) -> &str {
        "csv"
    }

    fn extract(&self, content: &[u8]) -> Result<Extraction> {
        let text = decode_text(content);
        let mut records = self.read_records(&text)?;

        let columns = records.iter().map(Vec::len).max().unwrap_or(0);
        if records.iter().any(|r| r.len() != columns) {
            log::warn!("CSV rows have uneven lengths; padding to {} columns", columns);
        }

        let mut events = Vec::with_capacity(records.len() + 1);
        events.push(RenderEvent::title(CSV_TITLE, DOCUMENT_TITLE_SIZE));
        for (index, mut cells) in records.drain(..).enumerate() {
            cells.resize(columns, String::new());
            events.push(RenderEvent::row(cells, index == 0));
        }
        Ok(Extraction::Events(events))
    }
}
