use crate::error::{ProcessingError, Result};
use crate::models::{TargetEntry, TargetList};
use crate::utils::constants::{LSD_COLUMN, TREES_COLUMN};
use crate::utils::encoding::decode_text;
use std::path::Path;
use tracing::debug;

/// Reads the list of ATS positions to convert.
///
/// The header must contain `LSD`; a `Trees` column is optional. Header names
/// are matched case-insensitively and every input column is kept.
pub struct TargetReader;

impl TargetReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_targets(&self, path: &Path) -> Result<TargetList> {
        let bytes = std::fs::read(path)?;
        let (text, encoding) = decode_text(&bytes);
        debug!(path = %path.display(), encoding = encoding.name(), "Decoded target list");
        self.parse_targets(&text)
    }

    pub fn parse_targets(&self, text: &str) -> Result<TargetList> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let find_column = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));

        let lsd_column = find_column(LSD_COLUMN)
            .ok_or_else(|| ProcessingError::MissingColumn(LSD_COLUMN.to_string()))?;
        let trees_column = find_column(TREES_COLUMN);

        let mut entries = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2);

            let mut values: Vec<String> = record.iter().map(String::from).collect();
            values.resize(columns.len(), String::new());

            let lsd = values[lsd_column].clone();
            let trees = match trees_column.map(|c| values[c].as_str()) {
                Some(raw) if !raw.is_empty() => Some(raw.parse::<i64>().map_err(|_| {
                    ProcessingError::InvalidRecord {
                        line,
                        reason: format!("Trees value '{}' is not an integer", raw),
                    }
                })?),
                _ => None,
            };

            entries.push(TargetEntry::new(line, lsd, trees, values));
        }

        Ok(TargetList {
            columns,
            lsd_column,
            trees_column,
            entries,
        })
    }
}

impl Default for TargetReader {
    fn default() -> Self {
        Self::new()
    }
}
