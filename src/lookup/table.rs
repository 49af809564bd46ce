use std::path::Path;

use super::ParcelLookup;
use crate::error::Result;
use crate::models::ParcelRecord;
use crate::readers::ParcelReader;

/// Whole parcel table held in memory and scanned on every lookup.
///
/// Matching is by substring: a record is a candidate when its PID contains the
/// numeral anywhere. Numerals are always the leading ten digits of an eleven
/// digit PID, but a numeral can also occur in the middle of an unrelated PID;
/// such false positives are possible and are left as they are.
#[derive(Debug, Clone, Default)]
pub struct ParcelTable {
    records: Vec<ParcelRecord>,
}

impl ParcelTable {
    pub fn from_records(records: Vec<ParcelRecord>) -> Self {
        Self { records }
    }

    /// Load a CSV table (or a zip archive holding one).
    pub fn load(path: &Path, use_mmap: bool) -> Result<Self> {
        let records = ParcelReader::with_mmap(use_mmap).read_parcels(path)?;
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ParcelRecord] {
        &self.records
    }
}

impl ParcelLookup for ParcelTable {
    fn backend_name(&self) -> &'static str {
        "table"
    }

    fn candidates(&self, numeral: &str) -> Result<Vec<ParcelRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.pid.contains(numeral))
            .cloned()
            .collect())
    }
}
