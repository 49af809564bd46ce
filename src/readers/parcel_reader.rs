use crate::error::{ProcessingError, Result};
use crate::models::ParcelRecord;
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, LATITUDE_COLUMN, LONGITUDE_COLUMN, PID_COLUMN};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;
use zip::ZipArchive;

/// Reads the tabular parcel database: `PID, Latitude, Longitude[, PID_trunc]`.
pub struct ParcelReader {
    use_mmap: bool,
}

impl ParcelReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read every parcel from a CSV file or from the first CSV inside a zip archive
    pub fn read_parcels(&self, path: &Path) -> Result<Vec<ParcelRecord>> {
        let is_archive = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

        let records = if is_archive {
            self.read_parcels_archive(path)?
        } else if self.use_mmap {
            self.read_parcels_mmap(path)?
        } else {
            self.read_parcels_buffered(path)?
        };

        info!(
            path = %path.display(),
            parcels = records.len(),
            "Loaded parcel table"
        );
        Ok(records)
    }

    fn read_parcels_buffered(&self, path: &Path) -> Result<Vec<ParcelRecord>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.parse_parcels(reader)
    }

    /// Memory-mapped read for the multi-million row provincial table
    fn read_parcels_mmap(&self, path: &Path) -> Result<Vec<ParcelRecord>> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        self.parse_parcels(&mmap[..])
    }

    fn read_parcels_archive(&self, path: &Path) -> Result<Vec<ParcelRecord>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let entry_name = archive
            .file_names()
            .find(|name| name.to_lowercase().ends_with(".csv"))
            .map(str::to_string)
            .ok_or_else(|| {
                ProcessingError::MissingData(format!(
                    "No CSV parcel table inside archive '{}'",
                    path.display()
                ))
            })?;

        debug!(archive = %path.display(), entry = %entry_name, "Reading parcel table from archive");
        let entry = archive.by_name(&entry_name)?;
        self.parse_parcels(entry)
    }

    /// Parse and validate parcel rows from any reader
    pub fn parse_parcels<R: Read>(&self, reader: R) -> Result<Vec<ParcelRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in [PID_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(ProcessingError::MissingColumn(required.to_string()));
            }
        }

        let mut records = Vec::new();
        for (index, result) in csv_reader.deserialize::<ParcelRecord>().enumerate() {
            let record = result?;
            record
                .validate()
                .map_err(|e| ProcessingError::InvalidRecord {
                    line: index + 2,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for ParcelReader {
    fn default() -> Self {
        Self::new()
    }
}
