//! Parcel lookup: numeral -> latitude/longitude.
//!
//! Backends only produce candidate records; duplicate resolution is shared so
//! the in-memory table and the SQLite index always agree.

pub mod audit;
pub mod indexed;
pub mod table;

pub use audit::DuplicateLog;
pub use indexed::IndexedStore;
pub use table::ParcelTable;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{LatLon, Numeral, ParcelRecord};

/// A parcel database able to list the records matching a numeral.
pub trait ParcelLookup {
    fn backend_name(&self) -> &'static str;

    /// Every record matching `numeral`, road allowance variants included.
    fn candidates(&self, numeral: &str) -> Result<Vec<ParcelRecord>>;

    fn lookup(&self, numeral: &str) -> Result<LatLon> {
        let candidates = self.candidates(numeral)?;
        resolve_candidates(&Numeral::from(numeral), &candidates).map(ParcelRecord::location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory scan of a CSV parcel table
    Table,
    /// SQLite store indexed on the truncated PID
    #[default]
    Indexed,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Table => write!(f, "table"),
            BackendKind::Indexed => write!(f, "indexed"),
        }
    }
}

/// Open the configured backend over `database`.
pub fn open_backend(
    kind: BackendKind,
    database: &Path,
    table_name: &str,
    use_mmap: bool,
) -> Result<Box<dyn ParcelLookup + Send>> {
    match kind {
        BackendKind::Table => Ok(Box::new(ParcelTable::load(database, use_mmap)?)),
        BackendKind::Indexed => Ok(Box::new(IndexedStore::open(database, table_name)?)),
    }
}

/// Pick the record for `numeral` out of its candidates.
///
/// A single candidate wins outright. Several candidates are road allowance
/// variants of one parcel, and exactly one of them must be the variant
/// without road allowance (`numeral` followed by `0`).
pub fn resolve_candidates<'a>(
    numeral: &Numeral,
    candidates: &'a [ParcelRecord],
) -> Result<&'a ParcelRecord> {
    match candidates {
        [] => Err(ProcessingError::NotFound {
            numeral: numeral.to_string(),
        }),
        [only] => Ok(only),
        _ => {
            let key = numeral.without_road_allowance();
            let exact: Vec<&ParcelRecord> = candidates.iter().filter(|r| r.pid == key).collect();
            match exact.as_slice() {
                [record] => Ok(*record),
                _ => Err(ProcessingError::AmbiguousOrMissing {
                    numeral: numeral.to_string(),
                    candidates: candidates.len(),
                    exact_matches: exact.len(),
                }),
            }
        }
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub pid: String,
    pub location: LatLon,
    pub candidates: usize,
}

impl Resolution {
    pub fn had_duplicates(&self) -> bool {
        self.candidates > 1
    }
}

/// Backend plus the duplicate audit log, used once per batch.
pub struct ParcelLocator {
    backend: Box<dyn ParcelLookup + Send>,
    audit: DuplicateLog,
}

impl ParcelLocator {
    pub fn new(backend: Box<dyn ParcelLookup + Send>, audit: DuplicateLog) -> Self {
        Self { backend, audit }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub fn audit(&self) -> &DuplicateLog {
        &self.audit
    }

    /// Look up `numeral` on behalf of the ATS string `ats`.
    pub fn locate(&mut self, numeral: &Numeral, ats: &str) -> Result<Resolution> {
        let candidates = self.backend.candidates(numeral.as_str())?;
        debug!(
            %numeral,
            candidates = candidates.len(),
            backend = self.backend.backend_name(),
            "Compared numeral to database"
        );

        if candidates.len() > 1 {
            warn!(
                ats,
                %numeral,
                candidates = candidates.len(),
                "Multiple parcels share this numeral, preferring the one without road allowance"
            );
            self.audit.record(ats, &candidates)?;
        }

        let record = resolve_candidates(numeral, &candidates)?;
        Ok(Resolution {
            pid: record.pid.clone(),
            location: record.location(),
            candidates: candidates.len(),
        })
    }
}
