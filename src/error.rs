use crate::models::AtsField;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parcel database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid ATS format: {0}")]
    InvalidFormat(String),

    #[error("{field} {value} is outside the Alberta range [{min}, {max}]")]
    OutOfRange {
        field: AtsField,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("No parcel found for numeral {numeral}")]
    NotFound { numeral: String },

    #[error(
        "Could not resolve numeral {numeral}: {candidates} candidates, {exact_matches} without road allowance"
    )]
    AmbiguousOrMissing {
        numeral: String,
        candidates: usize,
        exact_matches: usize,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("Processing cancelled by user")]
    Cancelled,

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Errors that belong to a single target entry rather than to the batch.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::InvalidFormat(_)
                | ProcessingError::OutOfRange { .. }
                | ProcessingError::AmbiguousOrMissing { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProcessingError::NotFound { .. })
    }
}
