use crate::codec;
use crate::config::{EntryPolicy, MissingPolicy, Settings};
use crate::error::{ProcessingError, Result};
use crate::lookup::{open_backend, DuplicateLog, ParcelLocator, Resolution};
use crate::models::{Numeral, OutputSchema, ResultRow, TargetEntry, TargetList};
use crate::processors::BatchSummary;
use crate::utils::filename::default_duplicates_log_path;
use crate::utils::progress::ProgressReporter;
use crate::utils::CancelFlag;
use std::path::Path;
use tracing::{error, info, warn};

/// Rows produced by one run, in input order.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub schema: OutputSchema,
    pub rows: Vec<ResultRow>,
    pub summary: BatchSummary,
}

/// Converts a target list entry by entry: validate, encode, look up, collect.
pub struct BatchProcessor {
    locator: ParcelLocator,
    missing_policy: MissingPolicy,
    entry_policy: EntryPolicy,
    cancel: CancelFlag,
}

impl BatchProcessor {
    pub fn new(locator: ParcelLocator) -> Self {
        Self {
            locator,
            missing_policy: MissingPolicy::default(),
            entry_policy: EntryPolicy::default(),
            cancel: CancelFlag::new(),
        }
    }

    /// Open the configured database and a fresh duplicate log for `input`.
    pub fn from_settings(settings: &Settings, input: Option<&Path>) -> Result<Self> {
        let database = settings.database.as_deref().ok_or_else(|| {
            ProcessingError::Config(
                "No parcel database configured (use --database or the 'database' setting)"
                    .to_string(),
            )
        })?;

        let backend = open_backend(
            settings.backend,
            database,
            &settings.table_name,
            settings.use_mmap,
        )?;

        let audit_path = settings
            .duplicates_log
            .clone()
            .or_else(|| input.map(default_duplicates_log_path));
        let audit = match audit_path {
            Some(path) if settings.audit_logging => DuplicateLog::create(&path)?,
            _ => DuplicateLog::disabled(),
        };

        Ok(Self::new(ParcelLocator::new(backend, audit))
            .with_missing_policy(settings.missing_policy)
            .with_entry_policy(settings.entry_policy))
    }

    pub fn with_missing_policy(mut self, missing_policy: MissingPolicy) -> Self {
        self.missing_policy = missing_policy;
        self
    }

    pub fn with_entry_policy(mut self, entry_policy: EntryPolicy) -> Self {
        self.entry_policy = entry_policy;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn locator(&self) -> &ParcelLocator {
        &self.locator
    }

    /// Validate, encode and look up a single ATS string.
    pub fn locate(&mut self, ats: &str) -> Result<(Numeral, Resolution)> {
        let position = codec::validate(ats)?;
        let numeral = position.numeral();
        let resolution = self.locator.locate(&numeral, ats)?;
        Ok((numeral, resolution))
    }

    /// Convert every entry of `targets`, preserving input order.
    pub fn process(
        &mut self,
        targets: &TargetList,
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchOutput> {
        let schema = targets.output_schema();
        let with_name = schema.with_name();
        let mut summary = BatchSummary::new(targets.len());
        let mut rows = Vec::with_capacity(targets.len());

        info!(
            entries = targets.len(),
            backend = self.locator.backend_name(),
            trees = with_name,
            "Converting ATS positions"
        );

        for entry in &targets.entries {
            if self.cancel.is_cancelled() {
                warn!(line = entry.line, "Cancelled before all entries were converted");
                return Err(ProcessingError::Cancelled);
            }

            let row = self.process_entry(entry, with_name, &mut summary)?;
            rows.push(row);

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Located {} of {} entries",
                summary.located, summary.total_entries
            ));
        }

        Ok(BatchOutput {
            schema,
            rows,
            summary,
        })
    }

    fn process_entry(
        &mut self,
        entry: &TargetEntry,
        with_name: bool,
        summary: &mut BatchSummary,
    ) -> Result<ResultRow> {
        let row = ResultRow::new(entry, with_name);

        match self.locate(&entry.lsd) {
            Ok((numeral, resolution)) => {
                summary.located += 1;
                if resolution.had_duplicates() {
                    summary.duplicates_resolved += 1;
                }
                info!(
                    line = entry.line,
                    ats = %entry.lsd,
                    %numeral,
                    latitude = resolution.location.latitude,
                    longitude = resolution.location.longitude,
                    "Located parcel"
                );
                Ok(row
                    .with_pid(Some(numeral.into_string()))
                    .with_location(Some(resolution.location)))
            }
            Err(e) if e.is_not_found() => match self.missing_policy {
                MissingPolicy::Strict => {
                    error!(
                        line = entry.line,
                        ats = %entry.lsd,
                        error = %e,
                        "Parcel not found"
                    );
                    Err(e)
                }
                MissingPolicy::Lenient => {
                    warn!(
                        line = entry.line,
                        ats = %entry.lsd,
                        error = %e,
                        "Parcel not found, leaving coordinates empty"
                    );
                    summary.record_not_found(entry.line, &entry.lsd, e.to_string());
                    Ok(row.with_pid(encoded_pid(&entry.lsd)))
                }
            },
            Err(e) if e.is_entry_error() => match self.entry_policy {
                EntryPolicy::Abort => {
                    error!(
                        line = entry.line,
                        ats = %entry.lsd,
                        error = %e,
                        "Invalid entry, aborting batch"
                    );
                    Err(e)
                }
                EntryPolicy::Skip => {
                    error!(
                        line = entry.line,
                        ats = %entry.lsd,
                        error = %e,
                        "Invalid entry, skipping"
                    );
                    summary.record_skipped(entry.line, &entry.lsd, e.to_string());
                    Ok(row.with_pid(encoded_pid(&entry.lsd)))
                }
            },
            Err(e) => Err(e),
        }
    }
}

/// PID column for rows without coordinates, when the string still encodes.
fn encoded_pid(ats: &str) -> Option<String> {
    codec::encode(ats).ok().map(Numeral::into_string)
}
