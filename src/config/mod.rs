//! Layered settings: defaults, optional settings file, `ATS_LOCATOR_*`
//! environment variables. Command-line flags are applied on top by the CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::lookup::BackendKind;
use crate::utils::constants::{COMPRESSION_SNAPPY, DEFAULT_TABLE_NAME, ENV_PREFIX, SETTINGS_FILE};

/// What to do when no parcel matches a numeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Fail the batch
    Strict,
    /// Leave latitude/longitude empty and continue
    #[default]
    Lenient,
}

/// What to do with an entry that cannot be parsed, validated or resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntryPolicy {
    /// Stop the whole batch
    #[default]
    Abort,
    /// Report the entry and continue with the next one
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendKind,

    /// CSV table (or zip) for the table backend, SQLite file for the indexed one
    pub database: Option<PathBuf>,

    #[validate(length(min = 1))]
    pub table_name: String,

    pub audit_logging: bool,

    /// Defaults to `<input dir>/Logs/_duplicates.csv`
    pub duplicates_log: Option<PathBuf>,

    pub missing_policy: MissingPolicy,

    pub entry_policy: EntryPolicy,

    pub use_mmap: bool,

    #[validate(length(min = 1))]
    pub compression: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            audit_logging: true,
            duplicates_log: None,
            missing_policy: MissingPolicy::default(),
            entry_policy: EntryPolicy::default(),
            use_mmap: false,
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `ats-locator.toml` when it exists,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                builder =
                    builder.add_source(config::File::with_name(SETTINGS_FILE).required(false));
            }
        }

        builder =
            builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.backend, BackendKind::Indexed);
        assert_eq!(settings.table_name, "ATS_V4_wLatLon");
        assert!(settings.audit_logging);
        assert_eq!(settings.missing_policy, MissingPolicy::Lenient);
        assert_eq!(settings.entry_policy, EntryPolicy::Abort);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "backend = \"table\"\n\
             database = \"data/ATS_V4-1_LSD_wLatLon.csv\"\n\
             audit_logging = false\n\
             missing_policy = \"strict\"\n\
             entry_policy = \"skip\""
        )?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.backend, BackendKind::Table);
        assert_eq!(
            settings.database,
            Some(PathBuf::from("data/ATS_V4-1_LSD_wLatLon.csv"))
        );
        assert!(!settings.audit_logging);
        assert_eq!(settings.missing_policy, MissingPolicy::Strict);
        assert_eq!(settings.entry_policy, EntryPolicy::Skip);
        // Untouched keys keep their defaults
        assert_eq!(settings.table_name, "ATS_V4_wLatLon");
        Ok(())
    }

    #[test]
    fn test_empty_table_name_is_rejected() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "table_name = \"\"")?;

        assert!(Settings::load(Some(file.path())).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(Settings::load(Some(Path::new("does/not/exist.toml"))).is_err());
    }
}
