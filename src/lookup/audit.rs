use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::ParcelRecord;

/// Append-only record of every numeral that matched several parcels.
///
/// Each entry is the original ATS string on its own line, one line per
/// candidate (`PID Latitude Longitude`), then a blank line.
#[derive(Debug)]
pub struct DuplicateLog {
    file: Option<File>,
    path: Option<PathBuf>,
    entries: usize,
}

impl DuplicateLog {
    /// Create (or truncate) the log, creating its directory when needed.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        File::create(path)?;
        let file = OpenOptions::new().append(true).open(path)?;

        Ok(Self {
            file: Some(file),
            path: Some(path.to_path_buf()),
            entries: 0,
        })
    }

    /// A log that counts entries but writes nothing.
    pub fn disabled() -> Self {
        Self {
            file: None,
            path: None,
            entries: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn record(&mut self, ats: &str, candidates: &[ParcelRecord]) -> Result<()> {
        if let Some(ref mut file) = self.file {
            let mut entry = String::new();
            entry.push_str(ats);
            entry.push('\n');
            for candidate in candidates {
                entry.push_str(&candidate.audit_line());
                entry.push('\n');
            }
            entry.push('\n');

            file.write_all(entry.as_bytes())?;
            file.flush()?;
            self.entries += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidates() -> Vec<ParcelRecord> {
        vec![
            ParcelRecord::new("40100101100", 49.00875466, -110.013391),
            ParcelRecord::new("40100101101", 49.00912345, -110.01298),
        ]
    }

    #[test]
    fn test_entry_layout() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Logs").join("_duplicates.csv");

        let mut log = DuplicateLog::create(&path)?;
        log.record("10-1-1-1 W4", &candidates())?;
        log.record("10-01-001-01 W4", &candidates()[..1])?;

        let content = fs::read_to_string(&path)?;
        assert_eq!(
            content,
            "10-1-1-1 W4\n\
             40100101100 49.00875466 -110.013391\n\
             40100101101 49.00912345 -110.01298\n\
             \n\
             10-01-001-01 W4\n\
             40100101100 49.00875466 -110.013391\n\
             \n"
        );
        assert_eq!(log.entries(), 2);
        Ok(())
    }

    #[test]
    fn test_create_truncates_previous_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("_duplicates.csv");
        fs::write(&path, "stale entry\n")?;

        let log = DuplicateLog::create(&path)?;
        assert!(log.is_enabled());
        assert_eq!(fs::read_to_string(&path)?, "");
        Ok(())
    }

    #[test]
    fn test_disabled_log_writes_nothing() -> Result<()> {
        let mut log = DuplicateLog::disabled();
        log.record("10-1-1-1 W4", &candidates())?;
        assert!(!log.is_enabled());
        assert_eq!(log.entries(), 0);
        assert!(log.path().is_none());
        Ok(())
    }
}
