use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

use crate::utils::constants::{DUPLICATES_LOG_FILE, LOGS_DIR};

/// Generate default output filename with format: ats-latlon-{YYMMDD}.{extension}
pub fn generate_default_output_filename(extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "ats-latlon-{:02}{:02}{:02}.{}",
        year, month, day, extension
    );
    PathBuf::from("output").join(filename)
}

/// Duplicate audit log next to the target list: `<input dir>/Logs/_duplicates.csv`
pub fn default_duplicates_log_path(input: &Path) -> PathBuf {
    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(LOGS_DIR).join(DUPLICATES_LOG_FILE)
}
