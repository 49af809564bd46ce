use crate::error::{ProcessingError, Result};
use crate::models::{OutputSchema, ResultRow};
use crate::utils::constants::COMPRESSION_SNAPPY;
use crate::writers::ParquetWriter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Parquet,
}

impl OutputFormat {
    /// Guess the format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            "parquet" => Some(OutputFormat::Parquet),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes the converted table in the requested format.
///
/// Output goes to a temporary file next to the destination and is renamed
/// into place once complete, so a failed run never leaves a partial table.
pub struct ResultWriter {
    format: OutputFormat,
    compression: String,
}

impl ResultWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }

    /// Parquet compression codec; ignored by the text formats.
    pub fn with_compression(mut self, compression: &str) -> Self {
        self.compression = compression.to_string();
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn write(&self, schema: &OutputSchema, rows: &[ResultRow], path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        match self.format {
            OutputFormat::Csv => write_csv(schema, rows, temp.as_file_mut())?,
            OutputFormat::Json => write_json(schema, rows, temp.as_file_mut())?,
            OutputFormat::Parquet => ParquetWriter::new()
                .with_compression(&self.compression)?
                .write_rows_to(schema, rows, temp.as_file_mut())?,
        }

        temp.persist(path).map_err(|e| ProcessingError::Io(e.error))?;

        info!(
            path = %path.display(),
            format = %self.format,
            rows = rows.len(),
            "Wrote converted table"
        );
        Ok(())
    }
}

fn write_csv<W: Write>(schema: &OutputSchema, rows: &[ResultRow], sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(schema.columns())?;
    for row in rows {
        writer.write_record(row.to_record(schema))?;
    }
    writer.flush()?;
    Ok(())
}

/// One JSON object per row; empty coordinates become `null`.
fn write_json<W: Write>(schema: &OutputSchema, rows: &[ResultRow], sink: W) -> Result<()> {
    let objects: Vec<Value> = rows.iter().map(|row| row_to_json(schema, row)).collect();

    let mut writer = BufWriter::new(sink);
    serde_json::to_writer_pretty(&mut writer, &objects)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn row_to_json(schema: &OutputSchema, row: &ResultRow) -> Value {
    let mut object = Map::new();

    for (i, column) in schema.input_columns.iter().enumerate() {
        let value = if schema.is_trees_column(i) {
            row.trees.map(Value::from).unwrap_or(Value::Null)
        } else {
            Value::from(row.values.get(i).cloned().unwrap_or_default())
        };
        object.insert(column.clone(), value);
    }

    let columns = schema.columns();
    let extra = &columns[schema.input_columns.len()..];
    let mut values = vec![
        row.pid.clone().map(Value::from).unwrap_or(Value::Null),
        row.latitude().map(Value::from).unwrap_or(Value::Null),
        row.longitude().map(Value::from).unwrap_or(Value::Null),
    ];
    if schema.with_name() {
        values.push(row.name.clone().map(Value::from).unwrap_or(Value::Null));
    }

    for (column, value) in extra.iter().zip(values) {
        object.insert(column.clone(), value);
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatLon, TargetEntry};
    use pretty_assertions::assert_eq;

    fn sample() -> (OutputSchema, Vec<ResultRow>) {
        let schema = OutputSchema::new(vec!["Site".to_string(), "LSD".to_string()], None);
        let located = TargetEntry::new(
            2,
            "10-1-1-1 W4",
            None,
            vec!["North".into(), "10-1-1-1 W4".into()],
        );
        let missing = TargetEntry::new(
            3,
            "16-36-126-30 W6",
            None,
            vec!["South".into(), "16-36-126-30 W6".into()],
        );
        let rows = vec![
            ResultRow::new(&located, false)
                .with_pid(Some("4010010110".to_string()))
                .with_location(Some(LatLon::new(49.00875466, -110.013391))),
            ResultRow::new(&missing, false).with_pid(Some("6301263616".to_string())),
        ];
        (schema, rows)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out/x.CSV")), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_path(Path::new("x.json")), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path(Path::new("x.parquet")), Some(OutputFormat::Parquet));
        assert_eq!(OutputFormat::from_path(Path::new("x.txt")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_write_csv() -> Result<()> {
        let (schema, rows) = sample();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("result.csv");

        ResultWriter::new(OutputFormat::Csv).write(&schema, &rows, &path)?;

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Site,LSD,PID,Latitude,Longitude",
                "North,10-1-1-1 W4,4010010110,49.00875466,-110.013391",
                "South,16-36-126-30 W6,6301263616,,",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_write_json() -> Result<()> {
        let (schema, rows) = sample();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("result.json");

        ResultWriter::new(OutputFormat::Json).write(&schema, &rows, &path)?;

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["PID"], "4010010110");
        assert_eq!(rows[0]["Latitude"], 49.00875466);
        assert_eq!(rows[1]["Site"], "South");
        assert!(rows[1]["Longitude"].is_null());
        Ok(())
    }

    #[test]
    fn test_write_parquet() -> Result<()> {
        let (schema, rows) = sample();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("result.parquet");

        ResultWriter::new(OutputFormat::Parquet)
            .with_compression("zstd")
            .write(&schema, &rows, &path)?;

        let info = ParquetWriter::new().get_file_info(&path)?;
        assert_eq!(info.total_rows, 2);
        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let (schema, rows) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.parquet");

        let result = ResultWriter::new(OutputFormat::Parquet)
            .with_compression("bogus")
            .write(&schema, &rows, &path);

        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
