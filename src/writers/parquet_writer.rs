use crate::error::{ProcessingError, Result};
use crate::models::{OutputSchema, ResultRow};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE, LATITUDE_COLUMN, LONGITUDE_COLUMN,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Writes converted rows as a typed Parquet table.
///
/// Input columns are strings except `Trees`, which is stored as a nullable
/// integer. PID, Latitude, Longitude and Name are nullable so entries that
/// were not located keep their place in the table.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write rows to a new file at `path`
    pub fn write_rows(&self, schema: &OutputSchema, rows: &[ResultRow], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_rows_to(schema, rows, file)
    }

    /// Write rows to any sink, one row group per `row_group_size` rows
    pub fn write_rows_to<W: Write + Send>(
        &self,
        schema: &OutputSchema,
        rows: &[ResultRow],
        sink: W,
    ) -> Result<()> {
        let arrow_schema = self.create_schema(schema);
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(sink, arrow_schema.clone(), Some(props))?;
        for chunk in rows.chunks(self.row_group_size) {
            let batch = self.rows_to_batch(schema, chunk, arrow_schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    fn create_schema(&self, schema: &OutputSchema) -> Arc<Schema> {
        let mut fields: Vec<Field> = schema
            .input_columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if schema.is_trees_column(i) {
                    Field::new(name, DataType::Int64, true)
                } else {
                    Field::new(name, DataType::Utf8, false)
                }
            })
            .collect();

        let extra = &schema.columns()[schema.input_columns.len()..];
        for name in extra {
            let data_type = if name == LATITUDE_COLUMN || name == LONGITUDE_COLUMN {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            fields.push(Field::new(name, data_type, true));
        }

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(
        &self,
        schema: &OutputSchema,
        rows: &[ResultRow],
        arrow_schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(arrow_schema.fields().len());

        for i in 0..schema.input_columns.len() {
            if schema.is_trees_column(i) {
                let trees: Vec<Option<i64>> = rows.iter().map(|r| r.trees).collect();
                columns.push(Arc::new(Int64Array::from(trees)));
            } else {
                let values: Vec<&str> = rows
                    .iter()
                    .map(|r| r.values.get(i).map(String::as_str).unwrap_or(""))
                    .collect();
                columns.push(Arc::new(StringArray::from(values)));
            }
        }

        let pids: Vec<Option<&str>> = rows.iter().map(|r| r.pid.as_deref()).collect();
        let latitudes: Vec<Option<f64>> = rows.iter().map(ResultRow::latitude).collect();
        let longitudes: Vec<Option<f64>> = rows.iter().map(ResultRow::longitude).collect();

        columns.push(Arc::new(StringArray::from(pids)));
        columns.push(Arc::new(Float64Array::from(latitudes)));
        columns.push(Arc::new(Float64Array::from(longitudes)));

        if schema.with_name() {
            let names: Vec<Option<&str>> = rows.iter().map(|r| r.name.as_deref()).collect();
            columns.push(Arc::new(StringArray::from(names)));
        }

        Ok(RecordBatch::try_new(arrow_schema, columns)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatLon, TargetEntry};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn sample() -> (OutputSchema, Vec<ResultRow>) {
        let schema = OutputSchema::new(vec!["LSD".to_string(), "Trees".to_string()], Some(1));
        let located = TargetEntry::new(
            2,
            "10-1-1-1 W4",
            Some(25),
            vec!["10-1-1-1 W4".into(), "25".into()],
        );
        let missing = TargetEntry::new(
            3,
            "16-36-126-30 W6",
            None,
            vec!["16-36-126-30 W6".into(), "".into()],
        );
        let rows = vec![
            ResultRow::new(&located, true)
                .with_pid(Some("4010010110".to_string()))
                .with_location(Some(LatLon::new(49.00875466, -110.013391))),
            ResultRow::new(&missing, true).with_pid(Some("6301263616".to_string())),
        ];
        (schema, rows)
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let (schema, rows) = sample();
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_rows(&schema, &rows, temp_file.path())?;

        let reader =
            ParquetRecordBatchReaderBuilder::try_new(File::open(temp_file.path())?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        let batch = &batches[0];

        let batch_schema = batch.schema();
        let field_names: Vec<&str> = batch_schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(field_names, vec!["LSD", "Trees", "PID", "Latitude", "Longitude", "Name"]);
        assert_eq!(batch_schema.field(1).data_type(), &DataType::Int64);

        let trees = batch.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(trees.value(0), 25);
        assert!(trees.is_null(1));

        let latitudes = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(latitudes.value(0), 49.00875466);
        assert!(latitudes.is_null(1));

        let names = batch.column(5).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(names.value(1), "16-36-126-30 W6 | ");
        Ok(())
    }

    #[test]
    fn test_row_groups() -> Result<()> {
        let (schema, rows) = sample();
        let writer = ParquetWriter::new().with_row_group_size(1);
        let temp_file = NamedTempFile::new()?;

        writer.write_rows(&schema, &rows, temp_file.path())?;
        let info = writer.get_file_info(temp_file.path())?;

        assert_eq!(info.total_rows, 2);
        assert_eq!(info.row_groups, 2);
        assert!(info.summary().contains("Total rows: 2"));
        Ok(())
    }

    #[test]
    fn test_write_empty_rows() -> Result<()> {
        let schema = OutputSchema::new(vec!["LSD".to_string()], None);
        let temp_file = NamedTempFile::new()?;

        ParquetWriter::new().write_rows(&schema, &[], temp_file.path())?;
        assert_eq!(ParquetWriter::new().get_file_info(temp_file.path())?.total_rows, 0);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let (schema, rows) = sample();
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;
            let result = writer.write_rows(&schema, &rows, temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }
}
