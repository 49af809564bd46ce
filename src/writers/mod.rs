pub mod parquet_writer;
pub mod result_writer;

pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use result_writer::{OutputFormat, ResultWriter};
