use std::ops::RangeInclusive;

/// Legal ATS survey ranges inside Alberta
pub const MERIDIAN_BOUNDS: RangeInclusive<u32> = 4..=6;
pub const RANGE_BOUNDS: RangeInclusive<u32> = 1..=30;
pub const TOWNSHIP_BOUNDS: RangeInclusive<u32> = 1..=126;
pub const SECTION_BOUNDS: RangeInclusive<u32> = 1..=36;
pub const LSD_BOUNDS: RangeInclusive<u32> = 1..=16;

/// PID layout
pub const NUMERAL_LENGTH: usize = 10;
pub const NO_ROAD_ALLOWANCE: char = '0';

/// Input columns
pub const LSD_COLUMN: &str = "LSD";
pub const TREES_COLUMN: &str = "Trees";

/// Output columns
pub const PID_COLUMN: &str = "PID";
pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";
pub const NAME_COLUMN: &str = "Name";

/// File and table names
pub const DEFAULT_TABLE_NAME: &str = "ATS_V4_wLatLon";
pub const SETTINGS_FILE: &str = "ats-locator.toml";
pub const ENV_PREFIX: &str = "ATS_LOCATOR";
pub const LOGS_DIR: &str = "Logs";
pub const DUPLICATES_LOG_FILE: &str = "_duplicates.csv";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
