use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{EntryPolicy, MissingPolicy};
use crate::lookup::BackendKind;
use crate::writers::OutputFormat;

#[derive(Parser)]
#[command(name = "ats-locator")]
#[command(about = "Convert Alberta Township System positions to latitude/longitude")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Only log warnings and hide progress")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: ats-locator.toml when present]"
    )]
    pub config: Option<PathBuf>,
}

/// Parcel database options shared by `convert` and `locate`.
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    #[arg(short, long, help = "Parcel database (SQLite file, or CSV/zip for the table backend)")]
    pub database: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    #[arg(long, help = "Parcel table name inside the SQLite database")]
    pub table_name: Option<String>,

    #[arg(long, help = "Memory-map the parcel table instead of buffered reads")]
    pub mmap: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every LSD of a CSV target list
    Convert {
        #[arg(short, long, help = "Target list CSV with an LSD column")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/ats-latlon-{YYMMDD}.{ext}]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, help = "Output format [default: from extension, else csv]")]
        format: Option<OutputFormat>,

        #[command(flatten)]
        database: DatabaseArgs,

        #[arg(long, help = "Duplicate audit log [default: <input dir>/Logs/_duplicates.csv]")]
        duplicates_log: Option<PathBuf>,

        #[arg(long, help = "Do not write the duplicate audit log")]
        no_audit: bool,

        #[arg(long, value_enum, help = "What to do when no parcel matches")]
        missing: Option<MissingPolicy>,

        #[arg(long, value_enum, help = "What to do with invalid entries")]
        on_invalid: Option<EntryPolicy>,

        #[arg(short, long, help = "Parquet compression (snappy, gzip, lz4, zstd, none)")]
        compression: Option<String>,
    },

    /// Look up one or more ATS positions
    Locate {
        #[arg(required = true, help = "ATS positions, e.g. \"7-27-72-3 W4\"")]
        ats: Vec<String>,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Check every LSD of a target list without a database
    Validate {
        #[arg(short, long, help = "Target list CSV with an LSD column")]
        input: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "ats-locator",
            "convert",
            "--input",
            "targets.csv",
            "--database",
            "parcels.sqlite",
            "--missing",
            "strict",
            "--on-invalid",
            "skip",
            "--no-audit",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Convert {
                input,
                database,
                missing,
                on_invalid,
                no_audit,
                ..
            } => {
                assert_eq!(input, PathBuf::from("targets.csv"));
                assert_eq!(database.database, Some(PathBuf::from("parcels.sqlite")));
                assert_eq!(missing, Some(MissingPolicy::Strict));
                assert_eq!(on_invalid, Some(EntryPolicy::Skip));
                assert!(no_audit);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_locate_requires_positions() {
        assert!(Cli::try_parse_from(["ats-locator", "locate"]).is_err());
    }
}
