use crate::cli::args::{Cli, Commands, DatabaseArgs};
use crate::codec;
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::processors::{BatchOutput, BatchProcessor};
use crate::readers::TargetReader;
use crate::utils::filename::generate_default_output_filename;
use crate::utils::progress::ProgressReporter;
use crate::utils::CancelFlag;
use crate::writers::{OutputFormat, ParquetWriter, ResultWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            database,
            duplicates_log,
            no_audit,
            missing,
            on_invalid,
            compression,
        } => {
            apply_database_args(&mut settings, &database);
            if let Some(path) = duplicates_log {
                settings.duplicates_log = Some(path);
            }
            if no_audit {
                settings.audit_logging = false;
            }
            if let Some(policy) = missing {
                settings.missing_policy = policy;
            }
            if let Some(policy) = on_invalid {
                settings.entry_policy = policy;
            }
            if let Some(codec) = compression {
                settings.compression = codec;
            }

            let format = format
                .or_else(|| output.as_deref().and_then(OutputFormat::from_path))
                .unwrap_or_default();
            let output =
                output.unwrap_or_else(|| generate_default_output_filename(format.extension()));

            if format == OutputFormat::Parquet {
                // Reject a bad codec before any lookups are done
                ParquetWriter::new().with_compression(&settings.compression)?;
            }

            convert(settings, input, output, format, cli.quiet).await
        }

        Commands::Locate { ats, database } => {
            apply_database_args(&mut settings, &database);
            locate(settings, ats).await
        }

        Commands::Validate { input } => validate(&input),
    }
}

fn apply_database_args(settings: &mut Settings, args: &DatabaseArgs) {
    if let Some(ref path) = args.database {
        settings.database = Some(path.clone());
    }
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    if let Some(ref name) = args.table_name {
        settings.table_name = name.clone();
    }
    if args.mmap {
        settings.use_mmap = true;
    }
}

/// Ctrl-C sets the flag; the batch stops before its next entry.
fn spawn_cancel_listener(cancel: CancelFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current entry");
            cancel.cancel();
        }
    })
}

async fn convert(
    settings: Settings,
    input: PathBuf,
    output: PathBuf,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    info!(
        input = %input.display(),
        output = %output.display(),
        %format,
        backend = %settings.backend,
        "Starting conversion"
    );

    let cancel = CancelFlag::new();
    let listener = spawn_cancel_listener(cancel.clone());

    let task_output = output.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<BatchOutput> {
        let spinner = ProgressReporter::new_spinner("Reading target list...", quiet);
        let targets = TargetReader::new().read_targets(&input)?;

        spinner.set_message(&format!(
            "Opening parcel database for {} entries...",
            targets.len()
        ));
        let mut processor =
            BatchProcessor::from_settings(&settings, Some(&input))?.with_cancel_flag(cancel);
        spinner.finish_with_message(&format!(
            "Opened {} backend",
            processor.locator().backend_name()
        ));

        let progress = ProgressReporter::new(targets.len() as u64, "Locating parcels...", quiet);
        let batch = processor.process(&targets, Some(&progress))?;

        ResultWriter::new(format)
            .with_compression(&settings.compression)
            .write(&batch.schema, &batch.rows, &task_output)?;

        let audit = processor.locator().audit();
        if let Some(path) = audit.path() {
            if audit.entries() > 0 {
                progress.println(&format!(
                    "{} duplicate numerals logged to {}",
                    audit.entries(),
                    path.display()
                ));
            }
        }

        Ok(batch)
    })
    .await;

    listener.abort();
    let batch = result??;

    println!("\n{}", batch.summary.summary());
    if format == OutputFormat::Parquet {
        let file_info = ParquetWriter::new().get_file_info(&output)?;
        println!("{}", file_info.summary());
    }
    println!("Output written to {}", output.display());

    Ok(())
}

async fn locate(settings: Settings, positions: Vec<String>) -> Result<()> {
    let failures = tokio::task::spawn_blocking(move || -> Result<usize> {
        let mut processor = BatchProcessor::from_settings(&settings, None)?;
        let mut failures = 0;

        for ats in &positions {
            match processor.locate(ats) {
                Ok((numeral, resolution)) => println!(
                    "{}\t{}\t{}\t{}",
                    ats, numeral, resolution.location.latitude, resolution.location.longitude
                ),
                Err(e) if e.is_not_found() || e.is_entry_error() => {
                    failures += 1;
                    println!("{}\terror: {}", ats, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(failures)
    })
    .await??;

    if failures > 0 {
        return Err(ProcessingError::MissingData(format!(
            "{} position(s) could not be located",
            failures
        )));
    }
    Ok(())
}

fn validate(input: &Path) -> Result<()> {
    println!("Validating target list: {}", input.display());

    let targets = TargetReader::new().read_targets(input)?;
    let mut invalid = 0;

    for entry in &targets.entries {
        if let Err(e) = codec::validate(&entry.lsd) {
            invalid += 1;
            println!("  Line {} '{}': {}", entry.line, entry.lsd, e);
        }
    }

    if invalid == 0 {
        println!("All {} entries are valid ATS positions", targets.len());
        Ok(())
    } else {
        println!("Found {} invalid entries out of {}", invalid, targets.len());
        Err(ProcessingError::InvalidFormat(format!(
            "{} invalid entries in {}",
            invalid,
            input.display()
        )))
    }
}
