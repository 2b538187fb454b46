//! rar-ads - Convert RAR5 alternate data streams into regular files
//!
//! For every archive given, locates the NTFS alternate data streams stored
//! in it and writes a copy where each stream is a normal, extractable entry.

use anyhow::{bail, Context, Result};
use clap::Parser;
use rar_ads::{convert, ConvertOptions, RarError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Convert RAR5 alternate data streams into regular files
#[derive(Parser, Debug)]
#[command(name = "rar-ads")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// RAR5 archives to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Analyze but do not change
    #[arg(short, long)]
    analyze: bool,

    /// Extension of converted archives, replacing the input's own
    #[arg(long, default_value = "ads.rar")]
    extension: String,

    /// Write converted archives here instead of next to their inputs
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = ConvertOptions {
        analyze_only: cli.analyze,
        output_extension: cli.extension,
        output_dir: cli.output_dir,
    };

    let results: Vec<Result<()>> = cli
        .files
        .iter()
        .map(|file| {
            let result = process(file, &options);
            if let Err(err) = &result {
                eprintln!("{:#}", err);
            }
            result
        })
        .collect();

    ExitCode::from(batch_status(&results))
}

/// Exit status of a batch: that of the first failed input, 0 if none failed.
fn batch_status(results: &[Result<()>]) -> u8 {
    results
        .iter()
        .find_map(|result| result.as_ref().err())
        .map_or(0, failure_code)
}

fn failure_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RarError>().map_or(1, RarError::exit_code)
}

fn process(file: &Path, options: &ConvertOptions) -> Result<()> {
    if !file.is_file() {
        bail!("Path {} does not exist or is not a file", file.display());
    }

    println!("Processing {}...", file.display());
    let report = convert(file, options)
        .with_context(|| format!("Failed to convert {}", file.display()))?;

    println!("{} stream(s) found.", report.streams.len());
    for stream in &report.streams {
        info!(
            "stream at {:#x}: {} -> {}",
            stream.offset(),
            stream.owner.name_lossy(),
            String::from_utf8_lossy(&stream.file_name())
        );
    }

    match report.output {
        Some(output) => println!("Modified rar file saved to {}", output.display()),
        None if options.analyze_only => debug!("analyze only, nothing written"),
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_failure_code_survives_context() {
        let err =
            anyhow::Error::from(RarError::UnsupportedVersion(4)).context("Failed to convert x");
        assert_eq!(failure_code(&err), 3);
        assert_eq!(failure_code(&anyhow::anyhow!("Path x does not exist")), 1);
    }

    #[test]
    fn test_batch_processes_every_input() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.rar");
        let rar4 = dir.path().join("old.rar");
        fs::write(&garbage, b"PK\x03\x04 not a rar").unwrap();
        fs::write(&rar4, b"Rar!\x1a\x07\x00\xcf\x90\x73\x00\x00\x0d\x00").unwrap();

        let options = ConvertOptions::default();
        let files = [dir.path().join("missing.rar"), rar4, garbage];
        let results: Vec<Result<()>> = files.iter().map(|f| process(f, &options)).collect();

        assert!(results.iter().all(Result::is_err));
        let codes: Vec<Option<u8>> = results
            .iter()
            .map(|r| r.as_ref().err().map(failure_code))
            .collect();
        assert_eq!(codes, vec![Some(1), Some(3), Some(2)]);
        // The first failure decides, even when later ones are more specific
        assert_eq!(batch_status(&results), 1);
        assert_eq!(batch_status(&results[1..]), 3);
        assert_eq!(batch_status(&[]), 0);
        assert_eq!(batch_status(&[Ok(()), Ok(())]), 0);
    }
}
