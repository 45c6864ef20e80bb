//! `convert`: turn Thunderbird message filters into a SIEVE script.

mod config;
mod convert;
mod error;
mod model;
mod sieve;
mod store;
mod thunderbird;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use crate::config::options::DEFAULT_OUTPUT;
use crate::error::{Error, Result};

#[derive(Parser)]
#[command(
    name = "convert",
    about = "Convert Thunderbird msgFilterRules.dat into a SIEVE script",
    version
)]
struct Cli {
    /// Thunderbird filter file (msgFilterRules.dat)
    input: PathBuf,

    /// Output script, `-` for stdout [default: roundcube.sieve]
    output: Option<PathBuf>,

    /// Settings file (JSON) instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit one independent `if` per rule instead of an if/elsif chain
    #[arg(long)]
    independent: bool,

    /// List skipped rules as comments at the end of the script
    #[arg(long)]
    comment_skipped: bool,

    /// Mailbox that converted folders are placed under
    #[arg(long)]
    folder_prefix: Option<String>,

    /// Folder hierarchy separator of the server
    #[arg(long)]
    folder_separator: Option<char>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli, &mut std::io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Output path: the command line wins over the settings file, which wins
/// over [`DEFAULT_OUTPUT`].
fn resolve_output(cli_output: Option<PathBuf>, settings_output: Option<PathBuf>) -> PathBuf {
    cli_output
        .or(settings_output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

/// Runs one conversion. An output of `-` sends the script to `stdout`.
/// Nothing is written unless the conversion succeeds.
fn run(cli: Cli, stdout: &mut impl Write) -> Result<()> {
    let settings = store::settings_store::load_settings(cli.config.as_deref())?;
    let mut options = settings.convert;
    if cli.independent {
        options.chain = false;
    }
    if cli.comment_skipped {
        options.comment_skipped = true;
    }
    if let Some(prefix) = cli.folder_prefix {
        options.folder_prefix = prefix;
    }
    if let Some(sep) = cli.folder_separator {
        options.folder_separator = sep;
    }
    let output = resolve_output(cli.output, settings.output);

    let conversion = convert::convert_file(&cli.input, &options)?;

    if output == Path::new("-") {
        stdout
            .write_all(conversion.script.as_bytes())
            .map_err(|source| Error::OutputWrite {
                path: output.clone(),
                source,
            })?;
    } else {
        conversion.write_to(&output)?;
        info!("SIEVE script written to {}", output.display());
    }

    let report = &conversion.report;
    info!(
        "{} of {} rules converted, {} skipped",
        report.converted.len(),
        report.total,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        info!("  skipped #{} '{}': {}", skipped.index + 1, skipped.name, skipped.reason);
    }
    if !report.warnings.is_empty() {
        info!(
            "{} condition value(s) had stray quotes removed, check those rules",
            report.warnings.len()
        );
    }
    Ok(())
}
