//! Binary entry point for the SRT to ASS converter.

use anyhow::{bail, Context, Result};
use clap::Parser;
use srt2ass_core::convert::default_output_path;
use srt2ass_core::intake::DEFAULT_MAX_BYTES;
use srt2ass_core::{convert_upload, ConversionResponse, IntakeOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line options for the binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Where to write the ASS script. Defaults to the input with an `.ass` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the conversion result as JSON on stdout instead of writing a file.
    #[arg(long)]
    json: bool,

    /// Reject inputs larger than this many bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    max_size: usize,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,

    /// Path to the SRT file to convert.
    input: PathBuf,
}

/// Application entry point which parses CLI args and performs the conversion.
/// This function should initialize logging and delegate to the core library.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let response = convert_path(&cli.input, cli.max_size)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    let out_path = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.input));
    write_response(response, &out_path)?;
    Ok(())
}

/// Logs go to stderr so `--json` output stays clean.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::default()
            .add_directive("srt2ass=trace".parse().unwrap())
            .add_directive("srt2ass_core=trace".parse().unwrap())
            .add_directive("info".parse().unwrap())
    } else {
        EnvFilter::default()
            .add_directive("srt2ass=info".parse().unwrap())
            .add_directive("srt2ass_core=info".parse().unwrap())
            .add_directive("warn".parse().unwrap())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read the input file and run it through the upload path.
fn convert_path(input: &Path, max_size: usize) -> Result<ConversionResponse> {
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let filename = input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok(convert_upload(
        &filename,
        &bytes,
        &IntakeOptions {
            max_bytes: max_size,
        },
    ))
}

/// Write a successful response to `out_path`, or turn a failed one into an error.
fn write_response(response: ConversionResponse, out_path: &Path) -> Result<()> {
    let Some(content) = response.content.filter(|_| response.success) else {
        bail!(
            "{}: {}",
            response.filename,
            response.error.as_deref().unwrap_or("conversion failed")
        );
    };
    fs::write(out_path, content).with_context(|| format!("writing {}", out_path.display()))?;
    info!(
        "wrote {} subtitles to {}",
        response.subtitle_count.unwrap_or_default(),
        out_path.display()
    );
    Ok(())
}
