use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use onepx_core::{ErrorPolicy, PngWriter, Rgb};

// ── CLI definition ─────────────────────────────────────────────────────────

const USAGE: &str = "\
usage: onepx [--strict] <color> <out.png>

  <color>  RRGGBB, #RRGGBB or 0xRRGGBB (hex digits are case-insensitive)

alpha channel is not supported, only RRGGBB";

#[derive(Parser)]
#[command(
    name = "onepx",
    about = "Write a 1x1 truecolor PNG filled with a single color",
    override_usage = "onepx [--strict] <color> <out.png>",
    version
)]
struct Cli {
    /// Fill color: RRGGBB, #RRGGBB or 0xRRGGBB (no alpha)
    #[arg(allow_hyphen_values = true)]
    color: String,
    /// Destination PNG file (created or truncated)
    output: PathBuf,
    /// Stop at the first error and exit non-zero. A bad color is rejected
    /// before the output file is created.
    #[arg(long)]
    strict: bool,
    /// Extra positionals are accepted and ignored.
    #[arg(hide = true, allow_hyphen_values = true)]
    _extra: Vec<OsString>,
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

/// Open for read/write, creating or truncating.
fn open_output(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("cannot open file {:?}", path))
}

// ── Modes ──────────────────────────────────────────────────────────────────

/// Legacy flow. The file is opened before the color is parsed, write
/// failures are reported and skipped, and only an open failure changes the
/// exit status.
fn run_compat(cli: &Cli) -> ExitCode {
    let file = match open_output(&cli.output) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let color: Rgb = match cli.color.parse() {
        Ok(c) => c,
        Err(e) => {
            // Leaves an empty file behind and still exits 0. Likely a latent
            // defect, kept as-is; --strict exits 1 here.
            eprintln!("invalid color {:?}: {e}", cli.color);
            return ExitCode::SUCCESS;
        }
    };

    let mut writer = PngWriter::new(file, ErrorPolicy::Compat);
    match writer.write_image(color) {
        Ok(report) => {
            for e in &report.errors {
                eprintln!("{e}");
            }
        }
        Err(e) => eprintln!("{e}"),
    }
    ExitCode::SUCCESS
}

fn run_strict(cli: &Cli) -> anyhow::Result<()> {
    let color: Rgb = cli
        .color
        .parse()
        .with_context(|| format!("invalid color {:?}", cli.color))?;
    let file = open_output(&cli.output)?;

    let mut writer = PngWriter::new(file, ErrorPolicy::FailFast);
    writer
        .write_image(color)
        .with_context(|| format!("writing {:?}", cli.output))?;
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            debug!(error = %e, "argument parsing failed");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let policy = if cli.strict {
        ErrorPolicy::FailFast
    } else {
        ErrorPolicy::Compat
    };
    debug!(policy = policy.name(), color = %cli.color, output = ?cli.output, "starting");

    match policy {
        ErrorPolicy::Compat => run_compat(&cli),
        ErrorPolicy::FailFast => match run_strict(&cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
