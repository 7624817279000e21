//! whodu - disk usage statistics broken down by owning user and group.
//!
//! Usage:
//!   whodu [PATH]...              Report usage for each path
//!   whodu -s blocks [PATH]       Sort the tables by block count
//!   whodu -u 'ali' [PATH]        Only show users matching a pattern
//!   whodu --format json [PATH]   Emit the report as JSON
//!   whodu --help                 Show help

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use whodu_analyze::select::compile_filter;
use whodu_analyze::{compute_report, render_report};
use whodu_core::{ReportOptions, SortMetric};
use whodu_scan::JwalkWalker;

#[derive(Parser)]
#[command(
    name = "whodu",
    version,
    about = "Disk usage statistics by owning user and group",
    long_about = "whodu walks each given path in parallel and reports file, \
                  directory, symlink, size, and block totals overall and per \
                  owning user and group, including a file-size histogram."
)]
struct Cli {
    /// Paths to report on (defaults to current directory)
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Metric the group and user tables are sorted by (ascending)
    #[arg(short, long, value_enum, default_value = "file-size")]
    sort: SortArg,

    /// Only list users whose name matches this regex (search semantics)
    #[arg(short, long)]
    user: Option<String>,

    /// Number of walker threads (0 = rayon default)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Blocks,
    Files,
    Directories,
    FileSize,
}

impl From<SortArg> for SortMetric {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Blocks => SortMetric::Blocks,
            SortArg::Files => SortMetric::Files,
            SortArg::Directories => SortMetric::Directories,
            SortArg::FileSize => SortMetric::FileSize,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ReportOptions::builder()
        .sort(SortMetric::from(cli.sort))
        .user_filter(cli.user.clone())
        .build()
        .context("Invalid report options")?;

    // Reject a bad filter pattern before any walking starts.
    compile_filter(&options).context("Invalid --user filter")?;

    let walker = JwalkWalker::with_threads(cli.threads);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for path in &cli.paths {
        tracing::info!(path = %path.display(), "reporting");
        let report = match compute_report(&walker, path) {
            Ok(report) => report,
            Err(err) => {
                // One unreadable path must not block the remaining ones.
                eprintln!("whodu: {}: {err}", path.display());
                failures += 1;
                continue;
            }
        };

        match cli.format {
            OutputFormat::Text => render_report(&options, &report, &mut out)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(&mut out)?;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize process-wide logging once at startup.
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
