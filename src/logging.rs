//! Subscriber setup for the binaries. Library code only emits `tracing` events.

use anyhow::Context as _;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Layer as _};

/// Default log file for `storyscrape`, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "storyscrape.log";

/// Level written to the log file regardless of console verbosity.
pub const FILE_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

/// Install the global subscriber: console output on stderr and, when `log_file` is given,
/// an append-only file layer with timestamps.
///
/// `RUST_LOG` takes precedence over `default_level` for the console. The file always records
/// [FILE_LOG_LEVEL] and above, so `-q` does not hide warnings from it.
pub fn init(default_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    subscriber(default_level, log_file)?
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))
}

fn subscriber(
    default_level: &str,
    log_file: Option<&Path>,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("build log filter")?;

    let console = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(FILE_LOG_LEVEL),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry().with(console).with(file_layer))
}

/// Filter level for the CLI verbosity flags.
pub fn level_for(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}
