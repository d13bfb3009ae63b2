//! CLI parsing and orchestration. Resolves settings, gathers input, crawls, then exports.
//! Maps errors to exit codes.

use crate::config::{self, Config};
use crate::epub::{EpubOptions, EpubVersion};
use crate::export::{export, output_path, ExportOptions};
use crate::input::{InputError, InputProvider, PromptInput, ScriptedInput};
use crate::logging::DEFAULT_LOG_FILE;
use crate::model::{ExportRequest, FormatChoice};
use crate::scraper::{
    crawl, fetch_document, is_valid_story_url, CrawlAborted, CrawlOptions, HttpClient,
    Literotica, PageExtractor, ScraperError, DEFAULT_PAGE_DELAY, DEFAULT_PROBE_TIMEOUT,
};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Crawl(#[from] CrawlAborted),

    #[error("All {count} requested export(s) failed")]
    ExportFailed { count: usize },
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) | CliRunError::Input(_) => 1,
            CliRunError::Scraper(_) | CliRunError::Crawl(_) => 2,
            CliRunError::ExportFailed { .. } => 3,
        }
    }

    /// True when the failure came from the network, so connectivity hints apply.
    pub fn is_network(&self) -> bool {
        match self {
            CliRunError::Scraper(e) => e.is_fetch_error(),
            CliRunError::Crawl(_) => true,
            CliRunError::Input(InputError::InvalidUrl(_)) => true,
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "storyscrape")]
#[command(about = "Scrape a multi-page Literotica story and save it as TXT, PDF, or EPUB")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, request_delay_secs, timeout_secs, probe_timeout_secs, log_file, epub_ncx) are read from ./storyscrape.toml or the user config directory. CLI flags override config."
)]
pub struct Args {
    /// Story URL (https://www.literotica.com/s/...). Prompted for when omitted.
    pub url: Option<String>,

    /// Output format: text, pdf, epub, or all. Prompted for when omitted.
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<FormatChoice>,

    /// Directory for the output files (created if missing).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Never prompt. Also implied when stdin is not a terminal. Format defaults to epub.
    #[arg(long)]
    pub non_interactive: bool,

    /// Delay between page requests in seconds (overrides config; default 1).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Page request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Stop after this many pages (at least 1).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Log file (overrides config; default storyscrape.log).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Generate EPUB 2 instead of EPUB 3.
    #[arg(long)]
    pub epub_2: bool,

    /// Leave toc.ncx out of EPUB 3 output.
    #[arg(long)]
    pub no_ncx: bool,

    /// Validate the URL and fetch the first page, then print the title and output paths.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and the full error chain on failure.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_format(s: &str) -> Result<FormatChoice, String> {
    match s.to_lowercase().as_str() {
        "text" | "txt" => Ok(FormatChoice::Text),
        "pdf" => Ok(FormatChoice::Pdf),
        "epub" => Ok(FormatChoice::Epub),
        "all" => Ok(FormatChoice::All),
        _ => Err(format!(
            "Invalid --format value: '{}'. Use text, pdf, epub, or all.",
            s
        )),
    }
}

/// Effective settings after merging flags, config file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub delay: Duration,
    pub timeout_secs: u64,
    pub probe_timeout: Duration,
    pub max_pages: Option<u32>,
    pub log_file: PathBuf,
    pub epub: EpubOptions,
}

impl Settings {
    /// Load the config file and merge it under `args`.
    pub fn resolve(args: &Args) -> Result<Self, CliRunError> {
        let config = config::load_config().map_err(CliRunError::InvalidInput)?;
        Ok(Self::merge(args, config.unwrap_or_default()))
    }

    fn merge(args: &Args, config: Config) -> Self {
        let delay = args
            .delay
            .or(config.request_delay_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PAGE_DELAY);
        let probe_timeout = config
            .probe_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT);
        let version = if args.epub_2 {
            EpubVersion::Epub2
        } else {
            EpubVersion::Epub3
        };
        Self {
            output_dir: args.output_dir.clone().or(config.output_dir),
            user_agent: args.user_agent.clone().or(config.user_agent),
            delay,
            timeout_secs: args
                .timeout
                .or(config.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            probe_timeout,
            max_pages: args.max_pages,
            log_file: args
                .log_file
                .clone()
                .or(config.log_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            epub: EpubOptions {
                version,
                include_ncx: !args.no_ncx && config.epub_ncx.unwrap_or(true),
            },
        }
    }
}

fn build_client(settings: &Settings) -> Result<HttpClient, CliRunError> {
    let mut builder = HttpClient::builder().timeout_secs(settings.timeout_secs);
    if let Some(ua) = &settings.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))
}

fn spinner(quiet: bool) -> Option<indicatif::ProgressBar> {
    if quiet {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Entry point for the CLI. Returns Ok(()) on success, including when only some formats
/// could be written; Err with exit code and message on failure.
pub fn run(args: &Args, settings: &Settings) -> Result<(), CliRunError> {
    let preset = ScriptedInput {
        url: args.url.clone(),
        format: args.format,
        output_dir: settings.output_dir.clone(),
    };
    let interactive = !args.non_interactive && std::io::stdin().is_terminal();
    let mut input: Box<dyn InputProvider> = if interactive {
        Box::new(PromptInput::new(
            std::io::stdin().lock(),
            std::io::stdout(),
            preset,
        ))
    } else {
        Box::new(preset)
    };

    let mut client = build_client(settings)?;
    let site = Literotica::new()?;

    let url = input.story_url(&mut |candidate: &str| {
        is_valid_story_url(&mut client, &site, candidate, settings.probe_timeout)
    })?;
    let choice = input.format_choice()?;
    let output_dir = input.output_dir()?;

    if args.dry_run {
        let doc = fetch_document(&mut client, &url)?;
        let title = site.extract_title(&doc);
        println!("Title: {}", title);
        for format in choice.formats() {
            println!("{}: {}", format, output_path(&output_dir, &title, format).display());
        }
        return Ok(());
    }

    tracing::info!(url = %url, "Starting scrape");
    let pb = spinner(args.quiet);
    let progress_cb = |n: u32, page_url: &str| {
        if let Some(pb) = &pb {
            pb.set_message(format!("Fetching page {}: {}", n, page_url));
        }
    };
    let options = CrawlOptions {
        delay: settings.delay,
        max_pages: settings.max_pages,
        progress: Some(&progress_cb),
    };
    let result = crawl(&mut client, &site, &url, &options);
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let story = result.map_err(|aborted| {
        tracing::warn!(
            pages = aborted.partial.len(),
            "Story incomplete; discarding pages fetched before the failure"
        );
        aborted
    })?;

    let request = ExportRequest::from_story(&story, choice.formats(), output_dir);
    let report = export(
        &request,
        &ExportOptions {
            epub: settings.epub,
        },
    );

    if report.all_failed() {
        return Err(CliRunError::ExportFailed {
            count: report.outcomes.len(),
        });
    }
    if !args.quiet {
        for outcome in report.written() {
            println!("Saved {}: {}", outcome.format, outcome.path.display());
        }
        for outcome in report.failed() {
            println!("Could not save {}: {}", outcome.format, outcome.path.display());
        }
        println!("Done! {} page(s).", story.pages.len());
    }
    tracing::info!("Scraping complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageText;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["storyscrape"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn parse_format_all_values() {
        assert_eq!(parse_format("text").unwrap(), FormatChoice::Text);
        assert_eq!(parse_format("txt").unwrap(), FormatChoice::Text);
        assert_eq!(parse_format("PDF").unwrap(), FormatChoice::Pdf);
        assert_eq!(parse_format("epub").unwrap(), FormatChoice::Epub);
        assert_eq!(parse_format("all").unwrap(), FormatChoice::All);
    }

    #[test]
    fn parse_format_invalid() {
        assert!(parse_format("markdown").is_err());
    }

    #[test]
    fn args_parse_flags() {
        let a = args(&[
            "https://www.literotica.com/s/x",
            "--format",
            "all",
            "-o",
            "out",
            "--non-interactive",
            "--max-pages",
            "3",
            "--epub-2",
        ]);
        assert_eq!(a.url.as_deref(), Some("https://www.literotica.com/s/x"));
        assert_eq!(a.format, Some(FormatChoice::All));
        assert_eq!(a.output_dir, Some(PathBuf::from("out")));
        assert!(a.non_interactive);
        assert_eq!(a.max_pages, Some(3));
        assert!(a.epub_2);
    }

    #[test]
    fn max_pages_must_be_positive() {
        assert!(Args::try_parse_from(["storyscrape", "--max-pages", "0"]).is_err());
        assert!(Args::try_parse_from(["storyscrape", "--max-pages", "-1"]).is_err());
        assert_eq!(args(&["--max-pages", "1"]).max_pages, Some(1));
    }

    #[test]
    fn url_is_optional() {
        assert!(args(&[]).url.is_none());
    }

    #[test]
    fn defaults_without_config() {
        let s = Settings::merge(&args(&[]), Config::default());
        assert_eq!(s.delay, DEFAULT_PAGE_DELAY);
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.probe_timeout, DEFAULT_PROBE_TIMEOUT);
        assert_eq!(s.log_file, PathBuf::from("storyscrape.log"));
        assert!(s.output_dir.is_none());
        assert_eq!(s.epub, EpubOptions::default());
    }

    #[test]
    fn flags_override_config() {
        let config = Config {
            output_dir: Some(PathBuf::from("cfg-out")),
            request_delay_secs: Some(5),
            timeout_secs: Some(60),
            probe_timeout_secs: Some(2),
            user_agent: Some("Cfg/1.0".to_string()),
            log_file: Some(PathBuf::from("cfg.log")),
            epub_ncx: Some(true),
        };
        let a = args(&[
            "--delay",
            "0",
            "-o",
            "flag-out",
            "--user-agent",
            "Flag/1.0",
            "--no-ncx",
        ]);
        let s = Settings::merge(&a, config);
        assert_eq!(s.delay, Duration::ZERO);
        assert_eq!(s.output_dir, Some(PathBuf::from("flag-out")));
        assert_eq!(s.user_agent.as_deref(), Some("Flag/1.0"));
        assert_eq!(s.timeout_secs, 60);
        assert_eq!(s.probe_timeout, Duration::from_secs(2));
        assert_eq!(s.log_file, PathBuf::from("cfg.log"));
        assert!(!s.epub.include_ncx);
    }

    #[test]
    fn config_can_disable_ncx() {
        let config = Config {
            epub_ncx: Some(false),
            ..Config::default()
        };
        let s = Settings::merge(&args(&["--epub-2"]), config);
        assert!(!s.epub.include_ncx);
        assert_eq!(s.epub.version, EpubVersion::Epub2);
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(CliRunError::Input(InputError::MissingUrl).exit_code(), 1);
        let status = ScraperError::HttpStatus {
            status: 503,
            url: "u".into(),
        };
        assert_eq!(CliRunError::Scraper(status).exit_code(), 2);
        let aborted = CrawlAborted {
            page_index: 2,
            url: "u".into(),
            source: ScraperError::HttpStatus {
                status: 500,
                url: "u".into(),
            },
            partial: vec![PageText::from_paragraphs("u", &["a".to_string()])],
        };
        let err = CliRunError::Crawl(aborted);
        assert_eq!(err.exit_code(), 2);
        assert!(err.is_network());
        assert_eq!(CliRunError::ExportFailed { count: 3 }.exit_code(), 3);
    }

    #[test]
    fn non_interactive_run_without_url_is_invalid_input() {
        let a = args(&["--non-interactive"]);
        let s = Settings::merge(&a, Config::default());
        let err = run(&a, &s).unwrap_err();
        assert!(matches!(err, CliRunError::Input(InputError::MissingUrl)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn non_interactive_run_rejects_foreign_url_without_network() {
        let a = args(&["https://example.com/s/story", "--non-interactive"]);
        let s = Settings::merge(&a, Config::default());
        let err = run(&a, &s).unwrap_err();
        assert!(matches!(err, CliRunError::Input(InputError::InvalidUrl(_))));
    }
}
