//! Optional config file loading. Search order: ./storyscrape.toml, then
//! $XDG_CONFIG_HOME/storyscrape/config.toml (or ~/.config/storyscrape/config.toml).

use serde::Deserialize;
use std::path::PathBuf;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Default output directory when --output-dir is not set. Skips the directory prompt.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in seconds between page fetches.
    pub request_delay_secs: Option<u64>,
    /// Page request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Timeout in seconds for the HEAD probe that validates the story URL.
    pub probe_timeout_secs: Option<u64>,
    /// Log file path (default storyscrape.log in the working directory).
    pub log_file: Option<PathBuf>,
    /// Include toc.ncx in EPUB 3 output (default: true).
    pub epub_ncx: Option<bool>,
}

/// Search order: (1) ./storyscrape.toml, (2) $XDG_CONFIG_HOME/storyscrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("storyscrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("storyscrape").join("config.toml"));
    }
    load_first(&paths)
}

fn load_first(paths: &[PathBuf]) -> Result<Option<Config>, String> {
    for path in paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok(Some(config));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.output_dir.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.request_delay_secs.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.probe_timeout_secs.is_none());
        assert!(c.log_file.is_none());
        assert!(c.epub_ncx.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            output_dir = "stories"
            user_agent = "Custom/1.0"
            request_delay_secs = 3
            timeout_secs = 60
            probe_timeout_secs = 10
            log_file = "logs/scrape.log"
            epub_ncx = false
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.output_dir.as_deref(), Some(std::path::Path::new("stories")));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.request_delay_secs, Some(3));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.probe_timeout_secs, Some(10));
        assert_eq!(
            c.log_file.as_deref(),
            Some(std::path::Path::new("logs/scrape.log"))
        );
        assert_eq!(c.epub_ncx, Some(false));
    }

    #[test]
    fn parse_partial_config() {
        let c: Config = toml::from_str("request_delay_secs = 0").unwrap();
        assert_eq!(c.request_delay_secs, Some(0));
        assert!(c.output_dir.is_none());
    }

    #[test]
    fn unknown_key_errors() {
        assert!(toml::from_str::<Config>("retry_count = 3").is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
    }

    #[test]
    fn first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.toml");
        let first = dir.path().join("a.toml");
        let second = dir.path().join("b.toml");
        std::fs::write(&first, "timeout_secs = 7").unwrap();
        std::fs::write(&second, "timeout_secs = 9").unwrap();
        let c = load_first(&[missing, first, second]).unwrap().unwrap();
        assert_eq!(c.timeout_secs, Some(7));
    }

    #[test]
    fn no_files_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_first(&[dir.path().join("x.toml")]).unwrap().is_none());
    }

    #[test]
    fn bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "epub_ncx = \"maybe\"").unwrap();
        let err = load_first(&[path]).unwrap_err();
        assert!(err.contains("bad.toml"));
    }
}
