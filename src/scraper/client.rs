//! Blocking HTTP transport. The crawl and validator talk to [Transport]; [HttpClient] is the
//! reqwest-backed implementation used by the binaries.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; storyscrape/0.1; +https://github.com/storyscrape)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// True for 2xx statuses.
pub(crate) fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Status and decoded body of a GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

/// Transport-level failure: nothing usable came back from the server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Raised by [Transport] implementations that are not backed by reqwest, such as
    /// in-memory transports. [HttpClient] never returns it.
    #[error("{0}")]
    Unavailable(String),
}

/// The two requests the scraper needs. Implemented by [HttpClient] and by test fakes.
pub trait Transport {
    /// GET `url` and read the whole body as text. Non-2xx statuses are returned, not errors.
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError>;

    /// HEAD `url` with a per-request timeout; returns the status code.
    fn head(&mut self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// Blocking reqwest client with a cookie jar, browser-like User-Agent, and request timeout.
#[derive(Debug)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Build a client with default User-Agent and timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }
}

impl Transport for HttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.inner.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }

    fn head(&mut self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        let response = self.inner.head(url).timeout(timeout).send()?;
        Ok(response.status().as_u16())
    }
}

/// Builder for [HttpClient] with optional User-Agent and timeout.
#[derive(Debug)]
pub struct HttpClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Timeout applied to every page fetch. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(HttpClient { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 302,
            body: String::new(),
        };
        let missing = HttpResponse {
            status: 404,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
        assert!(!missing.is_success());
    }

    #[test]
    fn success_status_bounds() {
        assert!(!is_success_status(199));
        assert!(is_success_status(200));
        assert!(is_success_status(299));
        assert!(!is_success_status(300));
        assert!(!is_success_status(500));
    }

    #[test]
    fn unavailable_displays_its_message() {
        let err = TransportError::Unavailable("connection refused: x".to_string());
        assert_eq!(err.to_string(), "connection refused: x");
    }

    #[test]
    fn builder_defaults_build() -> Result<(), reqwest::Error> {
        let _client = HttpClient::builder()
            .user_agent("Test/1.0")
            .timeout_secs(5)
            .build()?;
        Ok(())
    }
}
