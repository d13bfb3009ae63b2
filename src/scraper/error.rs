//! Shared error type for fetching and parsing story pages.

use crate::scraper::client::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    /// A hardcoded CSS selector failed to parse. Raised when an adapter is built.
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

impl ScraperError {
    /// True for the failures that come from retrieving a page (transport or status).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ScraperError::Network { .. } | ScraperError::HttpStatus { .. }
        )
    }
}
