//! Retrieve one page and parse it into a [ParsedDocument].

use crate::scraper::client::Transport;
use crate::scraper::error::ScraperError;
use scraper::Html;

/// A parsed page plus the URL it was fetched from (for resolving relative links).
#[derive(Debug)]
pub struct ParsedDocument {
    url: String,
    html: Html,
}

impl ParsedDocument {
    pub fn parse(url: impl Into<String>, body: &str) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(body),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

/// GET `url` and parse the body. Transport failures and non-2xx statuses are errors; no retry.
pub fn fetch_document<T: Transport + ?Sized>(
    transport: &mut T,
    url: &str,
) -> Result<ParsedDocument, ScraperError> {
    let response = transport.get(url).map_err(|e| ScraperError::Network {
        url: url.to_string(),
        source: e,
    })?;
    if !response.is_success() {
        return Err(ScraperError::HttpStatus {
            status: response.status,
            url: url.to_string(),
        });
    }
    Ok(ParsedDocument::parse(url, &response.body))
}
