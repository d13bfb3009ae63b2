//! Fetching and crawling: transport, URL validation, page extraction, and the pagination loop.

mod client;
mod crawl;
mod error;
mod fetch;
mod validate;

pub mod literotica;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpClient, HttpClientBuilder, HttpResponse, Transport, TransportError};
pub use crawl::{crawl, CrawlAborted, CrawlOptions, DEFAULT_PAGE_DELAY};
pub use error::ScraperError;
pub use fetch::{fetch_document, ParsedDocument};
pub use literotica::Literotica;
pub use validate::{is_valid_story_url, DEFAULT_PROBE_TIMEOUT};

/// Title used when a page has no title landmark.
pub const PLACEHOLDER_TITLE: &str = "Story";

/// Site adapter: reads the three landmarks of a story page.
///
/// Each lookup degrades instead of failing: a placeholder title, no paragraphs, or no next
/// page. `is_story_url` is the structural half of URL validation and must not touch the network.
pub trait PageExtractor {
    fn is_story_url(&self, url: &str) -> bool;

    fn extract_title(&self, doc: &ParsedDocument) -> String;

    fn extract_body_paragraphs(&self, doc: &ParsedDocument) -> Vec<String>;

    /// Absolute URL of the next page, or `None` on the last page.
    fn find_next_page_url(&self, doc: &ParsedDocument) -> Option<String>;
}
