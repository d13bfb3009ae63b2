//! Pagination crawl: fetch a page, extract its text, follow "next" until the story ends.
//!
//! States: Start -> Fetching -> Extracting -> Advancing -> (Fetching | Done), with any fetch
//! failure moving to Aborted. The loop is serial and sleeps a fixed delay between pages.

use crate::model::{PageText, StoryDocument};
use crate::scraper::client::Transport;
use crate::scraper::error::ScraperError;
use crate::scraper::fetch::fetch_document;
use crate::scraper::{PageExtractor, PLACEHOLDER_TITLE};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Default pause between successive page fetches.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Options for a crawl run: inter-page delay, optional page cap, progress callback.
pub struct CrawlOptions<'a> {
    pub delay: Duration,
    /// Stop after this many pages even if a next link exists. The first page is always
    /// fetched, so `Some(0)` behaves like `Some(1)`.
    pub max_pages: Option<u32>,
    /// Called before each fetch with the 1-based page index and URL.
    pub progress: Option<&'a dyn Fn(u32, &str)>,
}

impl Default for CrawlOptions<'_> {
    fn default() -> Self {
        Self {
            delay: DEFAULT_PAGE_DELAY,
            max_pages: None,
            progress: None,
        }
    }
}

/// A page fetch failed. Pages already extracted are kept in `partial`, but the story is
/// incomplete and is not exported.
#[derive(Debug, Error)]
#[error("Crawl aborted at page {page_index} ({url}): {source}")]
pub struct CrawlAborted {
    pub page_index: u32,
    pub url: String,
    #[source]
    pub source: ScraperError,
    pub partial: Vec<PageText>,
}

/// Why a crawl finished normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No pagination landmark or no "next" link.
    LastPage,
    /// The next link points at the page it is on.
    SelfLink,
    /// The next link points at a page already crawled.
    Revisit,
    /// `max_pages` reached.
    PageLimit,
}

struct CrawlState {
    current_url: Option<String>,
    visited: HashSet<String>,
    page_index: u32,
}

enum Advance {
    Done(StopReason),
    Next(String),
}

impl CrawlState {
    fn start(url: &str) -> Self {
        Self {
            current_url: Some(url.to_string()),
            visited: HashSet::new(),
            page_index: 1,
        }
    }

    fn decide(&self, current: &str, next: Option<String>, max_pages: Option<u32>) -> Advance {
        let Some(next) = next else {
            return Advance::Done(StopReason::LastPage);
        };
        if next == current {
            return Advance::Done(StopReason::SelfLink);
        }
        if self.visited.contains(&next) {
            return Advance::Done(StopReason::Revisit);
        }
        if max_pages.is_some_and(|max| self.page_index >= max) {
            return Advance::Done(StopReason::PageLimit);
        }
        Advance::Next(next)
    }
}

/// Crawl from `start_url`, following the extractor's next-page links.
///
/// The title comes from the first page. Terminates on a missing next link, a self link, a
/// link back to any visited page, or the page cap. The first fetch failure aborts the run.
pub fn crawl<T, E>(
    transport: &mut T,
    extractor: &E,
    start_url: &str,
    options: &CrawlOptions<'_>,
) -> Result<StoryDocument, CrawlAborted>
where
    T: Transport + ?Sized,
    E: PageExtractor + ?Sized,
{
    let mut state = CrawlState::start(start_url);
    let mut title: Option<String> = None;
    let mut pages: Vec<PageText> = Vec::new();

    while let Some(url) = state.current_url.take() {
        if let Some(progress) = options.progress {
            progress(state.page_index, &url);
        }
        tracing::info!(page = state.page_index, url = %url, "Fetching page");

        let doc = match fetch_document(transport, &url) {
            Ok(doc) => doc,
            Err(source) => {
                tracing::error!(page = state.page_index, url = %url, error = %source, "Page fetch failed");
                return Err(CrawlAborted {
                    page_index: state.page_index,
                    url,
                    source,
                    partial: pages,
                });
            }
        };

        if title.is_none() {
            title = Some(extractor.extract_title(&doc));
        }
        let paragraphs = extractor.extract_body_paragraphs(&doc);
        tracing::debug!(page = state.page_index, paragraphs = paragraphs.len(), "Extracted page");
        pages.push(PageText::from_paragraphs(url.as_str(), &paragraphs));

        match state.decide(&url, extractor.find_next_page_url(&doc), options.max_pages) {
            Advance::Done(reason) => {
                match reason {
                    StopReason::LastPage => {}
                    StopReason::SelfLink => {
                        tracing::warn!(url = %url, "Next page link points to itself; stopping")
                    }
                    StopReason::Revisit => {
                        tracing::warn!(url = %url, "Next page link revisits an earlier page; stopping")
                    }
                    StopReason::PageLimit => {
                        tracing::warn!(pages = pages.len(), "Page limit reached; stopping")
                    }
                }
                tracing::info!(pages = pages.len(), ?reason, "Crawl finished");
            }
            Advance::Next(next) => {
                state.visited.insert(url);
                state.current_url = Some(next);
                state.page_index += 1;
                if !options.delay.is_zero() {
                    std::thread::sleep(options.delay);
                }
            }
        }
    }

    Ok(StoryDocument {
        title: title.unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::testing::{story_page, FakeTransport};
    use crate::scraper::Literotica;
    use std::cell::RefCell;

    const BASE: &str = "https://www.literotica.com/s/tale";

    fn page_url(n: u32) -> String {
        if n == 1 {
            BASE.to_string()
        } else {
            format!("{}?page={}", BASE, n)
        }
    }

    fn fast<'a>() -> CrawlOptions<'a> {
        CrawlOptions {
            delay: Duration::ZERO,
            ..CrawlOptions::default()
        }
    }

    fn crawl_fake(t: &mut FakeTransport, options: &CrawlOptions<'_>) -> Result<StoryDocument, CrawlAborted> {
        let lit = Literotica::new().map_err(|source| CrawlAborted {
            page_index: 0,
            url: String::new(),
            source,
            partial: Vec::new(),
        })?;
        crawl(t, &lit, BASE, options)
    }

    #[test]
    fn three_pages_join_in_order() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new()
            .page(&page_url(1), &story_page(Some("Tale"), &["p1a", "p1b"], Some("/s/tale?page=2")))
            .page(&page_url(2), &story_page(Some("Ignored"), &["p2a", "p2b"], Some("/s/tale?page=3")))
            .page(&page_url(3), &story_page(Some("Ignored"), &["p3a", "p3b"], None));
        let story = crawl_fake(&mut t, &fast())?;
        assert_eq!(story.title, "Tale");
        assert_eq!(story.pages.len(), 3);
        assert_eq!(story.pages[1].url(), page_url(2));
        assert_eq!(story.full_text(), "p1a\n\np1b\n\np2a\n\np2b\n\np3a\n\np3b");
        Ok(())
    }

    #[test]
    fn single_page_without_pagination() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new().page(BASE, &story_page(Some("Short"), &["only"], None));
        let story = crawl_fake(&mut t, &fast())?;
        assert_eq!(story.pages.len(), 1);
        assert_eq!(story.full_text(), "only");
        Ok(())
    }

    #[test]
    fn self_link_on_page_n_stops_with_n_pages() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new()
            .page(&page_url(1), &story_page(Some("Loop"), &["a"], Some("/s/tale?page=2")))
            .page(&page_url(2), &story_page(None, &["b"], Some("/s/tale?page=3")))
            .page(&page_url(3), &story_page(None, &["c"], Some("/s/tale?page=3")));
        let story = crawl_fake(&mut t, &fast())?;
        assert_eq!(story.pages.len(), 3);
        assert_eq!(t.gets.len(), 3);
        Ok(())
    }

    #[test]
    fn longer_cycle_back_to_first_page_stops() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new()
            .page(&page_url(1), &story_page(Some("Cycle"), &["a"], Some("/s/tale?page=2")))
            .page(&page_url(2), &story_page(None, &["b"], Some("/s/tale")));
        let story = crawl_fake(&mut t, &fast())?;
        assert_eq!(story.pages.len(), 2);
        assert_eq!(story.full_text(), "a\n\nb");
        Ok(())
    }

    #[test]
    fn missing_title_uses_placeholder() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new().page(BASE, &story_page(None, &["x"], None));
        let story = crawl_fake(&mut t, &fast())?;
        assert_eq!(story.title, PLACEHOLDER_TITLE);
        Ok(())
    }

    #[test]
    fn empty_page_does_not_abort() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new()
            .page(&page_url(1), "<html><body><div class=\"panel clearfix l_bH\"><a title=\"Next Page\" href=\"/s/tale?page=2\">n</a></div></body></html>")
            .page(&page_url(2), &story_page(None, &["later"], None));
        let story = crawl_fake(&mut t, &fast())?;
        assert_eq!(story.pages.len(), 2);
        assert_eq!(story.pages[0].body(), "");
        Ok(())
    }

    #[test]
    fn fetch_failure_aborts_and_keeps_partial_pages() {
        let mut t = FakeTransport::new()
            .page(&page_url(1), &story_page(Some("Broken"), &["a"], Some("/s/tale?page=2")))
            .status(&page_url(2), 503);
        match crawl_fake(&mut t, &fast()) {
            Err(aborted) => {
                assert_eq!(aborted.page_index, 2);
                assert_eq!(aborted.url, page_url(2));
                assert_eq!(aborted.partial.len(), 1);
                assert!(matches!(
                    aborted.source,
                    ScraperError::HttpStatus { status: 503, .. }
                ));
            }
            Ok(story) => panic!("expected abort, got {} pages", story.pages.len()),
        }
    }

    #[test]
    fn first_page_failure_has_no_partial_pages() {
        let mut t = FakeTransport::new();
        let aborted = crawl_fake(&mut t, &fast()).err();
        assert!(aborted.is_some_and(|a| a.page_index == 1 && a.partial.is_empty()));
    }

    #[test]
    fn max_pages_caps_the_crawl() -> Result<(), CrawlAborted> {
        let mut t = FakeTransport::new()
            .page(&page_url(1), &story_page(Some("Long"), &["a"], Some("/s/tale?page=2")))
            .page(&page_url(2), &story_page(None, &["b"], Some("/s/tale?page=3")))
            .page(&page_url(3), &story_page(None, &["c"], None));
        let options = CrawlOptions {
            max_pages: Some(2),
            ..fast()
        };
        let story = crawl_fake(&mut t, &options)?;
        assert_eq!(story.pages.len(), 2);
        Ok(())
    }

    #[test]
    fn progress_reports_each_page() -> Result<(), CrawlAborted> {
        let seen: RefCell<Vec<u32>> = RefCell::new(Vec::new());
        let cb = |n: u32, _url: &str| seen.borrow_mut().push(n);
        let mut t = FakeTransport::new()
            .page(&page_url(1), &story_page(Some("P"), &["a"], Some("/s/tale?page=2")))
            .page(&page_url(2), &story_page(None, &["b"], None));
        let options = CrawlOptions {
            progress: Some(&cb),
            ..fast()
        };
        crawl_fake(&mut t, &options)?;
        assert_eq!(*seen.borrow(), vec![1, 2]);
        Ok(())
    }
}
