//! Literotica adapter. Story pages are `/s/{slug}` with `?page=N` pagination; each page
//! carries the title heading, the story panel, and a pagination panel with a "Next Page" link.

use crate::scraper::error::ScraperError;
use crate::scraper::fetch::ParsedDocument;
use crate::scraper::{PageExtractor, PLACEHOLDER_TITLE};
use regex::Regex;
use reqwest::Url;
use scraper::Selector;
use std::sync::LazyLock;

static STORY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.literotica\.com/s/[a-zA-Z0-9-]+")
        .expect("STORY_URL: hardcoded regex is valid")
});

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::Selector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Literotica page extractor. Selectors are parsed once at construction.
#[derive(Debug)]
pub struct Literotica {
    title: Selector,
    body: Selector,
    paragraph: Selector,
    pagination: Selector,
    next_link: Selector,
}

impl Literotica {
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            title: parse_selector("h1.j_bm.headline.j_eQ")?,
            body: parse_selector("div.panel.article.aa_eQ")?,
            paragraph: parse_selector("p")?,
            pagination: parse_selector("div.panel.clearfix.l_bH")?,
            next_link: parse_selector(r#"a[title="Next Page"]"#)?,
        })
    }
}

impl PageExtractor for Literotica {
    fn is_story_url(&self, url: &str) -> bool {
        STORY_URL.is_match(url)
    }

    fn extract_title(&self, doc: &ParsedDocument) -> String {
        let title = doc
            .html()
            .select(&self.title)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());
        match title {
            Some(t) => t,
            None => {
                tracing::warn!(url = doc.url(), "Title heading not found; using placeholder");
                PLACEHOLDER_TITLE.to_string()
            }
        }
    }

    fn extract_body_paragraphs(&self, doc: &ParsedDocument) -> Vec<String> {
        let Some(panel) = doc.html().select(&self.body).next() else {
            tracing::warn!(url = doc.url(), "Story panel not found; page has no text");
            return Vec::new();
        };
        panel
            .select(&self.paragraph)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn find_next_page_url(&self, doc: &ParsedDocument) -> Option<String> {
        let pagination = doc.html().select(&self.pagination).next()?;
        let href = pagination
            .select(&self.next_link)
            .next()?
            .value()
            .attr("href")?
            .trim();
        if href.is_empty() {
            return None;
        }
        match Url::parse(doc.url()).and_then(|base| base.join(href)) {
            Ok(u) => Some(u.to_string()),
            Err(e) => {
                tracing::warn!(url = doc.url(), href, error = %e, "Could not resolve next page link");
                None
            }
        }
    }
}
