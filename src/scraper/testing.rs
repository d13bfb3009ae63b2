//! In-memory transport for unit tests.

use crate::scraper::client::{HttpResponse, Transport, TransportError};
use std::collections::HashMap;
use std::time::Duration;

/// Serves canned responses by exact URL. Unknown URLs fail like an unreachable host.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    responses: HashMap<String, HttpResponse>,
    pub gets: Vec<String>,
    pub heads: Vec<String>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status: 200,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status,
                body: String::new(),
            },
        );
        self
    }

    pub fn request_count(&self) -> usize {
        self.gets.len() + self.heads.len()
    }
}

impl Transport for FakeTransport {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        self.gets.push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::Unavailable(format!("connection refused: {}", url)))
    }

    fn head(&mut self, url: &str, _timeout: Duration) -> Result<u16, TransportError> {
        self.heads.push(url.to_string());
        self.responses
            .get(url)
            .map(|r| r.status)
            .ok_or_else(|| TransportError::Unavailable(format!("connection refused: {}", url)))
    }
}

/// Minimal story page in the Literotica layout. `next` adds the pagination block.
pub(crate) fn story_page(title: Option<&str>, paragraphs: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>t</title></head><body>");
    if let Some(t) = title {
        html.push_str(&format!(r#"<h1 class="j_bm headline j_eQ">{}</h1>"#, t));
    }
    html.push_str(r#"<div class="panel article aa_eQ">"#);
    for p in paragraphs {
        html.push_str(&format!("<p>{}</p>", p));
    }
    html.push_str("</div>");
    if let Some(href) = next {
        html.push_str(&format!(
            r#"<div class="panel clearfix l_bH"><a title="Previous Page" href="/prev">Prev</a><a title="Next Page" href="{}">Next</a></div>"#,
            href
        ));
    }
    html.push_str("</body></html>");
    html
}
