//! Story URL validation: a structural check, then a HEAD probe. Never errors.

use crate::scraper::client::{is_success_status, Transport};
use crate::scraper::PageExtractor;
use std::time::Duration;

/// Default timeout for the reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// True when `url` matches the site's story path and answers a HEAD with 2xx.
///
/// A structural mismatch returns false without touching the network. Transport errors and
/// non-success statuses also return false.
pub fn is_valid_story_url<T, E>(
    transport: &mut T,
    extractor: &E,
    url: &str,
    probe_timeout: Duration,
) -> bool
where
    T: Transport + ?Sized,
    E: PageExtractor + ?Sized,
{
    if !extractor.is_story_url(url) {
        tracing::debug!(url, "URL does not match the story path pattern");
        return false;
    }
    match transport.head(url, probe_timeout) {
        Ok(status) if is_success_status(status) => true,
        Ok(status) => {
            tracing::debug!(url, status, "Story URL probe returned non-success status");
            false
        }
        Err(e) => {
            tracing::debug!(url, error = %e, "Story URL probe failed");
            false
        }
    }
}
