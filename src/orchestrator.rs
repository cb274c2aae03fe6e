//! Run orchestration: one browser session driven through discovery,
//! location, and extraction, with per-product failure containment.

use crate::browser::{BrowserSession, SessionConfig};
use crate::error::ScrapeError;
use crate::models::{ReviewDataset, ScrapeRequest};
use crate::{discovery, extractor, locator, pacing};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a run and its owner.
///
/// Clones observe the same flag. A cancelled run stops before the next
/// product visit, keeps whatever it has extracted so far, and still
/// closes the browser.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Scrape reviews for `request`, start to finish.
///
/// The only `Err` this returns is a failed browser launch; every
/// later failure is contained to the product it happened on. An empty
/// dataset is a valid outcome.
pub fn run(request: &ScrapeRequest) -> Result<ReviewDataset, ScrapeError> {
    run_with_cancel(request, &CancelToken::new())
}

/// `run`, observing a cancellation token between product visits.
pub fn run_with_cancel(
    request: &ScrapeRequest,
    cancel: &CancelToken,
) -> Result<ReviewDataset, ScrapeError> {
    if request.query.trim().is_empty() {
        log::warn!("Empty search query, nothing to scrape");
        return Ok(Vec::new());
    }

    let config = if request.headless {
        SessionConfig::default()
    } else {
        SessionConfig::visible()
    };

    let mut session = match BrowserSession::open(config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Could not start a browser session: {}", e);
            return Err(ScrapeError::session(e));
        }
    };

    let dataset = run_products(&session, request, cancel);

    session.close();

    log::info!(
        "Run finished: {} review(s) for '{}'",
        dataset.len(),
        request.query
    );

    Ok(dataset)
}

/// Everything that happens inside the session. Extracted so the session
/// is closed on the single path above it, whatever happens in here.
fn run_products(
    session: &BrowserSession,
    request: &ScrapeRequest,
    cancel: &CancelToken,
) -> ReviewDataset {
    let mut dataset = ReviewDataset::new();

    if cancel.is_cancelled() {
        log::info!("Cancelled before discovery");
        return dataset;
    }

    let candidates = discovery::discover_products(session, request);
    if candidates.is_empty() {
        log::info!("No products found for '{}'", request.query);
        return dataset;
    }

    for (index, candidate) in candidates.iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("Cancelled before product {}", index + 1);
            break;
        }

        if index > 0 {
            // Anti-burst pacing, not a correctness wait
            pacing::between_products(
                request.timeouts.pacing_min_ms,
                request.timeouts.pacing_max_ms,
            );
        }

        log::info!(
            "Product {}/{}: {}",
            index + 1,
            candidates.len(),
            candidate.url
        );

        let location = match locator::locate_reviews(session, candidate, &request.timeouts) {
            Ok(Some(location)) => location,
            Ok(None) => {
                log::info!("No review section found on {}", candidate.url);
                continue;
            }
            Err(e) => {
                log_product_failure(session, request, index + 1, &candidate.url, &e);
                continue;
            }
        };

        match extractor::extract_reviews(session, &location, &request.timeouts) {
            Ok(mut records) => dataset.append(&mut records),
            Err(e) => log_product_failure(session, request, index + 1, &candidate.url, &e),
        }
    }

    dataset
}

/// One skipped product is a warning, never a run failure.
fn log_product_failure(
    session: &BrowserSession,
    request: &ScrapeRequest,
    product_index: usize,
    url: &str,
    error: &ScrapeError,
) {
    if request.debug_trace {
        log::warn!("Skipping {}: {:?}", url, error);

        let path = format!("scrape-failure-product-{}.png", product_index);
        match session.screenshot(&path) {
            Ok(()) => log::debug!("Failure screenshot saved to {}", path),
            Err(e) => log::debug!("Failure screenshot not captured: {}", e),
        }
    } else {
        log::warn!("Skipping {}: {}", url, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_token_flips_once_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_token_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();

        clone.cancel();

        assert!(token.is_cancelled());
    }
}
