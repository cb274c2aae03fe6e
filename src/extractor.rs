//! Review extraction: force the lazy-loaded review list to materialize,
//! then map markup to records through per-field fallback chains.

use crate::browser::BrowserSession;
use crate::error::ScrapeError;
use crate::models::{ReviewLocation, ReviewRecord, Timeouts};
use crate::pacing;
use crate::selectors;
use scraper::Html;
use std::time::Duration;

/// Title used when the page supplies none.
const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Extract every review this location yields.
///
/// Per-block trouble skips the block; only an unreadable page is an
/// error, and the orchestrator catches that per product.
pub fn extract_reviews(
    session: &BrowserSession,
    location: &ReviewLocation,
    timeouts: &Timeouts,
) -> Result<Vec<ReviewRecord>, ScrapeError> {
    if session.current_url() != location.resolved_url {
        session
            .navigate(&location.resolved_url)
            .map_err(|e| ScrapeError::navigation(&location.resolved_url, e))?;
        pacing::settle(timeouts.settle());
    }

    let attempts = scroll_to_stable_height(
        || match session.scroll_to_bottom() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Scroll failed, extracting what is loaded: {}", e);
                false
            }
        },
        || session.page_height().ok(),
        timeouts.max_scroll_attempts,
        timeouts.scroll_pause(),
    );
    log::debug!(
        "Lazy-load scrolling settled after {} attempt(s) on {}",
        attempts,
        location.resolved_url
    );

    let html = session
        .page_html()
        .map_err(|e| ScrapeError::extraction(e))?;

    let records = records_from_html(&html);
    log::info!(
        "Extracted {} review(s) from {}",
        records.len(),
        location.resolved_url
    );

    Ok(records)
}

/// Scroll-until-stable driver.
///
/// `scroll` pushes the viewport to the bottom and reports whether it
/// worked; `height` reads the current document height (`None` when the
/// read-back fails). Stops when two consecutive heights match, either
/// closure reports failure, or `max_attempts` is reached, so it always
/// terminates within the ceiling. Returns the number of scrolls
/// performed.
pub fn scroll_to_stable_height<S, H>(
    mut scroll: S,
    mut height: H,
    max_attempts: usize,
    pause: Duration,
) -> usize
where
    S: FnMut() -> bool,
    H: FnMut() -> Option<u64>,
{
    let mut last_height = match height() {
        Some(h) => h,
        None => return 0,
    };

    let mut attempts = 0;
    while attempts < max_attempts {
        if !scroll() {
            break;
        }
        attempts += 1;

        std::thread::sleep(pacing::jittered(pause));

        match height() {
            Some(h) if h == last_height => break,
            Some(h) => last_height = h,
            None => break,
        }
    }

    attempts
}

/// Map a fully-loaded review page to records. Pure over the markup, so
/// the same input always yields the same records.
pub fn records_from_html(html: &str) -> Vec<ReviewRecord> {
    let document = Html::parse_document(html);

    let product_title = match selectors::first_text_in(&document, &["title"]) {
        Some(title) if !title.is_empty() => title,
        _ => UNKNOWN_PRODUCT.to_string(),
    };

    // Price is page-level; every record from this page shares it
    let price = selectors::first_text_in(&document, selectors::PRICE_FIELDS);

    let blocks = selectors::resolve(&document, selectors::REVIEW_BLOCKS);
    let mut records = Vec::new();

    for block in blocks {
        let record = ReviewRecord {
            product_title: product_title.clone(),
            price: price.clone(),
            date: selectors::first_text(block, selectors::DATE_FIELDS),
            rating: selectors::first_text(block, selectors::RATING_FIELDS),
            reviewer_name: selectors::first_text(block, selectors::REVIEWER_FIELDS),
            comment: selectors::first_text(block, selectors::COMMENT_FIELDS),
        };

        if record.is_valid() {
            records.push(record);
        } else {
            log::debug!("Dropped a block with neither rating nor comment");
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_stops_at_ceiling_when_height_keeps_growing() {
        let mut current = 0u64;
        let attempts = scroll_to_stable_height(
            || true,
            || {
                current += 100;
                Some(current)
            },
            20,
            Duration::ZERO,
        );

        assert_eq!(attempts, 20);
    }

    #[test]
    fn test_scroll_stops_early_once_height_stabilizes() {
        let heights = [1000u64, 1400, 1800, 1800, 1800];
        let mut index = 0;
        let attempts = scroll_to_stable_height(
            || true,
            || {
                let h = heights[index.min(heights.len() - 1)];
                index += 1;
                Some(h)
            },
            20,
            Duration::ZERO,
        );

        // Heights 1400 and 1800 grew; the repeated 1800 ends the loop
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_scroll_gives_up_when_height_unreadable() {
        let attempts = scroll_to_stable_height(|| true, || None, 20, Duration::ZERO);
        assert_eq!(attempts, 0);
    }

    #[test]
    fn test_scroll_stops_when_scrolling_fails() {
        let mut scrolls = 0;
        let mut current = 0u64;
        let attempts = scroll_to_stable_height(
            || {
                scrolls += 1;
                scrolls <= 2
            },
            || {
                current += 100;
                Some(current)
            },
            20,
            Duration::ZERO,
        );

        // Height keeps growing, so only the third scroll's failure ends
        // the loop
        assert_eq!(attempts, 2);
    }
}
