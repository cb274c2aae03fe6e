//! Review location: from a product page to the URL that shows its
//! reviews, when one can be found at all.

use crate::browser::{BrowserError, BrowserSession};
use crate::error::ScrapeError;
use crate::extractor;
use crate::models::{ProductCandidate, ReviewLocation, Timeouts};
use crate::pacing;
use crate::selectors::{self, ClickStrategy};
use scraper::{Html, Selector};
use url::Url;

/// Try to land the session on the product's review content.
///
/// `Ok(None)` means this product has no findable reviews and the caller
/// skips it. `Err` means the product page itself could not be worked
/// with; the orchestrator logs it and skips the product the same way.
pub fn locate_reviews(
    session: &BrowserSession,
    candidate: &ProductCandidate,
    timeouts: &Timeouts,
) -> Result<Option<ReviewLocation>, ScrapeError> {
    session
        .navigate(&candidate.url)
        .map_err(|e| ScrapeError::navigation(&candidate.url, e))?;

    // Initial render: the body first, then a settle for the client-side
    // app to hydrate
    if let Err(e) = session.wait_for_selector("body", timeouts.element_wait()) {
        log::debug!("No body element on {}: {}", candidate.url, e);
    }
    pacing::settle(timeouts.settle());

    let clicked = attempt_review_click(session);
    if clicked {
        // Give a resulting navigation or in-place expansion a moment
        pacing::settle(timeouts.settle());
    }

    // Review blocks are lazily rendered; scroll them into the DOM
    // before inspecting, clicked or not
    let scrolls = extractor::scroll_to_stable_height(
        || match session.scroll_to_bottom() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Pre-inspection scroll failed: {}", e);
                false
            }
        },
        || session.page_height().ok(),
        timeouts.marker_scroll_steps,
        timeouts.scroll_pause(),
    );
    log::debug!(
        "Pre-inspection scrolling settled after {} attempt(s) on {}",
        scrolls,
        candidate.url
    );

    let html = session
        .page_html()
        .map_err(|e| ScrapeError::navigation(&candidate.url, e))?;

    let markers_present = has_review_markers(&html);
    let static_anchor = static_review_anchor(&html, &candidate.url);
    let current_url = session.current_url();

    Ok(decide(
        candidate,
        markers_present,
        clicked,
        current_url,
        static_anchor,
    ))
}

/// Work through the "see all reviews" strategies; true once any click
/// goes through. A found element that rejects the direct click gets a
/// programmatic click before the next strategy is tried; a missing
/// element just moves on.
fn attempt_review_click(session: &BrowserSession) -> bool {
    for strategy in selectors::REVIEW_CLICKS {
        let outcome = match strategy {
            ClickStrategy::Css(css) => match session.click_element(css) {
                Err(BrowserError::ElementNotFound(_)) => continue,
                Err(e) => {
                    log::debug!("Direct click on '{}' failed ({}), trying JS click", css, e);
                    session.click_js(css)
                }
                ok => ok,
            },
            ClickStrategy::LinkText(needle) => {
                let xpath = selectors::link_text_xpath(needle);
                match session.click_xpath(&xpath) {
                    Err(BrowserError::ElementNotFound(_)) => continue,
                    Err(e) => {
                        log::debug!(
                            "Direct click on link text '{}' failed ({}), trying JS click",
                            needle,
                            e
                        );
                        session.click_xpath_js(&xpath)
                    }
                    ok => ok,
                }
            }
        };

        match outcome {
            Ok(()) => {
                log::debug!("Review control clicked via {:?}", strategy);
                return true;
            }
            Err(e) => {
                log::debug!("Review click attempt failed: {}", e);
            }
        }
    }

    false
}

/// Any review marker anywhere in the page.
pub fn has_review_markers(html: &str) -> bool {
    let document = Html::parse_document(html);
    !selectors::resolve(&document, selectors::REVIEW_MARKERS).is_empty()
}

/// First reviews-looking anchor in the static markup, absolutized
/// against the product URL. `None` when there is no such anchor or it
/// cannot be absolutized.
pub fn static_review_anchor(html: &str, product_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href*='review']").ok()?;

    let href = document
        .select(&selector)
        .find_map(|el| el.value().attr("href"))?;

    Url::parse(product_url)
        .and_then(|base| base.join(href))
        .ok()
        .map(|url| url.to_string())
}

/// Decide where this product's reviews live from what the page shows.
///
/// Markers on the current page win outright. A click with no markers is
/// trusted optimistically (the target may still be rendering) but
/// flagged unverified and logged. Failing both, a reviews anchor found
/// in the static markup is used. Otherwise there is nothing to extract
/// for this product.
fn decide(
    candidate: &ProductCandidate,
    markers_present: bool,
    clicked: bool,
    current_url: String,
    static_anchor: Option<String>,
) -> Option<ReviewLocation> {
    if markers_present {
        return Some(ReviewLocation {
            source_product_url: candidate.url.clone(),
            resolved_url: current_url,
            has_review_content: true,
        });
    }

    if clicked {
        log::warn!(
            "Clicked a review control on {} but saw no review markers; proceeding unverified",
            candidate.url
        );
        return Some(ReviewLocation {
            source_product_url: candidate.url.clone(),
            resolved_url: current_url,
            has_review_content: false,
        });
    }

    if let Some(anchor) = static_anchor {
        return Some(ReviewLocation {
            source_product_url: candidate.url.clone(),
            resolved_url: anchor,
            has_review_content: false,
        });
    }

    None
}
