//! Product discovery: from a search term to an ordered, deduplicated
//! list of product-page URLs.

use crate::browser::BrowserSession;
use crate::error::ScrapeError;
use crate::models::{ProductCandidate, ScrapeRequest};
use crate::pacing;
use crate::selectors;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Root of the target site; search pages live directly under it.
pub const SITE_BASE: &str = "https://www.myntra.com";

/// Search URL for a query: whitespace collapses to single hyphens, e.g.
/// "running shoes" becomes ".../running-shoes".
pub fn search_url(query: &str) -> String {
    let slug = query.trim().split_whitespace().collect::<Vec<_>>().join("-");
    format!("{}/{}", SITE_BASE, slug)
}

/// Discover up to `request.product_limit` product pages for the query.
///
/// Failure to load or read the search page is absorbed here: the run
/// should report "no reviews found" rather than abort when the search
/// itself is unreachable, so any error becomes a warning and an empty
/// list.
pub fn discover_products(
    session: &BrowserSession,
    request: &ScrapeRequest,
) -> Vec<ProductCandidate> {
    match try_discover(session, request) {
        Ok(candidates) => candidates,
        Err(e) => {
            log::warn!("Product discovery failed for '{}': {}", request.query, e);
            Vec::new()
        }
    }
}

fn try_discover(
    session: &BrowserSession,
    request: &ScrapeRequest,
) -> Result<Vec<ProductCandidate>, ScrapeError> {
    let url = search_url(&request.query);
    log::info!("Searching {}", url);

    session
        .navigate(&url)
        .map_err(|e| ScrapeError::navigation(&url, e))?;

    // Let client-side rendering settle before the first read
    pacing::settle(request.timeouts.settle());

    // A few scroll steps trigger above-the-fold lazy rendering; results
    // further down are beyond the product limit anyway
    for _ in 0..request.timeouts.discovery_scroll_steps {
        if let Err(e) = session.scroll_to_bottom() {
            log::debug!("Discovery scroll failed: {}", e);
            break;
        }
        pacing::settle(request.timeouts.scroll_pause());
    }

    let html = session
        .page_html()
        .map_err(|e| ScrapeError::navigation(&url, e))?;

    let candidates = candidates_from_html(&html, &url, request.product_limit);
    log::info!(
        "Found {} product page(s) for '{}'",
        candidates.len(),
        request.query
    );

    Ok(candidates)
}

/// Pure pipeline from search-page markup to candidates: resolve link
/// elements, absolutize hrefs against the page URL, keep only on-site
/// product-shaped URLs, dedupe preserving first-seen order, truncate to
/// `limit`.
pub fn candidates_from_html(html: &str, page_url: &str, limit: usize) -> Vec<ProductCandidate> {
    // The cap below fires after a push, so a zero limit must not enter
    // the loop at all
    if limit == 0 {
        return Vec::new();
    }

    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(e) => {
            log::warn!("Bad search page URL '{}': {}", page_url, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let links = selectors::resolve(&document, selectors::PRODUCT_LINKS);

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for link in links {
        let href = match link.value().attr("href") {
            Some(href) => href,
            None => continue,
        };

        let absolute = match base.join(href) {
            Ok(url) => url,
            Err(_) => continue,
        };

        if !is_product_url(&absolute) {
            continue;
        }

        let url_string = absolute.to_string();
        if seen.insert(url_string.clone()) {
            candidates.push(ProductCandidate { url: url_string });
            if candidates.len() == limit {
                break;
            }
        }
    }

    candidates
}

/// On the target site and shaped like a product-detail page.
fn is_product_url(url: &Url) -> bool {
    let on_site = url
        .host_str()
        .map(|host| host == "myntra.com" || host.ends_with(".myntra.com"))
        .unwrap_or(false);

    if !on_site {
        return false;
    }

    let path = url.path();
    selectors::PRODUCT_URL_MARKERS
        .iter()
        .any(|marker| path.contains(marker))
}
