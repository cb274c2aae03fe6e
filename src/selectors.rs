//! Strategy lists and the resolver that tries them in order.
//!
//! Every semantic target (product links, review blocks, each review
//! field) owns an ordered list of CSS strategies, most specific first.
//! The resolver returns the matches of the first strategy that finds
//! anything and never merges result sets across strategies, so drift in
//! the target site's markup is absorbed by editing a list here, not the
//! calling code.

use scraper::{ElementRef, Html, Selector};

/// Product links on a search-results page; structural container
/// selectors first, generic href patterns after, a bare anchor scan
/// last. The last resort leans on the discovery-side URL filter.
pub const PRODUCT_LINKS: &[&str] = &[
    "li.product-base a[href]",
    "ul.results-base li a[href]",
    "a.product-base",
    "a[href*='/p/']",
    "a[href*='/product/']",
    "a[href]",
];

/// Path fragments that identify a product-detail URL.
pub const PRODUCT_URL_MARKERS: &[&str] = &["/p/", "/product", "/buy"];

/// Elements whose presence means review content is on the page.
pub const REVIEW_MARKERS: &[&str] = &[
    "div.user-review",
    "li.user-review-item",
    "div.detailed-reviews-userReviewsContainer",
    ".ratings",
];

/// Containers holding one review (or the whole review list), in
/// specificity order.
pub const REVIEW_BLOCKS: &[&str] = &[
    "div.detailed-reviews-userReviewsContainer",
    "li.user-review-item",
    "div.user-review",
    "div.review",
    ".ratingReviews",
];

pub const RATING_FIELDS: &[&str] = &[
    ".user-review-starRating",
    ".rating",
    ".star-rating",
    ".index-starRating",
];

pub const COMMENT_FIELDS: &[&str] = &[
    ".user-review-reviewTextWrapper",
    ".review-text",
    "p",
    ".comment",
];

pub const REVIEWER_FIELDS: &[&str] = &[
    ".user-review-left span",
    ".user-name",
    ".reviewer",
    ".author",
];

pub const DATE_FIELDS: &[&str] = &[
    ".user-review-left span:nth-of-type(2)",
    ".review-date",
    ".date",
];

/// Product-page price, read once per page and stamped on every record
/// extracted from it.
pub const PRICE_FIELDS: &[&str] = &[
    ".pdp-price",
    ".pdp-product-price",
    "span.product-price",
    ".price",
];

/// Ways to reach the full-review view on a product page, tried in
/// order by the locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickStrategy {
    /// Direct CSS selector for the control.
    Css(&'static str),
    /// Case-insensitive substring match against anchor text.
    LinkText(&'static str),
}

/// "See all reviews" controls.
pub const REVIEW_CLICKS: &[ClickStrategy] = &[
    ClickStrategy::Css("a.detailed-reviews-allReviews"),
    ClickStrategy::Css("a[href*='reviews']"),
    ClickStrategy::LinkText("read all reviews"),
    ClickStrategy::LinkText("all reviews"),
];

/// XPath matching an `<a>` whose text contains `needle`, ignoring
/// ASCII case.
pub fn link_text_xpath(needle: &str) -> String {
    format!(
        "//a[contains(translate(text(), 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), '{}')]",
        needle.to_lowercase()
    )
}

/// Try each CSS strategy in order against the whole document and return
/// the matches of the first strategy that finds anything. Empty means no
/// strategy matched; callers decide whether that is fatal for their
/// step.
pub fn resolve<'a>(document: &'a Html, strategies: &[&str]) -> Vec<ElementRef<'a>> {
    for strategy in strategies {
        let selector = match Selector::parse(strategy) {
            Ok(selector) => selector,
            Err(_) => {
                log::debug!("Skipping unparsable selector: {}", strategy);
                continue;
            }
        };

        let matches: Vec<ElementRef<'a>> = document.select(&selector).collect();
        if !matches.is_empty() {
            log::debug!("Strategy '{}' matched {} element(s)", strategy, matches.len());
            return matches;
        }
    }

    Vec::new()
}

/// `resolve`, scoped to the subtree under `element`. Used for the
/// per-field chains inside a single review block.
pub fn resolve_within<'a>(element: ElementRef<'a>, strategies: &[&str]) -> Vec<ElementRef<'a>> {
    for strategy in strategies {
        let selector = match Selector::parse(strategy) {
            Ok(selector) => selector,
            Err(_) => continue,
        };

        let matches: Vec<ElementRef<'a>> = element.select(&selector).collect();
        if !matches.is_empty() {
            return matches;
        }
    }

    Vec::new()
}

/// Trimmed text of the first element the strategy list resolves to
/// under `element`. `None` when no strategy matched at all; a matched
/// but blank element yields `Some("")`, keeping "never located" and
/// "located, blank" distinguishable.
pub fn first_text(element: ElementRef<'_>, strategies: &[&str]) -> Option<String> {
    resolve_within(element, strategies)
        .first()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Document-level counterpart of `first_text`.
pub fn first_text_in(document: &Html, strategies: &[&str]) -> Option<String> {
    resolve(document, strategies)
        .first()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_strategy_lists_parse() {
        let lists: &[&[&str]] = &[
            PRODUCT_LINKS,
            REVIEW_MARKERS,
            REVIEW_BLOCKS,
            RATING_FIELDS,
            COMMENT_FIELDS,
            REVIEWER_FIELDS,
            DATE_FIELDS,
            PRICE_FIELDS,
        ];

        for list in lists {
            for strategy in *list {
                assert!(
                    Selector::parse(strategy).is_ok(),
                    "selector should parse: {}",
                    strategy
                );
            }
        }
    }

    #[test]
    fn test_first_non_empty_strategy_wins() {
        let html = Html::parse_document(
            r#"
            <html><body>
                <p class="note">one</p>
                <p class="note">two</p>
                <p class="note">three</p>
                <span class="other">ignored</span>
            </body></html>
            "#,
        );

        // First strategy matches nothing, second matches three elements,
        // third would match one more; only the second's results come back
        let matches = resolve(&html, &["div.absent", "p.note", "span.other"]);
        assert_eq!(matches.len(), 3);

        let texts: Vec<String> = matches
            .iter()
            .map(|el| el.text().collect::<String>())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_resolve_returns_empty_when_nothing_matches() {
        let html = Html::parse_document("<html><body><div>x</div></body></html>");
        assert!(resolve(&html, &["p.absent", "span.also-absent"]).is_empty());
    }

    #[test]
    fn test_first_text_distinguishes_absent_from_blank() {
        let html = Html::parse_document(
            r#"<html><body><div id="block"><span class="blank">   </span></div></body></html>"#,
        );
        let selector = Selector::parse("#block").unwrap();
        let block = html.select(&selector).next().unwrap();

        assert_eq!(first_text(block, &[".blank"]), Some(String::new()));
        assert_eq!(first_text(block, &[".missing"]), None);
    }

    #[test]
    fn test_link_text_xpath_lowercases_needle() {
        let xpath = link_text_xpath("Read All Reviews");
        assert!(xpath.contains("'read all reviews'"));
        assert!(xpath.starts_with("//a[contains(translate("));
    }
}
