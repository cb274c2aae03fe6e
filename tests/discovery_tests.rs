/// Product discovery tests
/// Pure HTML-fixture tests; no browser required
use myntra_review_scraper::discovery::candidates_from_html;

const SEARCH_URL: &str = "https://www.myntra.com/running-shoes";

#[test]
fn test_duplicate_links_collapse_to_first_seen() {
    let html = r#"
        <html><body><ul class="results-base">
            <li class="product-base"><a href="/p/111">First</a></li>
            <li class="product-base"><a href="/p/222">Second</a></li>
            <li class="product-base"><a href="/p/111">First again</a></li>
            <li class="product-base"><a href="/p/333">Third</a></li>
            <li class="product-base"><a href="/p/222">Second again</a></li>
        </ul></body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 2);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].url, "https://www.myntra.com/p/111");
    assert_eq!(candidates[1].url, "https://www.myntra.com/p/222");
}

#[test]
fn test_dedupe_preserves_document_order() {
    let html = r#"
        <html><body>
            <li class="product-base"><a href="/p/1">A</a></li>
            <li class="product-base"><a href="/p/2">B</a></li>
            <li class="product-base"><a href="/p/1">A dup</a></li>
            <li class="product-base"><a href="/p/3">C</a></li>
        </body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 10);

    let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://www.myntra.com/p/1",
            "https://www.myntra.com/p/2",
            "https://www.myntra.com/p/3",
        ]
    );
}

#[test]
fn test_offsite_and_non_product_links_are_filtered() {
    let html = r#"
        <html><body>
            <li class="product-base"><a href="https://evil.example.com/p/9">Elsewhere</a></li>
            <li class="product-base"><a href="/help/contact">Contact</a></li>
            <li class="product-base"><a href="/p/77">Real product</a></li>
        </body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].url, "https://www.myntra.com/p/77");
}

#[test]
fn test_relative_hrefs_are_absolutized() {
    let html = r#"
        <html><body>
            <li class="product-base"><a href="/brand/shirt/10/buy">Buy shape</a></li>
            <li class="product-base"><a href="/p/20">Detail shape</a></li>
        </body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 10);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].url, "https://www.myntra.com/brand/shirt/10/buy");
    assert_eq!(candidates[1].url, "https://www.myntra.com/p/20");
}

#[test]
fn test_cascade_finds_links_without_listing_markup() {
    // No structural result-list containers at all; the href-pattern
    // strategy has to carry discovery by itself
    let html = r#"
        <html><body>
            <a href="/p/31">Shirt</a>
            <a href="/about">About us</a>
            <a href="/p/32">Shoe</a>
        </body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 10);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].url, "https://www.myntra.com/p/31");
    assert_eq!(candidates[1].url, "https://www.myntra.com/p/32");
}

#[test]
fn test_bare_anchor_fallback_relies_on_url_filter() {
    // Nothing matches the product-shaped strategies, so every anchor
    // comes back and the URL filter decides
    let html = r#"
        <html><body>
            <a href="/item/9/buy">Item</a>
            <a href="/about">About</a>
            <a href="/login">Login</a>
        </body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].url, "https://www.myntra.com/item/9/buy");
}

#[test]
fn test_zero_limit_yields_no_candidates() {
    // A zero cap means nothing to visit, not everything
    let html = r#"
        <html><body>
            <li class="product-base"><a href="/p/1">A</a></li>
            <li class="product-base"><a href="/p/2">B</a></li>
            <li class="product-base"><a href="/p/3">C</a></li>
        </body></html>
    "#;

    let candidates = candidates_from_html(html, SEARCH_URL, 0);

    assert!(candidates.is_empty());
}

#[test]
fn test_empty_page_yields_no_candidates() {
    let candidates = candidates_from_html("<html><body></body></html>", SEARCH_URL, 10);
    assert!(candidates.is_empty());
}
