use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a single scrape run needs to know. Immutable once the run
/// starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Search term, e.g. "running shoes". Must be non-empty.
    pub query: String,

    /// Maximum number of product pages to visit.
    #[serde(default = "default_product_limit")]
    pub product_limit: usize,

    /// Render the browser off-screen.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Log caught per-product failures in full detail and save debug
    /// artifacts on failure.
    #[serde(default = "default_false")]
    pub debug_trace: bool,

    #[serde(default)]
    pub timeouts: Timeouts,
}

impl ScrapeRequest {
    /// Build a request with default timeouts. The limit is clamped to at
    /// least one product.
    pub fn new(query: impl Into<String>, product_limit: usize) -> Self {
        Self {
            query: query.into(),
            product_limit: product_limit.max(1),
            headless: true,
            debug_trace: false,
            timeouts: Timeouts::default(),
        }
    }
}

/// Wait and pacing durations for a run.
///
/// `element_wait` bounds explicit condition waits; the settle and scroll
/// pauses are deliberate fixed-with-jitter delays; the pacing bounds
/// shape the randomized sleep between product visits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_element_wait_secs")]
    pub element_wait_secs: u64,

    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    #[serde(default = "default_max_scroll_attempts")]
    pub max_scroll_attempts: usize,

    #[serde(default = "default_discovery_scroll_steps")]
    pub discovery_scroll_steps: usize,

    #[serde(default = "default_marker_scroll_steps")]
    pub marker_scroll_steps: usize,

    #[serde(default = "default_pacing_min_ms")]
    pub pacing_min_ms: u64,

    #[serde(default = "default_pacing_max_ms")]
    pub pacing_max_ms: u64,
}

fn default_true() -> bool { true }
fn default_false() -> bool { false }
fn default_product_limit() -> usize { 3 }
fn default_element_wait_secs() -> u64 { 12 }
fn default_settle_ms() -> u64 { 2000 }
fn default_scroll_pause_ms() -> u64 { 1000 }
fn default_max_scroll_attempts() -> usize { 20 }
fn default_discovery_scroll_steps() -> usize { 3 }
fn default_marker_scroll_steps() -> usize { 5 }
fn default_pacing_min_ms() -> u64 { 1500 }
fn default_pacing_max_ms() -> u64 { 2500 }

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_wait_secs: 12,
            settle_ms: 2000,
            scroll_pause_ms: 1000,
            max_scroll_attempts: 20,
            discovery_scroll_steps: 3,
            marker_scroll_steps: 5,
            pacing_min_ms: 1500,
            pacing_max_ms: 2500,
        }
    }
}

impl Timeouts {
    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }
}

/// A product page found by discovery. The URL is absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductCandidate {
    pub url: String,
}

/// Where a product's reviews were found, or presumed to be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLocation {
    pub source_product_url: String,

    /// Page to extract from; equals `source_product_url` when reviews
    /// render in place.
    pub resolved_url: String,

    /// True when review markers were actually observed on the resolved
    /// page; false on the optimistic post-click path and for static
    /// anchors that were never visited.
    pub has_review_content: bool,
}

/// One extracted customer review.
///
/// Fields hold raw trimmed text. `None` means the field was never
/// located on the page, which is different from located-but-blank
/// (`Some("")`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub product_title: String,
    pub price: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub reviewer_name: Option<String>,
    pub comment: Option<String>,
}

impl ReviewRecord {
    /// A block with neither a comment nor a rating is not a review.
    pub fn is_valid(&self) -> bool {
        self.comment.is_some() || self.rating.is_some()
    }
}

/// Final artifact of a run: records in (product discovery order, then
/// in-page block order). Emptiness is a legitimate outcome.
pub type ReviewDataset = Vec<ReviewRecord>;
