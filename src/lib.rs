// Library interface for myntra_review_scraper
// Pipeline stages are public so tests and the binary can drive them directly

pub mod browser;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod models;
pub mod orchestrator;
pub mod pacing;
pub mod selectors;

pub use error::ScrapeError;
pub use models::{
    ProductCandidate, ReviewDataset, ReviewLocation, ReviewRecord, ScrapeRequest, Timeouts,
};
pub use orchestrator::{run, run_with_cancel, CancelToken};
