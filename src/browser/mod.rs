//! Browser automation for a JavaScript-heavy retail site
//!
//! One [`BrowserSession`] owns one headless Chrome process and the
//! single tab a scrape run drives. Launch configuration lives in
//! [`SessionConfig`]; the session exposes the navigation, wait, click
//! and scroll primitives the pipeline stages build on.
//!
//! # Example
//!
//! ```no_run
//! use myntra_review_scraper::browser::{BrowserSession, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = BrowserSession::open(SessionConfig::default())?;
//!
//! session.navigate("https://www.myntra.com/shoes")?;
//! let html = session.page_html()?;
//! println!("Fetched {} bytes of HTML", html.len());
//!
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod session;

// Re-export main types for convenience
pub use config::SessionConfig;
pub use session::{poll_until, BrowserError, BrowserSession};
