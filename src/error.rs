/// Run-level error taxonomy.
///
/// Only `Session` is fatal to a run: it means no browser could be
/// started, so there is nothing to degrade to. `Navigation` and
/// `Extraction` are raised by individual steps and caught by the layer
/// that can continue without them (skip the product, skip the block).
/// A legitimately empty outcome is plain data (`None`, empty `Vec`) and
/// has no variant here.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Browser session failed: {0}")]
    Session(String),

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl ScrapeError {
    pub fn session(err: impl std::fmt::Display) -> Self {
        Self::Session(err.to_string())
    }

    pub fn navigation(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Navigation {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn extraction(err: impl std::fmt::Display) -> Self {
        Self::Extraction(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_error_carries_url() {
        let err = ScrapeError::navigation("https://example.com/p/1", "timed out");
        let message = err.to_string();
        assert!(message.contains("https://example.com/p/1"));
        assert!(message.contains("timed out"));
    }
}
