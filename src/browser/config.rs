use std::time::Duration;

/// Desktop Chrome user agent presented to the target site.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Launch configuration for a scraping session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run the browser off-screen
    pub headless: bool,

    /// Viewport size; the default 1920x1080 makes the site serve its
    /// desktop layout
    pub window_size: (u32, u32),

    /// User agent override
    pub user_agent: Option<String>,

    /// Navigation timeout in seconds
    pub nav_timeout_secs: u64,

    /// Chrome flags appended at launch
    pub chrome_flags: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            user_agent: Some(USER_AGENT.to_string()),
            nav_timeout_secs: 30,
            chrome_flags: stealth_flags(),
        }
    }
}

impl SessionConfig {
    /// Configuration with a visible window, for watching the scrape
    /// while debugging selectors.
    pub fn visible() -> Self {
        Self {
            headless: false,
            ..Self::default()
        }
    }

    /// Navigation timeout as a Duration
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }
}

/// Flags that strip the obvious automation markers, keep Chrome quiet,
/// and survive containerized environments.
fn stealth_flags() -> Vec<String> {
    vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--log-level=3".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_size, (1920, 1080));
        assert!(config.user_agent.is_some());
        assert_eq!(config.nav_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_includes_stealth_flags() {
        let config = SessionConfig::default();
        assert!(config
            .chrome_flags
            .iter()
            .any(|f| f.contains("AutomationControlled")));
        assert!(config.chrome_flags.iter().any(|f| f == "--no-sandbox"));
    }

    #[test]
    fn test_visible_config_keeps_stealth() {
        let config = SessionConfig::visible();
        assert!(!config.headless);
        // Stealth flags stay on even with the window shown
        assert!(!config.chrome_flags.is_empty());
    }
}
