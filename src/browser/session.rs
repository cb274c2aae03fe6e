use super::config::SessionConfig;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Errors raised by the browser primitives
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript execution error: {0}")]
    JavaScriptError(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtractionError(String),
}

/// One live Chrome process and the single tab a run drives.
///
/// The session is the sole owner of the browser process. `close` (or
/// `Drop`, which calls it) releases the process, so it is freed on every
/// exit path including panics.
pub struct BrowserSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch Chrome and prepare the scraping tab.
    ///
    /// Failure here is the only unconditionally fatal failure in a run:
    /// with no browser there is nothing to degrade to.
    pub fn open(config: SessionConfig) -> Result<Self, BrowserError> {
        let browser = Self::launch(&config)?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("Tab creation failed: {}", e)))?;

        tab.set_default_timeout(config.nav_timeout());

        if let Some(ref user_agent) = config.user_agent {
            tab.set_user_agent(user_agent, None, None)
                .map_err(|e| BrowserError::ConfigurationError(e.to_string()))?;
        }

        // Pin the viewport so the site serves its desktop layout
        tab.set_bounds(headless_chrome::types::Bounds::Normal {
            left: Some(0),
            top: Some(0),
            width: Some(config.window_size.0 as f64),
            height: Some(config.window_size.1 as f64),
        })
        .map_err(|e| BrowserError::ConfigurationError(e.to_string()))?;

        // Hide navigator.webdriver before any page script can read it,
        // on this and every later navigation
        let stealth_script = r#"
            Object.defineProperty(navigator, 'webdriver', {
                get: () => undefined
            });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en']
            });
        "#;
        tab.call_method(Page::AddScriptToEvaluateOnNewDocument {
            source: stealth_script.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })
        .map_err(|e| BrowserError::ConfigurationError(e.to_string()))?;

        log::debug!("Browser session opened (headless: {})", config.headless);

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    /// Launch options borrow the flag strings, so building them and
    /// starting the browser happen in one scope.
    fn launch(config: &SessionConfig) -> Result<Browser, BrowserError> {
        let args: Vec<&OsStr> = config
            .chrome_flags
            .iter()
            .map(|flag| OsStr::new(flag.as_str()))
            .collect();

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_size.0, config.window_size.1)))
            .args(args)
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))?;

        Browser::new(launch_options).map_err(|e| BrowserError::LaunchFailed(e.to_string()))
    }

    /// Navigate and block until the navigation settles.
    pub fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        log::debug!("Navigating to {}", url);

        self.tab.navigate_to(url).map_err(|e| {
            BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e))
        })?;

        self.tab.wait_until_navigated().map_err(|e| {
            BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e))
        })?;

        Ok(())
    }

    /// URL the tab is currently on.
    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Full serialized DOM of the current page.
    pub fn page_html(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    /// Document title of the current page.
    pub fn page_title(&self) -> Result<String, BrowserError> {
        self.tab
            .get_title()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    /// Evaluate a JavaScript expression, returning its JSON value if it
    /// produced one.
    pub fn evaluate(&self, script: &str) -> Result<Option<serde_json::Value>, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(result.value)
    }

    /// Wait until an element matching `selector` exists, polling every
    /// 100 ms up to `timeout`.
    pub fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let script = format!(
            r#"document.querySelector('{}') !== null"#,
            selector.replace('\'', "\\'")
        );

        let found = poll_until(timeout, Duration::from_millis(100), || {
            match self.tab.evaluate(&script, false) {
                Ok(result) => result.value.and_then(|v| v.as_bool()) == Some(true),
                Err(_) => false,
            }
        });

        if found {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!(
                "Waiting for selector: {}",
                selector
            )))
        }
    }

    /// Click an element through its DOM handle. Errors if the element is
    /// missing or rejects the interaction.
    pub fn click_element(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        element.click().map_err(|e| {
            BrowserError::JavaScriptError(format!("Click failed on {}: {}", selector, e))
        })?;

        Ok(())
    }

    /// Programmatic click fallback for elements that reject direct
    /// interaction (overlays, off-screen targets).
    pub fn click_js(&self, selector: &str) -> Result<(), BrowserError> {
        let script = format!(
            r#"document.querySelector('{}').click();"#,
            selector.replace('\'', "\\'")
        );

        self.tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::JavaScriptError(format!("Click failed: {}", e)))?;

        Ok(())
    }

    /// Click the first element matching an XPath expression.
    pub fn click_xpath(&self, xpath: &str) -> Result<(), BrowserError> {
        let element = self
            .tab
            .find_element_by_xpath(xpath)
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", xpath, e)))?;

        element.click().map_err(|e| {
            BrowserError::JavaScriptError(format!("Click failed on {}: {}", xpath, e))
        })?;

        Ok(())
    }

    /// XPath counterpart of `click_js`.
    pub fn click_xpath_js(&self, xpath: &str) -> Result<(), BrowserError> {
        let script = format!(
            r#"document.evaluate("{}", document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue.click();"#,
            xpath.replace('"', "\\\"")
        );

        self.tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::JavaScriptError(format!("Click failed: {}", e)))?;

        Ok(())
    }

    /// Scroll to the bottom of the page to trigger lazy loading.
    pub fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.tab
            .evaluate("window.scrollTo(0, document.body.scrollHeight);", false)
            .map_err(|e| BrowserError::JavaScriptError(format!("Scroll failed: {}", e)))?;

        Ok(())
    }

    /// Current document height; stops changing once lazy loading has
    /// nothing more to add.
    pub fn page_height(&self) -> Result<u64, BrowserError> {
        let result = self
            .tab
            .evaluate("document.body.scrollHeight", false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        result
            .value
            .and_then(|v| v.as_f64())
            .map(|height| height as u64)
            .ok_or_else(|| BrowserError::JavaScriptError("Page height unavailable".to_string()))
    }

    /// Save a PNG screenshot of the current page, for failure diagnosis.
    pub fn screenshot(&self, path: &str) -> Result<(), BrowserError> {
        let data = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| BrowserError::JavaScriptError(format!("Screenshot failed: {}", e)))?;

        std::fs::write(path, data).map_err(|e| {
            BrowserError::JavaScriptError(format!("Failed to save screenshot: {}", e))
        })?;

        Ok(())
    }

    /// Release the browser process. Safe to call more than once; `Drop`
    /// performs the same release if this is never reached.
    pub fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            drop(browser);
            log::debug!("Browser session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.browser.is_none()
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Poll `predicate` every `interval` until it holds or `timeout`
/// elapses; the predicate is always tried at least once. Returns
/// whether it ever held.
///
/// This is the correctness-wait primitive. Deliberate settle and pacing
/// sleeps live in the `pacing` module instead.
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();

    loop {
        if predicate() {
            return true;
        }

        if start.elapsed() >= timeout {
            return false;
        }

        std::thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_until_immediate_success() {
        let mut calls = 0;
        let held = poll_until(Duration::from_secs(1), Duration::from_millis(1), || {
            calls += 1;
            true
        });

        assert!(held);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_poll_until_eventual_success() {
        let mut calls = 0;
        let held = poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
            calls += 1;
            calls >= 3
        });

        assert!(held);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_poll_until_times_out() {
        let held = poll_until(Duration::from_millis(10), Duration::from_millis(1), || false);
        assert!(!held);
    }

    #[test]
    fn test_poll_until_checks_once_with_zero_timeout() {
        let mut calls = 0;
        poll_until(Duration::ZERO, Duration::from_millis(1), || {
            calls += 1;
            false
        });

        assert_eq!(calls, 1);
    }

    #[test]
    #[ignore] // Requires Chrome/Chromium
    fn test_open_and_close_session() {
        let mut session = BrowserSession::open(SessionConfig::default())
            .expect("Chrome/Chromium not installed?");

        assert!(!session.is_closed());

        session.close();
        session.close(); // Idempotent
        assert!(session.is_closed());
    }
}
