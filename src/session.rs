use headless_chrome::{Browser, LaunchOptions, Tab};
use scraper::{Html, Selector};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::SessionConfig;
use crate::identity::Identity;
use crate::models::SessionTopology;
use crate::utils::error::{AppError, Result};

/// Handle to one navigated page inside a scoped browser session.
pub struct PageSession {
    tab: Arc<Tab>,
    navigation_timeout: Duration,
}

impl PageSession {
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| AppError::Scraping(format!("navigation failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| AppError::Timeout(format!("page load failed: {}", e)))?;
        Ok(())
    }

    /// Wait for a defining marker element to render.
    pub fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|_| AppError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    /// Ordered text of every element matching the selector.
    pub fn read_text(&self, selector: &str) -> Result<Vec<String>> {
        let html = self.content()?;
        let document = Html::parse_document(&html);
        let selector = Selector::parse(selector).map_err(|e| AppError::Parse {
            message: format!("invalid selector: {:?}", e),
        })?;

        Ok(document
            .select(&selector)
            .map(|element| {
                element
                    .text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string()
            })
            .collect())
    }

    /// Full rendered page HTML, as handed to extractors.
    pub fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| AppError::Scraping(format!("failed to read page content: {}", e)))
    }

    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }
}

/// Owns browser lifecycle for scrape tasks. `with_session` is the only way
/// in: the tab is closed on every exit path, including when the closure
/// fails, and in per-task mode the whole browser dies with the scope.
pub struct SessionManager {
    config: SessionConfig,
    shared: Mutex<Option<Arc<Browser>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            shared: Mutex::new(None),
        }
    }

    pub fn topology(&self) -> SessionTopology {
        self.config.topology
    }

    /// Run `f` against a freshly navigatable page. Session acquisition
    /// failures surface as `SessionUnavailable`, never a panic.
    pub async fn with_session<T, F>(&self, identity: &Identity, f: F) -> Result<T>
    where
        F: FnOnce(&PageSession) -> Result<T>,
    {
        match self.config.topology {
            SessionTopology::PerTask => {
                let browser = self.launch(identity)?;
                self.run_in_tab(&browser, identity, f)
            }
            SessionTopology::Shared => {
                // The lock serializes tab work; shared mode trades
                // concurrency for one Chrome process.
                let mut shared = self.shared.lock().await;
                let browser = match &*shared {
                    Some(browser) => Arc::clone(browser),
                    None => {
                        let browser = Arc::new(self.launch(identity)?);
                        *shared = Some(Arc::clone(&browser));
                        browser
                    }
                };
                self.run_in_tab(&browser, identity, f)
            }
        }
    }

    fn launch(&self, identity: &Identity) -> Result<Browser> {
        // In shared topology the proxy of the launching identity applies to
        // the whole browser; per-tab user agents still rotate.
        let proxy = identity
            .proxy_endpoint
            .as_ref()
            .map(|url| url.as_str().to_string());

        let mut options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-background-timer-throttling"),
                OsStr::new("--disable-backgrounding-occluded-windows"),
                OsStr::new("--disable-renderer-backgrounding"),
            ])
            .build()
            .map_err(|e| AppError::SessionUnavailable(format!("launch options: {}", e)))?;

        if let Some(chrome_path) = &self.config.chrome_path {
            options.path = Some(PathBuf::from(chrome_path));
        }
        options.proxy_server = proxy.as_deref();

        Browser::new(options)
            .map_err(|e| AppError::SessionUnavailable(format!("failed to launch browser: {}", e)))
    }

    fn run_in_tab<T, F>(&self, browser: &Browser, identity: &Identity, f: F) -> Result<T>
    where
        F: FnOnce(&PageSession) -> Result<T>,
    {
        let tab = browser
            .new_tab()
            .map_err(|e| AppError::SessionUnavailable(format!("failed to open tab: {}", e)))?;

        if let Err(e) = tab.set_user_agent(&identity.user_agent, None, None) {
            let _ = tab.close(true);
            return Err(AppError::SessionUnavailable(format!(
                "failed to set user agent: {}",
                e
            )));
        }

        let page = PageSession {
            tab: Arc::clone(&tab),
            navigation_timeout: Duration::from_secs(self.config.navigation_timeout),
        };

        let result = f(&page);

        // Close the tab to free resources; errors here are unrecoverable
        // and the outcome of `f` matters more.
        let _ = tab.close(true);

        result
    }
}
