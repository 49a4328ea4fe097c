use crate::config::BrowserConfig;
use crate::scrapers::traits::{InteractionError, RenderingClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Headless Chrome session.
///
/// One tab is opened at launch and reused for every page of the run.
/// Chrome shuts down when the session is dropped.
pub struct HeadlessBrowser {
    // Keeps the Chrome process alive for as long as the tab is in use
    _browser: Browser,
    tab: Arc<Tab>,
}

impl HeadlessBrowser {
    /// Launch Chrome and open the working tab
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .idle_browser_timeout(Duration::from_secs(config.idle_timeout_secs))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

#[async_trait]
impl RenderingClient for HeadlessBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {} did not complete", url))?;
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value> {
        // Scripts are written as function bodies and may `return` a value
        let wrapped = format!("(function() {{ {} }})()", script);
        let result = self.tab.evaluate(&wrapped, false)?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), InteractionError> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| InteractionError::NotFound(selector.to_string()))?;
        element
            .scroll_into_view()
            .map_err(|e| InteractionError::Intercepted {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), InteractionError> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| InteractionError::NotFound(selector.to_string()))?;
        element.click().map_err(|e| InteractionError::Intercepted {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        let png = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .context("Failed to capture screenshot")?;
        tokio::fs::write(path, png)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Saved screenshot to {}", path.display());
        Ok(())
    }

    async fn page_markup(&mut self) -> Result<String> {
        self.tab.get_content().context("Could not get HTML from page")
    }
}
