//! Browser automation seam.
//!
//! [`CatalogScraper`](crate::catalog::CatalogScraper) only talks to a
//! [`Page`]: bounded waits, lookups inside an element, text and attribute
//! reads, clicks. [`WebDriverPage`] implements it on top of a `thirtyfour`
//! session against geckodriver.

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;
use tracing::{debug, warn};

use crate::{
    config::{BrowserConfig, ScrapeConfig},
    error::{Error, Result},
};

#[async_trait]
pub trait Page: Send + Sync + Sized {
    type Element: Send + Sync;

    async fn goto(&self, url: &str) -> Result<()>;

    /// Waits up to `timeout` for the first element matching `css`.
    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<Self::Element>;

    /// Waits up to `timeout` until at least one element matches `css`.
    async fn wait_for_all(&self, css: &str, timeout: Duration) -> Result<Vec<Self::Element>>;

    /// Immediate lookup inside `parent`, no waiting.
    async fn find_in(&self, parent: &Self::Element, css: &str) -> Result<Self::Element>;

    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attr(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn send_keys(&self, element: &Self::Element, keys: &str) -> Result<()>;

    /// History back; used when an overlay refuses to close.
    async fn back(&self) -> Result<()>;

    /// Releases the browser session.
    async fn close(self) -> Result<()>;
}

/// A live geckodriver session.
///
/// The driver sits in an `Option` so [`Page::close`] can take it. If the
/// page is dropped without being closed the session is quit in the
/// background.
pub struct WebDriverPage {
    driver: Option<WebDriver>,
    poll_interval: Duration,
}

impl WebDriverPage {
    /// Connects to geckodriver and opens a Firefox session.
    ///
    /// # Errors
    ///
    /// Returns an error if geckodriver is unreachable or refuses the session.
    /// This is the one failure that aborts a run.
    pub async fn connect(browser: &BrowserConfig, poll_interval: Duration) -> Result<Self> {
        let mut caps = DesiredCapabilities::firefox();
        if browser.headless {
            caps.set_headless()?;
        }
        let driver = WebDriver::new(&browser.webdriver_url, caps).await?;
        debug!(url = %browser.webdriver_url, headless = browser.headless, "browser session open");

        Ok(Self {
            driver: Some(driver),
            poll_interval,
        })
    }

    pub async fn from_config(config: &ScrapeConfig) -> Result<Self> {
        Self::connect(&config.browser, config.poll_interval()).await
    }

    fn driver(&self) -> Result<&WebDriver> {
        self.driver.as_ref().ok_or(Error::SessionClosed)
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<()> {
        self.driver()?.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<WebElement> {
        self.driver()?
            .query(By::Css(css.to_string()))
            .wait(timeout, self.poll_interval)
            .first()
            .await
            .map_err(|e| {
                debug!(selector = css, error = %e, "wait failed");
                Error::Timeout(css.to_string())
            })
    }

    async fn wait_for_all(&self, css: &str, timeout: Duration) -> Result<Vec<WebElement>> {
        self.driver()?
            .query(By::Css(css.to_string()))
            .wait(timeout, self.poll_interval)
            .all_from_selector_required()
            .await
            .map_err(|e| {
                debug!(selector = css, error = %e, "wait failed");
                Error::Timeout(css.to_string())
            })
    }

    async fn find_in(&self, parent: &WebElement, css: &str) -> Result<WebElement> {
        parent
            .find(By::Css(css.to_string()))
            .await
            .map_err(|_| Error::ElementNotFound(css.to_string()))
    }

    async fn text(&self, element: &WebElement) -> Result<String> {
        Ok(element.text().await?)
    }

    async fn attr(&self, element: &WebElement, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn click(&self, element: &WebElement) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &WebElement, keys: &str) -> Result<()> {
        element.send_keys(keys).await?;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        self.driver()?.back().await?;
        Ok(())
    }

    async fn close(mut self) -> Result<()> {
        let driver = self.driver.take().ok_or(Error::SessionClosed)?;
        driver.quit().await?;
        debug!("browser session closed");
        Ok(())
    }
}

impl Drop for WebDriverPage {
    fn drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        warn!("browser session dropped without close, quitting in background");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = driver.quit().await {
                    warn!(error = %e, "background quit failed");
                }
            });
        }
    }
}
