use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::ScrapeRange,
};

/// Config file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "catalog.toml";

const PAGE_PLACEHOLDER: &str = "{page_num}";

/// Scraper settings. Every field has a default, so a partial TOML file works.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Category page URL; `{page_num}` is replaced by the page number.
    pub url_template: String,
    pub start_page: u32,
    pub end_page: u32,
    /// Postal code typed into the location prompt.
    pub postal_code: String,
    /// Upper bound for every element wait.
    pub wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Open each product's detail view to read a second image.
    pub secondary_images: bool,
    /// Where the result table is written. Overwritten on every run.
    pub output_path: PathBuf,
    pub browser: BrowserConfig,
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// geckodriver endpoint.
    pub webdriver_url: String,
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Root of the per-category image folders.
    pub base_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: "https://tienda.mercadona.es/categories/{page_num}".to_string(),
            start_page: 0,
            end_page: 300,
            postal_code: "28039".to_string(),
            wait_timeout_ms: 3000,
            poll_interval_ms: 250,
            secondary_images: false,
            output_path: PathBuf::from("data/raw/products.csv"),
            browser: BrowserConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://127.0.0.1:4444".to_string(),
            headless: true,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data/images"),
            request_timeout_secs: 30,
        }
    }
}

impl ScrapeConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn page_url(&self, page_num: u32) -> String {
        self.url_template
            .replace(PAGE_PLACEHOLDER, &page_num.to_string())
    }

    pub fn range(&self) -> ScrapeRange {
        ScrapeRange::new(self.start_page, self.end_page)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.images.request_timeout_secs)
    }
}
