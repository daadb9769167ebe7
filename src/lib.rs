//! # Mercadona Catalog
//!
//! Scrapes product listings from the Mercadona online store by driving a
//! browser across its numbered category pages.
//!
//! The crate covers two stages:
//!
//! 1. **Scraping** - visit `categories/{n}` for every page number in a
//!    range, read name, format, price, discount price and image URL of
//!    every product tile, and write the result to a CSV table.
//!
//! 2. **Images** (optional) - create one folder per category and download
//!    the product images into it.
//!
//! ## Example
//!
//! ```no_run
//! use mercadona_catalog::{ImageFetcher, ScrapeConfig, images, scrape};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScrapeConfig {
//!         start_page: 112,
//!         end_page: 115,
//!         ..ScrapeConfig::default()
//!     };
//!     let records = scrape(&config).await?;
//!
//!     let base = &config.images.base_path;
//!     let dirs = images::category_dirs(&records, base);
//!     images::prepare_folders(dirs.keys().map(String::as_str), base).await;
//!
//!     let fetcher = ImageFetcher::new(config.request_timeout())?;
//!     for (row, record) in records.iter().enumerate() {
//!         for (secondary, url) in record.image_urls() {
//!             let path = images::image_path(base, record, row, url, secondary);
//!             fetcher.download(Some(url), &path).await;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod images;
pub mod logging;
pub mod model;
pub mod page;

pub use catalog::CatalogScraper;
pub use config::ScrapeConfig;
pub use error::{Error, Result};
pub use images::{DownloadOutcome, ImageFetcher};
pub use model::{ProductRecord, ScrapeRange};
pub use page::{Page, WebDriverPage};

/// Scrapes the configured page range and writes the table to
/// `config.output_path`.
///
/// Requires geckodriver to be running at `config.browser.webdriver_url`.
/// The browser session is released before the table is written.
///
/// # Errors
///
/// Returns an error if the browser session cannot be opened or the table
/// cannot be written. Individual page failures are only logged.
pub async fn scrape(config: &ScrapeConfig) -> Result<Vec<ProductRecord>> {
    let page = WebDriverPage::from_config(config).await?;
    scrape_with(page, config).await
}

/// Same as [`scrape`] over an already open `page`, which is closed before
/// the table is written.
///
/// # Errors
///
/// Returns an error if the table cannot be written.
pub async fn scrape_with<P: Page>(page: P, config: &ScrapeConfig) -> Result<Vec<ProductRecord>> {
    let records = CatalogScraper::new(page, config.clone())
        .run(config.range())
        .await;

    export::write_table(&records, &config.output_path, config.secondary_images)?;
    Ok(records)
}
