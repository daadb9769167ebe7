//! Downloads product images listed in a scraped table.
//!
//! Creates one folder per category under the configured image directory,
//! then fetches every main and secondary image URL in the table.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fetch-images                        # configured output_path
//! cargo run --bin fetch-images -- data/raw/other.csv  # custom table
//! ```

use std::{
    env,
    error::Error,
    path::{Path, PathBuf},
};

use mercadona_catalog::{ImageFetcher, ScrapeConfig, config::CONFIG_FILE, export, images, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let config = ScrapeConfig::load(Path::new(CONFIG_FILE))?;
    let table = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_path.clone());

    let records = export::read_table(&table)?;
    let base = &config.images.base_path;

    let dirs = images::category_dirs(&records, base);
    let created = images::prepare_folders(dirs.keys().map(String::as_str), base).await;
    println!("{} categories, {created} new folders", dirs.len());

    let fetcher = ImageFetcher::new(config.request_timeout())?;
    let mut saved = 0;
    let mut failed = 0;
    for (row, record) in records.iter().enumerate() {
        for (secondary, url) in record.image_urls() {
            let path = images::image_path(base, record, row, url, secondary);
            if fetcher.download(Some(url), &path).await.is_saved() {
                saved += 1;
            } else {
                failed += 1;
            }
        }
    }

    println!("\nComplete! Saved {saved} images, {failed} failed.");
    Ok(())
}
