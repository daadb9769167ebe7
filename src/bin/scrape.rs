//! Scrapes Mercadona category pages into a CSV table.
//!
//! Requires geckodriver to be running on port 4444. Settings come from
//! `catalog.toml` when present; the page range can be given on the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! geckodriver &
//! cargo run --bin scrape            # pages 0..=300
//! cargo run --bin scrape -- 112 115 # pages 112..=115
//! ```

use std::{env, error::Error, path::Path};

use mercadona_catalog::{ScrapeConfig, config::CONFIG_FILE, logging, scrape};

fn page_arg(arg: Option<String>, default: u32) -> Result<u32, mercadona_catalog::Error> {
    match arg {
        Some(value) => value
            .parse()
            .map_err(|_| mercadona_catalog::Error::Argument(value)),
        None => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let mut config = ScrapeConfig::load(Path::new(CONFIG_FILE))?;
    let mut args = env::args().skip(1);
    config.start_page = page_arg(args.next(), config.start_page)?;
    config.end_page = page_arg(args.next(), config.end_page)?;

    let records = scrape(&config).await?;
    println!(
        "\nComplete! Scraped {} products from pages {}..={}.",
        records.len(),
        config.start_page,
        config.end_page
    );
    println!("Table written to {}", config.output_path.display());
    println!("Run `cargo run --bin fetch-images` to download the images.");

    Ok(())
}
