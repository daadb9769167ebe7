use std::{collections::BTreeSet, ops::RangeInclusive};

use serde::Deserialize;

/// One product tile scraped from a category page.
///
/// Only `category` is guaranteed. Every other field is extracted on its own
/// and is `None` when that extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Category")]
    pub category: String,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub price: Option<String>,
    pub discount_price: Option<String>,
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub secondary_image_url: Option<String>,
}

impl ProductRecord {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Image URLs worth fetching, main first.
    pub fn image_urls(&self) -> impl Iterator<Item = (bool, &str)> {
        [
            (false, self.main_image_url.as_deref()),
            (true, self.secondary_image_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(secondary, url)| url.map(|u| (secondary, u)))
    }
}

/// Inclusive page-number range. `start_page > end_page` visits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeRange {
    pub start_page: u32,
    pub end_page: u32,
}

impl ScrapeRange {
    pub fn new(start_page: u32, end_page: u32) -> Self {
        Self {
            start_page,
            end_page,
        }
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start_page..=self.end_page
    }
}

impl Default for ScrapeRange {
    fn default() -> Self {
        Self::new(0, 300)
    }
}

/// Distinct categories of a result table, sorted.
pub fn categories(records: &[ProductRecord]) -> BTreeSet<&str> {
    records.iter().map(|r| r.category.as_str()).collect()
}
