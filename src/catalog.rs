//! Category page walker.
//!
//! For each page number: open the page, get past the postal-code prompt,
//! read the category title, then pull one [`ProductRecord`] out of every
//! product tile. A page that fails is logged and skipped; a field that fails
//! is left `None`.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    config::ScrapeConfig,
    error::{Error, Result},
    model::{ProductRecord, ScrapeRange},
    page::Page,
};

/// CSS selectors for the storefront's markup.
pub mod selectors {
    pub const POSTAL_CODE_INPUT: &str = "input.ym-hide-content";
    pub const POSTAL_CODE_SUBMIT: &str = "button[data-testid='postal-code-checker-button']";
    pub const CATEGORY_TITLE: &str = ".category-detail__title.title1-b";
    pub const PRODUCT_ENTRY: &str = ".product-cell__content-link";

    pub const NAME: &str = ".subhead1-r.product-cell__description-name";
    pub const SUBTITLE: &str = ".product-format.product-format__size--cell";
    pub const PRICE: &str = ".product-price__unit-price.subhead1-b";
    pub const DISCOUNT_PRICE: &str = ".product-price__unit-price--discount";
    pub const MAIN_IMAGE: &str = ".product-cell__image-wrapper img";

    pub const GALLERY_THUMBNAIL: &str = ".product-gallery__thumbnail";
    pub const GALLERY_IMAGE: &str = ".product-gallery__image img";
    pub const DETAIL_CLOSE: &str = "button[data-testid='modal-close-button']";
}

/// How a field is read once its element is found.
#[derive(Debug, Clone, Copy)]
enum Read {
    Text,
    Attr(&'static str),
}

/// A field inside a product tile.
#[derive(Debug, Clone, Copy)]
struct FieldLocator {
    css: &'static str,
    read: Read,
}

impl FieldLocator {
    const fn text(css: &'static str) -> Self {
        Self {
            css,
            read: Read::Text,
        }
    }

    const fn attr(css: &'static str, name: &'static str) -> Self {
        Self {
            css,
            read: Read::Attr(name),
        }
    }
}

const NAME: FieldLocator = FieldLocator::text(selectors::NAME);
const SUBTITLE: FieldLocator = FieldLocator::text(selectors::SUBTITLE);
const PRICE: FieldLocator = FieldLocator::text(selectors::PRICE);
const DISCOUNT_PRICE: FieldLocator = FieldLocator::text(selectors::DISCOUNT_PRICE);
const MAIN_IMAGE: FieldLocator = FieldLocator::attr(selectors::MAIN_IMAGE, "src");

/// Walks a range of category pages over one browser session.
pub struct CatalogScraper<P: Page> {
    page: P,
    config: ScrapeConfig,
}

impl<P: Page> CatalogScraper<P> {
    pub fn new(page: P, config: ScrapeConfig) -> Self {
        Self { page, config }
    }

    /// Scrapes every page in `range` and releases the session.
    ///
    /// Records come back in visiting order: page by page, and within a page
    /// in the order the tiles appear. Never fails; broken pages are skipped.
    pub async fn run(self, range: ScrapeRange) -> Vec<ProductRecord> {
        let mut records = Vec::new();

        for page_num in range.pages() {
            let before = records.len();
            match self.scrape_page(page_num, &mut records).await {
                Ok(category) => info!(
                    page = page_num,
                    category = %category,
                    products = records.len() - before,
                    "scraped category page"
                ),
                Err(e) => warn!(page = page_num, error = %e, "skipping category page"),
            }
        }

        if let Err(e) = self.page.close().await {
            warn!(error = %e, "failed to close browser session");
        }
        records
    }

    /// Visits one page and appends its products. Records pushed before a
    /// failure stay in `records`.
    async fn scrape_page(&self, page_num: u32, records: &mut Vec<ProductRecord>) -> Result<String> {
        let url = self.config.page_url(page_num);
        debug!(page = page_num, url = %url, "opening category page");
        self.page.goto(&url).await?;

        self.submit_postal_code().await;

        let title = self
            .page
            .wait_for(selectors::CATEGORY_TITLE, self.timeout())
            .await?;
        let category = self.page.text(&title).await?;

        let entries = self
            .page
            .wait_for_all(selectors::PRODUCT_ENTRY, self.timeout())
            .await?;

        for entry in &entries {
            let record = self.extract_product(&category, entry).await;
            records.push(record);
        }

        Ok(category)
    }

    /// Fills in the location prompt when the page shows one.
    async fn submit_postal_code(&self) {
        let result: Result<()> = async {
            let input = self
                .page
                .wait_for(selectors::POSTAL_CODE_INPUT, self.timeout())
                .await?;
            self.page.send_keys(&input, &self.config.postal_code).await?;
            let submit = self
                .page
                .wait_for(selectors::POSTAL_CODE_SUBMIT, self.timeout())
                .await?;
            self.page.click(&submit).await
        }
        .await;

        if let Err(e) = result {
            debug!(error = %e, "no postal code prompt");
        }
    }

    async fn extract_product(&self, category: &str, entry: &P::Element) -> ProductRecord {
        let mut record = ProductRecord::new(category);
        record.name = self.field(entry, NAME).await;
        record.subtitle = self.field(entry, SUBTITLE).await;
        record.price = self.field(entry, PRICE).await;
        record.discount_price = self.field(entry, DISCOUNT_PRICE).await;
        record.main_image_url = self.field(entry, MAIN_IMAGE).await;

        if self.config.secondary_images {
            record.secondary_image_url = self.secondary_image(entry).await;
        }
        record
    }

    /// Reads one field of a tile. Any failure yields `None`.
    async fn field(&self, entry: &P::Element, locator: FieldLocator) -> Option<String> {
        match self.read_field(entry, locator).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(selector = locator.css, error = %e, "field absent");
                None
            }
        }
    }

    async fn read_field(&self, entry: &P::Element, locator: FieldLocator) -> Result<String> {
        let element = self.page.find_in(entry, locator.css).await?;
        match locator.read {
            Read::Text => self.page.text(&element).await,
            Read::Attr(name) => self.read_attr(&element, locator.css, name).await,
        }
    }

    async fn read_attr(&self, element: &P::Element, css: &str, name: &str) -> Result<String> {
        self.page
            .attr(element, name)
            .await?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::MissingAttribute {
                selector: css.to_string(),
                attr: name.to_string(),
            })
    }

    /// Opens the detail view, reads the second gallery image, closes it.
    ///
    /// The view is closed whenever the click went through, so the next tile
    /// is never covered by a stale overlay.
    async fn secondary_image(&self, entry: &P::Element) -> Option<String> {
        if let Err(e) = self.page.click(entry).await {
            debug!(error = %e, "could not open detail view");
            return None;
        }

        let image = self.read_gallery_image().await;
        self.close_detail().await;

        match image {
            Ok(src) => Some(src),
            Err(e) => {
                debug!(error = %e, "secondary image absent");
                None
            }
        }
    }

    async fn read_gallery_image(&self) -> Result<String> {
        let thumbnails = self
            .page
            .wait_for_all(selectors::GALLERY_THUMBNAIL, self.timeout())
            .await?;
        let second = thumbnails
            .get(1)
            .ok_or_else(|| Error::ElementNotFound(format!("{}[1]", selectors::GALLERY_THUMBNAIL)))?;
        self.page.click(second).await?;

        let image = self
            .page
            .wait_for(selectors::GALLERY_IMAGE, self.timeout())
            .await?;
        self.read_attr(&image, selectors::GALLERY_IMAGE, "src").await
    }

    async fn close_detail(&self) {
        let closed: Result<()> = async {
            let button = self
                .page
                .wait_for(selectors::DETAIL_CLOSE, self.timeout())
                .await?;
            self.page.click(&button).await
        }
        .await;

        if let Err(e) = closed {
            warn!(error = %e, "detail view close failed, navigating back");
            if let Err(e) = self.page.back().await {
                warn!(error = %e, "could not leave detail view");
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.config.wait_timeout()
    }
}
