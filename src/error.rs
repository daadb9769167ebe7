use std::path::PathBuf;

/// Errors raised while scraping the catalog or handling its output.
///
/// Most of these never reach a caller: element timeouts become absent
/// fields, page failures become logged skips. What does surface is session
/// acquisition, configuration loading and writing the result table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("webdriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("timed out waiting for `{0}`")]
    Timeout(String),

    #[error("element not found: `{0}`")]
    ElementNotFound(String),

    #[error("attribute `{attr}` missing on `{selector}`")]
    MissingAttribute { selector: String, attr: String },

    #[error("browser session already closed")]
    SessionClosed,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid argument `{0}`")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
