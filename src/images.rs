//! Post-processing: category folders and product image downloads.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::StatusCode;
use tokio::fs;
use tracing::{debug, warn};

use crate::{error::Result, model::ProductRecord};

const DEFAULT_EXTENSION: &str = "jpg";

/// What happened to a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Written to disk, with the byte count.
    Saved(usize),
    /// No URL to fetch; nothing requested.
    MissingUrl,
    /// Server answered with a non-success status.
    Status(StatusCode),
    /// Connection, timeout, body or write failure.
    Transport,
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Downloads product images. Failures are logged and reported, never raised.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetches `url` with a single GET and writes the body to `destination`.
    pub async fn download(&self, url: Option<&str>, destination: &Path) -> DownloadOutcome {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            warn!(path = %destination.display(), "no image url, skipping");
            return DownloadOutcome::MissingUrl;
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "image request failed");
                return DownloadOutcome::Transport;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "image request rejected");
            return DownloadOutcome::Status(status);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url, error = %e, "image body failed");
                return DownloadOutcome::Transport;
            }
        };

        if let Err(e) = fs::write(destination, &bytes).await {
            warn!(url, path = %destination.display(), error = %e, "could not write image");
            return DownloadOutcome::Transport;
        }

        debug!(url, path = %destination.display(), bytes = bytes.len(), "saved image");
        DownloadOutcome::Saved(bytes.len())
    }
}

/// Folder name for a category. Path separators would split it into nested
/// directories, so they are replaced.
pub fn category_folder(category: &str) -> String {
    category.replace(['/', '\\'], "-")
}

/// Every distinct category of `records` mapped to `{base}/{category}`.
pub fn category_dirs(records: &[ProductRecord], base: &Path) -> BTreeMap<String, PathBuf> {
    crate::model::categories(records)
        .into_iter()
        .map(|category| (category.to_string(), base.join(category_folder(category))))
        .collect()
}

/// Ensures `{base}/{category}` exists for every category.
///
/// Existing directories are left alone; an existing non-directory is logged
/// and skipped. A failure for one category is logged and the rest still get
/// their folder. Returns how many were created.
pub async fn prepare_folders<'a, I>(categories: I, base: &Path) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut created = 0;
    for category in categories {
        let dir = base.join(category_folder(category));
        if let Ok(meta) = fs::metadata(&dir).await {
            if !meta.is_dir() {
                warn!(path = %dir.display(), "category folder path exists but is not a directory");
            }
            continue;
        }
        match fs::create_dir_all(&dir).await {
            Ok(()) => created += 1,
            Err(e) => warn!(path = %dir.display(), error = %e, "could not create category folder"),
        }
    }
    created
}

/// Where the image of table row `row` goes:
/// `{base}/{category}/{row:05}-{name}[-2].{ext}`.
pub fn image_path(
    base: &Path,
    record: &ProductRecord,
    row: usize,
    url: &str,
    secondary: bool,
) -> PathBuf {
    let name = record.name.as_deref().map(slug).unwrap_or_default();
    let stem = match (name.is_empty(), secondary) {
        (true, false) => format!("{row:05}"),
        (true, true) => format!("{row:05}-2"),
        (false, false) => format!("{row:05}-{name}"),
        (false, true) => format!("{row:05}-{name}-2"),
    };
    let ext = url_extension(url).unwrap_or(DEFAULT_EXTENSION);

    base.join(category_folder(&record.category))
        .join(format!("{stem}.{ext}"))
}

/// File extension of a URL path, ignoring query string and fragment.
/// The host never counts as a file name.
pub fn url_extension(url: &str) -> Option<&str> {
    let url = url.split('?').next().unwrap_or(url);
    let url = url.split('#').next().unwrap_or(url);
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/')?.1,
        None => url,
    };
    let file = path.rsplit('/').next()?;

    let (_, ext) = file.rsplit_once('.')?;
    let valid =
        !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// Lowercase file name fragment; runs of other characters collapse to `_`.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
