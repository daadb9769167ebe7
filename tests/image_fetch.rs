use std::{net::SocketAddr, path::Path, time::Duration};

use axum::Router;
use mercadona_catalog::{DownloadOutcome, ImageFetcher, images::prepare_folders};
use reqwest::StatusCode;
use tower_http::services::ServeDir;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

/// Serves `root` on an ephemeral port and returns its base URL.
async fn serve(root: &Path) -> String {
    let app = Router::new().fallback_service(ServeDir::new(root));
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fetcher() -> ImageFetcher {
    ImageFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_download_writes_body() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("leche.png"), PNG_BYTES).unwrap();
    let base = serve(site.path()).await;

    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("leche.png");
    let url = format!("{base}/leche.png");
    let outcome = fetcher().download(Some(url.as_str()), &dest).await;

    assert_eq!(outcome, DownloadOutcome::Saved(PNG_BYTES.len()));
    assert_eq!(std::fs::read(&dest).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_download_overwrites_existing_file() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("pan.png"), PNG_BYTES).unwrap();
    let base = serve(site.path()).await;

    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("pan.png");
    std::fs::write(&dest, vec![0u8; 4096]).unwrap();

    let url = format!("{base}/pan.png");
    let outcome = fetcher().download(Some(url.as_str()), &dest).await;

    assert!(outcome.is_saved());
    assert_eq!(std::fs::read(&dest).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_download_absent_url_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("none.jpg");

    assert_eq!(fetcher().download(None, &dest).await, DownloadOutcome::MissingUrl);
    assert_eq!(fetcher().download(Some(""), &dest).await, DownloadOutcome::MissingUrl);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_not_found_writes_nothing() {
    let site = tempfile::tempdir().unwrap();
    let base = serve(site.path()).await;

    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("missing.jpg");
    let url = format!("{base}/missing.jpg");
    let outcome = fetcher().download(Some(url.as_str()), &dest).await;

    assert_eq!(outcome, DownloadOutcome::Status(StatusCode::NOT_FOUND));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_connection_refused_is_not_fatal() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("refused.jpg");
    let url = format!("http://{addr}/refused.jpg");
    let outcome = fetcher().download(Some(url.as_str()), &dest).await;

    assert_eq!(outcome, DownloadOutcome::Transport);
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_prepare_folders_is_idempotent() {
    let base = tempfile::tempdir().unwrap();
    let categories = ["Dairy", "Bakery"];

    let created = prepare_folders(categories, base.path()).await;
    assert_eq!(created, 2);
    assert!(base.path().join("Dairy").is_dir());
    assert!(base.path().join("Bakery").is_dir());

    let created = prepare_folders(categories, base.path()).await;
    assert_eq!(created, 0);
}

#[tokio::test]
async fn test_prepare_folders_continues_after_failure() {
    let base = tempfile::tempdir().unwrap();

    // NUL is never valid in a path, so only that category fails.
    let created = prepare_folders(["Frutas", "bad\0name", "Verduras"], base.path()).await;

    assert_eq!(created, 2);
    assert!(base.path().join("Frutas").is_dir());
    assert!(base.path().join("Verduras").is_dir());
}

#[tokio::test]
async fn test_prepare_folders_skips_file_in_the_way() {
    let base = tempfile::tempdir().unwrap();
    let blocker = base.path().join("Dairy");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let created = prepare_folders(["Dairy", "Bakery"], base.path()).await;

    assert_eq!(created, 1);
    assert!(blocker.is_file());
    assert!(base.path().join("Bakery").is_dir());
}
