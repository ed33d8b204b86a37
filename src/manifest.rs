//! Append-only log of every file URL the crawl visits.
//!
//! The manifest is written regardless of whether files are actually
//! downloaded, so a manifest-only run is a complete record of the remote
//! tree's files. Appends from concurrent branches are serialized by a
//! mutex so each record is one complete line.

use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Concurrency-safe, append-only URL log backed by a file.
#[derive(Debug, Clone)]
pub struct UrlManifest {
    file: Arc<Mutex<File>>,
}

impl UrlManifest {
    /// Creates (truncating) the manifest file.
    ///
    /// This is the only crawl dependency whose failure is fatal; callers
    /// abort before any crawling begins.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be created.
    pub async fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path).await?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Appends one URL as a newline-terminated line.
    ///
    /// Best-effort: a write failure is logged and swallowed so it never
    /// aborts the branch that reported the URL.
    pub async fn record(&self, url: &str) {
        let mut line = String::with_capacity(url.len() + 1);
        line.push_str(url);
        line.push('\n');

        let mut file = self.file.lock().await;
        if let Err(error) = file.write_all(line.as_bytes()).await {
            warn!(url = %url, error = %error, "failed to record url in manifest");
            return;
        }
        if let Err(error) = file.flush().await {
            warn!(url = %url, error = %error, "failed to flush manifest");
        }
    }
}
