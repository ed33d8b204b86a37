//! Per-file download with size-based verification.
//!
//! This module provides the [`Downloader`], which handles one discovered
//! file entry at a time: it records the entry's URL in the manifest, checks
//! any existing local artifact against the remote-reported size, and only
//! then streams the body to disk. A local file whose size matches is left
//! untouched with no network call, which is what makes an interrupted run
//! safely re-invokable.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Size-based intact/damaged verification before any fetch
//! - Partial artifacts are deleted on any mid-stream error
//! - Manifest-only mode that records URLs without touching the network

mod client;
mod error;
mod path;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::listing::Entry;
use crate::manifest::UrlManifest;
use crate::stats::CrawlStats;

pub use client::{CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use path::artifact_path;

/// Downloads discovered file entries to local storage.
///
/// Cheap to clone; every crawl branch gets its own handle sharing the
/// pooled HTTP client, the manifest, and the stats counters.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: HttpClient,
    host: Url,
    output_dir: PathBuf,
    manifest: UrlManifest,
    stats: Arc<CrawlStats>,
    manifest_only: bool,
}

impl Downloader {
    /// Creates a downloader writing under `output_dir`.
    ///
    /// `host` is the index server's URL with its path cleared; entry hrefs
    /// are joined onto it to form download URLs. With `manifest_only` set,
    /// [`fetch`](Self::fetch) records URLs and performs no transfers.
    #[must_use]
    pub fn new(
        http: HttpClient,
        host: Url,
        output_dir: PathBuf,
        manifest: UrlManifest,
        stats: Arc<CrawlStats>,
        manifest_only: bool,
    ) -> Self {
        Self {
            http,
            host,
            output_dir,
            manifest,
            stats,
            manifest_only,
        }
    }

    /// Processes one file entry: records its URL, then downloads it unless
    /// an intact local copy exists or manifest-only mode is active.
    ///
    /// Errors are contained here. A failed entry is reported and counted;
    /// it never affects sibling branches.
    #[instrument(skip(self, entry), fields(href = %entry.href))]
    pub async fn fetch(&self, entry: &Entry) {
        let url = self.entry_url(&entry.href);

        self.manifest.record(url.as_str()).await;
        self.stats.increment_recorded();

        if self.manifest_only {
            return;
        }

        if let Err(error) = self.transfer(entry, &url).await {
            warn!(url = %url, error = %error, "download failed");
            self.stats.increment_failed();
        }
    }

    /// Builds the absolute download URL for an entry href.
    fn entry_url(&self, href: &str) -> Url {
        let mut url = self.host.clone();
        url.set_path(href);
        url
    }

    async fn transfer(&self, entry: &Entry, url: &Url) -> Result<(), DownloadError> {
        let local = artifact_path(&self.output_dir, &entry.href)?;

        match fs::metadata(&local).await {
            Ok(meta) if entry.size == Some(meta.len()) => {
                info!(path = %local.display(), bytes = meta.len(), "intact");
                self.stats.increment_intact();
                return Ok(());
            }
            Ok(meta) => {
                // Size mismatch, or remote size unknown: the copy cannot be
                // trusted and is replaced.
                info!(
                    path = %local.display(),
                    local_bytes = meta.len(),
                    remote_bytes = ?entry.size,
                    "damaged"
                );
                fs::remove_file(&local)
                    .await
                    .map_err(|e| DownloadError::io(&local, e))?;
                self.stats.increment_damaged();
            }
            Err(_) => {}
        }

        info!(url = %url, "downloading");
        let response = self.http.get(url).await?;

        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        info!(path = %local.display(), "saving");
        let mut file = File::create(&local)
            .await
            .map_err(|e| DownloadError::io(&local, e))?;

        match stream_to_file(&mut file, response, url, &local).await {
            Ok(bytes) => {
                debug!(path = %local.display(), bytes, "download complete");
                self.stats.increment_downloaded();
                Ok(())
            }
            Err(error) => {
                // A partial artifact must never survive to be mistaken for
                // an intact file by a later run.
                debug!(path = %local.display(), "cleaning up partial file after error");
                let _ = fs::remove_file(&local).await;
                Err(error)
            }
        }
    }
}

/// Streams a response body to an open file chunk-by-chunk.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &Url,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url.as_str(), e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
