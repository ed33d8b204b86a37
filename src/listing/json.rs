//! JSON API listing backend.
//!
//! Speaks the index server's structured API: a POST to the server root
//! identifying the directory and a traversal depth of one level, answered
//! with an item array carrying path, size, and modification time. Sizes
//! are exact byte counts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{DirectoryLister, Entry, EntryKind, ListingError};
use crate::download::HttpClient;

/// Lister backed by the index server's JSON API.
#[derive(Debug, Clone)]
pub struct JsonIndexLister {
    http: HttpClient,
    host: Url,
}

impl JsonIndexLister {
    /// Creates a lister posting to `host` (the index URL with path cleared).
    #[must_use]
    pub fn new(http: HttpClient, host: Url) -> Self {
        Self { http, host }
    }
}

#[derive(Debug, Serialize)]
struct IndexRequest<'a> {
    action: &'static str,
    items: RequestItems<'a>,
}

#[derive(Debug, Serialize)]
struct RequestItems<'a> {
    href: &'a str,
    what: u8,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(default)]
    items: Vec<IndexRow>,
}

#[derive(Debug, Deserialize)]
struct IndexRow {
    href: String,
    #[serde(default)]
    time: Option<u64>,
    #[serde(default)]
    size: Option<i64>,
}

impl IndexRow {
    /// Maps one API row to an entry.
    ///
    /// The API marks directories with a trailing slash and reports sizes
    /// as byte counts; negative placeholder sizes map to unknown. Parent
    /// links are not distinguished here, the crawler's descendant filter
    /// drops them.
    fn into_entry(self) -> Entry {
        let kind = if self.href.ends_with('/') {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size = self.size.and_then(|s| u64::try_from(s).ok());
        Entry {
            href: self.href,
            kind,
            size,
            modified: self.time,
        }
    }
}

#[async_trait]
impl DirectoryLister for JsonIndexLister {
    async fn list(&self, dir: &str) -> Result<Vec<Entry>, ListingError> {
        let request = IndexRequest {
            action: "get",
            items: RequestItems { href: dir, what: 1 },
        };

        let response = self
            .http
            .inner()
            .post(self.host.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ListingError::network(self.host.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::status(self.host.as_str(), status.as_u16()));
        }

        let index: IndexResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                ListingError::decode(self.host.as_str(), e)
            } else {
                ListingError::network(self.host.as_str(), e)
            }
        })?;

        debug!(dir = %dir, entries = index.items.len(), "listed directory");
        Ok(index.items.into_iter().map(IndexRow::into_entry).collect())
    }
}
