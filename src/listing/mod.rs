//! Directory-listing backends for index servers.
//!
//! A listing backend answers one question: given a directory location,
//! what are its immediate entries? Two interchangeable backends exist
//! behind the [`DirectoryLister`] trait:
//!
//! - [`JsonIndexLister`] - a structured request/response exchange with the
//!   index server's JSON API
//! - [`HtmlIndexLister`] - extraction from the server's rendered fallback
//!   listing table
//!
//! The backends are deliberately dumb row-to-entry translators; filtering
//! of parent links, directory self-echoes, and escaping paths is the
//! crawler's job.

mod html;
mod json;

use async_trait::async_trait;
use thiserror::Error;

pub use html::HtmlIndexLister;
pub use json::JsonIndexLister;

/// Classification of one listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A downloadable file.
    File,
    /// A sub-directory to recurse into.
    Directory,
    /// A link back to the parent directory; always discarded.
    Parent,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Server-relative path, percent-encoded as the server reported it.
    pub href: String,
    /// Entry classification.
    pub kind: EntryKind,
    /// Remote size in bytes, when the backend can report it exactly.
    ///
    /// Authoritative for integrity checks; entries without a size are
    /// always re-downloaded.
    pub size: Option<u64>,
    /// Modification time as reported by the backend (epoch milliseconds),
    /// when available.
    pub modified: Option<u64>,
}

/// Errors from listing a single directory.
///
/// A listing failure aborts that directory's traversal only.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Network-level error reaching the index server.
    #[error("network error listing {url}: {source}")]
    Network {
        /// The listing URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response from the index server.
    #[error("HTTP {status} listing {url}")]
    Status {
        /// The listing URL that failed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The listing body could not be decoded.
    #[error("failed to decode listing from {url}: {source}")]
    Decode {
        /// The listing URL that failed.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

impl ListingError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }
}

/// Lists the immediate entries of one directory.
///
/// Backends are shared across branches behind `Arc<dyn DirectoryLister>`;
/// async-trait is required for object-safe dyn dispatch.
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// Returns the entries of `dir`, one level deep.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] if the listing request or decoding fails.
    async fn list(&self, dir: &str) -> Result<Vec<Entry>, ListingError>;
}
