//! Error types for the download module.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors that can occur while fetching a single file.
///
/// Every variant aborts one entry only; nothing here is fatal to the crawl.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create directories/file, write, remove).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A remote path component could not be percent-decoded.
    #[error("malformed path encoding in {href}: {source}")]
    PathDecode {
        /// The remote href that failed to decode.
        href: String,
        /// The underlying decode error.
        #[source]
        source: FromUtf8Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a path decode error.
    pub fn path_decode(href: impl Into<String>, source: FromUtf8Error) -> Self {
        Self::PathDecode {
            href: href.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_error_message_includes_code_and_url() {
        let error = DownloadError::http_status("https://example.com/f.bin", 503);
        let message = error.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("https://example.com/f.bin"));
    }

    #[test]
    fn test_io_error_preserves_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = DownloadError::io("/tmp/x", source);
        assert!(std::error::Error::source(&error).is_some());
    }
}
