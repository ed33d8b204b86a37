//! Local artifact path derivation from remote hrefs.

use std::path::{Path, PathBuf};

use super::error::DownloadError;

/// Derives the local path for a remote href under the output root.
///
/// Each `/`-separated component is percent-decoded and whitespace-trimmed;
/// empty components are dropped, so `/docs//a%20b.txt` and `/docs/a b.txt`
/// land on the same artifact. Dot components are dropped as well, which
/// keeps every artifact under the output root.
///
/// # Errors
///
/// Returns [`DownloadError::PathDecode`] if a component's percent-encoding
/// does not decode to valid UTF-8.
pub fn artifact_path(root: &Path, href: &str) -> Result<PathBuf, DownloadError> {
    let mut path = root.to_path_buf();
    for component in href.split('/') {
        let decoded = urlencoding::decode(component)
            .map_err(|error| DownloadError::path_decode(href, error))?;
        let trimmed = decoded.trim();
        if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
            continue;
        }
        path.push(trimmed);
    }
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn derive(href: &str) -> PathBuf {
        artifact_path(Path::new("downloads"), href).unwrap()
    }

    #[test]
    fn test_joins_components_under_root() {
        assert_eq!(derive("/docs/sub/a.txt"), Path::new("downloads/docs/sub/a.txt"));
    }

    #[test]
    fn test_decodes_percent_sequences() {
        assert_eq!(derive("/docs/a%20b.txt"), Path::new("downloads/docs/a b.txt"));
    }

    #[test]
    fn test_trims_component_whitespace() {
        assert_eq!(derive("/docs/%20a.txt%20"), Path::new("downloads/docs/a.txt"));
    }

    #[test]
    fn test_drops_empty_components() {
        assert_eq!(derive("//docs///a.txt"), Path::new("downloads/docs/a.txt"));
    }

    #[test]
    fn test_dot_components_stay_under_root() {
        assert_eq!(derive("/docs/../a.txt"), Path::new("downloads/docs/a.txt"));
        assert_eq!(derive("/./a.txt"), Path::new("downloads/a.txt"));
    }

    #[test]
    fn test_malformed_encoding_is_rejected() {
        let result = artifact_path(Path::new("downloads"), "/docs/%FF.txt");
        assert!(matches!(result, Err(DownloadError::PathDecode { .. })));
    }
}
