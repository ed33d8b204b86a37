//! CLI argument definitions using clap derive macros.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Mirror the file tree behind a directory-index web server.
///
/// Crawls the server's directory listings recursively and, for every file
/// found, records its URL in a manifest and downloads it unless an intact
/// local copy already exists.
#[derive(Parser, Debug)]
#[command(name = "indexmirror")]
#[command(author, version, about)]
pub struct Args {
    /// Root URL of the directory index to mirror (http or https)
    pub url: String,

    /// Record file URLs in the manifest without downloading anything
    #[arg(long)]
    pub manifest_only: bool,

    /// Maximum concurrent crawl/download branches (default: CPU count)
    #[arg(short = 'c', long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Directory to mirror files into
    #[arg(short = 'o', long, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Path of the URL manifest file (created fresh each run)
    #[arg(short = 'm', long, default_value = "urls.txt")]
    pub manifest: PathBuf,

    /// Listing backend to use against the index server
    #[arg(long, value_enum, default_value = "json")]
    pub listing: ListingBackend,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Which directory-listing backend to speak to the index server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingBackend {
    /// Structured JSON API exchange
    Json,
    /// Extraction from the rendered fallback listing table
    Html,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["indexmirror", "http://example.com/docs/"]).unwrap();
        assert_eq!(args.url, "http://example.com/docs/");
        assert!(!args.manifest_only);
        assert_eq!(args.concurrency, None);
        assert_eq!(args.output_dir, PathBuf::from("downloads"));
        assert_eq!(args.manifest, PathBuf::from("urls.txt"));
        assert_eq!(args.listing, ListingBackend::Json);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_requires_a_url() {
        let result = Args::try_parse_from(["indexmirror"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_manifest_only_flag() {
        let args =
            Args::try_parse_from(["indexmirror", "--manifest-only", "http://example.com/"])
                .unwrap();
        assert!(args.manifest_only);
    }

    #[test]
    fn test_cli_concurrency_flag() {
        let args =
            Args::try_parse_from(["indexmirror", "-c", "8", "http://example.com/"]).unwrap();
        assert_eq!(args.concurrency.map(NonZeroUsize::get), Some(8));
    }

    #[test]
    fn test_cli_concurrency_rejects_zero() {
        let result = Args::try_parse_from(["indexmirror", "-c", "0", "http://example.com/"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_listing_backend_selection() {
        let args =
            Args::try_parse_from(["indexmirror", "--listing", "html", "http://example.com/"])
                .unwrap();
        assert_eq!(args.listing, ListingBackend::Html);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["indexmirror", "-vv", "http://example.com/"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result =
            Args::try_parse_from(["indexmirror", "--invalid-flag", "http://example.com/"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
