//! CLI entry point for the indexmirror tool.

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indexmirror_core::{
    ConcurrencyGate, CrawlContext, CrawlStats, DirectoryLister, Downloader, HtmlIndexLister,
    HttpClient, JsonIndexLister, UrlManifest, crawl, drain_tasks,
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

mod cli;

use cli::{Args, ListingBackend};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let root = Url::parse(&args.url).context("invalid root URL")?;
    if root.scheme() != "http" && root.scheme() != "https" {
        bail!("root URL must use http or https, got {}", root.scheme());
    }

    let root_path = root.path().to_string();
    let mut host = root.clone();
    host.set_path("");

    // The manifest is the only fatal dependency; fail before any crawling.
    let manifest = UrlManifest::create(&args.manifest)
        .await
        .with_context(|| format!("failed to create manifest file {}", args.manifest.display()))?;

    let concurrency = args.concurrency.map_or_else(num_cpus::get, NonZeroUsize::get);

    let http = HttpClient::new();
    let stats = Arc::new(CrawlStats::new());
    let downloader = Downloader::new(
        http.clone(),
        host.clone(),
        args.output_dir.clone(),
        manifest,
        Arc::clone(&stats),
        args.manifest_only,
    );
    let lister: Arc<dyn DirectoryLister> = match args.listing {
        ListingBackend::Json => Arc::new(JsonIndexLister::new(http.clone(), host.clone())),
        ListingBackend::Html => Arc::new(HtmlIndexLister::new(http, host)),
    };

    let (tasks, task_handles) = mpsc::unbounded_channel();
    let ctx = Arc::new(CrawlContext::new(
        ConcurrencyGate::new(concurrency),
        lister,
        downloader,
        tasks,
    ));

    info!(
        root = %root,
        concurrency,
        manifest_only = args.manifest_only,
        output_dir = %args.output_dir.display(),
        "starting crawl"
    );

    crawl(Arc::clone(&ctx), root_path).await;

    // Close our side of the task channel; still-running branches hold
    // their own clones, so the drain below ends only when they all do.
    drop(ctx);
    drain_tasks(task_handles).await;

    info!(
        recorded = stats.recorded(),
        downloaded = stats.downloaded(),
        intact = stats.intact(),
        damaged = stats.damaged(),
        failed = stats.failed(),
        "crawl complete"
    );

    Ok(())
}
