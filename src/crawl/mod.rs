//! Recursive traversal of the remote directory tree.
//!
//! The crawler lists one directory, classifies each entry, and routes
//! every resulting branch (sub-directory recursion or file download)
//! through the [`ConcurrencyGate`]. Admitted branches run as their own
//! tokio tasks; refused branches run inline on the caller, so a saturated
//! gate degrades to deep inline recursion on a single logical task rather
//! than unbounded task creation.
//!
//! Everything a branch needs travels in an explicit [`CrawlContext`]
//! rather than ambient state: the gate, the listing backend, the
//! downloader, and the task-handle channel that the orchestrator drains
//! for a structured join.

mod gate;

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::download::Downloader;
use crate::listing::{DirectoryLister, EntryKind};

pub use gate::{Admission, ConcurrencyGate, SlotGuard};

/// Shared state threaded through every crawl and download branch.
pub struct CrawlContext {
    gate: ConcurrencyGate,
    lister: Arc<dyn DirectoryLister>,
    downloader: Downloader,
    tasks: mpsc::UnboundedSender<JoinHandle<()>>,
}

impl CrawlContext {
    /// Assembles a context from its parts.
    ///
    /// Every spawned branch registers its `JoinHandle` on `tasks`; the
    /// matching receiver must be drained (see [`drain_tasks`]) before the
    /// crawl can be considered finished.
    #[must_use]
    pub fn new(
        gate: ConcurrencyGate,
        lister: Arc<dyn DirectoryLister>,
        downloader: Downloader,
        tasks: mpsc::UnboundedSender<JoinHandle<()>>,
    ) -> Self {
        Self {
            gate,
            lister,
            downloader,
            tasks,
        }
    }

    /// Returns the admission gate.
    #[must_use]
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }
}

/// Crawls one directory and everything beneath it.
///
/// Lists the directory, discards parent links and entries that are not
/// proper descendants (self-echoes, escaping paths), then dispatches a
/// branch per remaining entry. A listing failure aborts this directory's
/// traversal only; branches already dispatched are unaffected.
///
/// Returns a boxed future because the recursion would otherwise have an
/// infinite future type.
pub fn crawl(ctx: Arc<CrawlContext>, dir: String) -> BoxFuture<'static, ()> {
    async move {
        debug!(dir = %dir, "listing directory");
        let entries = match ctx.lister.list(&dir).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(dir = %dir, error = %error, "listing failed");
                return;
            }
        };

        for entry in entries {
            if entry.kind == EntryKind::Parent || !is_descendant(&dir, &entry.href) {
                debug!(href = %entry.href, "ignoring entry outside this directory");
                continue;
            }

            if entry.kind == EntryKind::Directory {
                dispatch(&ctx, crawl(Arc::clone(&ctx), entry.href)).await;
            } else {
                let downloader = ctx.downloader.clone();
                dispatch(&ctx, async move { downloader.fetch(&entry).await }).await;
            }
        }
    }
    .boxed()
}

/// Routes one branch through the gate.
///
/// An admitted branch is spawned with its slot guard moved in (released
/// when the task finishes) and its handle registered for the join drain.
/// A refused branch is the named inline path: it runs to completion on
/// the calling task before the next sibling is considered.
async fn dispatch<F>(ctx: &Arc<CrawlContext>, work: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match ctx.gate.admit() {
        Admission::Concurrent(slot) => {
            let handle = tokio::spawn(async move {
                // Slot is released when this task exits (RAII).
                let _slot = slot;
                work.await;
            });
            if ctx.tasks.send(handle).is_err() {
                warn!("task registry closed before crawl finished");
            }
        }
        Admission::Inline => work.await,
    }
}

/// Awaits every task handle registered during a crawl.
///
/// The channel closes once the last context clone (held by still-running
/// branches) drops, so transitively spawned tasks are tracked without any
/// fixed delay. Task panics are reported and do not abort the drain.
pub async fn drain_tasks(mut tasks: mpsc::UnboundedReceiver<JoinHandle<()>>) {
    while let Some(handle) = tasks.recv().await {
        if let Err(error) = handle.await {
            warn!(error = %error, "crawl task panicked");
        }
    }
}

/// Whether `href` is a proper descendant of `dir`.
///
/// Listings may echo the directory itself or point outside it; both are
/// discarded.
fn is_descendant(dir: &str, href: &str) -> bool {
    href != dir && href.starts_with(dir)
}
