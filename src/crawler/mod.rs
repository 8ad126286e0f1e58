//! Web crawler module
//!
//! A bounded breadth-first crawl seeded at a single URL:
//! - HTTP fetching with bounded redirects ([`fetcher`])
//! - link extraction and tag stripping ([`clean`])
//! - URL normalisation ([`urls`])
//! - the shared-visited-set BFS that feeds pages to the indexer
//!
//! The crawl limit bounds the number of distinct URLs ever enqueued, not the
//! traversal depth. Each crawl task fetches one page, enqueues its unseen
//! links while capacity remains, then indexes the page text through the
//! local-sub-index-and-merge path.

mod clean;
mod fetcher;
mod urls;

pub use clean::{extract_links, strip_tags};
pub use fetcher::{build_http_client, fetch_page};
pub use urls::{normalize_url, UrlError};

use crate::index::{ConcurrentIndex, InvertedIndex};
use crate::ingest;
use crate::queue::WorkQueue;
use crate::{QuerymillError, Result};
use reqwest::blocking::Client;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Crawls up to `limit` distinct pages starting from `seed`, indexing each
/// page's text under its URL.
///
/// The seed is normalised before it is counted against the limit. The call
/// returns after the queue reaches quiescence, at which point every page
/// that will ever be visited has been fetched and merged. A limit of zero is
/// a no-op.
///
/// # Arguments
///
/// * `seed` - the URL the breadth-first crawl starts from
/// * `limit` - maximum number of distinct URLs ever enqueued, seed included
/// * `index` - the shared index pages are merged into
/// * `queue` - the worker pool the crawl tasks run on
///
/// # Returns
///
/// * `Ok(())` - the crawl drained; failed fetches indexed nothing
/// * `Err(QuerymillError)` - the seed was malformed or the client failed to build
pub fn crawl(
    seed: &str,
    limit: usize,
    index: &Arc<ConcurrentIndex>,
    queue: &Arc<WorkQueue>,
) -> Result<()> {
    if limit == 0 {
        return Ok(());
    }

    let seed_url = normalize_url(seed).map_err(|e| QuerymillError::MalformedSeed {
        url: seed.to_string(),
        message: e.to_string(),
    })?;

    let crawler = Arc::new(Crawler {
        index: Arc::clone(index),
        queue: Arc::clone(queue),
        client: build_http_client()?,
        visited: Mutex::new(BTreeSet::new()),
        limit,
    });

    crawler.lock_visited().insert(seed_url.to_string());
    tracing::info!("starting crawl at {} (limit {})", seed_url, limit);

    let task = Arc::clone(&crawler);
    queue.execute(move || task.visit(seed_url));
    queue.finish();

    Ok(())
}

/// Shared state of one crawl run
struct Crawler {
    index: Arc<ConcurrentIndex>,
    queue: Arc<WorkQueue>,
    client: Client,
    /// Every URL ever enqueued, seed included; bounded by `limit`
    visited: Mutex<BTreeSet<String>>,
    limit: usize,
}

impl Crawler {
    fn lock_visited(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches one page, schedules its unseen links, and indexes its text.
    ///
    /// The visited lock is held only for the enqueue decisions and is
    /// released before any tokenising or index locking.
    fn visit(self: Arc<Self>, url: Url) {
        let html = fetch_page(&self.client, &url);
        let links = extract_links(&html, &url);
        let text = strip_tags(&html);

        {
            let mut visited = self.lock_visited();
            for link in links {
                if visited.len() >= self.limit {
                    break;
                }
                if visited.insert(link.to_string()) {
                    let task = Arc::clone(&self);
                    self.queue.execute(move || task.visit(link));
                }
            }
        }

        let mut local = InvertedIndex::new();
        ingest::index_text(&mut local, &text, url.as_str());
        self.index.merge(local);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_a_noop() {
        let index = Arc::new(ConcurrentIndex::new());
        let queue = Arc::new(WorkQueue::new(1));
        crawl("https://example.com/", 0, &index, &queue).unwrap();
        assert_eq!(index.num_unique_words(), 0);
    }

    #[test]
    fn test_malformed_seed_is_an_error() {
        let index = Arc::new(ConcurrentIndex::new());
        let queue = Arc::new(WorkQueue::new(1));
        let result = crawl("not a url", 1, &index, &queue);
        assert!(matches!(result, Err(QuerymillError::MalformedSeed { .. })));
    }

    #[test]
    fn test_non_http_seed_is_an_error() {
        let index = Arc::new(ConcurrentIndex::new());
        let queue = Arc::new(WorkQueue::new(1));
        let result = crawl("ftp://example.com/", 1, &index, &queue);
        assert!(matches!(result, Err(QuerymillError::MalformedSeed { .. })));
    }

    #[test]
    fn test_unreachable_seed_indexes_nothing_but_completes() {
        let index = Arc::new(ConcurrentIndex::new());
        let queue = Arc::new(WorkQueue::new(2));
        // Nothing listens on the discard port; the fetch fails, the task
        // still runs over empty content, and the crawl drains cleanly.
        crawl("http://127.0.0.1:9/", 2, &index, &queue).unwrap();
        assert_eq!(index.num_unique_words(), 0);
        assert_eq!(queue.pending(), 0);
    }
}
