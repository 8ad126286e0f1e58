//! Querymill: a concurrent inverted-index search tool
//!
//! This crate builds an in-memory inverted index over a corpus of text
//! documents, either a local file tree or a bounded web crawl, and answers
//! multi-word queries with ranked document lists. Ingestion, crawling, and
//! query processing all run on a single fixed-size worker pool; the index is
//! shared behind a reader-writer lock, and every ingestion task builds a
//! private sub-index that is merged into the shared one exactly once.

pub mod args;
pub mod crawler;
pub mod index;
pub mod ingest;
pub mod output;
pub mod queue;
pub mod search;
pub mod text;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for querymill operations
#[derive(Debug, Error)]
pub enum QuerymillError {
    #[error("cannot read input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed seed URL {url}: {message}")]
    MalformedSeed { url: String, message: String },

    #[error("cannot write output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for querymill operations
pub type Result<T> = std::result::Result<T, QuerymillError>;

// Re-export commonly used types
pub use args::ArgumentParser;
pub use index::{compare_results, ConcurrentIndex, InvertedIndex, SearchResult};
pub use queue::WorkQueue;
pub use search::{QueryProcessor, SearchProcessor, ThreadedSearchProcessor};
