//! Ingestion driver
//!
//! Both ingestion pathways, local text files and crawled pages, share one
//! contract: tokenise the document, assign consecutive 1-based positions
//! across the whole document, and insert under its location. In threaded
//! mode every task builds a private local index and merges it into the
//! shared index exactly once, keeping the write-side critical section
//! proportional to the task's own output.

use crate::index::{ConcurrentIndex, InvertedIndex};
use crate::queue::WorkQueue;
use crate::text;
use crate::{QuerymillError, Result};
use rust_stemmers::{Algorithm, Stemmer};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Indexes one text file into the given index.
///
/// The file is streamed line by line; positions continue across lines, so
/// the final word count of the location equals the number of stemmed tokens
/// in the whole file. A token whose stem is empty is skipped without
/// consuming a position.
pub fn index_file(index: &mut InvertedIndex, path: &Path) -> Result<()> {
    let location = path.to_string_lossy().to_string();
    let file = File::open(path).map_err(|source| QuerymillError::Input {
        path: path.to_path_buf(),
        source,
    })?;

    let stemmer = Stemmer::create(Algorithm::English);
    let mut position = 0;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| QuerymillError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        index_line(index, &stemmer, &line, &location, &mut position);
    }

    Ok(())
}

/// Indexes in-memory text (a cleaned HTML page) under the given location
pub fn index_text(index: &mut InvertedIndex, content: &str, location: &str) {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut position = 0;

    for line in content.lines() {
        index_line(index, &stemmer, line, location, &mut position);
    }
}

/// Stems one line and inserts its tokens at consecutive positions
fn index_line(
    index: &mut InvertedIndex,
    stemmer: &Stemmer,
    line: &str,
    location: &str,
    position: &mut usize,
) {
    for token in text::parse(line) {
        let stem = stemmer.stem(&token);
        if !stem.is_empty() {
            *position += 1;
            index.insert(&stem, location, *position);
        }
    }
}

/// Sequentially indexes a file, or every text file under a directory,
/// straight into the given index.
pub fn process_path(path: &Path, index: &mut InvertedIndex) -> Result<()> {
    for file in text::list_text_files(path)? {
        index_file(index, &file)?;
    }
    Ok(())
}

/// Indexes a file or directory on the worker pool.
///
/// One task per file: each builds a private local index and merges it once.
/// Per-file failures are logged and do not abort the stage; the call returns
/// after the queue reaches quiescence.
///
/// # Arguments
///
/// * `path` - a text file, or a directory to walk for `.txt`/`.text` files
/// * `index` - the shared index the per-file sub-indexes are merged into
/// * `queue` - the worker pool the file tasks run on
pub fn process_path_threaded(
    path: &Path,
    index: &Arc<ConcurrentIndex>,
    queue: &Arc<WorkQueue>,
) -> Result<()> {
    for file in text::list_text_files(path)? {
        let index = Arc::clone(index);
        queue.execute(move || {
            let mut local = InvertedIndex::new();
            match index_file(&mut local, &file) {
                Ok(()) => index.merge(local),
                Err(e) => tracing::error!("failed to index {}: {}", file.display(), e),
            }
        });
    }

    queue.finish();
    Ok(())
}
