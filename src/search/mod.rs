//! Query processing
//!
//! Reads a query file one line at a time, reduces each line to its canonical
//! form (unique stems, sorted, space-joined), and runs at most one search
//! per canonical query. Results are held in an ordered map keyed by the
//! canonical query so the JSON output is deterministic regardless of task
//! scheduling.

use crate::index::{ConcurrentIndex, InvertedIndex, SearchResult};
use crate::output;
use crate::queue::WorkQueue;
use crate::text;
use crate::{QuerymillError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Canonical form of a query line: unique stems in sorted order, joined by
/// single spaces. Empty when the line has no stems.
fn canonical_key(line: &str) -> (std::collections::BTreeSet<String>, String) {
    let stems = text::unique_stems(line);
    let key = stems
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    (stems, key)
}

/// Common interface of the sequential and threaded query processors
pub trait QueryProcessor {
    /// Stems one query line and runs the search for it, unless the line is
    /// empty or its canonical query has already been searched.
    fn parse_query_line(&mut self, line: &str);

    /// Returns true if this processor runs prefix searches
    fn is_partial(&self) -> bool;

    /// Returns the stored results for the line's canonical query, if any
    fn stored_results(&self, line: &str) -> Option<Vec<SearchResult>>;

    /// Canonical queries with stored results, in sorted order
    fn query_lines(&self) -> Vec<String>;

    /// Writes the query results as pretty JSON
    fn write_json(&self, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Writes the query results as pretty JSON to a file
    fn write_json_file(&self, path: &Path) -> Result<()>;

    /// Reads the query file line by line, parsing each line
    fn process_query_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|source| QuerymillError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| QuerymillError::Input {
                path: path.to_path_buf(),
                source,
            })?;
            self.parse_query_line(&line);
        }
        Ok(())
    }
}

/// Sequential query processor over a plain index
pub struct SearchProcessor<'a> {
    /// The index searched against
    index: &'a InvertedIndex,
    /// Prefix search when true, exact otherwise
    partial: bool,
    /// canonical query → ranked results
    results: BTreeMap<String, Vec<SearchResult>>,
}

impl<'a> SearchProcessor<'a> {
    /// Creates a processor that searches the given index
    pub fn new(index: &'a InvertedIndex, partial: bool) -> Self {
        Self {
            index,
            partial,
            results: BTreeMap::new(),
        }
    }
}

impl QueryProcessor for SearchProcessor<'_> {
    fn parse_query_line(&mut self, line: &str) {
        let (stems, key) = canonical_key(line);
        if stems.is_empty() || self.results.contains_key(&key) {
            return;
        }
        let found = self.index.search(&stems, self.partial);
        self.results.insert(key, found);
    }

    fn is_partial(&self) -> bool {
        self.partial
    }

    fn stored_results(&self, line: &str) -> Option<Vec<SearchResult>> {
        let (_, key) = canonical_key(line);
        self.results.get(&key).cloned()
    }

    fn query_lines(&self) -> Vec<String> {
        self.results.keys().cloned().collect()
    }

    fn write_json(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        output::write_results(&self.results, writer)
    }

    fn write_json_file(&self, path: &Path) -> Result<()> {
        output::write_file(path, |writer| output::write_results(&self.results, writer))
    }
}

impl fmt::Display for SearchProcessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&output::results_to_string(&self.results))
    }
}

/// Threaded query processor: one worker task per query line
pub struct ThreadedSearchProcessor {
    /// The shared index searched against
    index: Arc<ConcurrentIndex>,
    /// Prefix search when true, exact otherwise
    partial: bool,
    /// Pool the per-line tasks run on
    queue: Arc<WorkQueue>,
    /// canonical query → ranked results, shared with the tasks
    results: Arc<Mutex<BTreeMap<String, Vec<SearchResult>>>>,
}

impl ThreadedSearchProcessor {
    /// Creates a processor that searches the shared index on the given pool
    pub fn new(index: Arc<ConcurrentIndex>, partial: bool, queue: Arc<WorkQueue>) -> Self {
        Self {
            index,
            partial,
            queue,
            results: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// The per-line work, shared by direct calls and queued tasks.
    ///
    /// The canonical key is checked and reserved under one lock acquisition,
    /// so concurrent tasks for equivalent lines run at most one search; the
    /// reservation is filled in once the search completes.
    fn run_query(
        index: &ConcurrentIndex,
        partial: bool,
        results: &Mutex<BTreeMap<String, Vec<SearchResult>>>,
        line: &str,
    ) {
        let (stems, key) = canonical_key(line);
        if stems.is_empty() {
            return;
        }

        {
            let mut map = results.lock().unwrap_or_else(PoisonError::into_inner);
            if map.contains_key(&key) {
                return;
            }
            map.insert(key.clone(), Vec::new());
        }

        let found = index.search(&stems, partial);
        results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, found);
    }

    fn lock_results(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<SearchResult>>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryProcessor for ThreadedSearchProcessor {
    fn parse_query_line(&mut self, line: &str) {
        Self::run_query(&self.index, self.partial, &self.results, line);
    }

    fn is_partial(&self) -> bool {
        self.partial
    }

    fn stored_results(&self, line: &str) -> Option<Vec<SearchResult>> {
        let (_, key) = canonical_key(line);
        self.lock_results().get(&key).cloned()
    }

    fn query_lines(&self) -> Vec<String> {
        self.lock_results().keys().cloned().collect()
    }

    fn write_json(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        output::write_results(&self.lock_results(), writer)
    }

    fn write_json_file(&self, path: &Path) -> Result<()> {
        let results = self.lock_results();
        output::write_file(path, |writer| output::write_results(&results, writer))
    }

    /// Enqueues one task per line; quiescence is awaited even when reading
    /// fails partway through the file.
    fn process_query_file(&mut self, path: &Path) -> Result<()> {
        let read = (|| -> Result<()> {
            let file = File::open(path).map_err(|source| QuerymillError::Input {
                path: path.to_path_buf(),
                source,
            })?;
            for line in BufReader::new(file).lines() {
                let line = line.map_err(|source| QuerymillError::Input {
                    path: path.to_path_buf(),
                    source,
                })?;

                let index = Arc::clone(&self.index);
                let results = Arc::clone(&self.results);
                let partial = self.partial;
                self.queue.execute(move || {
                    Self::run_query(&index, partial, &results, &line);
                });
            }
            Ok(())
        })();

        self.queue.finish();
        read
    }
}

impl fmt::Display for ThreadedSearchProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&output::results_to_string(&self.lock_results()))
    }
}
