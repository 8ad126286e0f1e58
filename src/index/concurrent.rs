//! Thread-safe wrapper around the inverted index
//!
//! Readers share the index; `insert` and `merge` exclude everyone else. The
//! wrapper composes the plain index with a `std::sync::RwLock` rather than
//! re-implementing it, so the search and merge algorithms stay lock-agnostic.
//! Every accessor returns an owned snapshot because the guard is released on
//! return.

use super::{InvertedIndex, SearchResult};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Multi-reader / single-writer inverted index
#[derive(Debug, Default)]
pub struct ConcurrentIndex {
    inner: RwLock<InvertedIndex>,
}

impl ConcurrentIndex {
    /// Creates an empty thread-safe index
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the read side. A poisoned lock is recovered: a panicked
    /// worker task must not take the index down with it.
    fn read(&self) -> RwLockReadGuard<'_, InvertedIndex> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the write side, recovering from poisoning like [`read`](Self::read)
    fn write(&self) -> RwLockWriteGuard<'_, InvertedIndex> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a single occurrence under the write lock
    pub fn insert(&self, word: &str, location: &str, position: usize) {
        self.write().insert(word, location, position);
    }

    /// Merges a local sub-index under the write lock.
    ///
    /// This is the only bulk write path; keeping the critical section
    /// proportional to the sub-index keeps writers short-lived.
    pub fn merge(&self, other: InvertedIndex) {
        self.write().merge(other);
    }

    /// Runs an exact or partial search under the read lock
    pub fn search(&self, queries: &BTreeSet<String>, partial: bool) -> Vec<SearchResult> {
        self.read().search(queries, partial)
    }

    /// Exact search under the read lock
    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read().exact_search(queries)
    }

    /// Partial (prefix) search under the read lock
    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read().partial_search(queries)
    }

    /// Returns true if the word appears in the index
    pub fn contains_word(&self, word: &str) -> bool {
        self.read().contains_word(word)
    }

    /// Returns true if the word appears at the location
    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.read().contains_location(word, location)
    }

    /// Returns true if the word appears at the location and position
    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.read().contains_position(word, location, position)
    }

    /// Returns true if a word count is known for the location
    pub fn contains_count(&self, location: &str) -> bool {
        self.read().contains_count(location)
    }

    /// Number of unique words in the index
    pub fn num_unique_words(&self) -> usize {
        self.read().num_unique_words()
    }

    /// Number of locations with a word count
    pub fn num_counts(&self) -> usize {
        self.read().num_counts()
    }

    /// Number of locations a word occurs in
    pub fn num_locations(&self, word: &str) -> usize {
        self.read().num_locations(word)
    }

    /// Number of positions a word occurs at in a location
    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.read().num_positions(word, location)
    }

    /// Word count of a location, or 0 if unknown
    pub fn word_count(&self, location: &str) -> usize {
        self.read().word_count(location)
    }

    /// Snapshot of the positions of a word in a location
    pub fn positions(&self, word: &str, location: &str) -> BTreeSet<usize> {
        self.read().positions(word, location)
    }

    /// Snapshot of the locations a word occurs in
    pub fn locations(&self, word: &str) -> Vec<String> {
        self.read().locations(word)
    }

    /// Snapshot of all words in the index
    pub fn words(&self) -> Vec<String> {
        self.read().words()
    }

    /// Snapshot of the location → word count mapping
    pub fn word_counts(&self) -> BTreeMap<String, usize> {
        self.read().word_counts()
    }

    /// Writes the index as pretty JSON under the read lock
    pub fn write_json<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.read().write_json(writer)
    }

    /// Writes the index as pretty JSON to a file under the read lock
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        self.read().write_json_file(path)
    }

    /// Writes the word counts as pretty JSON under the read lock
    pub fn write_counts_json<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.read().write_counts_json(writer)
    }

    /// Writes the word counts as pretty JSON to a file under the read lock
    pub fn write_counts_json_file(&self, path: &Path) -> Result<()> {
        self.read().write_counts_json_file(path)
    }
}
