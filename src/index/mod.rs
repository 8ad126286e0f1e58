//! Inverted index module
//!
//! The authoritative data model: an ordered mapping from stemmed words to
//! the locations they occur in and the 1-based positions of each occurrence,
//! alongside a word count per location. Ordering matters everywhere: the
//! word map must be ordered for partial search to run as a tail-range scan,
//! and the location maps must be ordered for deterministic JSON output.

mod concurrent;

pub use concurrent::ConcurrentIndex;

use crate::output;
use crate::Result;
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// word → location → ascending unique positions
pub(crate) type IndexMap = BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>;

/// A single ranked match for a query: where it matched, how many query-word
/// occurrences were found there, and the normalised score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Document identifier (file path or URL)
    pub location: String,
    /// Total occurrences of the query words at this location
    pub count: usize,
    /// `count / word_count(location)`, in [0, 1]
    pub score: f64,
}

/// Total ordering for search results: score descending, then match count
/// descending, then location ascending ignoring case.
pub fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.location.to_lowercase().cmp(&b.location.to_lowercase()))
}

/// In-memory inverted index with per-location word counts
#[derive(Debug, Default)]
pub struct InvertedIndex {
    /// word → location → positions
    pub(crate) index: IndexMap,
    /// location → largest position recorded (the word count once ingestion
    /// of that location is complete)
    pub(crate) counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `word` occurs at `location`, `position`.
    ///
    /// The word count for the location is raised to `position` if it was
    /// smaller. Positions are 1-based and duplicates are absorbed by the
    /// position set.
    pub fn insert(&mut self, word: &str, location: &str, position: usize) {
        self.index
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);

        let count = self.counts.entry(location.to_string()).or_insert(0);
        *count = (*count).max(position);
    }

    /// Moves everything indexed in `other` into this index.
    ///
    /// Position sets for a `(word, location)` pair present in both are
    /// unioned; word counts take the maximum. The caller guarantees the two
    /// indexes did not ingest the same location, which is what makes the
    /// count maximum meaningful.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (location, count) in other.counts {
            let entry = self.counts.entry(location).or_insert(0);
            *entry = (*entry).max(count);
        }

        for (word, other_locations) in other.index {
            match self.index.entry(word) {
                Entry::Vacant(entry) => {
                    entry.insert(other_locations);
                }
                Entry::Occupied(mut entry) => {
                    let locations = entry.get_mut();
                    for (location, positions) in other_locations {
                        match locations.entry(location) {
                            Entry::Vacant(entry) => {
                                entry.insert(positions);
                            }
                            Entry::Occupied(mut entry) => {
                                entry.get_mut().extend(positions);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Runs an exact or partial search depending on the flag
    pub fn search(&self, queries: &BTreeSet<String>, partial: bool) -> Vec<SearchResult> {
        if partial {
            self.partial_search(queries)
        } else {
            self.exact_search(queries)
        }
    }

    /// Finds the locations containing the query words verbatim.
    ///
    /// Each location contributes at most one result across the whole query;
    /// occurrences of every matched word accumulate into that result.
    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut matches: BTreeMap<&str, usize> = BTreeMap::new();

        for word in queries {
            if let Some(locations) = self.index.get(word) {
                accumulate(locations, &mut matches);
            }
        }

        self.collect_results(matches)
    }

    /// Finds the locations containing any index word that starts with a
    /// query word.
    ///
    /// Scans the ordered word map from the first key ≥ the query word and
    /// stops at the first key that is not prefixed by it; the query word
    /// itself is a prefix match.
    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut matches: BTreeMap<&str, usize> = BTreeMap::new();

        for query in queries {
            for (word, locations) in self.index.range::<String, _>(query.clone()..) {
                if !word.starts_with(query.as_str()) {
                    break;
                }
                accumulate(locations, &mut matches);
            }
        }

        self.collect_results(matches)
    }

    /// Builds sorted results from accumulated per-location match counts
    fn collect_results(&self, matches: BTreeMap<&str, usize>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = matches
            .into_iter()
            .map(|(location, count)| SearchResult {
                location: location.to_string(),
                count,
                score: count as f64 / self.word_count(location) as f64,
            })
            .collect();

        results.sort_by(compare_results);
        results
    }

    /// Returns true if the word appears in the index
    pub fn contains_word(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Returns true if the word appears at the location
    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.index
            .get(word)
            .is_some_and(|locations| locations.contains_key(location))
    }

    /// Returns true if the word appears at the location and position
    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    /// Returns true if a word count is known for the location
    pub fn contains_count(&self, location: &str) -> bool {
        self.counts.contains_key(location)
    }

    /// Number of unique words in the index
    pub fn num_unique_words(&self) -> usize {
        self.index.len()
    }

    /// Number of locations with a word count
    pub fn num_counts(&self) -> usize {
        self.counts.len()
    }

    /// Number of locations a word occurs in, or 0 if the word is absent
    pub fn num_locations(&self, word: &str) -> usize {
        self.index.get(word).map_or(0, BTreeMap::len)
    }

    /// Number of positions a word occurs at in a location, or 0 if either is
    /// absent
    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    /// Word count of a location, or 0 if the location is unknown
    pub fn word_count(&self, location: &str) -> usize {
        self.counts.get(location).copied().unwrap_or(0)
    }

    /// Positions of a word in a location, empty if either is absent
    pub fn positions(&self, word: &str, location: &str) -> BTreeSet<usize> {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .cloned()
            .unwrap_or_default()
    }

    /// Locations a word occurs in, empty if the word is absent
    pub fn locations(&self, word: &str) -> Vec<String> {
        self.index
            .get(word)
            .map(|locations| locations.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// All words in the index, in lexicographic order
    pub fn words(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Snapshot of the location → word count mapping
    pub fn word_counts(&self) -> BTreeMap<String, usize> {
        self.counts.clone()
    }

    /// Writes the index as pretty JSON
    pub fn write_json<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        output::write_index(&self.index, writer)
    }

    /// Writes the index as pretty JSON to a file
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        output::write_file(path, |writer| output::write_index(&self.index, writer))
    }

    /// Writes the word counts as pretty JSON
    pub fn write_counts_json<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        output::write_counts(&self.counts, writer)
    }

    /// Writes the word counts as pretty JSON to a file
    pub fn write_counts_json_file(&self, path: &Path) -> Result<()> {
        output::write_file(path, |writer| output::write_counts(&self.counts, writer))
    }
}

impl fmt::Display for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&output::index_to_string(&self.index))
    }
}

/// Adds each location's position count under `locations` into the running
/// per-location match totals.
fn accumulate<'a>(
    locations: &'a BTreeMap<String, BTreeSet<usize>>,
    matches: &mut BTreeMap<&'a str, usize>,
) {
    for (location, positions) in locations {
        *matches.entry(location.as_str()).or_insert(0) += positions.len();
    }
}
