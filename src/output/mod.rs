//! Pretty JSON output
//!
//! Hand-rendered writers for the three output documents: word counts, the
//! inverted index, and query results. The format is fixed: two-space
//! indentation, `\n` line endings, keys in map order, and scores printed
//! with exactly eight digits after the decimal point. Scores use Rust's
//! `{:.8}` formatting, which rounds half-to-even.
//!
//! Empty objects render as `{\n}` and empty arrays as `[\n<indent>]`.

use crate::index::{IndexMap, SearchResult};
use crate::{QuerymillError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes `indent` levels of two-space indentation
fn write_indent<W: Write + ?Sized>(writer: &mut W, indent: usize) -> io::Result<()> {
    for _ in 0..indent {
        writer.write_all(b"  ")?;
    }
    Ok(())
}

/// Writes a string as a quoted JSON value, escaping the characters that can
/// occur in file paths and URLs.
fn write_quote<W: Write + ?Sized>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(b"\"")?;
    for c in text.chars() {
        match c {
            '"' => writer.write_all(b"\\\"")?,
            '\\' => writer.write_all(b"\\\\")?,
            '\n' => writer.write_all(b"\\n")?,
            '\t' => writer.write_all(b"\\t")?,
            '\r' => writer.write_all(b"\\r")?,
            c if (c as u32) < 0x20 => write!(writer, "\\u{:04x}", c as u32)?,
            c => write!(writer, "{c}")?,
        }
    }
    writer.write_all(b"\"")
}

/// Writes the location → word count mapping as a pretty JSON object
pub fn write_counts<W: Write + ?Sized>(counts: &BTreeMap<String, usize>, writer: &mut W) -> io::Result<()> {
    writer.write_all(b"{")?;

    let mut entries = counts.iter();
    if let Some((location, count)) = entries.next() {
        writer.write_all(b"\n")?;
        write_indent(writer, 1)?;
        write_quote(writer, location)?;
        write!(writer, ": {count}")?;
    }
    for (location, count) in entries {
        writer.write_all(b",\n")?;
        write_indent(writer, 1)?;
        write_quote(writer, location)?;
        write!(writer, ": {count}")?;
    }

    writer.write_all(b"\n}")
}

/// Writes a collection of positions as a pretty JSON array at the given
/// indent level (the opening bracket is written in place).
fn write_positions<'a, W, I>(positions: I, writer: &mut W, indent: usize) -> io::Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a usize>,
{
    writer.write_all(b"[")?;

    let mut entries = positions.into_iter();
    if let Some(position) = entries.next() {
        writer.write_all(b"\n")?;
        write_indent(writer, indent + 1)?;
        write!(writer, "{position}")?;
    }
    for position in entries {
        writer.write_all(b",\n")?;
        write_indent(writer, indent + 1)?;
        write!(writer, "{position}")?;
    }

    writer.write_all(b"\n")?;
    write_indent(writer, indent)?;
    writer.write_all(b"]")
}

/// Writes the full inverted index as a pretty JSON object of objects of
/// arrays: `{ "word": { "location": [positions…] } }`.
pub fn write_index<W: Write + ?Sized>(index: &IndexMap, writer: &mut W) -> io::Result<()> {
    writer.write_all(b"{")?;

    let mut words = index.iter().peekable();
    while let Some((word, locations)) = words.next() {
        writer.write_all(b"\n")?;
        write_indent(writer, 1)?;
        write_quote(writer, word)?;
        writer.write_all(b": {")?;

        let mut entries = locations.iter().peekable();
        while let Some((location, positions)) = entries.next() {
            writer.write_all(b"\n")?;
            write_indent(writer, 2)?;
            write_quote(writer, location)?;
            writer.write_all(b": ")?;
            write_positions(positions, writer, 2)?;
            if entries.peek().is_some() {
                writer.write_all(b",")?;
            }
        }

        writer.write_all(b"\n")?;
        write_indent(writer, 1)?;
        writer.write_all(b"}")?;
        if words.peek().is_some() {
            writer.write_all(b",")?;
        }
    }

    writer.write_all(b"\n}")
}

/// Writes a single search result object at the given indent level
fn write_result<W: Write + ?Sized>(result: &SearchResult, writer: &mut W, indent: usize) -> io::Result<()> {
    writer.write_all(b"{\n")?;

    write_indent(writer, indent + 1)?;
    write!(writer, "\"count\": {},\n", result.count)?;

    write_indent(writer, indent + 1)?;
    write!(writer, "\"score\": {:.8},\n", result.score)?;

    write_indent(writer, indent + 1)?;
    writer.write_all(b"\"where\": ")?;
    write_quote(writer, &result.location)?;
    writer.write_all(b"\n")?;

    write_indent(writer, indent)?;
    writer.write_all(b"}")
}

/// Writes an ordered list of search results as a pretty JSON array
fn write_result_array<W: Write + ?Sized>(
    results: &[SearchResult],
    writer: &mut W,
    indent: usize,
) -> io::Result<()> {
    writer.write_all(b"[")?;

    let mut entries = results.iter();
    if let Some(result) = entries.next() {
        writer.write_all(b"\n")?;
        write_indent(writer, indent + 1)?;
        write_result(result, writer, indent + 1)?;
    }
    for result in entries {
        writer.write_all(b",\n")?;
        write_indent(writer, indent + 1)?;
        write_result(result, writer, indent + 1)?;
    }

    writer.write_all(b"\n")?;
    write_indent(writer, indent)?;
    writer.write_all(b"]")
}

/// Writes the canonical query → results mapping as a pretty JSON object
pub fn write_results<W: Write + ?Sized>(
    results: &BTreeMap<String, Vec<SearchResult>>,
    writer: &mut W,
) -> io::Result<()> {
    writer.write_all(b"{")?;

    let mut entries = results.iter();
    if let Some((query, list)) = entries.next() {
        writer.write_all(b"\n")?;
        write_indent(writer, 1)?;
        write_quote(writer, query)?;
        writer.write_all(b": ")?;
        write_result_array(list, writer, 1)?;
    }
    for (query, list) in entries {
        writer.write_all(b",\n")?;
        write_indent(writer, 1)?;
        write_quote(writer, query)?;
        writer.write_all(b": ")?;
        write_result_array(list, writer, 1)?;
    }

    writer.write_all(b"\n}")
}

/// Creates the file and runs the writer body over a buffered writer, mapping
/// failures to an output error for the path.
pub(crate) fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let wrap = |source| QuerymillError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(wrap)?;
    writer.flush().map_err(wrap)
}

/// Renders the index to a string (used by `Display` and tests)
pub(crate) fn index_to_string(index: &IndexMap) -> String {
    let mut buffer = Vec::new();
    // Writing to a Vec cannot fail.
    write_index(index, &mut buffer).expect("in-memory write");
    String::from_utf8(buffer).expect("writer emits UTF-8")
}

/// Renders query results to a string (used by `Display` and tests)
pub(crate) fn results_to_string(results: &BTreeMap<String, Vec<SearchResult>>) -> String {
    let mut buffer = Vec::new();
    write_results(results, &mut buffer).expect("in-memory write");
    String::from_utf8(buffer).expect("writer emits UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvertedIndex;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(body: F) -> String {
        let mut buffer = Vec::new();
        body(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_counts_format() {
        let mut counts = BTreeMap::new();
        counts.insert("a.txt".to_string(), 4);
        counts.insert("b.txt".to_string(), 2);

        let json = render(|w| write_counts(&counts, w));
        assert_eq!(json, "{\n  \"a.txt\": 4,\n  \"b.txt\": 2\n}");
    }

    #[test]
    fn test_empty_counts() {
        let counts = BTreeMap::new();
        assert_eq!(render(|w| write_counts(&counts, w)), "{\n}");
    }

    #[test]
    fn test_index_format() {
        let mut index = InvertedIndex::new();
        index.insert("fox", "a.txt", 4);
        index.insert("fox", "b.txt", 2);
        index.insert("quick", "a.txt", 2);

        let json = render(|w| index.write_json(w));
        let expected = concat!(
            "{\n",
            "  \"fox\": {\n",
            "    \"a.txt\": [\n      4\n    ],\n",
            "    \"b.txt\": [\n      2\n    ]\n",
            "  },\n",
            "  \"quick\": {\n",
            "    \"a.txt\": [\n      2\n    ]\n",
            "  }\n",
            "}"
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_empty_index() {
        let index = InvertedIndex::new();
        assert_eq!(render(|w| index.write_json(w)), "{\n}");
    }

    #[test]
    fn test_results_format_and_score_digits() {
        let mut results = BTreeMap::new();
        results.insert(
            "quick".to_string(),
            vec![
                SearchResult {
                    location: "b.txt".to_string(),
                    count: 1,
                    score: 0.5,
                },
                SearchResult {
                    location: "a.txt".to_string(),
                    count: 1,
                    score: 0.25,
                },
            ],
        );

        let json = render(|w| write_results(&results, w));
        let expected = concat!(
            "{\n",
            "  \"quick\": [\n",
            "    {\n",
            "      \"count\": 1,\n",
            "      \"score\": 0.50000000,\n",
            "      \"where\": \"b.txt\"\n",
            "    },\n",
            "    {\n",
            "      \"count\": 1,\n",
            "      \"score\": 0.25000000,\n",
            "      \"where\": \"a.txt\"\n",
            "    }\n",
            "  ]\n",
            "}"
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_query_with_no_results_renders_empty_array() {
        let mut results = BTreeMap::new();
        results.insert("missing".to_string(), Vec::new());
        let json = render(|w| write_results(&results, w));
        assert_eq!(json, "{\n  \"missing\": [\n  ]\n}");
    }

    #[test]
    fn test_empty_results() {
        let results = BTreeMap::new();
        assert_eq!(render(|w| write_results(&results, w)), "{\n}");
    }

    #[test]
    fn test_score_rounding_is_half_to_even() {
        let score = |s: f64| {
            let result = SearchResult {
                location: "doc".to_string(),
                count: 1,
                score: s,
            };
            render(|w| write_result(&result, w, 0))
        };

        assert!(score(1.0 / 3.0).contains("\"score\": 0.33333333"));

        // 1/512 and 3/512 are exact in binary and tie at the ninth decimal
        // digit, so they expose the rounding mode: half-to-even keeps an
        // even last digit where half-up would always round away from zero.
        assert!(score(1.0 / 512.0).contains("\"score\": 0.00195312"));
        assert!(score(3.0 / 512.0).contains("\"score\": 0.00585938"));
    }

    #[test]
    fn test_quote_escaping() {
        let json = render(|w| write_quote(w, "pa\"th\\with\nweird"));
        assert_eq!(json, "\"pa\\\"th\\\\with\\nweird\"");
    }

    #[test]
    fn test_output_is_valid_json() {
        let mut index = InvertedIndex::new();
        index.insert("alpha", "x/y z.txt", 1);
        index.insert("beta", "x/y z.txt", 2);

        let parsed: serde_json::Value =
            serde_json::from_str(&render(|w| index.write_json(w))).unwrap();
        assert_eq!(parsed["alpha"]["x/y z.txt"][0], 1);

        let mut counts = BTreeMap::new();
        counts.insert("x/y z.txt".to_string(), 2);
        let parsed: serde_json::Value =
            serde_json::from_str(&render(|w| write_counts(&counts, w))).unwrap();
        assert_eq!(parsed["x/y z.txt"], 2);
    }
}
