//! Tokenisation and stemming
//!
//! Raw text is cleaned (NFD decomposition, combining marks removed,
//! lowercased), split on runs of non-letter characters, and stemmed with the
//! Snowball English algorithm. Stemmers are cheap to construct, so each entry
//! point creates its own rather than sharing one across threads.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Decomposes the text, drops combining marks, and lowercases what remains.
///
/// `"Résumé"` becomes `"resume"`.
pub fn clean(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Cleans the text and splits it into word tokens.
///
/// Any run of non-letter characters separates tokens, so digits and
/// punctuation never appear inside a token and empty tokens are never
/// produced.
pub fn parse(text: &str) -> Vec<String> {
    clean(text)
        .split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses the text and stems every token, in document order.
///
/// Tokens whose stem is empty are skipped.
pub fn stems(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    parse(text)
        .iter()
        .map(|token| stemmer.stem(token).into_owned())
        .filter(|stem| !stem.is_empty())
        .collect()
}

/// Parses and stems the text into a unique, lexicographically ordered set.
///
/// This is the canonical form of a query line: the iteration order of the
/// returned set is the order the stems are joined in to form the query key.
pub fn unique_stems(text: &str) -> BTreeSet<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    parse(text)
        .iter()
        .map(|token| stemmer.stem(token).into_owned())
        .filter(|stem| !stem.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lowercases() {
        assert_eq!(clean("Hello WORLD"), "hello world");
    }

    #[test]
    fn test_clean_strips_combining_marks() {
        assert_eq!(clean("Résumé"), "resume");
        assert_eq!(clean("naïve"), "naive");
    }

    #[test]
    fn test_parse_splits_on_non_letters() {
        assert_eq!(parse("one two\tthree"), vec!["one", "two", "three"]);
        assert_eq!(parse("abc123def"), vec!["abc", "def"]);
        assert_eq!(parse("don't"), vec!["don", "t"]);
    }

    #[test]
    fn test_parse_empty_and_symbol_only() {
        assert!(parse("").is_empty());
        assert!(parse("123 !!! ...").is_empty());
    }

    #[test]
    fn test_stems_plurals() {
        assert_eq!(stems("foxes"), vec!["fox"]);
        assert_eq!(stems("running quickly"), vec!["run", "quick"]);
    }

    #[test]
    fn test_stems_preserve_document_order() {
        assert_eq!(stems("zebra apple zebra"), vec!["zebra", "appl", "zebra"]);
    }

    #[test]
    fn test_unique_stems_sorted_and_deduped() {
        let stems = unique_stems("dog cat dogs CATS");
        let expected: Vec<&str> = vec!["cat", "dog"];
        assert_eq!(stems.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_unique_stems_empty_line() {
        assert!(unique_stems("").is_empty());
        assert!(unique_stems("42 + 17").is_empty());
    }
}
