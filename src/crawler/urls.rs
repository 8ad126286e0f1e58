//! URL normalisation
//!
//! Crawl identity is the normalised URL string: fragments are stripped, dot
//! segments are resolved, and an absent path becomes `/`, so the same page
//! reached through different spellings is visited once.

use thiserror::Error;
use url::Url;

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("failed to parse URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    Scheme(String),
}

/// Parses and normalises a URL string.
///
/// Only HTTP and HTTPS URLs are accepted. Parsing already resolves dot
/// segments and defaults the path to `/`; normalisation additionally drops
/// the fragment.
pub fn normalize_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::Scheme(url.scheme().to_string()));
    }
    Ok(normalize(url))
}

/// Strips the fragment from an already-parsed URL
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_stripped() {
        let url = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_missing_path_becomes_root() {
        let url = normalize_url("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_dot_segments_are_resolved() {
        let url = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(url.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_query_is_kept() {
        let url = normalize_url("https://example.com/search?q=fox#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=fox");
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        assert!(matches!(
            normalize_url("ftp://example.com/file"),
            Err(UrlError::Scheme(_))
        ));
        assert!(matches!(
            normalize_url("mailto:test@example.com"),
            Err(UrlError::Scheme(_))
        ));
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        assert!(matches!(
            normalize_url("http://"),
            Err(UrlError::Parse(_))
        ));
        assert!(matches!(normalize_url("not a url"), Err(UrlError::Parse(_))));
    }
}
