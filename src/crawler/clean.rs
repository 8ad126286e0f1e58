//! HTML link extraction and tag stripping
//!
//! Crawl tasks use this module twice per page: once to pull the outgoing
//! links out of the raw HTML, and once to reduce the page to plain text for
//! indexing. Both run over the same parsed document model; entities are
//! decoded by the parser.

use super::urls;
use scraper::node::Node;
use scraper::{Html, Selector};
use url::Url;

/// Elements whose entire subtree is invisible text
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

/// Elements that do not break the text flow around them
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "em", "i", "mark", "q", "s", "small", "span", "strong",
    "sub", "sup", "u",
];

/// Extracts the absolute, normalised HTTP(S) links from the anchor tags of
/// the HTML, resolved against the page URL.
///
/// Links are returned in document order, duplicates included; the caller's
/// visited set is what dedupes them. Anything that is not a resolvable
/// HTTP(S) URL is dropped.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Resolves an href against the base URL, returning None for anything that
/// should not be crawled: empty or fragment-only hrefs, non-HTTP(S) schemes,
/// and text that does not resolve to a URL.
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    Some(urls::normalize(resolved))
}

/// Strips all markup from the HTML, returning the visible text.
///
/// Script, style, and head subtrees are dropped entirely. Text separated by
/// block-level markup ends up on separate lines so that words from adjacent
/// elements never fuse; inline markup joins with its surroundings.
pub fn strip_tags(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.tree.root(), &mut text);
    text
}

/// Walks the node tree accumulating visible text
fn collect_text(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text),
        Node::Element(element) => {
            if SKIPPED_ELEMENTS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
            if !INLINE_ELEMENTS.contains(&element.name()) && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        // Document and fragment roots just recurse.
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    fn extracted(html: &str) -> Vec<String> {
        extract_links(html, &base())
            .iter()
            .map(Url::to_string)
            .collect()
    }

    #[test]
    fn test_absolute_link() {
        let links = extracted(r#"<a href="https://other.com/x">x</a>"#);
        assert_eq!(links, vec!["https://other.com/x"]);
    }

    #[test]
    fn test_relative_links_resolve_against_base() {
        let links = extracted(r#"<a href="/top">t</a><a href="sibling.html">s</a>"#);
        assert_eq!(
            links,
            vec![
                "https://example.com/top",
                "https://example.com/dir/sibling.html"
            ]
        );
    }

    #[test]
    fn test_fragments_are_stripped_from_links() {
        let links = extracted(r#"<a href="/page#section">p</a>"#);
        assert_eq!(links, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_fragment_only_and_special_schemes_skipped() {
        let html = r##"
            <a href="#top">top</a>
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@b.com">mail</a>
            <a href="tel:+15551234">tel</a>
            <a href="/keep">keep</a>
        "##;
        assert_eq!(extracted(html), vec!["https://example.com/keep"]);
    }

    #[test]
    fn test_duplicates_are_preserved_in_document_order() {
        let links = extracted(r#"<a href="/a">1</a><a href="/b">2</a><a href="/a">3</a>"#);
        assert_eq!(
            links,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/a"
            ]
        );
    }

    #[test]
    fn test_strip_tags_keeps_visible_text() {
        let html = r#"<html><head><title>skip me</title></head>
            <body><p>Hello world</p></body></html>"#;
        let text = strip_tags(html);
        assert!(text.contains("Hello world"));
        assert!(!text.contains("skip me"));
    }

    #[test]
    fn test_strip_tags_drops_script_and_style() {
        let html = r#"<body><p>keep</p><script>var gone = 1;</script>
            <style>.gone { color: red; }</style></body>"#;
        let text = strip_tags(html);
        assert!(text.contains("keep"));
        assert!(!text.contains("gone"));
    }

    #[test]
    fn test_block_elements_separate_words() {
        let text = strip_tags("<p>alpha</p><p>beta</p>");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_inline_elements_join_words() {
        let text = strip_tags("<p>bo<b>ld</b> and <i>it</i>alic</p>");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["bold", "and", "italic"]);
    }

    #[test]
    fn test_entities_are_decoded() {
        let text = strip_tags("<p>fish &amp; chips</p>");
        assert!(text.contains("fish & chips"));
    }
}
