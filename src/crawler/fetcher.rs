//! HTTP fetching
//!
//! Builds the blocking HTTP client used by crawl tasks and fetches pages.
//! Fetching is deliberately forgiving: a failed request, a non-success
//! status, or a non-HTML response all yield empty content, so the owning
//! task still runs to completion and the crawl keeps draining.

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops a single fetch will follow
const MAX_REDIRECTS: usize = 3;

/// Builds the HTTP client shared by all crawl tasks.
///
/// Timeouts are generous but bounded; redirects are followed up to
/// [`MAX_REDIRECTS`] hops and anything longer fails the fetch.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .build()
}

/// Fetches the page at `url`, returning its HTML body.
///
/// Returns the empty string when the request fails, the final status is not
/// a success, or the response is not HTML. The failure is logged; the caller
/// proceeds over empty content.
pub fn fetch_page(client: &Client, url: &Url) -> String {
    let response = match client.get(url.clone()).send() {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("fetch failed for {}: {}", url, e);
            return String::new();
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("fetch of {} returned {}", url, status);
        return String::new();
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if !content_type.is_empty() && !content_type.contains("text/html") {
        tracing::debug!("skipping non-HTML content at {} ({})", url, content_type);
        return String::new();
    }

    match response.text() {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("failed to read body of {}: {}", url, e);
            String::new()
        }
    }
}
