//! Page fetching capability
//!
//! The engine never renders pages itself; it consumes a [`PageFetcher`]
//! that returns the outbound links of a URL. [`HttpFetcher`] is the default
//! implementation (plain HTTP GET plus `<a href>` extraction). Anything that
//! can produce links for a URL — a headless browser bridge, a fixture map in
//! tests — plugs in through the same trait.

use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::error::FetchError;

/// Outcome of fetching one page: the outbound link targets found on it, in
/// document order, as written in the page (not yet normalized or filtered).
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub links: Vec<String>,
}

impl FetchOutcome {
    pub fn new(links: Vec<String>) -> Self {
        Self { links }
    }

    /// A page with no outbound links.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// External capability that retrieves a URL's content and outbound links.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one URL.
    ///
    /// Transient errors are retried by the caller with bounded backoff;
    /// fatal errors fail the whole job.
    async fn fetch(&self, url: &Url) -> Result<FetchOutcome, FetchError>;
}

/// HTTP-based [`PageFetcher`]: GET the page and extract `<a href>` targets.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("linkharvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Fatal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transient(format!("HTTP {status}")));
        }

        // Non-HTML resources (a .md glob can still point at text/plain)
        // simply contribute no links.
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        Ok(FetchOutcome::new(extract_links(&html)))
    }
}

/// Extract raw `<a href>` targets from an HTML document, in document order.
///
/// Fragment-only, mailto:, tel: and javascript: targets never lead to a
/// crawlable page and are skipped here; everything else is left for the
/// normalizer and glob filter to judge.
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    // "a[href]" is a valid selector; parse cannot fail.
    let selector = Selector::parse("a[href]").expect("static selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| {
            !(href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
                || href.starts_with("javascript:"))
        })
        .map(str::to_string)
        .collect()
}
