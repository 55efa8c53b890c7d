//! URL normalization for deduplication
//!
//! Two URLs that are semantically identical must compare equal after
//! normalization, otherwise the visited set would admit both and the same
//! page would be fetched twice. Normalization:
//!
//! - resolves relative references against a base URL,
//! - strips fragment identifiers (`#...`),
//! - lower-cases scheme and host (handled by the `url` crate),
//! - collapses default ports (`:80` for http, `:443` for https),
//! - removes the trailing slash except for the root path.
//!
//! Unparseable input fails with [`CrawlError::MalformedUrl`]; the caller
//! logs the link and discards it without affecting the crawl.

use url::Url;

use crate::error::CrawlError;

/// Normalize a raw (possibly relative) URL against an optional base.
///
/// Seeds are normalized with no base; discovered links pass the URL of the
/// page they were found on.
///
/// # Examples
///
/// ```
/// use linkharvest::normalize;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let url = normalize("../guide/#intro", Some(&base)).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/guide");
/// ```
pub fn normalize(raw: &str, base: Option<&Url>) -> Result<Url, CrawlError> {
    let malformed = |reason: String| CrawlError::MalformedUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = match base {
        Some(base) => base.join(raw).map_err(|e| malformed(e.to_string()))?,
        None => Url::parse(raw).map_err(|e| malformed(e.to_string()))?,
    };

    // Only http(s) pages can be crawled; mailto:, javascript:, ftp: and
    // friends are dropped as malformed-for-crawling.
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(malformed(format!("unsupported scheme '{}'", url.scheme())));
    }

    url.set_fragment(None);

    // Scheme/host lower-casing and default-port collapsing (`:80`, `:443`)
    // are done by the url crate at parse time.

    // Trailing slash is dropped on non-root paths so `/docs/` and `/docs`
    // dedup to the same entry. The root path keeps its slash: Url always
    // serializes an empty path as "/".
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    Ok(url)
}
