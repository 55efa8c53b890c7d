//! Error types for the crawler engine
//!
//! The taxonomy follows the blast radius of each failure:
//!
//! - [`CrawlError::MalformedUrl`] — local to one link; the link is dropped
//!   and the crawl continues.
//! - [`CrawlError::InvalidPattern`] — aborts the affected job at startup,
//!   before any fetch is issued.
//! - [`FetchError::Transient`] — retried with bounded backoff, then the URL
//!   is dropped and recorded as failed.
//! - [`FetchError::Fatal`] — fails the whole job; no partial results are
//!   persisted.
//! - [`CrawlError::Config`] — fatal to the whole process; no crawling starts.

/// Errors raised by the crawler engine outside of page fetching.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// A discovered link could not be parsed or resolved against its base.
    ///
    /// Recovered locally: the caller logs the link and discards it.
    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// A glob pattern in the job definition does not compile.
    ///
    /// Surfaced at job start; aborts that job only.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The job list could not be loaded or parsed.
    ///
    /// Fatal to the whole run; the process exits non-zero.
    #[error("Failed to load job list from '{path}': {reason}")]
    Config { path: String, reason: String },

    /// Writing a job's result file failed after the crawl completed.
    #[error("Failed to write results to '{path}': {source}")]
    SinkWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by a [`PageFetcher`](crate::PageFetcher).
///
/// The transient/fatal split drives the retry policy: transient failures are
/// retried up to the configured attempt ceiling, fatal failures cancel the
/// job immediately.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A failure worth retrying: timeouts, connection resets, non-success
    /// HTTP statuses.
    #[error("Transient fetch failure: {0}")]
    Transient(String),

    /// A failure that poisons the whole job, e.g. the fetcher itself is
    /// broken beyond recovery.
    #[error("Fatal fetch failure: {0}")]
    Fatal(String),
}

/// Errors that can occur during crawler configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Worker count must be greater than 0.
    #[error("Worker count must be greater than 0, got {0}")]
    InvalidWorkerCount(usize),

    /// Maximum fetch attempts must be greater than 0.
    #[error("Max fetch attempts must be greater than 0, got {0}")]
    InvalidMaxAttempts(usize),
}
