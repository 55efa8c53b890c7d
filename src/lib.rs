//! linkharvest — concurrent breadth-first web crawler engine
//!
//! Seeds a frontier with a start URL, drains it with a bounded pool of
//! concurrent workers, filters discovered links through URL normalization
//! and glob patterns, and hands the unique URL set to a result sink when the
//! frontier drains. Page fetching lives behind the [`PageFetcher`] trait;
//! [`HttpFetcher`] is the default HTTP implementation.

// Core modules
pub mod crawler;
mod error;
mod fetcher;
mod frontier;
mod glob;
mod job;
mod normalize;
mod sink;

// Public exports
pub use crawler::{
    Crawler, CrawlerBuilder, CrawlerConfig, CrawlReport, JobStatus, RetryPolicy,
};
pub use error::{ConfigError, CrawlError, FetchError};
pub use fetcher::{extract_links, FetchOutcome, HttpFetcher, PageFetcher};
pub use frontier::{CrawlTarget, Frontier, Visited};
pub use glob::GlobSet;
pub use job::{load_jobs, Job};
pub use normalize::normalize;
pub use sink::{FileSink, ResultSink};
