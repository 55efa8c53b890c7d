//! Crawl job definitions
//!
//! A job list is a JSON array:
//!
//! ```json
//! [
//!   {
//!     "url": "https://github.com/microsoft/dotnet",
//!     "outfile": "dotnet_github_urls.txt",
//!     "globs": ["https://github.com/microsoft/dotnet/blob/**/*.md"]
//!   }
//! ]
//! ```
//!
//! Jobs are immutable once loaded and run sequentially. A malformed job list
//! aborts the whole run before any crawling starts.

use std::path::Path;

use serde::Deserialize;

use crate::error::CrawlError;

/// One crawl job: seed URL, output file, and the glob patterns discovered
/// links must match to be followed.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    /// Seed URL the crawl starts from.
    pub url: String,
    /// File the unique URL set is written to; if it already exists the job
    /// is skipped entirely.
    pub outfile: String,
    /// Glob patterns for admitting discovered links. Empty means follow
    /// everything.
    #[serde(default)]
    pub globs: Vec<String>,
}

/// Load a job list from a JSON file.
///
/// Any read or parse failure is a [`CrawlError::Config`], fatal to the run.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, CrawlError> {
    let config = |reason: String| CrawlError::Config {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| config(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| config(e.to_string()))
}
