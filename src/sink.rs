//! Result persistence
//!
//! A job's result is written exactly once, after the crawl reaches `Done`.
//! Persistence is all-or-nothing: a failed job writes nothing, and a job
//! whose output file already exists is skipped before any fetch — re-running
//! a finished job list is a no-op.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CrawlError;

/// Where completed crawl results go.
pub trait ResultSink: Send + Sync {
    /// True when this output id already holds a completed result; the
    /// controller then skips the job entirely.
    fn exists(&self, outfile: &str) -> bool;

    /// Persist the unique URL set for a completed job. Called at most once
    /// per job, never for failed jobs.
    fn flush(&self, outfile: &str, urls: &[String]) -> Result<(), CrawlError>;
}

/// File-based sink: one URL per line, newline-joined, no trailing metadata.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Sink writing into the current working directory.
    pub fn new() -> Self {
        Self::in_dir(".")
    }

    /// Sink writing into `dir`. Relative outfile names resolve against it.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, outfile: &str) -> PathBuf {
        self.dir.join(outfile)
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSink for FileSink {
    fn exists(&self, outfile: &str) -> bool {
        self.path_for(outfile).exists()
    }

    fn flush(&self, outfile: &str, urls: &[String]) -> Result<(), CrawlError> {
        let path = self.path_for(outfile);
        let write_err = |source: std::io::Error| CrawlError::SinkWrite {
            path: path.display().to_string(),
            source,
        };

        let mut file = std::fs::File::create(&path).map_err(write_err)?;
        file.write_all(urls.join("\n").as_bytes()).map_err(write_err)?;
        Ok(())
    }
}
