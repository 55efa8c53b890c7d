//! Crawl controller and worker pool
//!
//! The controller owns one job at a time and drives it through
//! `Idle → Running → Draining → Done`, with `Failed` reachable from
//! `Running` on a fatal fetch error:
//!
//! - **Running**: the seed URL is claimed and pushed, then a bounded pool of
//!   workers drains the frontier. Each worker pops a target, fetches it
//!   (retrying transient failures with bounded exponential backoff), records
//!   the fetched URL, and feeds accepted links — normalized, glob-matched,
//!   claimed — back into the frontier.
//! - **Draining**: the frontier reports drained (empty queue, zero in-flight
//!   fetches) and every worker observes it and exits. A fetch still in
//!   flight blocks the drain, because it may enqueue new URLs.
//! - **Done**: the unique URL set is flushed to the result sink, once.
//! - **Failed**: workers stop claiming work, nothing is persisted.
//!
//! Jobs are isolated: frontier, visited set, and result set are fresh per
//! job and never shared across job boundaries. Jobs run sequentially; the
//! worker count bounds concurrency within a job.
//!
//! # Example
//!
//! ```ignore
//! use linkharvest::{Crawler, FileSink, HttpFetcher};
//! use std::sync::Arc;
//!
//! let crawler = Crawler::builder().workers(20).build()?;
//! let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(10))?);
//! let sink = FileSink::new();
//!
//! for job in jobs {
//!     let report = crawler.run_job(&job, fetcher.clone(), &sink).await?;
//!     println!("{}: {} URLs found", job.outfile, report.urls.len());
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ConfigError, CrawlError, FetchError};
use crate::fetcher::PageFetcher;
use crate::frontier::{CrawlTarget, Frontier, Visited};
use crate::glob::GlobSet;
use crate::job::Job;
use crate::sink::ResultSink;

const DEFAULT_WORKERS: usize = 20;
const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Retry policy for transient fetch failures: bounded exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first.
    pub max_attempts: usize,
    /// Backoff before the second attempt; doubles each retry.
    pub initial_backoff: Duration,
    /// Ceiling on the computed backoff.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(32) as u32;
        let backoff = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(exp));
        backoff.min(self.max_backoff)
    }
}

/// Validated crawler configuration.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub(crate) workers: usize,
    pub(crate) retry: RetryPolicy,
}

impl CrawlerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(0));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(0));
        }
        Ok(())
    }
}

/// Terminal state of one job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Output already existed; no fetch was performed.
    Skipped,
    /// Frontier drained cleanly and results were flushed.
    Done,
    /// A fatal fetch error aborted the job; nothing was persisted.
    Failed { reason: String },
}

/// Per-job summary handed back by the controller.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub status: JobStatus,
    /// Unique URLs successfully fetched, in completion order.
    pub urls: Vec<String>,
    /// URLs dropped after exhausting their retry budget.
    pub failed_fetches: usize,
}

/// Shared per-job state. Fresh for every job; dropped when the job ends.
struct JobContext {
    frontier: Frontier,
    visited: Visited,
    globs: GlobSet,
    results: Mutex<Vec<String>>,
    failed_fetches: AtomicUsize,
    fatal: Mutex<Option<String>>,
    cancel: CancellationToken,
    retry: RetryPolicy,
}

impl JobContext {
    /// Record a fatal failure and stop the job: refuse new work and release
    /// parked workers so they can exit.
    fn abort(&self, reason: String) {
        let mut fatal = self.fatal.lock().expect("fatal lock poisoned");
        if fatal.is_none() {
            *fatal = Some(reason);
        }
        drop(fatal);
        self.cancel.cancel();
    }
}

/// Crawl controller: runs jobs against a [`PageFetcher`] and a
/// [`ResultSink`] with a bounded pool of concurrent workers.
pub struct Crawler {
    config: CrawlerConfig,
}

impl Crawler {
    /// Crawler with default settings (20 workers, 3 fetch attempts).
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("default configuration should be valid")
    }

    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    /// Run one job to completion.
    ///
    /// Skips the job when the sink already holds its output. Pre-crawl
    /// failures (invalid glob pattern, malformed seed URL) return `Err` and
    /// abort this job only. A fatal fetch error surfaces as
    /// [`JobStatus::Failed`]; in that case no results are written.
    pub async fn run_job(
        &self,
        job: &Job,
        fetcher: Arc<dyn PageFetcher>,
        sink: &dyn ResultSink,
    ) -> Result<CrawlReport, CrawlError> {
        self.run_job_with_cancellation(job, fetcher, sink, CancellationToken::new())
            .await
    }

    /// Run one job with an external cancellation signal.
    ///
    /// On cancellation workers stop claiming new URLs, finish or abandon
    /// their current fetch, and the job ends as `Failed` without persisting
    /// results.
    pub async fn run_job_with_cancellation(
        &self,
        job: &Job,
        fetcher: Arc<dyn PageFetcher>,
        sink: &dyn ResultSink,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        if sink.exists(&job.outfile) {
            tracing::info!(url = %job.url, outfile = %job.outfile, "output exists, skipping job");
            return Ok(CrawlReport {
                status: JobStatus::Skipped,
                urls: Vec::new(),
                failed_fetches: 0,
            });
        }

        let globs = GlobSet::compile(&job.globs)?;
        let seed = crate::normalize::normalize(&job.url, None)?;

        let ctx = Arc::new(JobContext {
            frontier: Frontier::new(),
            visited: Visited::new(),
            globs,
            results: Mutex::new(Vec::new()),
            failed_fetches: AtomicUsize::new(0),
            fatal: Mutex::new(None),
            cancel,
            retry: self.config.retry.clone(),
        });

        ctx.visited.try_claim(&seed);
        ctx.frontier.push(CrawlTarget::new(seed, 0));

        tracing::info!(url = %job.url, workers = self.config.workers, "job running");

        // Cancellation (external abort or fatal error) closes the frontier,
        // which wakes parked workers and refuses further pushes.
        let watcher = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                ctx.cancel.cancelled().await;
                ctx.frontier.close();
            })
        };

        let workers = (0..self.config.workers)
            .map(|id| {
                let ctx = ctx.clone();
                let fetcher = fetcher.clone();
                tokio::spawn(worker_loop(id, ctx, fetcher))
            })
            .collect::<Vec<_>>();

        // All workers exiting means the frontier drained (or the job was
        // cancelled); either way there is no in-flight work left.
        futures::future::join_all(workers).await;
        watcher.abort();

        let cancelled = ctx.cancel.is_cancelled();
        let fatal = ctx.fatal.lock().expect("fatal lock poisoned").take();
        let urls = std::mem::take(&mut *ctx.results.lock().expect("results lock poisoned"));
        let failed_fetches = ctx.failed_fetches.load(Ordering::Relaxed);

        if let Some(reason) = fatal.or_else(|| cancelled.then(|| "crawl cancelled".to_string())) {
            tracing::error!(url = %job.url, %reason, "job failed, discarding partial results");
            return Ok(CrawlReport {
                status: JobStatus::Failed { reason },
                urls: Vec::new(),
                failed_fetches,
            });
        }

        tracing::debug!(url = %job.url, "frontier drained");
        sink.flush(&job.outfile, &urls)?;
        tracing::info!(
            url = %job.url,
            outfile = %job.outfile,
            found = urls.len(),
            failed = failed_fetches,
            "job done"
        );

        Ok(CrawlReport {
            status: JobStatus::Done,
            urls,
            failed_fetches,
        })
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// One worker: pop, fetch with retry, filter and re-enqueue discovered
/// links. Exits when the frontier reports drained or the job is cancelled.
async fn worker_loop(id: usize, ctx: Arc<JobContext>, fetcher: Arc<dyn PageFetcher>) {
    while let Some(target) = ctx.frontier.pop().await {
        tracing::trace!(
            worker = id,
            url = %target.url,
            depth = target.depth,
            queued = ?target.queued_at.elapsed(),
            "fetching"
        );
        match fetch_with_retry(fetcher.as_ref(), &target.url, &ctx).await {
            Ok(outcome) => {
                ctx.results
                    .lock()
                    .expect("results lock poisoned")
                    .push(target.url.as_str().to_string());
                enqueue_discovered(&ctx, &target, outcome.links);
            }
            Err(FetchError::Transient(reason)) => {
                ctx.failed_fetches.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    worker = id,
                    url = %target.url,
                    %reason,
                    "dropping URL after exhausting retries"
                );
            }
            Err(FetchError::Fatal(reason)) => {
                tracing::error!(worker = id, url = %target.url, %reason, "fatal fetch error");
                ctx.abort(reason);
            }
        }
        // Every popped target is completed exactly once, success or not;
        // the drain check depends on it.
        ctx.frontier.complete();
    }
}

/// Normalize, glob-filter, claim, and push the links found on one page.
fn enqueue_discovered(ctx: &JobContext, source: &CrawlTarget, links: Vec<String>) {
    for raw in links {
        let link = match crate::normalize::normalize(&raw, Some(&source.url)) {
            Ok(link) => link,
            Err(err) => {
                tracing::debug!(page = %source.url, link = %raw, %err, "dropping link");
                continue;
            }
        };
        if !ctx.globs.matches(link.as_str()) {
            continue;
        }
        // Claim before push: the visited set is the sole dedup gate, so a
        // URL can never sit in the frontier twice.
        if ctx.visited.try_claim(&link) {
            ctx.frontier.push(CrawlTarget::new(link, source.depth + 1));
        }
    }
}

/// Fetch one URL, retrying transient failures with bounded exponential
/// backoff. Fatal errors and exhausted budgets are returned to the worker.
async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &Url,
    ctx: &JobContext,
) -> Result<crate::fetcher::FetchOutcome, FetchError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match fetcher.fetch(url).await {
            Ok(outcome) => return Ok(outcome),
            Err(FetchError::Fatal(reason)) => return Err(FetchError::Fatal(reason)),
            Err(FetchError::Transient(reason)) => {
                if attempt >= ctx.retry.max_attempts || ctx.cancel.is_cancelled() {
                    return Err(FetchError::Transient(reason));
                }
                let backoff = ctx.retry.backoff(attempt);
                tracing::debug!(%url, attempt, ?backoff, %reason, "retrying fetch");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Builder for configuring a [`Crawler`].
pub struct CrawlerBuilder {
    config: CrawlerConfig,
}

impl CrawlerBuilder {
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig {
                workers: DEFAULT_WORKERS,
                retry: RetryPolicy::default(),
            },
        }
    }

    /// Number of concurrent workers per job (default: 20).
    ///
    /// This is the sole admission-control knob bounding concurrent
    /// outstanding fetches.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Total fetch attempts per URL, including the first (default: 3).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    /// Backoff before the first retry; doubles per attempt (default: 500ms).
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry.initial_backoff = backoff;
        self
    }

    /// Ceiling on the exponential backoff (default: 10s).
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry.max_backoff = backoff;
        self
    }

    pub fn build(self) -> Result<Crawler, ConfigError> {
        self.config.validate()?;
        Ok(Crawler {
            config: self.config,
        })
    }
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
