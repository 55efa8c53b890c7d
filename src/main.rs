//! linkharvest CLI
//!
//! Loads a JSON job list and runs each job sequentially. A job list that
//! cannot be loaded aborts the process with a non-zero exit before any
//! crawling starts; individual job failures are logged and do not stop the
//! remaining jobs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use linkharvest::{Crawler, FileSink, HttpFetcher, JobStatus};

#[derive(Parser, Debug)]
#[command(name = "linkharvest", version, about = "Crawl sites and collect glob-matched URLs")]
struct Cli {
    /// JSON job list: [{"url", "outfile", "globs"}, ...]
    #[arg(short, long, default_value = "links.json")]
    jobs: PathBuf,

    /// Concurrent workers per job
    #[arg(short, long, default_value_t = 20)]
    workers: usize,

    /// Fetch attempts per URL, including the first
    #[arg(long, default_value_t = 3)]
    max_attempts: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    fetch_timeout: u64,

    /// Directory result files are written into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkharvest=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Job source failures are fatal to the whole run.
    let jobs = linkharvest::load_jobs(&cli.jobs)?;

    let crawler = Crawler::builder()
        .workers(cli.workers)
        .max_attempts(cli.max_attempts)
        .build()
        .context("invalid crawler configuration")?;
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(cli.fetch_timeout))?);
    let sink = FileSink::in_dir(&cli.out_dir);

    for job in &jobs {
        tracing::info!(url = %job.url, "starting crawl");
        match crawler.run_job(job, fetcher.clone(), &sink).await {
            Ok(report) => match report.status {
                JobStatus::Done => tracing::info!(
                    outfile = %job.outfile,
                    found = report.urls.len(),
                    failed = report.failed_fetches,
                    "crawl finished"
                ),
                JobStatus::Skipped => {}
                JobStatus::Failed { reason } => {
                    tracing::error!(url = %job.url, %reason, "crawl failed")
                }
            },
            // Job-level setup errors (bad glob, bad seed URL) skip to the
            // next job.
            Err(err) => tracing::error!(url = %job.url, %err, "could not run job"),
        }
    }

    Ok(())
}
