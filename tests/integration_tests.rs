use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use linkharvest::{
    Crawler, FetchError, FetchOutcome, FileSink, Job, JobStatus, PageFetcher, ResultSink,
};
use url::Url;

struct MapFetcher {
    pages: HashMap<String, Vec<String>>,
    fetches: AtomicUsize,
}

impl MapFetcher {
    fn new(pages: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, links)| {
                    (
                        url.to_string(),
                        links.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(FetchOutcome::new(
            self.pages.get(url.as_str()).cloned().unwrap_or_default(),
        ))
    }
}

fn job(url: &str, outfile: &str, globs: &[&str]) -> Job {
    Job {
        url: url.to_string(),
        outfile: outfile.to_string(),
        globs: globs.iter().map(|g| g.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_end_to_end_glob_filtered_crawl() {
    // Seed links to two markdown pages (one duplicated) and one text file;
    // only the markdown pages pass the glob and the duplicate collapses.
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(MapFetcher::new(vec![(
        "https://example.test/",
        vec!["/a.md", "/b.md", "/a.md", "/c.txt"],
    )]));
    let crawler = Crawler::builder().workers(20).build().unwrap();
    let sink = FileSink::in_dir(dir.path());

    let report = crawler
        .run_job(
            &job("https://example.test/", "found.txt", &["**/*.md"]),
            fetcher.clone(),
            &sink,
        )
        .await
        .unwrap();

    assert_eq!(report.status, JobStatus::Done);

    let mut urls = report.urls.clone();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://example.test/",
            "https://example.test/a.md",
            "https://example.test/b.md",
        ],
        "c.txt excluded by glob, duplicate a.md collapsed"
    );
    assert_eq!(fetcher.fetch_count(), 3);
}

#[tokio::test]
async fn test_output_file_is_one_url_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(MapFetcher::new(vec![
        ("https://example.test/", vec!["/a"]),
        ("https://example.test/a", vec![]),
    ]));
    let crawler = Crawler::builder().workers(1).build().unwrap();
    let sink = FileSink::in_dir(dir.path());

    crawler
        .run_job(&job("https://example.test/", "out.txt", &[]), fetcher, &sink)
        .await
        .unwrap();

    let content = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
    let lines: Vec<&str> = content.split('\n').collect();
    assert_eq!(
        lines,
        vec!["https://example.test/", "https://example.test/a"],
        "newline-joined URLs, no trailing metadata"
    );
}

#[tokio::test]
async fn test_rerun_with_existing_output_performs_zero_fetches() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(MapFetcher::new(vec![("https://example.test/", vec![])]));
    let crawler = Crawler::builder().workers(2).build().unwrap();
    let sink = FileSink::in_dir(dir.path());
    let job = job("https://example.test/", "out.txt", &[]);

    let first = crawler.run_job(&job, fetcher.clone(), &sink).await.unwrap();
    assert_eq!(first.status, JobStatus::Done);
    assert_eq!(fetcher.fetch_count(), 1);
    assert!(sink.exists("out.txt"));

    let second = crawler.run_job(&job, fetcher.clone(), &sink).await.unwrap();
    assert_eq!(second.status, JobStatus::Skipped);
    assert_eq!(
        fetcher.fetch_count(),
        1,
        "a job whose output exists must perform zero fetches"
    );
}

#[tokio::test]
async fn test_jobs_are_isolated() {
    // The same URL is crawled again by a second job: per-job visited state
    // must not leak across job boundaries.
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(MapFetcher::new(vec![("https://example.test/", vec![])]));
    let crawler = Crawler::builder().workers(2).build().unwrap();
    let sink = FileSink::in_dir(dir.path());

    let first = crawler
        .run_job(&job("https://example.test/", "one.txt", &[]), fetcher.clone(), &sink)
        .await
        .unwrap();
    let second = crawler
        .run_job(&job("https://example.test/", "two.txt", &[]), fetcher.clone(), &sink)
        .await
        .unwrap();

    assert_eq!(first.status, JobStatus::Done);
    assert_eq!(second.status, JobStatus::Done);
    assert_eq!(second.urls, vec!["https://example.test/"]);
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn test_job_list_end_to_end() {
    // Full pipeline: load jobs from JSON, crawl each sequentially, check the
    // written files.
    let dir = tempfile::tempdir().unwrap();
    let jobs_path = dir.path().join("links.json");
    std::fs::write(
        &jobs_path,
        r#"[
            {"url": "https://example.test/", "outfile": "md.txt",
             "globs": ["**/*.md"]},
            {"url": "https://example.test/", "outfile": "all.txt"}
        ]"#,
    )
    .unwrap();

    let jobs = linkharvest::load_jobs(&jobs_path).unwrap();
    assert_eq!(jobs.len(), 2);

    let fetcher = Arc::new(MapFetcher::new(vec![
        ("https://example.test/", vec!["/a.md", "/b.txt"]),
        ("https://example.test/a.md", vec![]),
        ("https://example.test/b.txt", vec![]),
    ]));
    let crawler = Crawler::builder().workers(4).build().unwrap();
    let sink = FileSink::in_dir(dir.path());

    for job in &jobs {
        let report = crawler.run_job(job, fetcher.clone(), &sink).await.unwrap();
        assert_eq!(report.status, JobStatus::Done);
    }

    let md = std::fs::read_to_string(dir.path().join("md.txt")).unwrap();
    assert!(md.contains("https://example.test/a.md"));
    assert!(!md.contains("b.txt"));

    let all = std::fs::read_to_string(dir.path().join("all.txt")).unwrap();
    assert!(all.contains("https://example.test/a.md"));
    assert!(all.contains("https://example.test/b.txt"));
}
