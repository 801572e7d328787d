//! Integration tests for the crawler
//!
//! The graph tests drive the coordinator with an in-memory fetcher so the
//! scheduling properties can be checked exactly. The HTTP tests use wiremock
//! to run the full fetch-parse-crawl cycle end-to-end.

use async_trait::async_trait;
use ripple_crawl::config::Config;
use ripple_crawl::crawler::{crawl, Coordinator, CrawlSettings, HttpFetcher, PageFetcher, PageSummary};
use ripple_crawl::output::PageOutcome;
use ripple_crawl::{CrawlError, CrawlPhase, FailureKind, FetchError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory link graph
///
/// Pages listed in `failing` fail with a transport error; pages missing from
/// the graph fail with HTTP 404. Every call is recorded.
struct GraphFetcher {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl GraphFetcher {
    fn new(edges: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            pages: edges
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.into_iter().map(str::to_string).collect()))
                .collect(),
            failing: HashSet::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl PageFetcher for GraphFetcher {
    async fn fetch(&self, url: &str) -> Result<PageSummary, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(url) {
            return Err(FetchError::Connect(format!("{} unreachable", url)));
        }

        match self.pages.get(url) {
            Some(links) => Ok(PageSummary {
                title: Some(format!("Page {}", url)),
                links: links.clone(),
            }),
            None => Err(FetchError::Status(404)),
        }
    }
}

async fn run_graph(
    seed: &str,
    fetcher: Arc<GraphFetcher>,
    settings: CrawlSettings,
) -> ripple_crawl::CrawlReport {
    let coordinator = Coordinator::new(seed, settings, fetcher);
    tokio::time::timeout(Duration::from_secs(30), coordinator.run())
        .await
        .expect("crawl did not terminate")
        .expect("crawl failed")
}

#[tokio::test]
async fn test_cycle_and_failure_scenario() {
    // A -> B, C; B -> A (cycle), D; C fails; D has no links
    let fetcher = Arc::new(
        GraphFetcher::new(vec![
            ("A", vec!["B", "C"]),
            ("B", vec!["A", "D"]),
            ("C", vec![]),
            ("D", vec![]),
        ])
        .failing("C"),
    );

    let report = run_graph("A", fetcher.clone(), CrawlSettings::with_workers(4)).await;

    assert_eq!(report.phase, CrawlPhase::Done);
    assert!(!report.cancelled);
    assert_eq!(report.outstanding(), 0);

    let mut calls = fetcher.calls();
    calls.sort();
    assert_eq!(calls, vec!["A", "B", "C", "D"]);
    assert_eq!(fetcher.call_count("A"), 1);

    assert_eq!(report.summary.visited, 4);
    assert_eq!(report.summary.discovered, 4);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(
        report.summary.failures_by_kind.get(&FailureKind::Transport),
        Some(&1)
    );

    let failed: Vec<_> = report
        .records
        .iter()
        .filter(|r| !r.outcome.is_success())
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(failed, vec!["C"]);
}

#[tokio::test]
async fn test_seed_failure_escalates() {
    let fetcher = Arc::new(GraphFetcher::new(vec![("other", vec![])]).failing("seed"));

    let report = run_graph("seed", fetcher.clone(), CrawlSettings::with_workers(8)).await;

    assert_eq!(report.phase, CrawlPhase::DoneError);
    assert_eq!(report.tasks_submitted, 1);
    assert_eq!(report.summary.visited, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(fetcher.calls(), vec!["seed"]);
    assert_eq!(report.records.len(), 1);
    assert!(matches!(
        report.records[0].outcome,
        PageOutcome::Failure(FetchError::Connect(_))
    ));

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, CrawlError::SeedFailed { ref url, .. } if url == "seed"));
}

#[tokio::test]
async fn test_rediscovered_page_fetched_once() {
    // Both B and C link to D
    let fetcher = Arc::new(GraphFetcher::new(vec![
        ("A", vec!["B", "C"]),
        ("B", vec!["D"]),
        ("C", vec!["D"]),
        ("D", vec![]),
    ]));

    let report = run_graph("A", fetcher.clone(), CrawlSettings::with_workers(3)).await;

    assert_eq!(fetcher.call_count("D"), 1);
    assert_eq!(report.summary.visited, 4);

    // Both discovering pages still report the shared link
    for url in ["B", "C"] {
        let record = report.records.iter().find(|r| r.url == url).unwrap();
        assert_eq!(record.link_count, 1);
    }
}

#[tokio::test]
async fn test_single_worker_processes_in_submission_order() {
    let leaves: Vec<String> = (0..10).map(|i| format!("leaf-{}", i)).collect();
    let mut edges: Vec<(&str, Vec<&str>)> = vec![("root", leaves.iter().map(String::as_str).collect())];
    edges.extend(leaves.iter().map(|leaf| (leaf.as_str(), vec![])));

    let serial = Arc::new(GraphFetcher::new(edges.clone()));
    let serial_report = run_graph("root", serial.clone(), CrawlSettings::with_workers(1)).await;

    let mut expected = vec!["root".to_string()];
    expected.extend(leaves.iter().cloned());

    let processed: Vec<String> = serial_report.records.iter().map(|r| r.url.clone()).collect();
    assert_eq!(processed, expected);
    assert_eq!(serial.calls(), expected);

    let parallel = Arc::new(GraphFetcher::new(edges));
    let parallel_report = run_graph("root", parallel, CrawlSettings::with_workers(8)).await;

    assert_eq!(serial_report.summary, parallel_report.summary);
    assert_eq!(serial_report.summary.visited, 11);
    assert_eq!(serial_report.summary.discovered, 11);
}

#[tokio::test]
async fn test_dense_graph_with_tiny_result_buffer_terminates() {
    // 300 pages, each linking to the next five (wrapping around), so every
    // page is discovered many times and the graph is full of cycles
    let names: Vec<String> = (0..300).map(|i| format!("n{}", i)).collect();
    let edges: Vec<(&str, Vec<&str>)> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let links = (1..=5)
                .map(|step| names[(i + step) % names.len()].as_str())
                .collect();
            (name.as_str(), links)
        })
        .collect();

    let fetcher = Arc::new(GraphFetcher::new(edges));
    let settings = CrawlSettings {
        workers: 32,
        result_buffer: 1,
        ..CrawlSettings::default()
    };

    let report = run_graph("n0", fetcher.clone(), settings).await;

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.tasks_submitted, 300);
    assert_eq!(report.results_consumed, 300);
    assert_eq!(report.summary.visited, 300);

    let calls = fetcher.calls();
    let distinct: HashSet<_> = calls.iter().collect();
    assert_eq!(calls.len(), distinct.len());
}

#[tokio::test]
async fn test_cancellation_accounts_for_every_task() {
    let leaves: Vec<String> = (0..50).map(|i| format!("slow-{}", i)).collect();
    let mut edges: Vec<(&str, Vec<&str>)> = vec![("start", leaves.iter().map(String::as_str).collect())];
    edges.extend(leaves.iter().map(|leaf| (leaf.as_str(), vec![])));

    let fetcher = Arc::new(GraphFetcher::new(edges).with_delay(Duration::from_millis(50)));
    let coordinator = Coordinator::new("start", CrawlSettings::with_workers(2), fetcher.clone());
    let cancel = coordinator.cancel_handle();

    let crawl = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel.cancel();

    let report = tokio::time::timeout(Duration::from_secs(10), crawl)
        .await
        .expect("cancelled crawl did not finish")
        .unwrap()
        .unwrap();

    assert_eq!(report.phase, CrawlPhase::Done);
    assert!(report.cancelled);
    assert_eq!(report.outstanding(), 0);
    assert!(report.summary.cancelled > 0);
    assert_eq!(
        report.summary.visited + report.summary.cancelled,
        report.tasks_submitted
    );
    assert_eq!(fetcher.calls().len() as u64, report.summary.visited);
}

fn test_config(workers: usize) -> Config {
    let mut config = Config::default();
    config.crawler.workers = workers;
    config.crawler.fetch_timeout_ms = Some(5_000);
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_full_http_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
                <a href="/page1">Page 1</a>
                <a href="page2#top">Page 2</a>
                <a href="/missing">Missing</a>
                <a href="/logo.png">Logo</a>
                <a href="mailto:someone@example.com">Mail</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><head><title>Page 1</title></head><body>
                <a href="/">Home</a>
                <a href="/page2">Page 2</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(
            r#"<html><head><title>Page 2</title></head><body>No links</body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", base_url);
    let report = crawl(&seed, &test_config(4)).await.unwrap();

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.summary.visited, 5);
    assert_eq!(report.summary.discovered, 5);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(
        report.summary.failures_by_kind.get(&FailureKind::Protocol),
        Some(&2)
    );

    let home = report.records.iter().find(|r| r.url == seed).unwrap();
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.link_count, 4);

    let missing = report
        .records
        .iter()
        .find(|r| r.url.ends_with("/missing"))
        .unwrap();
    assert_eq!(missing.outcome, PageOutcome::Failure(FetchError::Status(404)));

    let logo = report
        .records
        .iter()
        .find(|r| r.url.ends_with("/logo.png"))
        .unwrap();
    assert!(matches!(
        logo.outcome,
        PageOutcome::Failure(FetchError::ContentType(ref ct)) if ct.starts_with("image/png")
    ));
}

#[tokio::test]
async fn test_http_seed_failure_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/", mock_server.uri());
    let err = crawl(&seed, &test_config(2)).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::SeedFailed {
            source: FetchError::Status(503),
            ..
        }
    ));
}

#[tokio::test]
async fn test_seed_with_fragment_is_not_refetched_via_self_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/">Home</a>
                <a href="/?utm_source=x">Tracked home</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/#top", mock_server.uri());
    let report = crawl(&seed, &test_config(2)).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    assert_eq!(report.seed, format!("{}/", mock_server.uri()));
    assert_eq!(report.summary.visited, 1);
    assert_eq!(report.summary.discovered, 1);
    let urls: Vec<_> = report.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![report.seed.as_str()]);
}

#[tokio::test]
async fn test_http_fetcher_resolves_links_against_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/index.html"))
        .respond_with(html(
            r#"<html><head><title> Docs </title></head><body>
                <a href="intro.html">Intro</a>
                <a href="../about?utm_source=feed&b=2&a=1">About</a>
                <a href="https://other.example.org/x">External</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::from_config(&Config::default().user_agent, None).unwrap();
    let page = fetcher
        .fetch(&format!("{}/docs/index.html", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(page.title.as_deref(), Some("Docs"));
    assert_eq!(
        page.links,
        vec![
            format!("{}/docs/intro.html", mock_server.uri()),
            format!("{}/about?a=1&b=2", mock_server.uri()),
            "https://other.example.org/x".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_same_host_http_crawl_stays_local() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/local">Local</a>
                <a href="http://unreachable.invalid/">Remote</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/local"))
        .respond_with(html("<html><body></body></html>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(2);
    config.crawler.same_host = true;

    let report = crawl(&format!("{}/", mock_server.uri()), &config)
        .await
        .unwrap();

    assert_eq!(report.summary.visited, 2);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.skipped, 1);
}
