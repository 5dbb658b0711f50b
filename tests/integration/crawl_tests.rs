//! Integration tests for the crawler
//!
//! These tests drive the full crawl cycle end-to-end, against wiremock mock
//! servers (direct and proxy strategies) and against an in-memory fixture
//! strategy.

use async_trait::async_trait;
use scraper::Html;
use sitesift::config::{
    load_config, Config, ContentFilters, CrawlRequest, DataTypeSelector, UserAgentConfig,
};
use sitesift::crawler::{
    build_http_client, expand, run_crawl, Coordinator, CrawlEvent, ExpansionPolicy, FetchError,
    FetchStrategy, Frontier, HttpStrategy, RedirectScope, Transport,
};
use sitesift::output::{DataType, HistoryStore, MemoryHistory, MAX_HISTORY};
use sitesift::RunState;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{any, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory strategy serving canned bodies keyed by URL
#[derive(Default)]
struct FixtureStrategy {
    pages: HashMap<String, String>,
    fetched: Arc<Mutex<Vec<String>>>,
    panic_on: Option<String>,
    cancel_on: Option<(String, CancellationToken)>,
}

impl FixtureStrategy {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn fetched_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.fetched.clone()
    }
}

#[async_trait]
impl FetchStrategy for FixtureStrategy {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, target: &Url) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(target.to_string());

        if self.panic_on.as_deref() == Some(target.as_str()) {
            panic!("fixture exploded on {}", target);
        }
        if let Some((url, token)) = &self.cancel_on {
            if url == target.as_str() {
                token.cancel();
            }
        }

        self.pages
            .get(target.as_str())
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

fn client() -> reqwest::Client {
    client_with(RedirectScope::SameOrigin, Duration::from_secs(5))
}

fn client_with(redirects: RedirectScope, timeout: Duration) -> reqwest::Client {
    build_http_client(&UserAgentConfig::default(), timeout, redirects)
        .expect("Failed to build HTTP client")
}

/// Transport with short backoff so failure paths stay fast
fn fast_transport(strategies: Vec<Box<dyn FetchStrategy>>) -> Transport {
    Transport::new(strategies)
        .with_max_attempts(2)
        .with_attempt_timeout(Duration::from_secs(2))
        .with_backoff_step(Duration::from_millis(1))
}

fn direct_transport() -> Transport {
    fast_transport(vec![Box::new(HttpStrategy::direct(client()))])
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}

fn headings_and_paragraphs() -> ContentFilters {
    ContentFilters {
        headings: true,
        paragraphs: true,
        images: false,
        links: false,
        data_type: DataTypeSelector::Text,
    }
}

#[tokio::test]
async fn test_scenario_a_single_page_extraction() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<!DOCTYPE html><html><body>
            <h1>First</h1><p>one</p><h1>Second</h1><p>two</p><p>three</p>
        </body></html>"#,
    )
    .await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()))
        .unwrap()
        .with_max_pages(1)
        .with_page_depth(1)
        .with_filters(headings_and_paragraphs());
    let mut coordinator = Coordinator::new(request, direct_transport());

    let result = coordinator.run().await;

    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.progress, 100.0);
    assert_eq!(result.items_of(DataType::Heading).count(), 2);
    assert_eq!(result.items_of(DataType::Paragraph).count(), 3);
    assert_eq!(result.item_count(), 5);
    assert!(result.has_log_containing("Crawl finished: 1 page(s), 5 item(s) collected"));
}

#[tokio::test]
async fn test_scenario_b_every_strategy_fails() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transport = fast_transport(vec![
        Box::new(HttpStrategy::direct(client())),
        Box::new(
            HttpStrategy::all_origins(client()).with_endpoint(format!("{}/allorigins/raw", server.uri())),
        ),
        Box::new(HttpStrategy::jina(client()).with_endpoint(format!("{}/jina/", server.uri()))),
    ]);
    let request = CrawlRequest::new(&format!("{}/broken", server.uri())).unwrap();
    let mut coordinator = Coordinator::new(request, transport);

    let result = coordinator.run().await;

    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.pages_scraped, 0);
    assert!(result.items.is_empty());
    assert!(result.has_log_containing("failed: HTTP 500"));
    assert!(result.has_log_containing("fetch failed after 6 attempts"));

    let paths = requested_paths(&server).await;
    assert_eq!(paths.len(), 6);
    assert_eq!(paths.iter().filter(|p| *p == "/broken").count(), 2);
    assert_eq!(paths.iter().filter(|p| *p == "/allorigins/raw").count(), 2);
    assert_eq!(paths.iter().filter(|p| p.starts_with("/jina/")).count(), 2);
}

#[tokio::test]
async fn test_scenario_c_same_domain_expansion() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;

    let home = format!(
        r#"<html><body>
            <a href="/one">One</a>
            <a href="/two">Two</a>
            <a href="/three">Three</a>
            <a href="{}/elsewhere">Elsewhere</a>
        </body></html>"#,
        foreign.uri()
    );
    mount_page(&server, "/", &home).await;
    for child in ["/one", "/two", "/three"] {
        mount_page(&server, child, "<html><body><p>child</p></body></html>").await;
    }
    Mock::given(any())
        .respond_with(html_response("<html><body><p>foreign</p></body></html>"))
        .expect(0)
        .mount(&foreign)
        .await;

    // The frontier receives exactly the three same-origin children at depth 2
    let start = Url::parse(&format!("{}/", server.uri())).unwrap();
    let policy = ExpansionPolicy {
        start_url: start.clone(),
        same_domain_only: true,
        page_depth: 2,
    };
    let entries = expand(&Html::parse_document(&home), &start, 1, &policy, &Frontier::new());
    let children: Vec<_> = entries.iter().map(|e| (e.url.path(), e.depth)).collect();
    assert_eq!(children, vec![("/one", 2), ("/two", 2), ("/three", 2)]);

    let request = CrawlRequest::new(start.as_str())
        .unwrap()
        .with_page_depth(2)
        .with_max_pages(5);
    let mut coordinator = Coordinator::new(request, direct_transport());

    let result = coordinator.run().await;

    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.pages_scraped, 4);
    assert_eq!(requested_paths(&server).await, vec!["/", "/one", "/two", "/three"]);
    assert!(requested_paths(&foreign).await.is_empty());
}

/// Home page linking to `/r`, which redirects to `/secret` on `foreign`
async fn mount_redirecting_site(server: &MockServer, foreign: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><body><h1>Home</h1><a href="/r">Moved</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/r"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/secret", foreign.uri())),
        )
        .mount(server)
        .await;
    mount_page(
        foreign,
        "/secret",
        r#"<html><body><h1>Secret</h1><a href="/deeper">Deeper</a></body></html>"#,
    )
    .await;
}

#[tokio::test]
async fn test_same_domain_crawl_does_not_follow_foreign_redirect() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_redirecting_site(&server, &foreign).await;

    let mut config = Config::default();
    config.transport.strategies = vec!["direct".to_string()];
    config.transport.max_attempts = 2;
    config.transport.backoff_step_ms = 1;

    let request = CrawlRequest::new(&format!("{}/", server.uri()))
        .unwrap()
        .with_page_depth(3)
        .with_max_pages(10)
        .with_same_domain_only(true)
        .with_filters(headings_and_paragraphs());
    let result = run_crawl(request, &config).await.unwrap();

    assert_eq!(result.state, RunState::Completed);
    assert!(requested_paths(&foreign).await.is_empty());
    // Not retried: the refusal cannot change on another attempt
    assert_eq!(requested_paths(&server).await, vec!["/", "/r"]);
    assert_eq!(result.pages_scraped, 1);

    let headings: Vec<_> = result
        .items_of(DataType::Heading)
        .map(|item| item.content.as_str())
        .collect();
    assert_eq!(headings, vec!["Home"]);
    assert!(result.has_log_containing("redirect to another origin not followed"));
    assert!(result.has_log_containing(&format!("Skipped {}/r", server.uri())));
}

#[tokio::test]
async fn test_all_domains_crawl_follows_foreign_redirect() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_redirecting_site(&server, &foreign).await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()))
        .unwrap()
        .with_page_depth(2)
        .with_max_pages(10)
        .with_same_domain_only(false)
        .with_filters(headings_and_paragraphs());
    let transport = fast_transport(vec![Box::new(HttpStrategy::direct(client_with(
        RedirectScope::Any,
        Duration::from_secs(5),
    )))]);
    let mut coordinator = Coordinator::new(request, transport);

    let result = coordinator.run().await;

    assert_eq!(result.state, RunState::Completed);
    assert_eq!(requested_paths(&foreign).await, vec!["/secret"]);
    assert!(result
        .items_of(DataType::Heading)
        .any(|item| item.content == "Secret"));
}

#[tokio::test]
async fn test_same_origin_redirect_is_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/old">Old</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<html><body><h2>New home</h2></body></html>").await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()))
        .unwrap()
        .with_page_depth(2)
        .with_filters(headings_and_paragraphs());
    let mut coordinator = Coordinator::new(request, direct_transport());

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 2);
    assert_eq!(requested_paths(&server).await, vec!["/", "/old", "/new"]);
    assert!(result
        .items_of(DataType::Heading)
        .any(|item| item.content == "New home"));
}

#[tokio::test]
async fn test_client_timeout_reported_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_response("<html></html>").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let strategy = HttpStrategy::direct(client_with(
        RedirectScope::SameOrigin,
        Duration::from_millis(50),
    ));
    let target = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    let result = strategy.fetch(&target).await;

    assert!(matches!(result, Err(FetchError::Timeout)));
}

#[tokio::test]
async fn test_scenario_d_relative_image_resolved() {
    let strategy = FixtureStrategy::new(&[(
        "https://x.test/p",
        r#"<html><body><img src="/img/a.png" alt="A"></body></html>"#,
    )]);
    let filters = ContentFilters {
        data_type: DataTypeSelector::Images,
        ..ContentFilters::default()
    };
    let request = CrawlRequest::new("https://x.test/p")
        .unwrap()
        .with_filters(filters);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]));

    let result = coordinator.run().await;

    let images: Vec<_> = result.items_of(DataType::Image).collect();
    assert_eq!(images.len(), 1);
    assert!(images[0].content.starts_with("https://x.test/img/a.png"));
    assert_eq!(images[0].source_url, "https://x.test/p");
}

#[tokio::test]
async fn test_scenario_e_plain_text_body() {
    let body = format!("  {}  ", "word ".repeat(100));
    let strategy = FixtureStrategy::new(&[("https://x.test/", body.as_str())]);
    let filters = ContentFilters {
        headings: true,
        paragraphs: true,
        images: true,
        links: true,
        data_type: DataTypeSelector::All,
    };
    let request = CrawlRequest::new("https://x.test/")
        .unwrap()
        .with_filters(filters);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]));

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.item_count(), 1);
    let item = &result.items[0];
    assert_eq!(item.data_type, DataType::Text);
    assert_eq!(item.content.chars().count(), 200);
    assert!(body.trim().starts_with(&item.content));
}

#[tokio::test]
async fn test_allorigins_fallback_after_direct_failure() {
    let server = MockServer::start().await;
    let target = format!("{}/blocked", server.uri());

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param("url", target.as_str()))
        .respond_with(html_response("<html><body><h1>Via proxy</h1></body></html>"))
        .mount(&server)
        .await;

    let transport = fast_transport(vec![
        Box::new(HttpStrategy::direct(client())),
        Box::new(HttpStrategy::all_origins(client()).with_endpoint(format!("{}/raw", server.uri()))),
    ]);
    let mut coordinator = Coordinator::new(CrawlRequest::new(&target).unwrap(), transport);

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.items[0].content, "Via proxy");
    // The item is attributed to the page, not the proxy
    assert_eq!(result.items[0].source_url, target);
    assert!(result.has_log_containing("attempt 2/2 via direct failed: HTTP 403"));
    assert!(result.has_log_containing("attempt 1/2 via allorigins succeeded"));
}

#[tokio::test]
async fn test_jina_reader_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/reader/http:/+x\.test/article$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Title: Article\n\nMarkdown body"))
        .mount(&server)
        .await;

    let transport = fast_transport(vec![Box::new(
        HttpStrategy::jina(client()).with_endpoint(format!("{}/reader/", server.uri())),
    )]);
    let mut coordinator =
        Coordinator::new(CrawlRequest::new("https://x.test/article").unwrap(), transport);

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.item_count(), 1);
    assert_eq!(result.items[0].data_type, DataType::Text);
    assert!(result.items[0].content.starts_with("Title: Article"));
}

#[tokio::test]
async fn test_no_url_fetched_twice() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a><a href="/#top">Self</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/a",
        r#"<html><body><a href="/">Home</a><a href="/b">B</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/b",
        r#"<html><body><a href="/a">A</a><a href="/">Home</a></body></html>"#,
    )
    .await;

    let request = CrawlRequest::new(&format!("{}/", server.uri()))
        .unwrap()
        .with_page_depth(4)
        .with_max_pages(20);
    let mut coordinator = Coordinator::new(request, direct_transport());

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 3);
    let mut paths = requested_paths(&server).await;
    paths.sort();
    assert_eq!(paths, vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let strategy = FixtureStrategy::new(&[
        ("https://x.test/", r#"<html><body><a href="/1">1</a></body></html>"#),
        ("https://x.test/1", r#"<html><body><a href="/2">2</a></body></html>"#),
        ("https://x.test/2", r#"<html><body><a href="/3">3</a></body></html>"#),
        ("https://x.test/3", "<html><body><p>deep</p></body></html>"),
    ]);
    let fetched = strategy.fetched_log();
    let request = CrawlRequest::new("https://x.test/")
        .unwrap()
        .with_page_depth(2)
        .with_max_pages(10);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]));

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 2);
    assert_eq!(
        *fetched.lock().unwrap(),
        vec!["https://x.test/", "https://x.test/1"]
    );
}

#[tokio::test]
async fn test_page_budget_respected() {
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    let home = format!("<html><body>{}</body></html>", links);
    let mut pages = vec![("https://x.test/".to_string(), home)];
    for i in 0..10 {
        pages.push((
            format!("https://x.test/p{}", i),
            "<html><body><p>leaf</p></body></html>".to_string(),
        ));
    }
    let page_refs: Vec<(&str, &str)> = pages.iter().map(|(u, b)| (u.as_str(), b.as_str())).collect();

    let strategy = FixtureStrategy::new(&page_refs);
    let fetched = strategy.fetched_log();
    let request = CrawlRequest::new("https://x.test/")
        .unwrap()
        .with_page_depth(2)
        .with_max_pages(3);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]));

    let result = coordinator.run().await;

    assert_eq!(result.pages_scraped, 3);
    assert_eq!(fetched.lock().unwrap().len(), 3);
    assert_eq!(result.progress, 100.0);
}

#[tokio::test]
async fn test_disabled_filters_yield_no_items_of_their_type() {
    let page = r#"<html><body>
        <h1>Head</h1><p>Para</p><img src="/i.png"><a href="/l">L</a>
        <table><tr><td>cell</td></tr></table>
    </body></html>"#;
    let strategy = FixtureStrategy::new(&[("https://x.test/", page)]);
    let filters = ContentFilters {
        headings: false,
        paragraphs: true,
        images: false,
        links: false,
        data_type: DataTypeSelector::Links,
    };
    let request = CrawlRequest::new("https://x.test/")
        .unwrap()
        .with_filters(filters);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]));

    let result = coordinator.run().await;

    assert_eq!(result.items_of(DataType::Heading).count(), 0);
    assert_eq!(result.items_of(DataType::Image).count(), 0);
    assert_eq!(result.items_of(DataType::Table).count(), 0);
    assert_eq!(result.items_of(DataType::Paragraph).count(), 1);
    // The links selector turns the link pass on
    assert_eq!(result.items_of(DataType::Link).count(), 1);
}

#[tokio::test]
async fn test_deterministic_results() {
    let pages = [
        (
            "https://x.test/",
            r#"<html><body><h1>H</h1><p>P</p><a href="/next">next</a></body></html>"#,
        ),
        (
            "https://x.test/next",
            "<html><body><table><tr><td>a</td><td>b</td></tr></table></body></html>",
        ),
    ];

    let mut runs = Vec::new();
    for _ in 0..2 {
        let request = CrawlRequest::new("https://x.test/")
            .unwrap()
            .with_page_depth(2);
        let mut coordinator =
            Coordinator::new(request, fast_transport(vec![Box::new(FixtureStrategy::new(&pages))]));
        let result = coordinator.run().await;
        runs.push(
            result
                .items
                .iter()
                .map(|i| (i.data_type, i.content.clone(), i.source_url.clone()))
                .collect::<Vec<_>>(),
        );
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].len(), 3);
}

#[tokio::test]
async fn test_cancellation_mid_run_keeps_items() {
    let token = CancellationToken::new();
    let mut strategy = FixtureStrategy::new(&[
        (
            "https://x.test/",
            r#"<html><body><h1>Home</h1><a href="/a">A</a><a href="/b">B</a></body></html>"#,
        ),
        ("https://x.test/a", "<html><body><h1>A</h1></body></html>"),
        ("https://x.test/b", "<html><body><h1>B</h1></body></html>"),
    ]);
    strategy.cancel_on = Some(("https://x.test/a".to_string(), token.clone()));
    let fetched = strategy.fetched_log();

    let history = Arc::new(MemoryHistory::new());
    let request = CrawlRequest::new("https://x.test/")
        .unwrap()
        .with_page_depth(2);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]))
        .with_cancellation(token)
        .with_history(history.clone());

    let result = coordinator.run().await;

    assert_eq!(result.state, RunState::Cancelled);
    assert_eq!(result.pages_scraped, 2);
    assert_eq!(result.item_count(), 2);
    assert!(result.progress < 100.0);
    assert!(result.has_log_containing("Crawl cancelled"));
    assert!(!fetched.lock().unwrap().contains(&"https://x.test/b".to_string()));

    let entries = history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, RunState::Cancelled);
}

#[tokio::test]
async fn test_panicking_strategy_is_fatal() {
    let mut strategy = FixtureStrategy::new(&[
        (
            "https://x.test/",
            r#"<html><body><h1>Home</h1><a href="/boom">Boom</a></body></html>"#,
        ),
        ("https://x.test/boom", "<html></html>"),
    ]);
    strategy.panic_on = Some("https://x.test/boom".to_string());

    let history = Arc::new(MemoryHistory::new());
    let request = CrawlRequest::new("https://x.test/")
        .unwrap()
        .with_page_depth(2);
    let mut coordinator = Coordinator::new(request, fast_transport(vec![Box::new(strategy)]))
        .with_history(history.clone());

    let result = coordinator.run().await;

    assert_eq!(result.state, RunState::Fatal);
    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.items[0].content, "Home");
    assert!(result.has_log_containing("fixture exploded"));
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_history_keeps_most_recent_runs() {
    let history = Arc::new(MemoryHistory::new());
    let store: Arc<dyn HistoryStore> = history.clone();

    let mut coordinator = Coordinator::new(
        CrawlRequest::new("https://x.test/").unwrap(),
        fast_transport(vec![Box::new(FixtureStrategy::new(&[(
            "https://x.test/",
            "<html><body><p>x</p></body></html>",
        )]))]),
    )
    .with_history(store);

    for _ in 0..(MAX_HISTORY + 2) {
        let result = coordinator.run().await;
        assert_eq!(result.state, RunState::Completed);
    }

    let entries = history.entries();
    assert_eq!(entries.len(), MAX_HISTORY);
    assert!(entries.iter().all(|e| e.items_found == 1));
    assert!(entries[0].created_at >= entries[MAX_HISTORY - 1].created_at);
}

#[tokio::test]
async fn test_events_streamed_during_run() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let strategy = FixtureStrategy::new(&[("https://x.test/", "<html><body><p>x</p></body></html>")]);
    let mut coordinator = Coordinator::new(
        CrawlRequest::new("https://x.test/").unwrap(),
        fast_transport(vec![Box::new(strategy)]),
    )
    .with_events(tx);

    let result = coordinator.run().await;

    let mut logs = 0;
    let mut last_state = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            CrawlEvent::Log(_) => logs += 1,
            CrawlEvent::State(state) => last_state = Some(state),
            CrawlEvent::Progress(p) => assert!((0.0..=100.0).contains(&p)),
        }
    }
    assert_eq!(logs, result.logs.len());
    assert_eq!(last_state, Some(RunState::Completed));
}

#[tokio::test]
async fn test_run_crawl_from_config_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body><h2>Configured</h2></body></html>").await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
max-pages = 1
page-depth = 1

[filters]
paragraphs = false

[transport]
strategies = ["direct"]
max-attempts = 1
attempt-timeout-ms = 2000
backoff-step-ms = 0
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let request = CrawlRequest::from_config(&server.uri(), &config).unwrap();
    let result = run_crawl(request, &config).await.unwrap();

    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.items[0].content, "Configured");
    assert_eq!(result.items[0].data_type, DataType::Heading);
}

#[test]
fn test_invalid_start_url_rejected_before_run() {
    assert!(CrawlRequest::new("").is_err());
    assert!(CrawlRequest::new("   ").is_err());
    assert!(CrawlRequest::new("example.com:notaport/").is_err());
}
