//! End-to-end tests running the reqwest-backed engine against a mock server

use seekora::config::{Config, RobotsFailurePolicy};
use seekora::output::{write_results, CRAWL_PATHS_FILE, VOTE_COUNTS_FILE};
use seekora::{CrawlEngine, PageState};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = Some(2);
    config.crawler.progress_interval = 0;
    config.retry.backoff_ms = 10;
    config.retry.request_timeout_secs = 5;
    config
}

fn html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_mock_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 404, "").await;
    mount_page(&server, "/", html(&["/about", "https://elsewhere.org/"])).await;
    mount_page(&server, "/about", html(&["/"])).await;

    let engine = CrawlEngine::from_config(test_config()).unwrap();
    let results = engine.run(&base, 2).await.unwrap();

    let home = format!("{}/", base);
    let about = format!("{}/about", base);
    assert_eq!(
        results.graph[&home],
        vec![about.clone(), "https://elsewhere.org/".to_string()]
    );
    assert_eq!(results.graph[&about], vec![home.clone()]);

    // Two internal links, one external endorsement.
    assert!((results.votes[base.as_str()] - 0.2).abs() < 1e-9);
    assert_eq!(results.votes["https://elsewhere.org"], 1.0);
    assert_eq!(results.statistics.count(PageState::Processed), 2);
}

#[tokio::test]
async fn test_rate_limited_page_is_retried() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 404, "").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(&["/next"])))
        .expect(1)
        .mount(&server)
        .await;

    let engine = CrawlEngine::from_config(test_config()).unwrap();
    let results = engine.run(&base, 1).await.unwrap();

    assert_eq!(results.graph.len(), 1);
    assert_eq!(results.graph[&format!("{}/", base)], vec![format!("{}/next", base)]);
    assert_eq!(results.statistics.retries, 2);
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 200, "User-agent: *\nDisallow: /private\n").await;
    mount_page(&server, "/", html(&["/private", "/public"])).await;
    mount_page(&server, "/public", html(&[])).await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = CrawlEngine::from_config(test_config()).unwrap();
    let results = engine.run(&base, 2).await.unwrap();

    let private = format!("{}/private", base);
    assert!(results.graph[&format!("{}/", base)].contains(&private));
    assert!(!results.graph.contains_key(&private));
    assert!(results.graph.contains_key(&format!("{}/public", base)));
    assert_eq!(results.statistics.count(PageState::Disallowed), 1);
}

#[tokio::test]
async fn test_robots_server_error_denies_site() {
    let server = MockServer::start().await;

    mount_robots(&server, 500, "").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let engine = CrawlEngine::from_config(test_config()).unwrap();
    let results = engine.run(&server.uri(), 1).await.unwrap();

    assert!(results.graph.is_empty());
    assert_eq!(results.statistics.robots_failures, 1);
}

#[tokio::test]
async fn test_robots_server_error_with_allow_policy() {
    let server = MockServer::start().await;

    mount_robots(&server, 500, "").await;
    mount_page(&server, "/", html(&[])).await;

    let mut config = test_config();
    config.robots.on_failure = RobotsFailurePolicy::Allow;
    let engine = CrawlEngine::from_config(config).unwrap();
    let results = engine.run(&server.uri(), 1).await.unwrap();

    assert!(results.graph.contains_key(&format!("{}/", server.uri())));
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("user-agent", "TestBot/9.9"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "9.9".to_string();
    let engine = CrawlEngine::from_config(config).unwrap();
    let results = engine.run(&server.uri(), 1).await.unwrap();

    assert_eq!(results.graph.len(), 1);
}

#[tokio::test]
async fn test_results_written_to_disk() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 404, "").await;
    mount_page(&server, "/", html(&["https://b.com/y"])).await;

    let engine = CrawlEngine::from_config(test_config()).unwrap();
    let results = engine.run(&base, 1).await.unwrap();

    let dir = TempDir::new().unwrap();
    let paths = write_results(&results, dir.path().join("out")).unwrap();
    assert!(paths.crawl_paths.ends_with(CRAWL_PATHS_FILE));
    assert!(paths.vote_counts.ends_with(VOTE_COUNTS_FILE));

    let graph: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.crawl_paths).unwrap()).unwrap();
    assert_eq!(graph[format!("{}/", base)][0], "https://b.com/y");

    let votes: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.vote_counts).unwrap()).unwrap();
    assert_eq!(votes["https://b.com"], 1.0);
}
