//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the real
//! HTTP fetcher through the traversal engine end-to-end.

use broken_links::config::{Config, SeedSpec};
use broken_links::crawler::{crawl, Engine, HttpFetcher};
use broken_links::output::{report_path, BrokenLinkRecord, CrawlReport, LinkStatus, MemorySink, TransportErrorKind};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration: no throttling, no retries, no robots.txt
fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = 4;
    config.crawler.timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config.retry.enabled = false;
    config.throttle.enabled = false;
    config.scope.obey_robots = false;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn run(config: &Config, spec: SeedSpec) -> (CrawlReport, Vec<BrokenLinkRecord>) {
    let fetcher = Arc::new(HttpFetcher::new(config).expect("Failed to build fetcher"));
    let sink = Arc::new(MemorySink::new());
    let report = Engine::new(spec, fetcher, sink.clone()).run().await;
    (report, sink.records())
}

fn seed_spec(seed: String) -> SeedSpec {
    SeedSpec::builder().seed(seed).build().expect("Invalid seed")
}

#[tokio::test]
async fn test_reports_404_and_500() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/en/home",
        r#"<html><body>
            <a href="/en/about">About</a>
            <a href="/en/missing">Missing</a>
            <a href="/en/error">Error</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/en/about", "<html><body>About us</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/en/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (report, mut records) = run(&test_config(), seed_spec(format!("{}/en/home", base))).await;
    records.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, format!("{}/en/error", base));
    assert_eq!(records[0].status, LinkStatus::Http(500));
    assert_eq!(records[1].url, format!("{}/en/missing", base));
    assert_eq!(records[1].status, LinkStatus::Http(404));
    assert_eq!(records[1].previous_page, format!("{}/en/home", base));
    assert_eq!(records[1].previous_link_href, "/en/missing");
    assert_eq!(records[1].previous_link_text, "Missing");

    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.pages_ok, 2);
}

#[tokio::test]
async fn test_relative_links_are_resolved() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/en/home",
        r#"<html><body><a href="about">About</a><a href="../en/team">Team</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/en/about", "<html></html>").await;

    let (_, records) = run(&test_config(), seed_spec(format!("{}/en/home", base))).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/en/team", base));
    assert_eq!(records[0].previous_link_href, "../en/team");
}

#[tokio::test]
async fn test_trailing_slash_links_fetched_as_written() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/en/home",
        r#"<html><body><a href="/en/about/">About</a><a href="/en/about">Again</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/en/about/"))
        .respond_with(html("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let (report, records) = run(&test_config(), seed_spec(format!("{}/en/home", base))).await;

    assert!(records.is_empty());
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.duplicates, 1);
}

#[tokio::test]
async fn test_prefix_restriction() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/en/home",
        r#"<html><body><a href="/fr/about">FR</a><a href="/en/about">EN</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/en/about", "<html></html>").await;
    Mock::given(method("GET"))
        .and(path("/fr/about"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let spec = SeedSpec::builder()
        .seed(format!("{}/en/home", base))
        .prefix("en")
        .build()
        .unwrap();
    let (report, records) = run(&test_config(), spec).await;

    assert!(records.is_empty());
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.out_of_scope, 1);
}

#[tokio::test]
async fn test_off_domain_and_mailto_links_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="mailto:info@example.com">Mail</a>
            <a href="https://elsewhere.invalid/page">Elsewhere</a>
        </body></html>"#,
    )
    .await;

    let (report, records) = run(&test_config(), seed_spec(base.clone())).await;

    assert!(records.is_empty());
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.out_of_scope, 2);
}

#[tokio::test]
async fn test_robots_txt_is_honored() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/private/page">Private</a><a href="/public">Public</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/public", "<html></html>").await;
    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.scope.obey_robots = true;
    let (report, records) = run(&config, seed_spec(base)).await;

    assert!(records.is_empty());
    assert_eq!(report.robots_skipped, 1);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_accept_language_follows_page_lang() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("accept-language", "en"))
        .respond_with(html(
            r#"<html lang="fr"><body><a href="/fr/contact">Contact</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fr/contact"))
        .and(header("accept-language", "fr"))
        .respond_with(html("<html lang=\"fr\"></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let (report, records) = run(&test_config(), seed_spec(base)).await;

    assert!(records.is_empty(), "unexpected records: {:?}", records);
    assert_eq!(report.pages_ok, 2);
}

#[tokio::test]
async fn test_accept_language_override() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("accept-language", "de"))
        .respond_with(html(
            r#"<html lang="fr"><body><a href="/next">Next</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .and(header("accept-language", "de"))
        .respond_with(html("<html></html>"))
        .mount(&server)
        .await;

    let spec = SeedSpec::builder()
        .seed(base)
        .accept_language(Some("de".to_string()))
        .build()
        .unwrap();
    let (report, records) = run(&test_config(), spec).await;

    assert!(records.is_empty(), "unexpected records: {:?}", records);
    assert_eq!(report.pages_ok, 2);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Reserve a port, then close it so nothing is listening
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    mount_page(
        &server,
        "/",
        &format!(
            r#"<html><body><a href="http://127.0.0.1:{}/down">Down</a></body></html>"#,
            closed_port
        ),
    )
    .await;

    let spec = SeedSpec::builder()
        .seed(base)
        .domain("127.0.0.1")
        .build()
        .unwrap();
    let (report, records) = run(&test_config(), spec).await;

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].status,
        LinkStatus::Transport(TransportErrorKind::Connect)
    );
    assert_eq!(records[0].status.to_string(), "transport-error:connect");
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<html><body><a href="/flaky">Flaky</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "<html></html>").await;

    let mut config = test_config();
    config.retry.enabled = true;
    config.retry.retry_delay_ms = 10;
    let (report, records) = run(&config, seed_spec(base)).await;

    assert!(records.is_empty());
    assert_eq!(report.pages_ok, 2);
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<html><body><a href="/old">Old</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/new/",
        r#"<html><body><a href="gone">Gone</a></body></html>"#,
    )
    .await;

    let (_, records) = run(&test_config(), seed_spec(base.clone())).await;

    // Relative links resolve against the final URL after redirects
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/new/gone", base));
    assert_eq!(records[0].previous_page, format!("{}/new/", base));
}

#[tokio::test]
async fn test_non_html_content_not_scanned() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<html><body><a href="/data.json">Data</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"href": "<a href='/nope'>x</a>"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let (report, records) = run(&test_config(), seed_spec(base)).await;

    assert!(records.is_empty());
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_crawl_writes_csv_report() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = tempfile::tempdir().unwrap();

    mount_page(
        &server,
        "/en/home",
        r#"<html><body><a href="/en/missing">Missing, really</a></body></html>"#,
    )
    .await;

    let mut config = test_config();
    config.scope.seeds = vec![format!("{}/en/home", base)];
    config.output.directory = dir.path().display().to_string();
    config.output.csv_name = "site".to_string();

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.broken_links, 1);

    let content = std::fs::read_to_string(report_path(dir.path(), "site")).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("url,previous_page,previous_link_href,previous_link_text,status")
    );
    assert_eq!(
        lines.next(),
        Some(
            format!(
                "{base}/en/missing,{base}/en/home,/en/missing,\"Missing, really\",404"
            )
            .as_str()
        )
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn test_crawl_rejects_missing_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config();
    config.output.directory = dir.path().display().to_string();

    assert!(crawl(config).await.is_err());
}
