//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: CLI arguments → HTTP requests → JSON lines

use clap::Parser;
use feedbin_tools::cli::{Cli, Runner};
use feedbin_tools::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::{self, Write};
use tempfile::TempDir;
use wiremock::matchers::{basic_auth, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    server: MockServer,
    dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn base_url(&self) -> String {
        format!("{}/v2/", self.server.uri())
    }

    fn url(&self, rest: &str) -> String {
        format!("{}/v2/{rest}", self.server.uri())
    }

    /// Runner against the mock server with no settings file and no env
    fn runner(&self, args: &[&str]) -> Runner {
        let config = self.dir.path().join("absent.yaml");
        let mut argv = vec![
            "feedbin-tools".to_string(),
            "--base-url".to_string(),
            self.base_url(),
            "--config".to_string(),
            config.display().to_string(),
        ];
        argv.extend(args.iter().map(|a| (*a).to_string()));
        Runner::new(Cli::try_parse_from(argv).unwrap()).with_env(|_| None)
    }

    async fn run(&self, args: &[&str]) -> (feedbin_tools::Result<u64>, Vec<Value>) {
        let mut out = Vec::new();
        let result = self.runner(args).run_with_writer(&mut out).await;
        (result, lines(&out))
    }

    fn next_link(&self, rest: &str) -> String {
        format!("<{}>; rel=\"next\"", self.url(rest))
    }
}

fn lines(out: &[u8]) -> Vec<Value> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn without_stamp(records: &[Value]) -> Vec<Value> {
    records
        .iter()
        .map(|r| {
            let mut r = r.clone();
            if let Some(fields) = r.as_object_mut() {
                assert!(fields.remove("retrieved_at").is_some(), "missing stamp");
            }
            r
        })
        .collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_entries_walk_all_pages() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("entries.json?page=2").as_str())
                .insert_header("X-Feedbin-Record-Count", "3")
                .set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h.run(&["entries"]).await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(
        without_stamp(&records),
        vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]
    );
}

#[tokio::test]
async fn test_entries_next_link_back_to_first_page_is_not_refetched() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("entries.json?page=2").as_str())
                .set_body_json(json!([{"id": 1}])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("entries.json").as_str())
                .set_body_json(json!([{"id": 2}])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h.run(&["entries"]).await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(
        without_stamp(&records),
        vec![json!({"id": 1}), json!({"id": 2})]
    );
}

#[tokio::test]
async fn test_entries_filters_reapplied_to_next_page_and_read_echoed() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("read", "false"))
        .and(query_param("mode", "extended"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("entries.json?page=2").as_str())
                .set_body_json(json!([{"id": 1}])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("page", "2"))
        .and(query_param("read", "false"))
        .and(query_param("mode", "extended"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 2}])))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h
        .run(&["entries", "--read", "false", "--extended"])
        .await;

    assert_eq!(result.unwrap(), 2);
    for record in &records {
        assert_eq!(record["is_read"], json!(false));
        assert!(record["retrieved_at"].as_str().unwrap().ends_with("+00:00"));
    }
}

#[tokio::test]
async fn test_limit_stops_before_next_page() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/feeds/42/entries.json"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("feeds/42/entries.json?page=2").as_str())
                .set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/feeds/42/entries.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .expect(0)
        .mount(&h.server)
        .await;

    let (result, records) = h.run(&["feed", "42", "--limit", "2"]).await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_subscriptions_since_is_normalized() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/subscriptions.json"))
        .and(query_param("since", "2024-01-01T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 9, "feed_id": 3}])))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h
        .run(&["subscriptions", "--since", "2024-01-01"])
        .await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(without_stamp(&records), vec![json!({"id": 9, "feed_id": 3})]);
}

#[tokio::test]
async fn test_bad_since_fails_before_any_request() {
    let h = Harness::start().await;

    let (result, records) = h
        .run(&["subscriptions", "--since", "not-a-date"])
        .await;

    assert!(matches!(result.unwrap_err(), Error::DateParse { .. }));
    assert!(records.is_empty());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_info_emits_object() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/feeds/7.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Example",
            "feed_url": "https://example.com/feed.xml"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h.run(&["feed-info", "7"]).await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(records[0]["title"], "Example");
}

// ============================================================================
// Batched lookups
// ============================================================================

#[tokio::test]
async fn test_starred_batches_cleaned_ids() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/starred_entries.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 0, 3, null, 4])))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("ids", "1,2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 2}, {"id": 1}])))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("ids", "3,4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}, {"id": 4}])))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h.run(&["starred", "--chunk-size", "3"]).await;

    assert_eq!(result.unwrap(), 4);
    assert_eq!(
        without_stamp(&records),
        vec![json!({"id": 2}), json!({"id": 1}), json!({"id": 3}), json!({"id": 4})]
    );
}

#[tokio::test]
async fn test_unread_limit_skips_later_chunks() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/unread_entries.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3, 4])))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("ids", "1,2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("ids", "3,4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}, {"id": 4}])))
        .expect(0)
        .mount(&h.server)
        .await;

    let (result, records) = h
        .run(&["unread", "--chunk-size", "2", "--limit", "1"])
        .await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_starred_ids_only_makes_no_lookups() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/starred_entries.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([5, 0, 6])))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut out = Vec::new();
    let written = h
        .runner(&["starred", "--ids-only"])
        .run_with_writer(&mut out)
        .await
        .unwrap();

    assert_eq!(written, 2);
    assert_eq!(String::from_utf8(out).unwrap(), "5\n6\n");
}

#[tokio::test]
async fn test_zero_limit_makes_no_requests() {
    let h = Harness::start().await;

    let (result, records) = h.run(&["starred", "--limit", "0"]).await;

    assert_eq!(result.unwrap(), 0);
    assert!(records.is_empty());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Credentials and errors
// ============================================================================

#[tokio::test]
async fn test_basic_auth_from_flags() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/subscriptions.json"))
        .and(basic_auth("me@example.com", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, _) = h
        .run(&["subscriptions", "-u", "me@example.com", "-p", "secret"])
        .await;

    assert_eq!(result.unwrap(), 0);
}

#[tokio::test]
async fn test_settings_file_supplies_credentials_and_base_url() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/subscriptions.json"))
        .and(basic_auth("file@example.com", "from-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&h.server)
        .await;

    let settings = h.dir.path().join("config.yaml");
    std::fs::write(
        &settings,
        format!(
            "username: file@example.com\npassword: from-file\nbase_url: \"{}\"\ncache:\n  enabled: false\n",
            h.base_url()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "feedbin-tools",
        "--config",
        settings.to_str().unwrap(),
        "subscriptions",
    ])
    .unwrap();

    let mut out = Vec::new();
    let written = Runner::new(cli)
        .with_env(|_| None)
        .run_with_writer(&mut out)
        .await
        .unwrap();

    assert_eq!(written, 1);
}

#[tokio::test]
async fn test_half_credentials_rejected() {
    let h = Harness::start().await;

    let (result, _) = h.run(&["subscriptions", "-u", "me@example.com"]).await;

    assert!(matches!(
        result.unwrap_err(),
        Error::MissingConfigField { .. }
    ));
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_surfaces_status() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/subscriptions.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&h.server)
        .await;

    let (result, records) = h.run(&["subscriptions"]).await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized"));
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_error_mid_walk_keeps_partial_output() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("entries.json?page=2").as_str())
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&h.server)
        .await;

    let mut out = Vec::new();
    let err = h
        .runner(&["entries"])
        .run_with_writer(&mut out)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(lines(&out).len(), 1);
}

/// Accepts one write, then reports the reader as gone
struct OneLinePipe {
    lines: usize,
}

impl Write for OneLinePipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.lines == 1 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.lines += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_closed_output_is_not_an_error() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Links", h.next_link("entries.json?page=2").as_str())
                .set_body_json(json!([{"id": 1}, {"id": 2}, {"id": 3}])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/entries.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 4}])))
        .expect(0)
        .mount(&h.server)
        .await;

    let written = h
        .runner(&["entries"])
        .run_with_writer(OneLinePipe { lines: 0 })
        .await
        .unwrap();

    assert_eq!(written, 1);
}
