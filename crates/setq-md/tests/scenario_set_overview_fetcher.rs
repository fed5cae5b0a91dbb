//! SetOverviewFetcher against a local mock upstream.
//!
//! GREEN when:
//! - A well-formed page yields both fields verbatim (commas kept).
//! - Browser-like headers are sent on every request.
//! - Non-2xx status, missing elements and slow upstreams map to the matching
//!   `FetchError` variant instead of panicking or fabricating values.

use std::time::Duration;

use httpmock::prelude::*;
use setq_md::{FetchError, FetcherSettings, MarketDataFetcher, RawQuote, SetOverviewFetcher};

const OVERVIEW_PAGE: &str = r#"
<!doctype html>
<html><body>
  <div class="value text-white mb-0 me-2 lh-1 stock-info">1,293.62</div>
  <div class="d-block quote-market-cost ps-2 ps-xl-3">
    <span class="ms-2 ms-xl-4">38,576.94</span>
  </div>
</body></html>
"#;

fn settings_for(server: &MockServer) -> FetcherSettings {
    FetcherSettings {
        url: server.url("/en/market/index/set/overview"),
        timeout: Duration::from_millis(500),
        ..FetcherSettings::default()
    }
}

#[tokio::test]
async fn scrapes_both_fields_from_overview_page() {
    let server = MockServer::start_async().await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/en/market/index/set/overview")
                .header_exists("user-agent")
                .header("accept-language", "en-US,en;q=0.9")
                .header("referer", "https://www.google.com/");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(OVERVIEW_PAGE);
        })
        .await;

    let fetcher = SetOverviewFetcher::new(settings_for(&server)).unwrap();
    let quote = fetcher.fetch().await.unwrap();

    page.assert_async().await;
    assert_eq!(quote, RawQuote::new("1,293.62", "38,576.94"));
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/en/market/index/set/overview");
            then.status(503).body("maintenance");
        })
        .await;

    let fetcher = SetOverviewFetcher::new(settings_for(&server)).unwrap();
    assert_eq!(fetcher.fetch().await.unwrap_err(), FetchError::Status(503));
}

#[tokio::test]
async fn page_without_markers_is_missing_field() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/en/market/index/set/overview");
            then.status(200).body("<html><body>redesigned</body></html>");
        })
        .await;

    let fetcher = SetOverviewFetcher::new(settings_for(&server)).unwrap();
    assert_eq!(
        fetcher.fetch().await.unwrap_err(),
        FetchError::MissingField("index_value")
    );
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/en/market/index/set/overview");
            then.status(200)
                .delay(Duration::from_secs(2))
                .body(OVERVIEW_PAGE);
        })
        .await;

    let fetcher = SetOverviewFetcher::new(settings_for(&server)).unwrap();
    assert_eq!(
        fetcher.fetch().await.unwrap_err(),
        FetchError::Timeout(Duration::from_millis(500))
    );
}

#[tokio::test]
async fn unreachable_upstream_is_transport_error() {
    let settings = FetcherSettings {
        // Port 9 (discard) on loopback is not expected to accept HTTP.
        url: "http://127.0.0.1:9/overview".to_string(),
        timeout: Duration::from_millis(500),
        ..FetcherSettings::default()
    };
    let fetcher = SetOverviewFetcher::new(settings).unwrap();
    let err = fetcher.fetch().await.unwrap_err();
    assert!(
        matches!(err, FetchError::Transport(_) | FetchError::Timeout(_)),
        "unexpected error: {err:?}"
    );
}
