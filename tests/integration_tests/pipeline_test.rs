//! End-to-end feed pipeline integration tests
//!
//! Tests the complete workflow:
//! 1. Catalog iteration
//! 2. Feed fetch (mocked)
//! 3. Parsing and normalization
//! 4. Index submission (mocked)
//! 5. Statistics tracking and pacing

use serde_json::json;
use sluice::harvest::FeedHarvest;
use sluice::models::Source;
use sluice::catalog::SourceCatalog;
use sluice::scheduler::CyclicScheduler;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{mock_catalog, numbered_feed, SAMPLE_ATOM, SAMPLE_RDF};
use crate::common::{self, EPSILON, INDEX_PATH};

const UNIT: Duration = Duration::from_millis(250);

async fn mount_feed(server: &MockServer, n: usize, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/feed/{n}.xml")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_index(server: &MockServer, status: u16, expected: u64) {
    Mock::given(method("POST"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected)
        .mount(server)
        .await;
}

fn scheduler(
    server: &MockServer,
    catalog: SourceCatalog,
    interval: Duration,
) -> CyclicScheduler<FeedHarvest> {
    let config = common::test_config(server, interval);
    let crawler = common::test_crawler(server, interval);
    CyclicScheduler::new(
        FeedHarvest::new(catalog, &crawler, &config.feeds),
        config.feeds.cycle_sleep(),
    )
}

// ============================================================================
// Pacing
// ============================================================================

/// 3 sources, 1 item each: 6 paced requests, the first one free
#[tokio::test]
async fn test_cycle_is_paced_across_fetch_and_submit() {
    let mock_server = MockServer::start().await;
    for n in 1..=3 {
        mount_feed(&mock_server, n, numbered_feed(1)).await;
    }
    mount_index(&mock_server, 200, 3).await;

    let mut scheduler = scheduler(&mock_server, mock_catalog(&mock_server, 3), UNIT);

    let started = Instant::now();
    let stats = scheduler.run_once().await;
    let elapsed = started.elapsed();

    assert_eq!(stats.submitted, 3);
    assert_eq!(stats.failed, 0);
    assert!(elapsed + EPSILON >= UNIT * 5, "cycle took {elapsed:?}");
}

/// A failed fetch on source 2 is isolated; source 3 is still processed
#[tokio::test]
async fn test_failed_fetch_does_not_abort_cycle() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, 1, numbered_feed(1)).await;
    Mock::given(method("GET"))
        .and(path("/feed/2.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_feed(&mock_server, 3, numbered_feed(1)).await;
    mount_index(&mock_server, 200, 2).await;

    let mut scheduler = scheduler(&mock_server, mock_catalog(&mock_server, 3), UNIT);

    let started = Instant::now();
    let stats = scheduler.run_once().await;
    let elapsed = started.elapsed();

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.failed, 1);
    // fetch, submit, fetch (500), fetch, submit
    assert!(elapsed + EPSILON >= UNIT * 4, "cycle took {elapsed:?}");
}

// ============================================================================
// Content handling
// ============================================================================

/// Only the first `max_entries_per_feed` entries are submitted
#[tokio::test]
async fn test_entry_cap() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, 1, numbered_feed(12)).await;

    Mock::given(method("POST"))
        .and(path(INDEX_PATH))
        .and(body_partial_json(json!({"url": "https://example.com/9"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_index(&mock_server, 200, 8).await;

    let mut scheduler = scheduler(&mock_server, mock_catalog(&mock_server, 1), Duration::ZERO);
    let stats = scheduler.run_once().await;

    assert_eq!(stats.processed, 8);
    assert_eq!(stats.submitted, 8);
}

/// RDF and Atom feeds go through the same pipeline; plugin hints apply
#[tokio::test]
async fn test_rdf_and_atom_with_plugins() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, 1, SAMPLE_RDF.to_string()).await;
    mount_feed(&mock_server, 2, SAMPLE_ATOM.to_string()).await;

    Mock::given(method("POST"))
        .and(path(INDEX_PATH))
        .and(body_json(json!({
            "url": "https://example.jp/news/1",
            "title": null,
            "favicon": null,
            "tags": ["news"],
            "descriptions": "記事の要約です。"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(INDEX_PATH))
        .and(body_json(json!({
            "url": "https://blog.example.org/release",
            "title": null,
            "favicon": null,
            "tags": ["blog"],
            "descriptions": "Version 2.0 is out"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = SourceCatalog::new(vec![
        Source::new("RDF News", format!("{}/feed/1.xml", mock_server.uri())),
        Source::new("Atom Blog", format!("{}/feed/2.xml", mock_server.uri()))
            .with_tags(["blog"])
            .with_plugins(["unHTML", "cleanAllURLParams", "linuxReleaseID"]),
    ]);

    let mut scheduler = scheduler(&mock_server, catalog, Duration::ZERO);
    let stats = scheduler.run_once().await;

    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.rejected, 0);
}

/// Unparseable documents and index rejections are counted, not fatal
#[tokio::test]
async fn test_garbage_feed_and_rejections_are_counted() {
    let mock_server = MockServer::start().await;
    mount_feed(&mock_server, 1, String::from("<html><body>maintenance</body></html>")).await;
    mount_feed(&mock_server, 2, numbered_feed(2)).await;
    mount_index(&mock_server, 503, 2).await;

    let mut scheduler = scheduler(&mock_server, mock_catalog(&mock_server, 2), Duration::ZERO);
    let stats = scheduler.run_once().await;

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.submitted, 0);
}

/// An entry with neither link nor guid yields no document; the next entry still goes out
#[tokio::test]
async fn test_linkless_entry_is_skipped() {
    let mock_server = MockServer::start().await;
    let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test</title><link>https://example.com/</link><description>Test feed</description>
<item><title>Announcement</title><description>No permalink for this one</description></item>
<item><title>Item 2</title><link>https://example.com/2</link><description>Summary 2</description></item>
</channel></rss>"#;
    mount_feed(&mock_server, 1, feed.to_string()).await;

    Mock::given(method("POST"))
        .and(path(INDEX_PATH))
        .and(body_partial_json(json!({"url": "https://example.com/2"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut scheduler = scheduler(&mock_server, mock_catalog(&mock_server, 1), Duration::ZERO);
    let stats = scheduler.run_once().await;

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.submitted, 1);

    let posts = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 1);
}

// ============================================================================
// Lifecycle
// ============================================================================

/// The loop keeps cycling until the shutdown signal arrives
#[tokio::test]
async fn test_run_until_shutdown() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(numbered_feed(1)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = common::test_config(&mock_server, Duration::ZERO);
    let crawler = common::test_crawler(&mock_server, Duration::ZERO);
    let harvest = FeedHarvest::new(mock_catalog(&mock_server, 1), &crawler, &config.feeds);
    let mut scheduler = CyclicScheduler::new(harvest, Duration::from_millis(50));

    let (tx, rx) = watch::channel(false);
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(400)).await;
        tx.send(true).ok();
    });

    let summary = tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx))
        .await
        .expect("scheduler should stop on shutdown");
    stopper.await.unwrap();

    assert!(summary.cycles >= 2, "only {} cycles ran", summary.cycles);
    assert_eq!(summary.totals.submitted as u64, summary.cycles);
}
