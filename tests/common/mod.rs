//! Common test utilities

#![allow(dead_code)]

use sluice::config::Config;
use sluice::crawler::Crawler;
use std::time::Duration;
use wiremock::MockServer;

/// Path the mock index endpoint listens on
pub const INDEX_PATH: &str = "/api/index";

/// Scheduling slack allowed when comparing measured spacing to the interval
pub const EPSILON: Duration = Duration::from_millis(20);

/// Configuration pointing every collaborator at `server`
pub fn test_config(server: &MockServer, interval: Duration) -> Config {
    let mut config = Config::default();
    config.http.request_interval_secs = interval.as_secs_f64();
    config.http.request_timeout_secs = 5;
    config.index.endpoint = format!("{}{INDEX_PATH}", server.uri());
    config.feeds.cycle_sleep_secs = 0.0;
    config.wiki.site_base = Some(server.uri());
    config.wiki.metrics_base = Some(server.uri());
    config.wiki.cycle_sleep_secs = 0.0;
    config
}

/// HTTP stack for `server` with the given spacing
pub fn test_crawler(server: &MockServer, interval: Duration) -> Crawler {
    Crawler::new(&test_config(server, interval)).expect("test config should be valid")
}

/// RSS 2.0 document with one item per `(title, link, description)`
pub fn rss_document(items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link, description)| {
            format!(
                "<item><title>{title}</title><link>{link}</link><description>{description}</description></item>"
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test</title><link>https://example.com/</link><description>Test feed</description>{items}</channel></rss>"#
    )
}
