//! Test fixtures for integration tests
//!
//! Provides sample feed documents and catalog helpers

use sluice::catalog::SourceCatalog;
use sluice::models::Source;
use wiremock::MockServer;

/// RSS 1.0 (RDF) feed as served by many Japanese news sites
pub const SAMPLE_RDF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.jp/">
    <title>RDF News</title>
    <link>https://example.jp/</link>
    <description>RSS 1.0 feed</description>
  </channel>
  <item rdf:about="https://example.jp/news/1">
    <title>ニュース記事</title>
    <link>https://example.jp/news/1</link>
    <description>記事の要約です。</description>
  </item>
</rdf:RDF>"#;

/// Atom feed whose entries carry HTML in their content
pub const SAMPLE_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Blog</title>
  <id>urn:example:blog</id>
  <entry>
    <title>Release notes</title>
    <link rel="alternate" href="https://blog.example.org/release?utm_source=feed#top"/>
    <id>urn:example:blog:1</id>
    <content type="html">&lt;p&gt;Version &lt;b&gt;2.0&lt;/b&gt; is out&lt;/p&gt;</content>
  </entry>
</feed>"#;

/// RSS 2.0 feed with `count` items linking to `https://example.com/{n}`
pub fn numbered_feed(count: usize) -> String {
    let items: Vec<(String, String, String)> = (1..=count)
        .map(|n| (format!("Item {n}"), format!("https://example.com/{n}"), format!("Summary {n}")))
        .collect();
    let refs: Vec<(&str, &str, &str)> = items
        .iter()
        .map(|(t, l, d)| (t.as_str(), l.as_str(), d.as_str()))
        .collect();
    crate::common::rss_document(&refs)
}

/// Catalog of `count` sources served at `/feed/{n}.xml` on `server`
pub fn mock_catalog(server: &MockServer, count: usize) -> SourceCatalog {
    SourceCatalog::new(
        (1..=count)
            .map(|n| {
                Source::new(format!("Source {n}"), format!("{}/feed/{n}.xml", server.uri()))
                    .with_tags(["news"])
            })
            .collect(),
    )
}
