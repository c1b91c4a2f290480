//! Two-page listing crawled over HTTP against a mock KMT site.

use std::sync::Arc;

use kmt_crawler::models::{Config, CrawlerConfig, ReactionRecord, ResolverConfig};
use kmt_crawler::pipeline::CrawlOrchestrator;
use kmt_crawler::services::{HttpFetcher, Paginator, RecordExtractor};
use kmt_crawler::storage::{LocalStorage, RecordStorage};
use kmt_crawler::utils::http;

const DOI: &str = "10.1/test";

const PAGE_ONE: &str = r#"<html><body>
    <script>var reactions = []; reactions.push("A>>B");</script>
    <a href="/page2">Next</a>
</body></html>"#;

const PAGE_TWO: &str = r#"<html><body>
    <div class="card" data-reaction-smiles="C.D>E>F"></div>
    <a href="/page1">Previous</a>
</body></html>"#;

async fn mock_site() -> (mockito::ServerGuard, Vec<mockito::Mock>) {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", format!("/data/reaction/doi/{DOI}/start/0").as_str())
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PAGE_ONE)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/page2")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PAGE_TWO)
        .create_async()
        .await;
    (server, vec![first, second])
}

fn config(base_url: String) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url,
            delay_min_ms: 0,
            delay_max_ms: 0,
            ..CrawlerConfig::default()
        },
        resolver: ResolverConfig {
            enable_remote: false,
            ..ResolverConfig::default()
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_paginator_extracts_strings_in_page_order() {
    let (server, _mocks) = mock_site().await;
    let config = config(server.url());
    let client = http::create_client(&config.crawler).unwrap();
    let paginator = Paginator::new(Arc::new(HttpFetcher::new(client)), &config.crawler).unwrap();

    let pages = paginator.crawl(&config.crawler.start_url(DOI), 5).await;
    let extractor = RecordExtractor::new();
    let raw: Vec<String> = pages
        .iter()
        .flat_map(|page| extractor.extract(&page.body))
        .collect();

    assert_eq!(raw, vec!["A>>B", "C.D>E>F"]);
}

#[tokio::test]
async fn test_orchestrator_emits_records_and_writes_output() {
    let (server, mocks) = mock_site().await;
    let orchestrator = CrawlOrchestrator::from_config(Arc::new(config(server.url()))).unwrap();

    let records = orchestrator.run(&[DOI.to_string()], 5).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].reactant_structures, vec!["A"]);
    assert_eq!(records[0].product_structures, vec!["B"]);
    assert!(records[0].solvent_structures.is_empty());
    assert_eq!(records[1].reactant_structures, vec!["C", "D"]);
    assert_eq!(records[1].solvent_structures, vec!["E"]);
    assert_eq!(records[1].product_structures, vec!["F"]);
    assert_eq!(records[1].primary_solvent_name, None);

    for mock in &mocks {
        mock.assert_async().await;
    }

    let dir = tempfile::TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path().join("kmt_reactions_combined.json"));
    let summary = storage.write_records(&records).await.unwrap();
    assert_eq!(summary.count, 2);
    let written: Vec<ReactionRecord> =
        serde_json::from_slice(&std::fs::read(&summary.path).unwrap()).unwrap();
    assert_eq!(written, records);
}
