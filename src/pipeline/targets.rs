// src/pipeline/targets.rs

//! Crawl target collection.
//!
//! Targets come from explicit DOIs, listing URLs, or archive pages whose
//! reaction links are scanned for DOIs.

use std::collections::BTreeSet;

use scraper::{Html, Selector};

use crate::models::CrawlTarget;
use crate::services::PageFetcher;

/// Path fragment shared by every reaction listing link.
const LISTING_PATH: &str = "/data/reaction/doi/";

/// Where a crawl target came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// A DOI or listing URL, normalized later
    Direct(String),
    /// An archive page listing many DOIs, of which at most `limit` are taken
    Archive { url: String, limit: Option<usize> },
}

impl TargetSource {
    pub fn archive(url: impl Into<String>, limit: Option<usize>) -> Self {
        Self::Archive {
            url: url.into(),
            limit,
        }
    }

    /// Classify a free-form argument. Anything mentioning "archive" is
    /// treated as an archive page capped at `archive_limit`.
    pub fn from_arg(arg: &str, archive_limit: Option<usize>) -> Self {
        if arg.contains("archive") {
            Self::archive(arg, archive_limit)
        } else {
            Self::Direct(arg.to_string())
        }
    }
}

/// Collect DOIs linked from an archive page, sorted and de-duplicated.
pub fn extract_dois_from_archive(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(links) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(LISTING_PATH))
        .filter_map(CrawlTarget::from_path)
        .map(|target| target.doi().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fetch an archive page and return its DOIs, at most `limit` of them.
///
/// A failed fetch yields no DOIs.
pub async fn expand_archive(
    fetcher: &dyn PageFetcher,
    url: &str,
    limit: Option<usize>,
) -> Vec<String> {
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            log::warn!("Failed to fetch archive {}: {}", url, e);
            return Vec::new();
        }
    };

    let mut dois = extract_dois_from_archive(&html);
    if let Some(limit) = limit {
        dois.truncate(limit);
    }
    log::info!("Archive {} listed {} DOIs", url, dois.len());
    dois
}

/// Resolve sources into raw targets in order, falling back to `default_doi`
/// when nothing was collected.
pub async fn collect_targets(
    fetcher: &dyn PageFetcher,
    sources: &[TargetSource],
    default_doi: &str,
) -> Vec<String> {
    let mut targets = Vec::new();
    for source in sources {
        match source {
            TargetSource::Direct(target) => targets.push(target.clone()),
            TargetSource::Archive { url, limit } => {
                targets.extend(expand_archive(fetcher, url, *limit).await)
            }
        }
    }

    if targets.is_empty() {
        log::info!("No targets given, using default DOI {}", default_doi);
        targets.push(default_doi.to_string());
    }
    targets
}
