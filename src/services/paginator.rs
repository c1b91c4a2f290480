// src/services/paginator.rs

//! Listing page traversal.
//!
//! Follows "next" links from a start page until there is no next link, the
//! page cap is reached, or a link points back to a page already visited.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use rand::Rng;
use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{CrawlerConfig, Page};
use crate::utils::http::fetch_text;
use crate::utils::resolve_url;

/// Link texts that mark a pagination "next" anchor.
const NEXT_LABELS: [&str; 3] = ["next", ">", "»"];

/// Source of page bodies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the body of `url`, or an error for transport failures and
    /// non-200 responses.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        fetch_text(&self.client, url).await
    }
}

struct Traversal {
    next: Option<String>,
    seen: HashSet<String>,
    visited: usize,
}

/// Walks paginated listings with a politeness delay between fetches.
pub struct Paginator {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
    delay_ms: (u64, u64),
}

impl Paginator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(&config.base_url)?,
            delay_ms: (config.delay_min_ms, config.delay_max_ms),
        })
    }

    /// Fetch every reachable page, in traversal order.
    pub async fn crawl(&self, start_url: &str, max_pages: usize) -> Vec<Page> {
        self.pages(start_url, max_pages).collect().await
    }

    /// Lazily fetch pages starting at `start_url`.
    ///
    /// Every call starts a fresh traversal with an empty visited set.
    pub fn pages<'a>(
        &'a self,
        start_url: &str,
        max_pages: usize,
    ) -> impl Stream<Item = Page> + 'a {
        let traversal = Traversal {
            next: Some(start_url.to_string()),
            seen: HashSet::new(),
            visited: 0,
        };

        stream::unfold(traversal, move |mut state| async move {
            let url = state.next.take()?;
            if state.visited >= max_pages {
                log::debug!("Page limit {} reached before {}", max_pages, url);
                return None;
            }
            if !state.seen.insert(url.clone()) {
                log::debug!("Next link loops back to {}", url);
                return None;
            }
            if state.visited > 0 {
                self.pause().await;
            }

            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Stopping pagination at {}: {}", url, e);
                    return None;
                }
            };

            state.next = find_next_page(&body, &self.base_url);
            state.visited += 1;
            Some((Page { url, body }, state))
        })
    }

    async fn pause(&self) {
        let (min, max) = self.delay_ms;
        if max == 0 {
            return;
        }
        let millis = if min >= max {
            max
        } else {
            rand::rng().random_range(min..=max)
        };
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

/// Locate the pagination "next" link and resolve it against `base`.
pub fn find_next_page(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a").ok()?;

    document.select(&anchor).find_map(|a| {
        let label = a.text().collect::<String>().trim().to_lowercase();
        if !NEXT_LABELS.contains(&label.as_str()) {
            return None;
        }
        a.value()
            .attr("href")
            .filter(|href| !href.is_empty())
            .map(|href| resolve_url(base, href))
    })
}
