// src/pipeline/crawl.rs

//! Reaction crawling pipeline.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, CrawlStats, CrawlTarget, Page, ParsedReaction, ReactionRecord};
use crate::services::resolver::preferred_solvent_name;
use crate::services::{
    HttpFetcher, NameResolver, PageFetcher, PageParser, Paginator, RecordExtractor,
};
use crate::utils::{http, log};

/// Records and counters from one run.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub records: Vec<ReactionRecord>,
    pub stats: CrawlStats,
}

/// Result of crawling a single target.
#[derive(Debug, Default)]
struct TargetOutcome {
    records: Vec<ReactionRecord>,
    pages: usize,
    skipped: bool,
}

/// Crawls DOIs and turns their listings into reaction records.
pub struct CrawlOrchestrator {
    config: Arc<Config>,
    paginator: Paginator,
    extractor: RecordExtractor,
    parser: PageParser,
    resolver: NameResolver,
}

impl CrawlOrchestrator {
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn PageFetcher>,
        resolver: NameResolver,
    ) -> Result<Self> {
        let paginator = Paginator::new(fetcher, &config.crawler)?;
        Ok(Self {
            config,
            paginator,
            extractor: RecordExtractor::new(),
            parser: PageParser::new(),
            resolver,
        })
    }

    /// Build an orchestrator with HTTP fetching and the default resolver chain.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let client = http::create_client(&config.crawler)?;
        let resolver = NameResolver::from_config(&config.resolver, client.clone());
        Self::new(config, Arc::new(HttpFetcher::new(client)), resolver)
    }

    /// Crawl every target and concatenate the records in target order.
    pub async fn run(&self, targets: &[String], max_pages: usize) -> Vec<ReactionRecord> {
        self.run_report(targets, max_pages).await.records
    }

    /// Crawl every target, returning records with run statistics.
    pub async fn run_report(&self, targets: &[String], max_pages: usize) -> CrawlReport {
        let start_time = Utc::now();
        let concurrency = self.config.crawler.max_concurrent_targets.max(1);

        log::header("KMT reaction crawl");

        let outcomes: Vec<TargetOutcome> = stream::iter(targets.iter().enumerate())
            .map(|(index, target)| async move {
                log::step(index + 1, targets.len(), target);
                self.crawl_target(target, max_pages).await
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut report = CrawlReport {
            stats: CrawlStats {
                start_time,
                target_count: targets.len(),
                ..CrawlStats::default()
            },
            ..CrawlReport::default()
        };

        for outcome in outcomes {
            report.stats.page_count += outcome.pages;
            if outcome.skipped {
                report.stats.skipped_targets += 1;
            }
            report.records.extend(outcome.records);
        }

        report.stats.record_count = report.records.len();
        report.stats.named_solvent_count = report
            .records
            .iter()
            .filter(|r| r.primary_solvent_name.is_some())
            .count();
        report.stats.end_time = Utc::now();

        log_summary(&report.stats);
        report
    }

    /// Crawl the listing of one target.
    async fn crawl_target(&self, input: &str, max_pages: usize) -> TargetOutcome {
        let Some(target) = CrawlTarget::parse(input) else {
            ::log::warn!("Skipping {}: no DOI found", input);
            return TargetOutcome {
                skipped: true,
                ..TargetOutcome::default()
            };
        };

        let start_url = self.config.crawler.start_url(target.doi());
        let pages = self.paginator.crawl(&start_url, max_pages).await;

        let mut records = Vec::new();
        for page in &pages {
            let reactions = self.extractor.parse_page(page);
            if reactions.is_empty() {
                records.extend(self.record_from_details(page).await);
                continue;
            }
            for reaction in &reactions {
                records.push(self.build_record(reaction).await);
            }
        }

        log::sub_item(&format!(
            "{}: {} records from {} pages",
            target,
            records.len(),
            pages.len()
        ));

        TargetOutcome {
            records,
            pages: pages.len(),
            skipped: false,
        }
    }

    /// Turn a split reaction into an output record.
    pub async fn build_record(&self, reaction: &ParsedReaction) -> ReactionRecord {
        let (solvent, name) = self.pick_primary_solvent(&reaction.solvents).await;
        ReactionRecord {
            primary_solvent_name: name,
            reactant_structures: reaction.reactants.clone(),
            solvent_structures: solvent.into_iter().collect(),
            product_structures: reaction.products.clone(),
        }
    }

    /// Choose the solvent shown for a reaction and its name.
    ///
    /// The first solvent with a preferred name wins. Otherwise the first
    /// solvent is resolved remotely, and may end up without a name.
    pub async fn pick_primary_solvent(
        &self,
        solvents: &[String],
    ) -> (Option<String>, Option<String>) {
        let preferred = solvents
            .iter()
            .find_map(|s| preferred_solvent_name(s).map(|name| (s, name)));
        if let Some((solvent, name)) = preferred {
            return (Some(solvent.clone()), Some(name.to_string()));
        }

        match solvents.first() {
            Some(first) => (Some(first.clone()), self.resolver.resolve_remote(first).await),
            None => (None, None),
        }
    }

    /// Read a record from a page that carries no reaction strings, such as
    /// a reaction detail page.
    async fn record_from_details(&self, page: &Page) -> Option<ReactionRecord> {
        let fields = self.parser.parse_details(&page.body);
        if fields.reactant_structures.is_empty()
            && fields.solvents.is_empty()
            && fields.product_structures.is_empty()
        {
            ::log::debug!("No reactions on {}", page.url);
            return None;
        }

        if let Some(product) = &fields.product_name {
            ::log::debug!("Detail page {} names product {}", page.url, product);
        }
        let (solvent, name) = self.pick_primary_solvent(&fields.solvents).await;
        Some(ReactionRecord {
            primary_solvent_name: name,
            reactant_structures: fields.reactant_structures,
            solvent_structures: solvent.into_iter().collect(),
            product_structures: fields.product_structures,
        })
    }
}

fn log_summary(stats: &CrawlStats) {
    log::summary(
        "Crawl complete",
        &[
            ("Targets", stats.target_count.to_string()),
            ("Skipped", stats.skipped_targets.to_string()),
            ("Pages", stats.page_count.to_string()),
            ("Records", stats.record_count.to_string()),
            ("Named solvents", stats.named_solvent_count.to_string()),
            (
                "Elapsed",
                format!("{:.1}s", stats.elapsed().num_milliseconds() as f64 / 1000.0),
            ),
        ],
    );
}
