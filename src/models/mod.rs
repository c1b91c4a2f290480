// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

use chrono::{DateTime, Utc};

mod config;
mod reaction;
mod target;

// Re-export all public types
pub use config::{Config, CrawlerConfig, OutputConfig, ResolverConfig};
pub use reaction::{DetailFields, ParsedReaction, ReactionRecord};
pub use target::CrawlTarget;

/// A fetched listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub body: String,
}

/// Counters and timing for one crawl run.
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub target_count: usize,
    /// Targets that normalized to no DOI
    pub skipped_targets: usize,
    pub page_count: usize,
    pub record_count: usize,
    pub named_solvent_count: usize,
}

impl CrawlStats {
    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}
