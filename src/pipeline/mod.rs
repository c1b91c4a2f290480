//! Pipeline entry points for crawler operations.
//!
//! - `collect_targets`: Turn DOIs, URLs and archive pages into crawl targets
//! - `CrawlOrchestrator`: Crawl targets into reaction records

pub mod crawl;
pub mod targets;

pub use crawl::{CrawlOrchestrator, CrawlReport};
pub use targets::{TargetSource, collect_targets, expand_archive, extract_dois_from_archive};
