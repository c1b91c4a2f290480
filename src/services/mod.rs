//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Reaction string extraction (`RecordExtractor`)
//! - Detail page parsing (`PageParser`)
//! - Listing pagination (`Paginator`)
//! - Structure-to-name resolution (`NameResolver`)
//! - Listing diagnostics (`describe_listing`)

pub mod diagnostics;
mod details;
mod extractor;
mod paginator;
pub mod resolver;

pub use details::PageParser;
pub use diagnostics::{debug_list, describe_listing, describe_script};
pub use extractor::RecordExtractor;
pub use paginator::{HttpFetcher, PageFetcher, Paginator, find_next_page};
pub use resolver::{NameCache, NameResolver, NameStrategy};
