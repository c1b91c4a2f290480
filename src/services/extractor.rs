// src/services/extractor.rs

//! Reaction string extraction from listing pages.
//!
//! The listing embeds reactions in two ways, both scanned on every page:
//! an inline script building an array with `reactions.push("...")`, and
//! `data-reaction-smiles="..."` attributes on the rendered cards.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Page, ParsedReaction};

static SCRIPT_PUSH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"reactions\.push\(\s*['"]([\s\S]*?)['"]\s*\)"#).expect("valid push regex")
});

static REACTION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-reaction-smiles\s*=\s*['"]([^'"]+)['"]"#).expect("valid attribute regex")
});

/// Pulls raw reaction strings out of page markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordExtractor;

impl RecordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All reaction strings on the page, script matches first.
    ///
    /// Both sources are kept even when they repeat each other.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let from_script = SCRIPT_PUSH
            .captures_iter(html)
            .filter_map(|caps| caps.get(1));
        let from_attr = REACTION_ATTR
            .captures_iter(html)
            .filter_map(|caps| caps.get(1));

        from_script
            .chain(from_attr)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Extract and split every reaction on a fetched page.
    pub fn parse_page(&self, page: &Page) -> Vec<ParsedReaction> {
        self.extract(&page.body)
            .iter()
            .map(|raw| ParsedReaction::parse(raw).with_page_url(&page.url))
            .collect()
    }
}
