//! Crawl target identifiers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DOI_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/doi/(.+?)(?:/start|$)").expect("valid DOI regex"));

/// A publication DOI whose reaction listing is crawled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTarget(String);

impl CrawlTarget {
    /// Normalize user input to a DOI.
    ///
    /// Bare identifiers pass through. URLs must carry a `/doi/<id>` path
    /// segment, otherwise no target is produced.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if !input.starts_with("http") {
            return Some(Self(input.to_string()));
        }

        let parsed = url::Url::parse(input).ok()?;
        Self::from_path(parsed.path())
    }

    /// Extract a DOI from a `/data/reaction/doi/<id>/start/<n>` style path.
    pub fn from_path(path: &str) -> Option<Self> {
        DOI_SEGMENT
            .captures(path)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn doi(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
