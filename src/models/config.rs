//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Name resolution services
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Output artifact settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}. Using defaults.", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.delay_min_ms > self.crawler.delay_max_ms {
            return Err(AppError::validation(
                "crawler.delay_min_ms must not exceed crawler.delay_max_ms",
            ));
        }
        if self.crawler.max_concurrent_targets == 0 {
            return Err(AppError::validation(
                "crawler.max_concurrent_targets must be > 0",
            ));
        }
        if !self.crawler.list_template.contains("{doi}") {
            return Err(AppError::validation(
                "crawler.list_template must contain {doi}",
            ));
        }
        if self.resolver.timeout_secs == 0 {
            return Err(AppError::validation("resolver.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.crawler.base_url)?;
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Site root used to resolve relative links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Listing URL with `{base}`, `{doi}` and `{start}` placeholders
    #[serde(default = "defaults::list_template")]
    pub list_template: String,

    /// DOI crawled when no target is given
    #[serde(default = "defaults::default_doi")]
    pub default_doi: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header for HTTP requests
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header for HTTP requests
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Lower bound of the delay between page fetches
    #[serde(default = "defaults::delay_min")]
    pub delay_min_ms: u64,

    /// Upper bound of the delay between page fetches
    #[serde(default = "defaults::delay_max")]
    pub delay_max_ms: u64,

    /// Maximum listing pages per DOI
    #[serde(default = "defaults::max_pages")]
    pub max_pages: usize,

    /// Number of DOIs crawled at the same time
    #[serde(default = "defaults::max_concurrent_targets")]
    pub max_concurrent_targets: usize,
}

impl CrawlerConfig {
    /// Build the first listing URL for a DOI.
    pub fn start_url(&self, doi: &str) -> String {
        self.list_template
            .replace("{base}", self.base_url.trim_end_matches('/'))
            .replace("{doi}", doi)
            .replace("{start}", "0")
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            list_template: defaults::list_template(),
            default_doi: defaults::default_doi(),
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
            delay_min_ms: defaults::delay_min(),
            delay_max_ms: defaults::delay_max(),
            max_pages: defaults::max_pages(),
            max_concurrent_targets: defaults::max_concurrent_targets(),
        }
    }
}

/// Remote name resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// PubChem PUG REST root
    #[serde(default = "defaults::pubchem_base")]
    pub pubchem_base: String,

    /// NCI CACTUS resolver root
    #[serde(default = "defaults::cactus_base")]
    pub cactus_base: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Query remote services at all
    #[serde(default = "defaults::enable_remote")]
    pub enable_remote: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pubchem_base: defaults::pubchem_base(),
            cactus_base: defaults::cactus_base(),
            timeout_secs: defaults::timeout(),
            enable_remote: defaults::enable_remote(),
        }
    }
}

/// Output artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the combined JSON file
    #[serde(default = "defaults::combined_out")]
    pub combined_out: String,

    /// Pretty-print the JSON output
    #[serde(default = "defaults::pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            combined_out: defaults::combined_out(),
            pretty: defaults::pretty(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn base_url() -> String {
        "https://kmt.vander-lingen.nl".into()
    }
    pub fn list_template() -> String {
        "{base}/data/reaction/doi/{doi}/start/{start}".into()
    }
    pub fn default_doi() -> String {
        "10.1021/jacsau.4c01276".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
            .into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.9".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn delay_min() -> u64 {
        600
    }
    pub fn delay_max() -> u64 {
        1500
    }
    pub fn max_pages() -> usize {
        15
    }
    pub fn max_concurrent_targets() -> usize {
        1
    }

    // Resolver defaults
    pub fn pubchem_base() -> String {
        "https://pubchem.ncbi.nlm.nih.gov/rest/pug".into()
    }
    pub fn cactus_base() -> String {
        "https://cactus.nci.nih.gov".into()
    }
    pub fn enable_remote() -> bool {
        true
    }

    // Output defaults
    pub fn combined_out() -> String {
        "kmt_reactions_combined.json".into()
    }
    pub fn pretty() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_delay() {
        let mut config = Config::default();
        config.crawler.delay_min_ms = 2000;
        config.crawler.delay_max_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn start_url_uses_template() {
        let config = CrawlerConfig::default();
        assert_eq!(
            config.start_url("10.1021/jacsau.4c01276"),
            "https://kmt.vander-lingen.nl/data/reaction/doi/10.1021/jacsau.4c01276/start/0"
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max_pages = 3

            [output]
            combined_out = "out.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.crawler.max_pages, 3);
        assert_eq!(config.crawler.delay_min_ms, 600);
        assert_eq!(config.output.combined_out, "out.json");
        assert_eq!(config.resolver.timeout_secs, 30);
    }
}
