//! Structure-to-name resolution.
//!
//! A [`NameResolver`] tries an ordered chain of [`NameStrategy`] objects and
//! returns the first name found. Remote strategies are memoized per cache tag
//! in a [`NameCache`] owned by the resolver, so a structure is looked up at
//! most once per strategy in a run, including lookups that found nothing.
//!
//! Default chain:
//!
//! 1. curated dictionary (exact or stereo-normalized match)
//! 2. PubChem IUPAC name, then PubChem synonyms (tag `name`)
//! 3. CACTUS IUPAC name (tag `cactus`)

mod cache;
mod cactus;
mod dictionary;
mod pubchem;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ResolverConfig;

pub use cache::NameCache;
pub use cactus::CactusStrategy;
pub use dictionary::{DictionaryStrategy, normalize, preferred_solvent_name};
pub use pubchem::PubChemStrategy;

/// One way of turning a structure-string into a name.
#[async_trait]
pub trait NameStrategy: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Cache namespace; `None` disables memoization for this strategy.
    fn cache_tag(&self) -> Option<&'static str> {
        None
    }

    /// Whether the strategy talks to a remote service.
    fn is_remote(&self) -> bool {
        true
    }

    /// `Ok(None)` means the strategy answered but knows no name.
    async fn attempt(&self, structure: &str) -> Result<Option<String>>;
}

/// Ordered fallback chain over name strategies.
pub struct NameResolver {
    strategies: Vec<Box<dyn NameStrategy>>,
    cache: Arc<NameCache>,
}

impl NameResolver {
    /// Create an empty resolver backed by `cache`.
    pub fn new(cache: Arc<NameCache>) -> Self {
        Self {
            strategies: Vec::new(),
            cache,
        }
    }

    /// Append a strategy to the end of the chain.
    pub fn with_strategy(mut self, strategy: impl NameStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Build the default chain: dictionary, PubChem, CACTUS.
    pub fn from_config(config: &ResolverConfig, client: reqwest::Client) -> Self {
        let resolver = Self::new(Arc::new(NameCache::new()))
            .with_strategy(DictionaryStrategy::known_compounds());

        if !config.enable_remote {
            log::debug!("Remote name resolution disabled");
            return resolver;
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        resolver
            .with_strategy(PubChemStrategy::new(
                client.clone(),
                &config.pubchem_base,
                timeout,
            ))
            .with_strategy(CactusStrategy::new(client, &config.cactus_base, timeout))
    }

    /// Resolve through the whole chain.
    pub async fn resolve(&self, structure: &str) -> Option<String> {
        self.resolve_filtered(structure, |_| true).await
    }

    /// Resolve through remote strategies only.
    pub async fn resolve_remote(&self, structure: &str) -> Option<String> {
        self.resolve_filtered(structure, |s| s.is_remote()).await
    }

    pub fn cache(&self) -> &NameCache {
        &self.cache
    }

    async fn resolve_filtered<P>(&self, structure: &str, include: P) -> Option<String>
    where
        P: Fn(&dyn NameStrategy) -> bool,
    {
        for strategy in &self.strategies {
            let strategy = strategy.as_ref();
            if !include(strategy) {
                continue;
            }
            if let Some(name) = self.run_strategy(strategy, structure).await {
                log::debug!("Resolved {} via {}: {}", structure, strategy.name(), name);
                return Some(name);
            }
        }
        None
    }

    async fn run_strategy(&self, strategy: &dyn NameStrategy, structure: &str) -> Option<String> {
        match strategy.cache_tag() {
            Some(tag) => {
                self.cache
                    .get_or_resolve(tag, structure, || attempt(strategy, structure))
                    .await
            }
            None => attempt(strategy, structure).await,
        }
    }
}

/// Run a strategy, treating any failure as "no answer".
async fn attempt(strategy: &dyn NameStrategy, structure: &str) -> Option<String> {
    match strategy.attempt(structure).await {
        Ok(name) => name,
        Err(e) => {
            log::debug!("{} lookup failed for {}: {}", strategy.name(), structure, e);
            None
        }
    }
}
