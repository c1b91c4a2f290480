//! In-memory memo of name lookups.
//!
//! Keys are `<tag>:<structure>`. A stored `None` means the lookup ran and
//! found nothing; a missing key means the lookup has not run yet. Entries are
//! written once and never evicted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Option<String>>>;

/// Memoizing map shared by every resolution in one run.
#[derive(Debug, Default)]
pub struct NameCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result, or `None` if this key was never resolved.
    pub fn lookup(&self, tag: &str, structure: &str) -> Option<Option<String>> {
        self.entries()
            .get(&Self::key(tag, structure))
            .and_then(|slot| slot.get().cloned())
    }

    /// Record a result. The first value stored for a key wins.
    pub fn store(&self, tag: &str, structure: &str, name: Option<String>) {
        let slot = self.slot(tag, structure);
        let _ = slot.set(name);
    }

    /// Return the cached result or run `resolve` to produce it.
    ///
    /// Concurrent callers for the same key wait on the first caller's
    /// in-flight future instead of starting their own.
    pub async fn get_or_resolve<F, Fut>(
        &self,
        tag: &str,
        structure: &str,
        resolve: F,
    ) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        let slot = self.slot(tag, structure);
        slot.get_or_init(resolve).await.clone()
    }

    /// Number of completed entries, found or not.
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, tag: &str, structure: &str) -> Slot {
        let mut entries = self.entries();
        Arc::clone(entries.entry(Self::key(tag, structure)).or_default())
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(tag: &str, structure: &str) -> String {
        format!("{tag}:{structure}")
    }
}
