//! Directory lookups: fallback support and relay hints per canonical number.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;

/// Directory service consulted for per-number delivery capabilities.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Whether the directory believes this number accepts the fallback channel.
    async fn supports_fallback(&self, canonical: &str) -> bool;

    /// Relay hint for this number, if it is served by a federated relay.
    async fn relay_for(&self, canonical: &str) -> Option<String>;
}

/// One directory record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    /// Canonical number the record describes.
    pub number: String,
    /// Whether the number accepts fallback (carrier) messages.
    #[serde(default)]
    pub fallback: bool,
    /// Relay hint, if any.
    #[serde(default)]
    pub relay: Option<String>,
}

/// A directory held in memory, seeded from config or tests.
///
/// Unknown numbers report no fallback and no relay.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entries: RwLock<HashMap<String, DirectoryEntry>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding the given entries.
    pub fn from_entries(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|e| (e.number.clone(), e))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Insert or replace a record.
    pub fn upsert(&self, entry: DirectoryEntry) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(entry.number.clone(), entry);
        }
    }

    fn lookup(&self, canonical: &str) -> Option<DirectoryEntry> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(canonical).cloned())
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn supports_fallback(&self, canonical: &str) -> bool {
        self.lookup(canonical).is_some_and(|e| e.fallback)
    }

    async fn relay_for(&self, canonical: &str) -> Option<String> {
        self.lookup(canonical).and_then(|e| e.relay)
    }
}
