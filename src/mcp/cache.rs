//! TTL-bounded store of discovered tool schemas, keyed by server id.
//!
//! Entries are overwritten on every successful listing and purged lazily by
//! the first lookup after they expire; there is no background sweep.
//! Concurrent writers race with last-write-wins semantics.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::mcp::types::ToolSchema;

/// Default time a listing stays fresh.
pub const DEFAULT_SCHEMA_TTL: Duration = Duration::from_secs(45);

#[derive(Debug, Clone)]
struct CacheEntry {
    schema: Arc<Vec<ToolSchema>>,
    updated_at: Instant,
}

/// Shared schema cache handle. Clones refer to the same store.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SCHEMA_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached tools for `server_id` if they are still fresh.
    ///
    /// A stale entry is removed and reported as absent.
    pub fn get(&self, server_id: &str) -> Option<Arc<Vec<ToolSchema>>> {
        let now = Instant::now();
        {
            let guard = self
                .entries
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match guard.get(server_id) {
                None => return None,
                Some(entry) if now.duration_since(entry.updated_at) <= self.ttl => {
                    return Some(Arc::clone(&entry.schema));
                }
                Some(_) => {}
            }
        }

        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Another caller may have refreshed the entry between the two locks.
        if let Some(entry) = guard.get(server_id) {
            if now.duration_since(entry.updated_at) <= self.ttl {
                return Some(Arc::clone(&entry.schema));
            }
            guard.remove(server_id);
            tracing::debug!(name: "mcp.cache.expired", server_id, "Schema cache entry expired");
        }
        None
    }

    /// Store `schema` for `server_id`, replacing any previous entry.
    pub fn set(&self, server_id: &str, schema: Vec<ToolSchema>) -> Arc<Vec<ToolSchema>> {
        let schema = Arc::new(schema);
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(
                server_id.to_string(),
                CacheEntry {
                    schema: Arc::clone(&schema),
                    updated_at: Instant::now(),
                },
            );
        schema
    }

    /// Number of stored entries, fresh or not yet purged.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
