//! Storage for regeneration parameters.

use crate::types::SessionRecord;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Key-value store for [`SessionRecord`]s, addressed by session id.
///
/// Records are written once and only read afterwards.
pub trait SessionStore {
    fn put(&self, id: &str, record: SessionRecord);
    fn get(&self, id: &str) -> Option<SessionRecord>;
}

/// Store entry with optional expiry.
#[derive(Debug, Clone)]
struct StoreEntry {
    record: SessionRecord,
    expires_at: Option<Instant>,
}

/// Thread-safe in-memory session store.
///
/// Without a TTL, records live until the process exits.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    entries: Arc<DashMap<String, StoreEntry>>,
    ttl: Option<Duration>,
}

impl MemorySessionStore {
    /// Create a store whose records never expire.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: None,
        }
    }

    /// Create a store evicting records `ttl` after insertion.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Drop every record whose TTL has elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| entry.expires_at.map_or(true, |expires_at| expires_at > now));
    }

    /// Number of stored records. Expired records not yet purged are counted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, id: &str, record: SessionRecord) {
        if self.ttl.is_some() {
            self.purge_expired();
        }

        let entry = StoreEntry {
            record,
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(id.to_string(), entry);
    }

    fn get(&self, id: &str) -> Option<SessionRecord> {
        let entry = self.entries.get(id)?;
        match entry.expires_at {
            Some(expires_at) if Instant::now() >= expires_at => {
                drop(entry);
                self.entries.remove(id);
                None
            }
            _ => Some(entry.record.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cvv, MonthYear};

    fn record() -> SessionRecord {
        SessionRecord {
            base_card: "411111xxxxxxxxxx".to_string(),
            base_month_year: MonthYear::Unknown,
            base_cvv: Cvv::Unknown,
            resolved_month: None,
            resolved_year: None,
            bin_prefix: "411111".to_string(),
        }
    }

    #[test]
    fn test_store_put_get() {
        let store = MemorySessionStore::new();
        store.put("regen_1", record());

        assert_eq!(store.get("regen_1"), Some(record()));
        assert_eq!(store.get("regen_1"), Some(record()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_miss() {
        let store = MemorySessionStore::new();
        assert!(store.get("nonexistent").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_record_is_evicted() {
        let store = MemorySessionStore::with_ttl(Duration::ZERO);
        store.put("regen_1", record());

        assert!(store.get("regen_1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_purges_unread_expired_records() {
        let store = MemorySessionStore::with_ttl(Duration::from_millis(20));
        store.put("regen_1", record());
        std::thread::sleep(Duration::from_millis(40));

        store.put("regen_2", record());
        assert_eq!(store.len(), 1);
        assert!(store.get("regen_1").is_none());
        assert_eq!(store.get("regen_2"), Some(record()));
    }

    #[test]
    fn test_purge_keeps_live_records() {
        let store = MemorySessionStore::with_ttl(Duration::from_secs(60));
        store.put("regen_1", record());
        store.put("regen_2", record());
        store.purge_expired();
        assert_eq!(store.len(), 2);
    }
}
