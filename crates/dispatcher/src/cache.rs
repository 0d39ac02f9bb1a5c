//! Dispatch cache
//!
//! 运行期年龄缓存：(name, COUNTRY) -> 查询结果。
//! 无淘汰、无 TTL、无容量上限，生命周期与一次运行相同。

use contracts::{AgeKey, AgeRecord};
use dashmap::DashMap;

/// Concurrent age cache shared by preload and dispatch
///
/// Country codes are uppercased before every access. Reads return owned
/// clones so no shard guard outlives the call.
#[derive(Debug, Default)]
pub struct DispatchCache {
    entries: DashMap<AgeKey, AgeRecord>,
}

impl DispatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up by name and country (any casing)
    pub fn get(&self, name: &str, country: &str) -> Option<AgeRecord> {
        self.get_key(&AgeKey::new(name, country))
    }

    /// Store by name and country (any casing)
    pub fn put(&self, name: &str, country: &str, record: AgeRecord) {
        self.insert(AgeKey::new(name, country), record);
    }

    /// Look up by key
    pub fn get_key(&self, key: &AgeKey) -> Option<AgeRecord> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store by key; a later write for the same key replaces the earlier one
    pub fn insert(&self, key: AgeKey, record: AgeRecord) {
        self.entries.insert(key, record);
    }

    pub fn contains(&self, key: &AgeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
