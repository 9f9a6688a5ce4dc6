use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use cdag_types::ChunkId;

use crate::error::StoreResult;
use crate::traits::KvBackend;

/// In-memory, `BTreeMap`-based backend.
///
/// Intended for tests and embedding. Values are held behind a `RwLock` and
/// cloned on read. Keys iterate in ascending order.
pub struct InMemoryBackend {
    entries: RwLock<BTreeMap<ChunkId, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Total value bytes across all keys.
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(|v| v.len() as u64)
            .sum()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvBackend for InMemoryBackend {
    async fn get(&self, key: &ChunkId) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &ChunkId, value: Vec<u8>) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(*key, value);
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<ChunkId>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.keys().copied().collect())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("entry_count", &self.len())
            .finish()
    }
}
