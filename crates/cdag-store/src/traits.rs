use async_trait::async_trait;
use cdag_types::ChunkId;

use crate::error::StoreResult;

/// A persistent key → value map keyed by chunk id.
///
/// Implementations must satisfy these invariants:
/// - `put` is atomic per key and overwrites any existing value.
/// - `get` of an absent key is `Ok(None)`, never an error.
/// - `keys` returns a snapshot; calling it again restarts the iteration.
/// - Implementations must not hold a lock across an `.await`.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &ChunkId) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &ChunkId, value: Vec<u8>) -> StoreResult<()>;

    /// All keys currently stored, in ascending order.
    async fn keys(&self) -> StoreResult<Vec<ChunkId>>;

    /// Number of keys currently stored.
    ///
    /// Default implementation counts [`keys`](Self::keys). Backends with a
    /// cheaper count may override.
    async fn count(&self) -> StoreResult<usize> {
        Ok(self.keys().await?.len())
    }
}
