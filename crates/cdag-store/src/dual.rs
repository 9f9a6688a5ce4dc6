use std::path::Path;
use std::sync::Arc;

use cdag_types::ChunkId;

use crate::entry::CompleteEntry;
use crate::error::StoreResult;
use crate::log::{LogBackend, LogConfig};
use crate::memory::InMemoryBackend;
use crate::traits::KvBackend;

/// File name of the complete map inside a data directory.
pub const COMPLETE_LOG: &str = "complete.log";
/// File name of the incomplete map inside a data directory.
pub const INCOMPLETE_LOG: &str = "incomplete.log";

/// The complete and incomplete chunk maps, side by side.
///
/// The complete map stores bincode-encoded [`CompleteEntry`] values; the
/// incomplete map stores raw payload bytes. The two maps are independent:
/// nothing here keeps them mutually exclusive, that is up to the caller.
/// Cloning is cheap and shares the underlying backends.
#[derive(Clone)]
pub struct DualStore {
    complete: Arc<dyn KvBackend>,
    incomplete: Arc<dyn KvBackend>,
}

impl DualStore {
    /// Pair two backends.
    pub fn new(complete: Arc<dyn KvBackend>, incomplete: Arc<dyn KvBackend>) -> Self {
        Self {
            complete,
            incomplete,
        }
    }

    /// Two fresh in-memory maps.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryBackend::new()),
            Arc::new(InMemoryBackend::new()),
        )
    }

    /// Open (or create) log-backed maps inside `dir`.
    pub fn open(dir: &Path, config: LogConfig) -> StoreResult<Self> {
        let complete = LogBackend::open(&dir.join(COMPLETE_LOG), config.clone())?;
        let incomplete = LogBackend::open(&dir.join(INCOMPLETE_LOG), config)?;
        Ok(Self::new(Arc::new(complete), Arc::new(incomplete)))
    }

    /// Look up a complete entry.
    pub async fn get_complete(&self, id: &ChunkId) -> StoreResult<Option<CompleteEntry>> {
        match self.complete.get(id).await? {
            Some(bytes) => Ok(Some(CompleteEntry::decode(id, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Write a complete entry, replacing any previous value.
    pub async fn put_complete(&self, id: &ChunkId, entry: &CompleteEntry) -> StoreResult<()> {
        self.complete.put(id, entry.encode()?).await
    }

    /// Look up the raw payload of an incomplete chunk.
    pub async fn get_incomplete(&self, id: &ChunkId) -> StoreResult<Option<Vec<u8>>> {
        self.incomplete.get(id).await
    }

    /// Write the raw payload of an incomplete chunk.
    pub async fn put_incomplete(&self, id: &ChunkId, payload: Vec<u8>) -> StoreResult<()> {
        self.incomplete.put(id, payload).await
    }

    /// All ids in the complete map.
    pub async fn complete_keys(&self) -> StoreResult<Vec<ChunkId>> {
        self.complete.keys().await
    }

    /// Number of ids in the complete map.
    pub async fn complete_count(&self) -> StoreResult<usize> {
        self.complete.count().await
    }

    /// Number of ids in the incomplete map.
    pub async fn incomplete_count(&self) -> StoreResult<usize> {
        self.incomplete.count().await
    }
}

impl std::fmt::Debug for DualStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ChunkId {
        ChunkId::from_hash([n; 32])
    }

    #[tokio::test]
    async fn maps_are_independent() {
        let store = DualStore::in_memory();
        store
            .put_complete(&id(1), &CompleteEntry::leaf(b"leaf".to_vec()))
            .await
            .unwrap();
        store.put_incomplete(&id(2), b"parent".to_vec()).await.unwrap();

        assert!(store.get_complete(&id(2)).await.unwrap().is_none());
        assert!(store.get_incomplete(&id(1)).await.unwrap().is_none());
        assert_eq!(store.complete_count().await.unwrap(), 1);
        assert_eq!(store.incomplete_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn complete_entry_roundtrip() {
        let store = DualStore::in_memory();
        let entry = CompleteEntry {
            payload: b"node".to_vec(),
            depth: 2,
            size: 40,
        };
        store.put_complete(&id(5), &entry).await.unwrap();
        assert_eq!(store.get_complete(&id(5)).await.unwrap(), Some(entry));
        assert_eq!(store.complete_keys().await.unwrap(), vec![id(5)]);
    }

    #[tokio::test]
    async fn log_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = DualStore::open(dir.path(), LogConfig::default()).unwrap();
            store
                .put_complete(&id(1), &CompleteEntry::leaf(b"a".to_vec()))
                .await
                .unwrap();
            store.put_incomplete(&id(2), b"b".to_vec()).await.unwrap();
        }

        let store = DualStore::open(dir.path(), LogConfig::default()).unwrap();
        assert_eq!(
            store.get_complete(&id(1)).await.unwrap(),
            Some(CompleteEntry::leaf(b"a".to_vec()))
        );
        assert_eq!(
            store.get_incomplete(&id(2)).await.unwrap(),
            Some(b"b".to_vec())
        );
        assert!(dir.path().join(COMPLETE_LOG).exists());
        assert!(dir.path().join(INCOMPLETE_LOG).exists());
    }
}
