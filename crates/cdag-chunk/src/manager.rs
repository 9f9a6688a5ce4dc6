use std::sync::Arc;

use cdag_crypto::ChunkHasher;
use cdag_store::{CompleteEntry, DualStore};
use cdag_types::ChunkId;
use tracing::{debug, trace};

use crate::config::ManagerConfig;
use crate::descriptor::{ChunkDescriptor, Completeness, StoreStats};
use crate::error::{ChunkError, ChunkResult};
use crate::extractor::{ChildrenExtractor, JsonReferenceExtractor};
use crate::reporter::{Reporter, ReporterHandle};

/// Stores and retrieves chunks, tracking whether each chunk's subtree is
/// resolvable.
///
/// The manager holds no state of its own besides the two maps in its
/// [`DualStore`]; share it between tasks with an `Arc`. Every backend call
/// is an await point and no lock is held across one.
///
/// Operations on the same id are not atomic end to end. A `retrieve` that
/// races a `store` of the same payload may report [`ChunkError::NotFound`]
/// until the store's single put lands. Concurrent stores of one payload
/// write the same value and converge.
pub struct ChunkManager {
    store: DualStore,
    extractor: Arc<dyn ChildrenExtractor>,
    hasher: ChunkHasher,
    config: ManagerConfig,
}

impl ChunkManager {
    /// Create a manager using the JSON reference extractor.
    pub fn new(store: DualStore, config: ManagerConfig) -> Self {
        Self {
            store,
            extractor: Arc::new(JsonReferenceExtractor),
            hasher: ChunkHasher::CHUNK,
            config,
        }
    }

    /// Replace the children extractor.
    pub fn with_extractor(mut self, extractor: impl ChildrenExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The underlying maps.
    pub fn dual_store(&self) -> &DualStore {
        &self.store
    }

    /// Id a payload would be stored under.
    pub fn identify(&self, payload: &[u8]) -> ChunkId {
        self.hasher.hash(payload)
    }

    /// Store a chunk.
    ///
    /// Children are looked up in the complete map in payload order. The
    /// scan stops at the first missing child; the chunk is then written to
    /// the incomplete map without aggregates. Otherwise it is written to the
    /// complete map with `size = len + Σ child size` and
    /// `depth = 1 + max child depth` (0 for a leaf).
    ///
    /// Storing an id that already has an entry overwrites it. A chunk
    /// previously stored as incomplete is only re-evaluated when it is
    /// stored again.
    pub async fn store(&self, payload: Vec<u8>) -> ChunkResult<ChunkDescriptor> {
        if payload.len() > self.config.max_chunk_size {
            return Err(ChunkError::SizeLimitExceeded {
                size: payload.len(),
                limit: self.config.max_chunk_size,
            });
        }

        let children = self.extractor.children(&payload);
        let resolved = self.resolve_children(&children).await?;
        let id = self.hasher.hash(&payload);

        let Some((child_depth, child_size)) = resolved else {
            self.store.put_incomplete(&id, payload.clone()).await?;
            debug!(id = %id.short_hex(), children = children.len(), "stored incomplete chunk");
            return Ok(ChunkDescriptor {
                id,
                payload,
                completeness: Completeness::Incomplete,
            });
        };

        let depth = if children.is_empty() { 0 } else { child_depth + 1 };
        let size = (payload.len() as u64).saturating_add(child_size);
        let entry = CompleteEntry {
            payload,
            depth,
            size,
        };
        self.store.put_complete(&id, &entry).await?;
        debug!(id = %id.short_hex(), depth, size, children = children.len(), "stored complete chunk");
        Ok(ChunkDescriptor {
            id,
            payload: entry.payload,
            completeness: Completeness::Complete { depth, size },
        })
    }

    /// Look up every child in the complete map.
    ///
    /// Returns `(max child depth, Σ child size)` when all are present and
    /// `None` at the first miss.
    async fn resolve_children(&self, children: &[ChunkId]) -> ChunkResult<Option<(u64, u64)>> {
        let mut max_depth = 0u64;
        let mut total_size = 0u64;
        for child in children {
            let Some(entry) = self.store.get_complete(child).await? else {
                trace!(child = %child.short_hex(), "child not complete; chunk is incomplete");
                return Ok(None);
            };
            max_depth = max_depth.max(entry.depth);
            total_size = total_size.saturating_add(entry.size);
        }
        Ok(Some((max_depth, total_size)))
    }

    /// Fetch a chunk, preferring the complete map.
    pub async fn retrieve(&self, id: &ChunkId) -> ChunkResult<ChunkDescriptor> {
        if let Some(entry) = self.store.get_complete(id).await? {
            return Ok(ChunkDescriptor {
                id: *id,
                payload: entry.payload,
                completeness: Completeness::Complete {
                    depth: entry.depth,
                    size: entry.size,
                },
            });
        }
        if let Some(payload) = self.store.get_incomplete(id).await? {
            return Ok(ChunkDescriptor {
                id: *id,
                payload,
                completeness: Completeness::Incomplete,
            });
        }
        Err(ChunkError::NotFound(*id))
    }

    /// Key counts of both maps.
    pub async fn stats(&self) -> ChunkResult<StoreStats> {
        Ok(StoreStats {
            complete: self.store.complete_count().await?,
            incomplete: self.store.incomplete_count().await?,
        })
    }

    /// Start the periodic reporter on the current tokio runtime.
    ///
    /// The returned handle owns the task: call
    /// [`ReporterHandle::shutdown`] before dropping the manager.
    pub fn spawn_reporter(&self) -> ReporterHandle {
        Reporter::new(self.store.clone()).spawn(self.config.report_interval())
    }
}

impl std::fmt::Debug for ChunkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkManager")
            .field("config", &self.config)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
