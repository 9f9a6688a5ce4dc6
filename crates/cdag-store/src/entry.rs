use cdag_types::ChunkId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Value stored in the complete map: the payload plus its aggregates.
///
/// `depth` is 0 for a leaf and `1 + max(child depth)` otherwise. `size` is
/// the payload length plus the `size` of every direct child, so it counts
/// the whole subtree (a child reachable along two paths is counted twice).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteEntry {
    pub payload: Vec<u8>,
    pub depth: u64,
    pub size: u64,
}

impl CompleteEntry {
    /// Entry for a chunk with no children.
    pub fn leaf(payload: Vec<u8>) -> Self {
        let size = payload.len() as u64;
        Self {
            payload,
            depth: 0,
            size,
        }
    }

    /// Encode for storage.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a value read from the complete map under `key`.
    pub fn decode(key: &ChunkId, bytes: &[u8]) -> StoreResult<Self> {
        bincode::deserialize(bytes).map_err(|e| StoreError::CorruptRecord {
            key: *key,
            reason: e.to_string(),
        })
    }
}
