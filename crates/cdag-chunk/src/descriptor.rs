use cdag_types::ChunkId;
use serde::{Deserialize, Serialize};

/// Whether a chunk's subtree was resolvable when it was stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Completeness {
    /// Every child was in the complete map. Aggregates are known.
    Complete { depth: u64, size: u64 },
    /// At least one child was missing. No aggregates.
    Incomplete,
}

/// Result of a store or retrieve: the chunk and what is known about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkDescriptor {
    pub id: ChunkId,
    pub payload: Vec<u8>,
    pub completeness: Completeness,
}

impl ChunkDescriptor {
    pub fn is_complete(&self) -> bool {
        matches!(self.completeness, Completeness::Complete { .. })
    }

    /// Longest child chain below this chunk, if complete.
    pub fn depth(&self) -> Option<u64> {
        match self.completeness {
            Completeness::Complete { depth, .. } => Some(depth),
            Completeness::Incomplete => None,
        }
    }

    /// Bytes of this chunk plus its whole subtree, if complete.
    pub fn size(&self) -> Option<u64> {
        match self.completeness {
            Completeness::Complete { size, .. } => Some(size),
            Completeness::Incomplete => None,
        }
    }
}

/// Key counts of both maps.
///
/// Entries are never removed, so a chunk first stored as incomplete and
/// stored again once its children arrived is counted in both fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Keys in the complete map.
    pub complete: usize,
    /// Keys in the incomplete map, including ids later stored as complete.
    pub incomplete: usize,
}
