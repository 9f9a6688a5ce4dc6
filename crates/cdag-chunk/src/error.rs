use cdag_store::StoreError;
use cdag_types::ChunkId;

/// Errors returned by the chunk manager.
///
/// The set is closed: callers match it exhaustively.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The payload is larger than the configured limit. Nothing was written.
    #[error("chunk size limit exceeded: {size} bytes (limit {limit})")]
    SizeLimitExceeded { size: usize, limit: usize },

    /// The chunk is in neither the complete nor the incomplete map.
    #[error("chunk not found: {0}")]
    NotFound(ChunkId),

    /// The key-value backend failed. Not retried.
    #[error("backend error: {0}")]
    Backend(#[from] StoreError),
}

/// Result alias for chunk manager operations.
pub type ChunkResult<T> = Result<T, ChunkError>;
