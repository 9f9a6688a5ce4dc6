use std::path::PathBuf;

use cdag_types::ChunkId;

/// Errors from key-value backend operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value exists but cannot be decoded.
    #[error("corrupt record for {key}: {reason}")]
    CorruptRecord { key: ChunkId, reason: String },

    /// A log file is damaged before its final record and cannot be replayed.
    #[error("corrupt log {} at offset {offset}: {reason}", path.display())]
    CorruptLog {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    /// Failure reported by an external backend implementation.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
