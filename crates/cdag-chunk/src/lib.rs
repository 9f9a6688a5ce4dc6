//! Chunk management for ChunkDAG.
//!
//! A chunk is an immutable payload of at most 1024 bytes (by default) that
//! may name other chunks as children. Chunks can arrive in any order, so the
//! [`ChunkManager`] decides at store time whether the chunk's whole subtree
//! is already present:
//!
//! - if every child is in the complete map, the chunk is written there with
//!   its aggregate `size` and `depth`;
//! - otherwise its raw payload goes to the incomplete map.
//!
//! The decision is final for that write. A chunk recorded as incomplete is
//! not revisited when its missing children arrive later; storing the same
//! payload again re-evaluates it.
//!
//! A [`Reporter`] can run alongside the manager, periodically counting the
//! complete map and logging growth.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod manager;
pub mod reporter;

#[cfg(test)]
mod testing;

pub use config::{ManagerConfig, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_REPORT_INTERVAL, MIN_REPORT_INTERVAL};
pub use descriptor::{ChunkDescriptor, Completeness, StoreStats};
pub use error::{ChunkError, ChunkResult};
pub use extractor::{ChildrenExtractor, JsonReferenceExtractor, NoChildren};
pub use manager::ChunkManager;
pub use reporter::{Report, Reporter, ReporterHandle};
