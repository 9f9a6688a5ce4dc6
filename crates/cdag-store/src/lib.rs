//! Persistent key-value storage for ChunkDAG.
//!
//! Chunks live in two independent maps keyed by [`ChunkId`]:
//!
//! - the *complete* map holds a [`CompleteEntry`] (payload plus aggregate
//!   size and depth) for chunks whose whole subtree was resolvable when they
//!   were stored;
//! - the *incomplete* map holds the raw payload of every other chunk.
//!
//! [`DualStore`] pairs the two maps and owns their value encoding. The maps
//! themselves are any [`KvBackend`]:
//!
//! - [`InMemoryBackend`] -- `BTreeMap` store for tests and embedding
//! - [`LogBackend`] -- append-only CRC-framed file with an in-memory index
//!
//! # Design Rules
//!
//! 1. Every mutation is a single key-scoped put; there are no multi-key
//!    transactions.
//! 2. A put overwrites any existing value for the key.
//! 3. Backends never interpret values.
//! 4. All I/O errors are propagated, never silently ignored.
//!
//! [`ChunkId`]: cdag_types::ChunkId

pub mod dual;
pub mod entry;
pub mod error;
pub mod log;
pub mod memory;
pub mod traits;

pub use dual::DualStore;
pub use entry::CompleteEntry;
pub use error::{StoreError, StoreResult};
pub use log::{LogBackend, LogConfig, SyncMode};
pub use memory::InMemoryBackend;
pub use traits::KvBackend;
