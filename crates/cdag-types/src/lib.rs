//! Foundation types for ChunkDAG.
//!
//! Every other ChunkDAG crate depends on `cdag-types`. The crate is kept
//! free of hashing so that identifiers can be parsed, compared and
//! serialized without pulling in the hasher.
//!
//! # Key Types
//!
//! - [`ChunkId`] -- 32-byte content-addressed chunk identifier
//! - [`TypeError`] -- parse failures for textual identifiers

pub mod chunk_id;
pub mod error;

pub use chunk_id::{ChunkId, REFERENCE_PREFIX};
pub use error::TypeError;
