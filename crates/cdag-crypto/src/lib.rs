//! Content hashing for ChunkDAG.
//!
//! Chunk identifiers are domain-separated BLAKE3 hashes over the raw
//! payload. The hash wraps an established library; there is no custom
//! cryptography here.

pub mod hasher;

pub use hasher::ChunkHasher;
