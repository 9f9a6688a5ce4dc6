use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Prefix marking a chunk reference inside a payload (`chunk:<64 hex>`).
pub const REFERENCE_PREFIX: &str = "chunk:";

/// Content-addressed identifier for a chunk.
///
/// A `ChunkId` is the hash of a chunk's raw payload and doubles as its
/// storage key. Identical payloads always produce the same `ChunkId`, so
/// re-submitting a chunk collapses onto the existing entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId([u8; 32]);

impl ChunkId {
    /// Create a `ChunkId` from a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Reference form used when a payload names this chunk as a child.
    pub fn to_reference(&self) -> String {
        format!("{REFERENCE_PREFIX}{}", self.to_hex())
    }

    /// Parse from a hex string, with or without the `chunk:` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix(REFERENCE_PREFIX).unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Parse a string only if it is in reference form (`chunk:<64 hex>`).
    ///
    /// Returns `None` for anything else, including bare hex.
    pub fn parse_reference(s: &str) -> Option<Self> {
        let hex_part = s.strip_prefix(REFERENCE_PREFIX)?;
        if hex_part.len() != 64 {
            return None;
        }
        Self::from_hex(hex_part).ok()
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({})", self.short_hex())
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ChunkId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for ChunkId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<ChunkId> for [u8; 32] {
    fn from(id: ChunkId) -> Self {
        id.0
    }
}
