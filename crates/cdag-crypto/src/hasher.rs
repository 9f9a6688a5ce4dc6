use cdag_types::ChunkId;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash computation so that a chunk id
/// can never collide with a hash of the same bytes taken for another purpose.
#[derive(Clone, Copy, Debug)]
pub struct ChunkHasher {
    domain: &'static str,
}

impl ChunkHasher {
    /// Hasher for chunk payloads.
    pub const CHUNK: Self = Self {
        domain: "cdag-chunk-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ChunkId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ChunkId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected chunk id.
    pub fn verify(&self, data: &[u8], expected: &ChunkId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

impl Default for ChunkHasher {
    fn default() -> Self {
        Self::CHUNK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ChunkHasher::CHUNK.hash(data), ChunkHasher::CHUNK.hash(data));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let other = ChunkHasher::new("cdag-test-v1");
        assert_ne!(ChunkHasher::CHUNK.hash(b"same"), other.hash(b"same"));
    }

    #[test]
    fn domain_separation_differs_from_raw_blake3() {
        let id = ChunkHasher::CHUNK.hash(b"test");
        assert_ne!(id.as_bytes(), blake3::hash(b"test").as_bytes());
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let id = ChunkHasher::CHUNK.hash(b"original");
        assert!(ChunkHasher::CHUNK.verify(b"original", &id));
        assert!(!ChunkHasher::CHUNK.verify(b"tampered", &id));
    }

    #[test]
    fn empty_payload_has_an_id() {
        let id = ChunkHasher::CHUNK.hash(b"");
        assert_ne!(id, ChunkHasher::CHUNK.hash(b"\0"));
    }

    #[test]
    fn default_is_chunk_domain() {
        assert_eq!(ChunkHasher::default().domain(), "cdag-chunk-v1");
    }

    proptest! {
        #[test]
        fn distinct_payloads_get_distinct_ids(a in proptest::collection::vec(any::<u8>(), 0..64),
                                              b in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assume!(a != b);
            prop_assert_ne!(ChunkHasher::CHUNK.hash(&a), ChunkHasher::CHUNK.hash(&b));
        }
    }
}
