//! Backends with injected behaviour for manager and reporter tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cdag_store::{InMemoryBackend, KvBackend, StoreError, StoreResult};
use cdag_types::ChunkId;
use tokio::sync::Notify;

/// Counts `get` calls before delegating to an in-memory map.
#[derive(Default)]
pub struct CountingBackend {
    inner: InMemoryBackend,
    gets: AtomicUsize,
}

impl CountingBackend {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvBackend for CountingBackend {
    async fn get(&self, key: &ChunkId) -> StoreResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &ChunkId, value: Vec<u8>) -> StoreResult<()> {
        self.inner.put(key, value).await
    }

    async fn keys(&self) -> StoreResult<Vec<ChunkId>> {
        self.inner.keys().await
    }
}

/// Fails every operation.
pub struct FailingBackend;

#[async_trait]
impl KvBackend for FailingBackend {
    async fn get(&self, _key: &ChunkId) -> StoreResult<Option<Vec<u8>>> {
        Err(StoreError::Unavailable("get refused".into()))
    }

    async fn put(&self, _key: &ChunkId, _value: Vec<u8>) -> StoreResult<()> {
        Err(StoreError::Unavailable("put refused".into()))
    }

    async fn keys(&self) -> StoreResult<Vec<ChunkId>> {
        Err(StoreError::Unavailable("keys refused".into()))
    }
}

/// Holds every `put` until [`release`](Self::release) is called.
#[derive(Default)]
pub struct GatedBackend {
    inner: InMemoryBackend,
    entered: Notify,
    gate: Notify,
}

impl GatedBackend {
    /// Wait until a put is parked at the gate.
    pub async fn wait_for_put(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl KvBackend for GatedBackend {
    async fn get(&self, key: &ChunkId) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &ChunkId, value: Vec<u8>) -> StoreResult<()> {
        self.entered.notify_one();
        self.gate.notified().await;
        self.inner.put(key, value).await
    }

    async fn keys(&self) -> StoreResult<Vec<ChunkId>> {
        self.inner.keys().await
    }
}

pub fn arc<T: KvBackend + 'static>(backend: T) -> (Arc<T>, Arc<dyn KvBackend>) {
    let typed = Arc::new(backend);
    let erased: Arc<dyn KvBackend> = typed.clone();
    (typed, erased)
}
