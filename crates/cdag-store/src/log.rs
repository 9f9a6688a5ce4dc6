use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use cdag_types::ChunkId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::KvBackend;

/// Largest encoded record accepted by default (1 MiB).
pub const DEFAULT_MAX_RECORD_LEN: u32 = 1 << 20;

/// Flush/sync strategy for the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every put (safest, highest latency).
    EveryWrite,
    /// Hand every put to the OS and rely on page-cache buffering.
    OsDefault,
}

impl Default for SyncMode {
    fn default() -> Self {
        Self::OsDefault
    }
}

/// Configuration for a [`LogBackend`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Sync/flush strategy.
    pub sync_mode: SyncMode,
    /// Upper bound on one encoded record. Larger puts are rejected, and a
    /// header claiming more than this on replay marks the log as corrupt.
    pub max_record_len: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::default(),
            max_record_len: DEFAULT_MAX_RECORD_LEN,
        }
    }
}

/// One key/value pair as persisted in the log.
///
/// On-disk framing:
/// ```text
/// [4 bytes: record length (little-endian u32)]
/// [4 bytes: CRC32 of record (little-endian u32)]
/// [N bytes: record (bincode-serialized LogRecord)]
/// ```
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
struct LogRecord {
    key: ChunkId,
    value: Vec<u8>,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: u64 = 8;

fn encode_frame(record: &LogRecord, max_record_len: u32) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .ok()
        .filter(|&len| len <= max_record_len)
        .ok_or_else(|| {
            StoreError::Serialization(format!(
                "record too large: {} bytes (limit {max_record_len})",
                payload.len()
            ))
        })?;

    let mut frame = Vec::with_capacity(HEADER_SIZE as usize + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// File operations the writer relies on beyond `Write + Seek`.
trait LogFile: Write + Seek {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Appends whole frames and keeps the file ending on a record boundary.
struct LogWriter<F> {
    file: F,
    /// End of the last complete record.
    offset: u64,
    /// A failed append left bytes past `offset` that could not be removed.
    needs_rollback: bool,
}

impl<F: LogFile> LogWriter<F> {
    fn new(file: F, offset: u64) -> Self {
        Self {
            file,
            offset,
            needs_rollback: false,
        }
    }

    /// Write one frame; returns the new end offset.
    ///
    /// On failure any partially written bytes are cut off again, so the
    /// next append never lands behind a half-written record.
    fn append(&mut self, frame: &[u8], sync: bool) -> io::Result<u64> {
        if self.needs_rollback {
            self.rollback()?;
        }

        let written = self
            .file
            .write_all(frame)
            .and_then(|()| self.file.flush())
            .and_then(|()| if sync { self.file.sync() } else { Ok(()) });

        if let Err(e) = written {
            self.needs_rollback = true;
            if let Err(rollback) = self.rollback() {
                warn!(offset = self.offset, error = %rollback, "failed to roll back partial record");
            }
            return Err(e);
        }

        self.offset += frame.len() as u64;
        Ok(self.offset)
    }

    fn rollback(&mut self) -> io::Result<()> {
        self.file.truncate_to(self.offset)?;
        self.file.seek(SeekFrom::Start(self.offset))?;
        self.needs_rollback = false;
        Ok(())
    }
}

struct LogInner {
    path: PathBuf,
    index: RwLock<BTreeMap<ChunkId, Vec<u8>>>,
    writer: Mutex<LogWriter<File>>,
    config: LogConfig,
}

impl LogInner {
    fn append(&self, record: LogRecord) -> StoreResult<()> {
        let frame = encode_frame(&record, self.config.max_record_len)?;
        let sync = self.config.sync_mode == SyncMode::EveryWrite;

        let mut w = self.writer.lock().expect("log mutex poisoned");
        let offset = w.append(&frame, sync)?;

        debug!(key = %record.key.short_hex(), len = frame.len(), offset, "log append");

        // Index is updated under the writer lock so it always matches the
        // newest record on disk.
        self.index
            .write()
            .expect("lock poisoned")
            .insert(record.key, record.value);
        Ok(())
    }
}

/// Durable backend: an append-only record log plus an in-memory index.
///
/// Every put appends a framed record; the newest record for a key wins. On
/// open the log is replayed front to back to rebuild the index. Records that
/// fail their CRC are skipped. A final record cut short by a crash is
/// truncated so new records always start on a record boundary; a damaged
/// header anywhere else refuses the open instead of discarding what follows.
///
/// File writes run on tokio's blocking pool, so puts need a tokio runtime.
pub struct LogBackend {
    inner: Arc<LogInner>,
}

impl LogBackend {
    /// Open (or create) the log file at `path` and rebuild its index.
    pub fn open(path: &Path, config: LogConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let file_len = file.metadata()?.len();
        let (index, valid_len) = replay(path, &file, file_len, config.max_record_len)?;
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "truncating torn record at end of log"
            );
            file.set_len(valid_len)?;
        }
        file.seek(SeekFrom::Start(valid_len))?;

        info!(path = %path.display(), keys = index.len(), "log backend opened");

        Ok(Self {
            inner: Arc::new(LogInner {
                path: path.to_path_buf(),
                index: RwLock::new(index),
                writer: Mutex::new(LogWriter::new(file, valid_len)),
                config,
            }),
        })
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Current end-of-log offset in bytes.
    pub fn offset(&self) -> u64 {
        self.inner.writer.lock().expect("log mutex poisoned").offset
    }

    /// Number of distinct keys in the index.
    pub fn len(&self) -> usize {
        self.inner.index.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.index.read().expect("lock poisoned").is_empty()
    }
}

/// Replay framed records from the start of `reader`.
///
/// Returns the rebuilt index and the offset just past the last intact record.
/// Only a record that runs past `file_len` with a plausible length is treated
/// as a torn tail; any other bad length is reported as corruption.
fn replay<R: Read>(
    path: &Path,
    reader: R,
    file_len: u64,
    max_record_len: u32,
) -> StoreResult<(BTreeMap<ChunkId, Vec<u8>>, u64)> {
    let mut reader = BufReader::new(reader);
    let mut index = BTreeMap::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE <= file_len {
        let mut header = [0u8; HEADER_SIZE as usize];
        reader.read_exact(&mut header)?;
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || length > max_record_len {
            return Err(StoreError::CorruptLog {
                path: path.to_path_buf(),
                offset,
                reason: format!("record length {length} outside 1..={max_record_len}"),
            });
        }

        let next = offset + HEADER_SIZE + u64::from(length);
        if next > file_len {
            warn!(offset, length, file_len, "record runs past end of log; stopping replay");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        reader.read_exact(&mut payload)?;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "CRC mismatch; skipping record"
            );
            offset = next;
            continue;
        }

        match bincode::deserialize::<LogRecord>(&payload) {
            Ok(record) => {
                index.insert(record.key, record.value);
            }
            Err(e) => {
                warn!(offset, error = %e, "failed to decode record; skipping");
            }
        }
        offset = next;
    }

    debug!(keys = index.len(), valid_len = offset, "log replay complete");
    Ok((index, offset))
}

#[async_trait]
impl KvBackend for LogBackend {
    async fn get(&self, key: &ChunkId) -> StoreResult<Option<Vec<u8>>> {
        let index = self.inner.index.read().expect("lock poisoned");
        Ok(index.get(key).cloned())
    }

    async fn put(&self, key: &ChunkId, value: Vec<u8>) -> StoreResult<()> {
        let inner = Arc::clone(&self.inner);
        let record = LogRecord { key: *key, value };
        tokio::task::spawn_blocking(move || inner.append(record))
            .await
            .map_err(|e| StoreError::Unavailable(format!("log writer task failed: {e}")))?
    }

    async fn keys(&self) -> StoreResult<Vec<ChunkId>> {
        let index = self.inner.index.read().expect("lock poisoned");
        Ok(index.keys().copied().collect())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }
}

impl std::fmt::Debug for LogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBackend")
            .field("path", &self.inner.path)
            .field("entry_count", &self.len())
            .finish()
    }
}
