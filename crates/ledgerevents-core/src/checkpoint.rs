//! Checkpoint stores — durable "last seen position" tracking per stream.
//!
//! The listener only ever asks two questions: `check(key)` ("did I already
//! process this position?") and `save(key)` ("record forward progress").
//! Keys are decimal block positions. `save` records an idempotent upper
//! bound: a key at or below the recorded position is accepted and leaves
//! the record unchanged, which tolerates at-least-once redelivery from the
//! transport.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::CheckpointError;
use crate::position::BlockPosition;

/// The store contract consumed by the listener.
///
/// Implementations shared across listeners on distinct stream keys must
/// keep the keys independent; a single key is only accessed sequentially
/// per the serial-delivery guarantee of one registration.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// `true` if `key` has already been recorded as processed.
    async fn check(&self, key: &str) -> Result<bool, CheckpointError>;

    /// Durably record `key` as the latest processed position.
    async fn save(&self, key: &str) -> Result<(), CheckpointError>;
}

/// Non-durable single-stream checkpointer.
///
/// Useful for tests and for callers that want dedup within one process
/// lifetime only.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointer {
    last_seen: Mutex<Option<u64>>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last recorded position, if any.
    pub fn last_seen(&self) -> Option<BlockPosition> {
        self.last_seen.lock().unwrap().map(BlockPosition::new)
    }
}

#[async_trait]
impl Checkpointer for InMemoryCheckpointer {
    async fn check(&self, key: &str) -> Result<bool, CheckpointError> {
        let position = key.parse::<BlockPosition>()?;
        let last_seen = self.last_seen.lock().unwrap();
        Ok(matches!(*last_seen, Some(last) if position.value() <= last))
    }

    async fn save(&self, key: &str) -> Result<(), CheckpointError> {
        let position = key.parse::<BlockPosition>()?;
        let mut last_seen = self.last_seen.lock().unwrap();
        if last_seen.map_or(true, |last| position.value() > last) {
            *last_seen = Some(position.value());
        }
        Ok(())
    }
}

/// Durable checkpoint store backed by a JSON file.
///
/// The file holds a map from stream key to the last-seen position in its
/// decimal-string form. Every effective `save` rewrites the file through a
/// temp-file-and-rename so a crash never leaves a half-written map behind.
/// [`FileCheckpointStore::for_stream`] hands out per-stream handles that
/// share the store without interfering across keys.
#[derive(Clone)]
pub struct FileCheckpointStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    positions: tokio::sync::Mutex<HashMap<String, u64>>,
}

impl FileCheckpointStore {
    /// Open the store at `path`, loading any previously persisted map.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let path = path.into();
        let positions = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let persisted: BTreeMap<String, String> = serde_json::from_slice(&bytes)?;
                let mut map = HashMap::with_capacity(persisted.len());
                for (stream, key) in persisted {
                    map.insert(stream, key.parse::<BlockPosition>()?.value());
                }
                map
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), streams = positions.len(), "checkpoint store opened");
        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                positions: tokio::sync::Mutex::new(positions),
            }),
        })
    }

    /// A [`Checkpointer`] scoped to one stream key within this store.
    pub fn for_stream(&self, stream_key: impl Into<String>) -> FileCheckpointer {
        FileCheckpointer {
            inner: Arc::clone(&self.inner),
            stream_key: stream_key.into(),
        }
    }

    /// The last recorded position for `stream_key`, if any.
    pub async fn last_seen(&self, stream_key: &str) -> Option<BlockPosition> {
        self.inner
            .positions
            .lock()
            .await
            .get(stream_key)
            .copied()
            .map(BlockPosition::new)
    }
}

impl StoreInner {
    async fn persist(&self, positions: &HashMap<String, u64>) -> Result<(), CheckpointError> {
        let persisted: BTreeMap<&str, String> = positions
            .iter()
            .map(|(stream, &pos)| (stream.as_str(), BlockPosition::new(pos).to_string()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        // The temp file must reach the disk before the rename makes it
        // visible under the real name.
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Per-stream handle into a [`FileCheckpointStore`].
pub struct FileCheckpointer {
    inner: Arc<StoreInner>,
    stream_key: String,
}

impl FileCheckpointer {
    /// The stream key this handle is scoped to.
    pub fn stream_key(&self) -> &str {
        &self.stream_key
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

#[async_trait]
impl Checkpointer for FileCheckpointer {
    async fn check(&self, key: &str) -> Result<bool, CheckpointError> {
        let position = key.parse::<BlockPosition>()?;
        let positions = self.inner.positions.lock().await;
        Ok(matches!(
            positions.get(&self.stream_key),
            Some(&last) if position.value() <= last
        ))
    }

    async fn save(&self, key: &str) -> Result<(), CheckpointError> {
        let position = key.parse::<BlockPosition>()?;
        let mut positions = self.inner.positions.lock().await;
        match positions.get(&self.stream_key) {
            Some(&last) if position.value() <= last => Ok(()),
            _ => {
                positions.insert(self.stream_key.clone(), position.value());
                self.inner.persist(&positions).await
            }
        }
    }
}
