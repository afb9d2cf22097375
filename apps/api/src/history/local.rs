//! File-backed history store used when no remote credentials are configured.
//!
//! The whole collection lives in `<data_dir>/history.json` as a pretty-printed
//! array, newest entry first. Every mutation rewrites the file.
//!
//! Mutations run load → compute → save under `write_lock`, so two concurrent
//! inserts can never compute the same id. Saves go through a temp file and a
//! rename, which lets readers skip the lock.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::history::{HistoryBackend, HistoryEntry, HistoryPatch, NewHistoryEntry, StoreError};

pub const HISTORY_FILE_NAME: &str = "history.json";

pub struct LocalStore {
    dir: PathBuf,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Opens (and creates, if absent) the store directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StoreError::Backend(format!(
                "Failed to create data directory {}: {e}",
                dir.display()
            ))
        })?;

        let store = Self {
            path: dir.join(HISTORY_FILE_NAME),
            dir,
            write_lock: Mutex::new(()),
        };
        info!("Local history store at {}", store.path().display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection. A missing file is an empty store; an unreadable or
    /// unparseable one is logged and also treated as empty.
    async fn load(&self) -> Vec<HistoryEntry> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {}: {e}; treating as empty", self.path.display());
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Malformed history file {}: {e}; treating as empty",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, rows: &[HistoryEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(rows)
            .map_err(|e| StoreError::Backend(format!("Failed to serialize history: {e}")))?;

        let dir = self.dir.clone();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, json.as_bytes()))
            .await
            .map_err(|e| StoreError::Backend(format!("History writer task failed: {e}")))?
            .map_err(|e| StoreError::Backend(format!("Failed to write history file: {e}")))?;

        debug!("Wrote {} history entries", rows.len());
        Ok(())
    }
}

/// Temp file in the same directory, then rename over the target.
fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn next_id(rows: &[HistoryEntry]) -> i64 {
    rows.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
}

#[async_trait]
impl HistoryBackend for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut rows = self.load().await;
        let row = HistoryEntry::from_new(next_id(&rows), Utc::now(), entry);
        rows.insert(0, row.clone());
        self.save(&rows).await?;

        debug!("Inserted history entry {} ({})", row.id, row.kind);
        Ok(row)
    }

    async fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut rows = self.load().await;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<HistoryEntry, StoreError> {
        self.load()
            .await
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: HistoryPatch) -> Result<HistoryEntry, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut rows = self.load().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply_to(row);
        let updated = row.clone();
        self.save(&rows).await?;

        debug!("Updated history entry {id}");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut rows = self.load().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Ok(false);
        }
        self.save(&rows).await?;

        debug!("Deleted history entry {id}");
        Ok(true)
    }
}
