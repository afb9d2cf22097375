//! History persistence: every generation (and every manually created item)
//! becomes one `HistoryEntry`.
//!
//! Two backends implement `HistoryBackend`:
//! - `LocalStore`: a single JSON file, used in development.
//! - `RemoteStore`: the managed Postgres `history` table, used in production.
//!
//! `HistoryStore` picks one of them once at start-up and is carried in
//! `AppState`. Nothing downstream ever branches on which one is active.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

pub mod handlers;
pub mod local;
pub mod mapper;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

/// Default page size for history listings.
pub const DEFAULT_LIST_LIMIT: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A persisted history entry, in the external (camelCase) shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub job_description: String,
    pub resume: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

/// An entry before the store has assigned `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub job_description: String,
    pub resume: String,
    pub output: String,
}

/// Partial update. Only the four mutable fields exist here, so `id` and
/// `createdAt` in an incoming body are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl HistoryEntry {
    /// Stamps a new entry with the store-assigned identity.
    pub fn from_new(id: i64, created_at: DateTime<Utc>, entry: NewHistoryEntry) -> Self {
        Self {
            id,
            kind: entry.kind,
            job_description: entry.job_description,
            resume: entry.resume,
            output: entry.output,
            created_at,
        }
    }
}

impl HistoryPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.job_description.is_none()
            && self.resume.is_none()
            && self.output.is_none()
    }

    /// Shallow merge: every provided field replaces the existing value.
    pub fn apply_to(&self, entry: &mut HistoryEntry) {
        if let Some(kind) = &self.kind {
            entry.kind = kind.clone();
        }
        if let Some(job_description) = &self.job_description {
            entry.job_description = job_description.clone();
        }
        if let Some(resume) = &self.resume {
            entry.resume = resume.clone();
        }
        if let Some(output) = &self.output {
            entry.output = output.clone();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("History entry {0} not found")]
    NotFound(i64),

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

/// The five history operations. Implement this to add a backend without touching
/// the pipeline or handlers.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Short backend label for logs and `/health`.
    fn name(&self) -> &'static str;

    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError>;

    /// Newest-first, at most `limit` entries.
    async fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError>;

    async fn get(&self, id: i64) -> Result<HistoryEntry, StoreError>;

    async fn update(&self, id: i64, patch: HistoryPatch) -> Result<HistoryEntry, StoreError>;

    /// Returns `true` when an entry was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Facade
// ────────────────────────────────────────────────────────────────────────────

/// Backend-agnostic handle to history persistence. Cheap to clone.
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn HistoryBackend>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn HistoryBackend>) -> Self {
        Self { backend }
    }

    /// Remote when both Supabase credentials are configured, local otherwise.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let backend: Arc<dyn HistoryBackend> = match &config.supabase {
            Some(supabase) => Arc::new(RemoteStore::new(&supabase.url, &supabase.anon_key)?),
            None => Arc::new(LocalStore::open(&config.data_dir).await?),
        };

        info!("History backend selected: {}", backend.name());
        Ok(Self::new(backend))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        self.backend.insert(entry).await
    }

    pub async fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        self.backend.list(limit).await
    }

    pub async fn get(&self, id: i64) -> Result<HistoryEntry, StoreError> {
        self.backend.get(id).await
    }

    pub async fn update(&self, id: i64, patch: HistoryPatch) -> Result<HistoryEntry, StoreError> {
        self.backend.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.backend.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;
    use serde_json::json;

    fn config_with(data_dir: &std::path::Path, supabase: Option<SupabaseConfig>) -> Config {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            data_dir: data_dir.to_path_buf(),
            supabase,
            openai_api_key: None,
            openai_base_url: crate::config::DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    #[tokio::test]
    async fn test_local_backend_selected_without_supabase_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::from_config(&config_with(dir.path(), None))
            .await
            .unwrap();
        assert_eq!(store.backend_name(), "local");
    }

    #[tokio::test]
    async fn test_remote_backend_selected_with_supabase_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let supabase = SupabaseConfig {
            url: "https://project.supabase.co".to_string(),
            anon_key: "anon".to_string(),
        };
        let store = HistoryStore::from_config(&config_with(dir.path(), Some(supabase)))
            .await
            .unwrap();
        assert_eq!(store.backend_name(), "remote");
        // Remote selection must not touch the local data directory.
        assert!(!dir.path().join(local::HISTORY_FILE_NAME).exists());
    }

    #[test]
    fn test_patch_ignores_immutable_fields_in_json() {
        let patch: HistoryPatch = serde_json::from_value(json!({
            "id": 99,
            "createdAt": "2020-01-01T00:00:00Z",
            "output": "X"
        }))
        .unwrap();
        assert_eq!(
            patch,
            HistoryPatch {
                output: Some("X".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_patch_apply_only_touches_provided_fields() {
        let created_at = Utc::now();
        let mut entry = HistoryEntry {
            id: 4,
            kind: "cover".to_string(),
            job_description: "J".to_string(),
            resume: "R".to_string(),
            output: "O".to_string(),
            created_at,
        };
        HistoryPatch {
            resume: Some("R2".to_string()),
            ..Default::default()
        }
        .apply_to(&mut entry);

        assert_eq!(entry.resume, "R2");
        assert_eq!(entry.id, 4);
        assert_eq!(entry.kind, "cover");
        assert_eq!(entry.job_description, "J");
        assert_eq!(entry.output, "O");
        assert_eq!(entry.created_at, created_at);
    }

    #[test]
    fn test_entry_serializes_with_external_field_names() {
        let entry = HistoryEntry {
            id: 1,
            kind: "resume".to_string(),
            job_description: "J".to_string(),
            resume: "R".to_string(),
            output: "O".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["createdAt", "id", "jobDescription", "output", "resume", "type"]
        );
    }
}
