//! Remote history store: the `history` table in the managed Postgres service,
//! reached through its PostgREST gateway (`/rest/v1/history`).
//!
//! Field names are translated by `history::mapper` in both directions.
//! Zero rows from a filtered select/update is `StoreError::NotFound`; transport
//! errors and non-2xx responses are `StoreError::Backend`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::history::mapper::{select_columns, HistoryInsertRow, HistoryRow, HistoryUpdateRow};
use crate::history::{HistoryBackend, HistoryEntry, HistoryPatch, NewHistoryEntry, StoreError};

pub const HISTORY_TABLE: &str = "history";

#[derive(Debug, Deserialize)]
struct GatewayError {
    message: String,
}

pub struct RemoteStore {
    client: Client,
    table_url: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Backend(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            table_url: format!(
                "{}/rest/v1/{HISTORY_TABLE}",
                base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Sends the request and decodes the returned rows.
    async fn fetch_rows(&self, request: RequestBuilder) -> Result<Vec<HistoryRow>, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("History request failed: {e}")))?;

        let response = check_status(response).await?;

        response
            .json::<Vec<HistoryRow>>()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to decode history rows: {e}")))
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GatewayError>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(StoreError::Backend(format!(
        "History table returned {status}: {message}"
    )))
}

fn id_filter(id: i64) -> String {
    format!("eq.{id}")
}

#[async_trait]
impl HistoryBackend for RemoteStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        let row = HistoryInsertRow::from(entry);
        let request = self
            .request(Method::POST)
            .query(&[("select", select_columns())])
            .header("Prefer", "return=representation")
            .json(&row);

        let inserted = self
            .fetch_rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("Insert returned no row".to_string()))?;

        debug!("Inserted remote history entry {}", inserted.id);
        Ok(inserted.into())
    }

    async fn list(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        let request = self.request(Method::GET).query(&[
            ("select", select_columns()),
            ("order", "id.desc".to_string()),
            ("limit", limit.to_string()),
        ]);

        let rows = self.fetch_rows(request).await?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn get(&self, id: i64) -> Result<HistoryEntry, StoreError> {
        let request = self
            .request(Method::GET)
            .query(&[("select", select_columns()), ("id", id_filter(id))]);

        self.fetch_rows(request)
            .await?
            .into_iter()
            .next()
            .map(HistoryEntry::from)
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: HistoryPatch) -> Result<HistoryEntry, StoreError> {
        // The gateway rejects an empty PATCH body.
        if patch.is_empty() {
            return self.get(id).await;
        }

        let row = HistoryUpdateRow::from(patch);
        let request = self
            .request(Method::PATCH)
            .query(&[("select", select_columns()), ("id", id_filter(id))])
            .header("Prefer", "return=representation")
            .json(&row);

        let updated = self
            .fetch_rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound(id))?;

        debug!("Updated remote history entry {id}");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let request = self
            .request(Method::DELETE)
            .query(&[("select", select_columns()), ("id", id_filter(id))])
            .header("Prefer", "return=representation");

        let removed = self.fetch_rows(request).await?;
        debug!("Deleted {} remote history row(s) for id {id}", removed.len());
        Ok(!removed.is_empty())
    }
}
