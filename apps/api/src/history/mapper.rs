//! Row mapping between the external entry shape (camelCase) and the columns of
//! the remote `history` table (snake_case).
//!
//! The column names are spelled out on every row struct rather than derived with
//! `rename_all`, so a rename on either side shows up as a failing test here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::{HistoryEntry, HistoryPatch, NewHistoryEntry};

/// Every (external field, internal column) pair. Exactly one counterpart each way.
pub const FIELD_COLUMNS: [(&str, &str); 6] = [
    ("id", "id"),
    ("type", "type"),
    ("jobDescription", "job_description"),
    ("resume", "resume"),
    ("output", "output"),
    ("createdAt", "created_at"),
];

/// Explicit projection for remote selects: every mapped column, comma-separated.
pub fn select_columns() -> String {
    FIELD_COLUMNS
        .iter()
        .map(|(_, column)| *column)
        .collect::<Vec<_>>()
        .join(",")
}

/// A full row as returned by the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(rename = "id")]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "job_description")]
    pub job_description: String,
    #[serde(rename = "resume")]
    pub resume: String,
    #[serde(rename = "output")]
    pub output: String,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

/// Insert payload. `id` and `created_at` are assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryInsertRow {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "job_description")]
    pub job_description: String,
    #[serde(rename = "resume")]
    pub resume: String,
    #[serde(rename = "output")]
    pub output: String,
}

/// Update payload. Absent fields are omitted so the update stays column-scoped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryUpdateRow {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "job_description", skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(rename = "resume", skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(rename = "output", skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl From<NewHistoryEntry> for HistoryInsertRow {
    fn from(entry: NewHistoryEntry) -> Self {
        Self {
            kind: entry.kind,
            job_description: entry.job_description,
            resume: entry.resume,
            output: entry.output,
        }
    }
}

impl From<HistoryPatch> for HistoryUpdateRow {
    fn from(patch: HistoryPatch) -> Self {
        Self {
            kind: patch.kind,
            job_description: patch.job_description,
            resume: patch.resume,
            output: patch.output,
        }
    }
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            job_description: row.job_description,
            resume: row.resume,
            output: row.output,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn sorted_keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn sample_row() -> HistoryRow {
        HistoryRow {
            id: 7,
            kind: "cover".to_string(),
            job_description: "JD".to_string(),
            resume: "R".to_string(),
            output: "O".to_string(),
            created_at: "2024-05-01T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_field_table_is_a_bijection() {
        let fields: HashSet<&str> = FIELD_COLUMNS.iter().map(|(f, _)| *f).collect();
        let columns: HashSet<&str> = FIELD_COLUMNS.iter().map(|(_, c)| *c).collect();
        assert_eq!(fields.len(), FIELD_COLUMNS.len());
        assert_eq!(columns.len(), FIELD_COLUMNS.len());
    }

    #[test]
    fn test_select_columns_lists_every_column() {
        assert_eq!(
            select_columns(),
            "id,type,job_description,resume,output,created_at"
        );
    }

    #[test]
    fn test_row_and_entry_keys_follow_the_table() {
        let row = sample_row();
        let entry: HistoryEntry = row.clone().into();

        let row_json = serde_json::to_value(&row).unwrap();
        let entry_json = serde_json::to_value(&entry).unwrap();

        let mut columns: Vec<String> = FIELD_COLUMNS.iter().map(|(_, c)| c.to_string()).collect();
        columns.sort();
        let mut fields: Vec<String> = FIELD_COLUMNS.iter().map(|(f, _)| f.to_string()).collect();
        fields.sort();

        assert_eq!(sorted_keys(&row_json), columns);
        assert_eq!(sorted_keys(&entry_json), fields);

        // Each mapped pair carries the same value on both sides.
        for (field, column) in FIELD_COLUMNS {
            assert_eq!(entry_json[field], row_json[column], "{field} <-> {column}");
        }
    }

    #[test]
    fn test_to_external_preserves_every_value() {
        let entry: HistoryEntry = sample_row().into();
        assert_eq!(entry.id, 7);
        assert_eq!(entry.kind, "cover");
        assert_eq!(entry.job_description, "JD");
        assert_eq!(entry.resume, "R");
        assert_eq!(entry.output, "O");
        assert_eq!(entry.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_insert_row_uses_column_names() {
        let row = HistoryInsertRow::from(NewHistoryEntry {
            kind: "resume".to_string(),
            job_description: "J".to_string(),
            resume: "R".to_string(),
            output: "O".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"type": "resume", "job_description": "J", "resume": "R", "output": "O"})
        );
    }

    #[test]
    fn test_update_row_only_carries_provided_fields() {
        let row = HistoryUpdateRow::from(HistoryPatch {
            job_description: Some("new JD".to_string()),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"job_description": "new JD"})
        );

        let empty = HistoryUpdateRow::from(HistoryPatch::default());
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn test_row_parses_database_timestamp_with_offset() {
        let row: HistoryRow = serde_json::from_value(json!({
            "id": 3,
            "type": "cover",
            "job_description": "",
            "resume": "",
            "output": "text",
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        }))
        .unwrap();
        assert_eq!(row.id, 3);
        assert_eq!(row.job_description, "");
    }
}
