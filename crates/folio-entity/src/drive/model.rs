//! Drive record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use folio_core::types::{OwnerId, RecordId};

/// Whether a drive record describes a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveRecordKind {
    /// A logical folder.
    Folder,
    /// An uploaded file whose bytes live in the blob store.
    File,
}

/// Metadata entry for a folder or file.
///
/// A file record's `blob_key` should reference an existing blob, but this
/// can be transiently false (for example after a failed upload or a
/// half-finished rename). Readers must not assume the blob exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveRecord {
    /// Unique record identifier.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Folder or file.
    #[serde(rename = "type")]
    pub kind: DriveRecordKind,
    /// Containing folder, if any.
    #[serde(default)]
    pub parent_id: Option<RecordId>,
    /// Logical path (e.g., `entities/Shopify/march.pdf`).
    pub path: String,
    /// Physical blob key (for folders, the key prefix ending in `/`).
    pub blob_key: String,
    /// The record owner.
    pub owner_id: OwnerId,
    /// File size in bytes.
    #[serde(default)]
    pub size_bytes: Option<u64>,
    /// MIME type of the file.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl DriveRecord {
    /// Build a folder record.
    pub fn folder(
        id: RecordId,
        owner_id: OwnerId,
        name: impl Into<String>,
        path: impl Into<String>,
        blob_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            kind: DriveRecordKind::Folder,
            parent_id: None,
            path: path.into(),
            blob_key: blob_key.into(),
            owner_id,
            size_bytes: None,
            mime_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a file record placed inside `parent_id`.
    pub fn file(
        owner_id: OwnerId,
        parent_id: Option<RecordId>,
        name: impl Into<String>,
        path: impl Into<String>,
        blob_key: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            mime_type: mime_from_name(&name),
            name,
            kind: DriveRecordKind::File,
            parent_id,
            path: path.into(),
            blob_key: blob_key.into(),
            owner_id,
            size_bytes: Some(size_bytes),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this record is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == DriveRecordKind::Folder
    }

    /// Check if this record is a file.
    pub fn is_file(&self) -> bool {
        self.kind == DriveRecordKind::File
    }

    /// Whether the record's blob key lies under `prefix`.
    pub fn is_under(&self, prefix: &str) -> bool {
        self.blob_key.starts_with(prefix)
    }
}

/// Partial update for a drive record.
///
/// Only the fields that are set are sent to the store; `updated_at` is
/// always refreshed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriveRecordPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New logical path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// New blob key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,
    /// New parent folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
}

impl DriveRecordPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.path.is_none()
            && self.blob_key.is_none()
            && self.parent_id.is_none()
    }

    /// Convert to the field map sent with an `update` call.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        fields.insert(
            "updated_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        fields
    }
}

/// Guess a MIME type from a file name.
fn mime_from_name(name: &str) -> Option<String> {
    let ext = name.rsplit('.').next().filter(|ext| *ext != name)?;
    let mime = match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ofx" | "qfx" => "application/x-ofx",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime.to_string())
}
