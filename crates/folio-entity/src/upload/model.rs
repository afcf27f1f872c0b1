//! Statement upload model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{OwnerId, RecordId, UploadId};

/// Reference to an uploaded statement by its public blob URL.
///
/// The URL embeds the blob key, so renaming an entity must rewrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementUpload {
    /// Unique upload identifier.
    pub id: UploadId,
    /// The uploading user.
    pub owner_id: OwnerId,
    /// Drive record of the uploaded file, when one was created.
    #[serde(default)]
    pub file_id: Option<RecordId>,
    /// Public URL of the uploaded blob.
    pub blob_url: String,
    /// Name of the file as uploaded.
    pub original_filename: String,
    /// When the upload happened.
    pub uploaded_at: DateTime<Utc>,
}

impl StatementUpload {
    /// Create an upload reference.
    pub fn new(
        owner_id: OwnerId,
        file_id: Option<RecordId>,
        blob_url: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        Self {
            id: UploadId::new(),
            owner_id,
            file_id,
            blob_url: blob_url.into(),
            original_filename: original_filename.into(),
            uploaded_at: Utc::now(),
        }
    }
}
