//! Entity view over a folder drive record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{OwnerId, RecordId};

use super::model::DriveRecord;

/// Root segment of every entity path.
pub const ENTITIES_ROOT: &str = "entities";

/// A user-defined logical folder grouping uploaded statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Folder record id, derived from the owner and the name.
    pub id: RecordId,
    /// Entity name.
    pub name: String,
    /// The owning user.
    pub owner_id: OwnerId,
    /// Canonical path, `entities/<name>`.
    pub path: String,
    /// Blob key prefix every object of the entity lives under.
    pub prefix: String,
    /// When the entity was created.
    pub created_at: DateTime<Utc>,
    /// When the entity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Canonical path for an entity name.
    pub fn path_for(name: &str) -> String {
        format!("{ENTITIES_ROOT}/{name}")
    }

    /// Entity name encoded in a path, if the path is exactly
    /// `entities/<name>`.
    pub fn name_from_path(path: &str) -> Option<&str> {
        let name = path.strip_prefix(ENTITIES_ROOT)?.strip_prefix('/')?;
        if name.is_empty() || name.contains('/') {
            None
        } else {
            Some(name)
        }
    }

    /// Build the entity view of a folder record.
    ///
    /// Returns `None` for files and for folders outside `entities/`.
    pub fn from_record(record: &DriveRecord) -> Option<Self> {
        if !record.is_folder() {
            return None;
        }
        let name = Self::name_from_path(&record.path)?;
        Some(Self {
            id: record.id,
            name: name.to_string(),
            owner_id: record.owner_id.clone(),
            path: record.path.clone(),
            prefix: record.blob_key.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
