//! Transaction ledger row model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{OwnerId, RecordId, TransactionId};

/// A financial transaction extracted from a statement file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique row identifier.
    pub id: TransactionId,
    /// The statement file this row was extracted from.
    pub file_id: RecordId,
    /// The row owner.
    pub owner_id: OwnerId,
    /// Name of the entity the statement was filed under.
    pub entity_name: String,
    /// Date the transaction posted.
    pub posted_on: NaiveDate,
    /// Statement description line.
    pub description: String,
    /// Signed amount in minor currency units.
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Counterparty, when the statement names one.
    #[serde(default)]
    pub counterparty: Option<String>,
    /// When the row was extracted.
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a row for `file_id` filed under `entity_name`.
    pub fn new(
        file_id: RecordId,
        owner_id: OwnerId,
        entity_name: impl Into<String>,
        posted_on: NaiveDate,
        description: impl Into<String>,
        amount_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            file_id,
            owner_id,
            entity_name: entity_name.into(),
            posted_on,
            description: description.into(),
            amount_minor,
            currency: currency.into(),
            counterparty: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the row belongs to `owner`'s entity `name`.
    pub fn belongs_to_entity(&self, owner: &OwnerId, name: &str) -> bool {
        &self.owner_id == owner && self.entity_name == name
    }
}
