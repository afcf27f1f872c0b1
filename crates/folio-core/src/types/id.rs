//! Typed identifiers for owners and stored records.
//!
//! Record identifiers are newtype wrappers around [`uuid::Uuid`] so that a
//! `TransactionId` can never be passed where a `RecordId` is expected.
//! Owners come from the external identity provider and are opaque strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// Identifier of a drive record (folder or file).
    RecordId
);

define_id!(
    /// Identifier of a ledger transaction row.
    TransactionId
);

define_id!(
    /// Identifier of a statement upload cross-reference.
    UploadId
);

/// Namespace for name-derived folder identifiers.
const ENTITY_NAMESPACE: Uuid = Uuid::from_u128(0x6f3c_2a51_9d4e_4b7a_8c1f_52e0_d9a7_b3c4);

impl RecordId {
    /// Deterministic folder identifier for an owner's entity slug.
    ///
    /// The same `(owner, slug)` pair always yields the same id; different
    /// owners never share one.
    pub fn derived(owner: &OwnerId, slug: &str) -> Self {
        Self(Uuid::new_v5(
            &ENTITY_NAMESPACE,
            format!("{}:{}", owner.as_str(), slug).as_bytes(),
        ))
    }
}

/// Identifier of the user that owns entities, records and ledger rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Build an owner id from trimmed input.
    ///
    /// The id becomes one blob key segment, so empty ids, path separators
    /// and dot-only ids are rejected.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Owner id cannot be empty"));
        }
        if trimmed.contains(['/', '\\']) || trimmed.chars().all(|c| c == '.') {
            return Err(AppError::validation(format!(
                "Owner id must be a single path segment: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = AppError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

impl FromStr for OwnerId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
