//! # folio-entity
//!
//! Domain entity models for Folio. Every struct in this crate represents a
//! record stored in one of the record tables, or a value derived from them.
//! All entities derive `Debug`, `Clone`, `Serialize` and `Deserialize`.

pub mod drive;
pub mod ledger;
pub mod upload;

pub use drive::{DriveRecord, DriveRecordKind, DriveRecordPatch, Entity};
pub use ledger::TransactionRecord;
pub use upload::StatementUpload;
