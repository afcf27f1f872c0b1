//! # folio-database
//!
//! Record store backends and typed table adapters for Folio.
//!
//! Every backend speaks the same `execute` contract from
//! [`folio_core::traits::record`]. None of them filter server-side: each
//! query in this crate is a capped full scan followed by an in-memory
//! filter, so items beyond `records.max_scan_items` are invisible.

pub mod backends;
pub mod repositories;
pub mod table;

pub use backends::create_record_backend;
pub use repositories::{MetadataCatalog, StatementUploadRepository, TransactionLedger};
pub use table::{Record, RecordTable};
