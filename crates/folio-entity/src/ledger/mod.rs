//! Ledger rows derived from statement files.

pub mod model;

pub use model::TransactionRecord;
