//! Named table adapters for Folio's record stores.

pub mod catalog;
pub mod ledger;
pub mod uploads;

pub use catalog::MetadataCatalog;
pub use ledger::TransactionLedger;
pub use uploads::StatementUploadRepository;
