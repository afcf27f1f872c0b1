//! Core traits defined in `folio-core` and implemented by other crates.

pub mod blob;
pub mod record;

pub use blob::BlobStore;
pub use record::{RecordBackend, RecordOperation, RecordRequest, RecordResponse};
