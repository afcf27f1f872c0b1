//! # folio-storage
//!
//! Blob store implementations for Folio (memory, local filesystem, and
//! S3-compatible object stores) plus [`BlobStorage`], the adapter the
//! lifecycle manager talks to.

pub mod adapter;
pub mod providers;

pub use adapter::BlobStorage;
pub use providers::create_blob_store;
