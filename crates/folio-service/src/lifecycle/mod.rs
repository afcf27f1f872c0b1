//! Entity lifecycle orchestration.
//!
//! - `manager`: construction, CREATE and LIST
//! - `rename`: RENAME across blobs, records and upload URLs
//! - `delete`: cascading DELETE
//! - `file`: single-file DELETE-FILE and RENAME-FILE

pub mod delete;
pub mod file;
pub mod manager;
pub mod rename;

pub use manager::EntityLifecycleManager;
