//! Statement upload cross-references.

pub mod model;

pub use model::StatementUpload;
