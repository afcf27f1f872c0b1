//! Core type definitions used across the Folio workspace.

pub mod id;
pub mod scan;

pub use id::*;
pub use scan::{ListPage, ScanPage};
