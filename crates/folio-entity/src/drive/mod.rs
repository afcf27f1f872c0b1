//! Drive records: folder and file metadata entries.

pub mod entity;
pub mod model;

pub use entity::Entity;
pub use model::{DriveRecord, DriveRecordKind, DriveRecordPatch};
