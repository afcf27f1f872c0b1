//! # folio-service
//!
//! Entity lifecycle orchestration for Folio. The
//! [`EntityLifecycleManager`] sequences calls to the blob store, the
//! metadata catalog, the transaction ledger and the statement-upload table
//! as sagas: ordered steps with a per-step abort-or-continue policy and no
//! rollback.
//!
//! Dependencies are provided at construction time; the manager holds no
//! global state.

pub mod deferred;
pub mod lifecycle;
pub mod naming;
pub mod saga;

pub use deferred::DeferredCleanup;
pub use lifecycle::EntityLifecycleManager;
pub use naming::EntityKeys;
pub use saga::{SagaReport, StepOutcome, StepPolicy};
