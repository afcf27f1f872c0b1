//! Saga step policies and per-operation reports.
//!
//! Lifecycle operations run as ordered steps against independent stores.
//! A step's [`StepPolicy`] decides whether its failure stops the operation
//! or is only counted. Nothing is ever rolled back.

use std::fmt;

use serde::Serialize;

use folio_core::result::AppResult;

/// What a step failure does to the rest of the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// The first failure propagates and later steps never run.
    Abort,
    /// Failures are logged per item and the step carries on.
    BestEffort,
}

impl fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Counters for one saga step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Step name.
    pub name: &'static str,
    /// Failure policy.
    pub policy: StepPolicy,
    /// Store calls attempted.
    pub attempted: usize,
    /// Calls that succeeded.
    pub succeeded: usize,
    /// Calls that failed.
    pub failed: usize,
    /// Why the step did not run, if it was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl StepOutcome {
    /// Start counting a step.
    pub fn new(name: &'static str, policy: StepPolicy) -> Self {
        Self {
            name,
            policy,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: None,
        }
    }

    /// Count one call result. Returns whether it succeeded.
    pub fn record<T>(&mut self, result: &AppResult<T>) -> bool {
        self.attempted += 1;
        if result.is_ok() {
            self.succeeded += 1;
            true
        } else {
            self.failed += 1;
            false
        }
    }

    /// Mark the step as skipped.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.skipped = Some(reason.into());
    }

    /// Whether the step was skipped.
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Per-step report of one lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SagaReport {
    /// Operation name.
    pub operation: &'static str,
    /// Steps in execution order.
    pub steps: Vec<StepOutcome>,
}

impl SagaReport {
    /// Start a report for `operation`.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            steps: Vec::new(),
        }
    }

    /// Append a finished step.
    pub fn push(&mut self, step: StepOutcome) {
        self.steps.push(step);
    }

    /// Look up a step by name.
    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Total failed calls across every step.
    pub fn failed(&self) -> usize {
        self.steps.iter().map(|s| s.failed).sum()
    }

    /// Whether every step ran and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|s| s.failed == 0 && !s.is_skipped())
    }
}
