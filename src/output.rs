//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use folio_service::SagaReport;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One saga step as a table row
#[derive(Debug, Tabled)]
struct StepRow {
    /// Step name
    step: &'static str,
    /// Failure policy
    policy: String,
    /// Calls attempted
    attempted: usize,
    /// Calls that succeeded
    succeeded: usize,
    /// Calls that failed
    failed: usize,
    /// Skip reason
    skipped: String,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{item:#?}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a saga report, one row per step
pub fn print_report(report: &SagaReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<StepRow> = report
                .steps
                .iter()
                .map(|step| StepRow {
                    step: step.name,
                    policy: step.policy.to_string(),
                    attempted: step.attempted,
                    succeeded: step.succeeded,
                    failed: step.failed,
                    skipped: step.skipped.clone().unwrap_or_default(),
                })
                .collect();
            if rows.is_empty() {
                println!("Nothing to do.");
            } else {
                println!("{}", Table::new(rows));
            }
            if report.is_clean() {
                print_success(&format!("{} completed", report.operation));
            } else {
                print_warning(&format!(
                    "{} completed with issues ({} failed call(s))",
                    report.operation,
                    report.failed()
                ));
            }
        }
        OutputFormat::Json => print_item(report, format),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
