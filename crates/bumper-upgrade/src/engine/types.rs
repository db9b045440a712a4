//! Per-step and per-run results.

use std::time::Duration;

use bumper_core::types::edits::{RemainingReference, UpgradeWarning};
use bumper_core::ProcessingResult;

/// The outcome of one upgrader or post-processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub name: String,
    pub result: ProcessingResult,
    pub duration: Duration,
}

/// Everything a run produced, ready for a report writer.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// The reduced outcome of every upgrader and post-processor.
    pub result: ProcessingResult,
    pub steps: Vec<StepOutcome>,
    pub post_processing: Vec<StepOutcome>,
    pub changelog: Vec<String>,
    pub warnings: Vec<UpgradeWarning>,
    pub remaining_references: Vec<RemainingReference>,
}

impl RunReport {
    /// Whether any upgrader rewrote a file.
    pub fn made_changes(&self) -> bool {
        self.steps.iter().any(|step| step.result.made_changes())
    }

    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .chain(&self.post_processing)
            .find(|step| step.name == name)
    }
}
