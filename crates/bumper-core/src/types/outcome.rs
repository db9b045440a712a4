//! Per-step processing outcome and its reduction to one run-level result.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of one upgrader (or post-processor) invocation.
///
/// Variants are ordered by precedence, so the overall run result is simply the
/// maximum of every step's result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingResult {
    /// Nothing needed changing.
    #[default]
    None,
    /// At least one file was rewritten.
    Success,
    /// An edit was applied or attempted but something needs manual review.
    Warning,
    /// A failure-level condition, e.g. a post-processing validation failed.
    Error,
}

impl ProcessingResult {
    /// Combine two outcomes, keeping the one with higher precedence.
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }

    /// Reduce many outcomes into one.
    pub fn reduce<I: IntoIterator<Item = Self>>(results: I) -> Self {
        results.into_iter().fold(Self::None, Self::merge)
    }

    pub fn made_changes(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for ProcessingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}
