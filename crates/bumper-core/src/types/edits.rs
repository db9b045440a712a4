//! Location records for edits made and references left behind.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A (line, column, matched text) triple. Lines and columns are 1-based.
///
/// Ordered by line then column so reports are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PotentialEdit {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl PotentialEdit {
    pub fn new(line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            column,
            text: text.into(),
        }
    }
}

/// A version-bearing token the scanner found but no upgrader edited.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RemainingReference {
    /// Path relative to the project root.
    pub path: PathBuf,
    pub edit: PotentialEdit,
}

/// Why an upgrader finished with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// The file could not be parsed.
    Malformed,
    /// Policy forbids applying this transition automatically.
    Unsupported,
    /// A remote lookup failed; the dependent edit was skipped.
    Transient,
    /// An external tool reported a failure.
    ToolFailure,
}

impl WarningKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Malformed => "BUMPER001",
            Self::Unsupported => "BUMPER002",
            Self::Transient => "BUMPER003",
            Self::ToolFailure => "BUMPER004",
        }
    }
}

/// A warning raised while processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeWarning {
    pub upgrader: String,
    pub path: PathBuf,
    pub kind: WarningKind,
    pub message: String,
}
