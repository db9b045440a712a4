//! Run-scoped upgrade context: changelog, warnings and remaining references.
//!
//! Created empty at run start, passed by reference to every upgrader, and
//! consumed once by the report writers at the end. Interior locking makes
//! appends safe if an upgrader processes files in parallel.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::types::edits::{PotentialEdit, RemainingReference, UpgradeWarning, WarningKind};

#[derive(Debug, Default)]
pub struct UpgradeContext {
    changelog: Mutex<Vec<String>>,
    warnings: Mutex<Vec<UpgradeWarning>>,
    remaining: Mutex<Vec<RemainingReference>>,
    suppressed: HashSet<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl UpgradeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that drops warnings whose code appears in `no_warn`.
    pub fn with_suppressed_warnings<I, S>(no_warn: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suppressed: no_warn.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a changelog entry.
    pub fn log_change(&self, entry: impl Into<String>) {
        lock(&self.changelog).push(entry.into());
    }

    /// Record a warning unless its code is suppressed.
    pub fn record_warning(
        &self,
        upgrader: &str,
        path: impl Into<PathBuf>,
        kind: WarningKind,
        message: impl Into<String>,
    ) {
        if self.suppressed.contains(kind.code()) {
            return;
        }
        lock(&self.warnings).push(UpgradeWarning {
            upgrader: upgrader.to_string(),
            path: path.into(),
            kind,
            message: message.into(),
        });
    }

    /// Record references left for manual review in `path`.
    pub fn record_remaining(&self, path: impl Into<PathBuf>, edits: Vec<PotentialEdit>) {
        let path = path.into();
        let mut remaining = lock(&self.remaining);
        remaining.extend(edits.into_iter().map(|edit| RemainingReference {
            path: path.clone(),
            edit,
        }));
        remaining.sort();
    }

    pub fn changelog(&self) -> Vec<String> {
        lock(&self.changelog).clone()
    }

    pub fn warnings(&self) -> Vec<UpgradeWarning> {
        lock(&self.warnings).clone()
    }

    /// Remaining references ordered by path, line and column.
    pub fn remaining_references(&self) -> Vec<RemainingReference> {
        lock(&self.remaining).clone()
    }

    /// Consume the context, yielding the changelog for the report writers.
    pub fn into_changelog(self) -> Vec<String> {
        self.changelog
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
