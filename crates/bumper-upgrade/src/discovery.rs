//! Candidate file discovery using the `ignore` crate's parallel walker.
//!
//! Honours `.gitignore` (with or without a `.git` directory) and skips build
//! output and dependency folders. Returns files sorted by path for
//! deterministic processing.

use std::path::{Path, PathBuf};

use bumper_core::config::ScanConfig;
use bumper_core::{CancellationToken, UpgradeError, UpgradeResult};
use crossbeam_channel as channel;
use glob::{MatchOptions, Pattern};

/// Directories never searched for candidate files.
pub const DEFAULT_IGNORES: &[&str] = &[".git", ".vs", "bin", "obj", "node_modules"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// File patterns an upgrader is interested in.
///
/// Patterns without a `/` match the file name; patterns with one match the
/// path relative to the project root, using `/` separators.
#[derive(Debug, Clone)]
pub struct FilePatterns {
    names: Vec<Pattern>,
    relative: Vec<Pattern>,
}

impl FilePatterns {
    pub fn new(patterns: &[&str]) -> Self {
        let mut names = Vec::new();
        let mut relative = Vec::new();
        for raw in patterns {
            match Pattern::new(raw) {
                Ok(pattern) if raw.contains('/') => relative.push(pattern),
                Ok(pattern) => names.push(pattern),
                Err(e) => tracing::warn!(pattern = %raw, error = %e, "invalid file pattern"),
            }
        }
        Self { names, relative }
    }

    pub fn matches(&self, relative_path: &Path) -> bool {
        let name = relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.names.iter().any(|p| p.matches_with(name, MATCH_OPTIONS)) {
            return true;
        }
        let unix = relative_path.to_string_lossy().replace('\\', "/");
        self.relative.iter().any(|p| p.matches_with(&unix, MATCH_OPTIONS))
    }
}

/// Find every file under `root` matching `patterns`.
pub fn find_files(
    root: &Path,
    patterns: &FilePatterns,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> UpgradeResult<Vec<PathBuf>> {
    walk_files(root, config, &[], cancel, &|relative| patterns.matches(relative))
}

/// Walk `root` in parallel, keeping the files `accept` returns true for.
///
/// `extra_ignores` are gitignore-style globs skipped in addition to
/// [`DEFAULT_IGNORES`] and the project's ignore files.
pub fn walk_files(
    root: &Path,
    config: &ScanConfig,
    extra_ignores: &[String],
    cancel: &CancellationToken,
    accept: &(dyn Fn(&Path) -> bool + Sync),
) -> UpgradeResult<Vec<PathBuf>> {
    cancel.check()?;
    let (tx, rx) = channel::unbounded();

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .max_filesize(Some(config.effective_max_file_size()))
        .follow_links(config.effective_follow_symlinks());

    let threads = config.effective_threads();
    if threads > 0 {
        builder.threads(threads);
    }

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in DEFAULT_IGNORES {
        let _ = overrides.add(&format!("!{pattern}/**"));
        let _ = overrides.add(&format!("!{pattern}"));
    }
    for pattern in extra_ignores {
        let pattern = pattern.trim().trim_start_matches('!');
        if pattern.is_empty() {
            continue;
        }
        if let Err(e) = overrides.add(&format!("!{pattern}")) {
            tracing::warn!(pattern = %pattern, error = %e, "invalid ignore pattern");
        }
    }
    match overrides.build() {
        Ok(built) => {
            builder.overrides(built);
        }
        Err(e) => tracing::warn!(error = %e, "failed to build ignore overrides"),
    }

    builder.build_parallel().run(|| {
        let tx = tx.clone();
        let cancel = cancel.clone();
        Box::new(move |entry| {
            if cancel.is_cancelled() {
                return ignore::WalkState::Quit;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    return ignore::WalkState::Continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            if accept(relative) {
                let _ = tx.send(path.to_path_buf());
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    if cancel.is_cancelled() {
        return Err(UpgradeError::Cancelled);
    }
    let mut files: Vec<PathBuf> = rx.into_iter().collect();
    files.sort();
    Ok(files)
}

/// `path` relative to `root` for messages and reports.
pub fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
