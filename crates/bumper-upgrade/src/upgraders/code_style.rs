//! C# code style fixes that newer language versions make available.
//!
//! The edits are made by `dotnet format` itself, so this upgrader only decides
//! which diagnostics to apply and works out afterwards which files changed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use bumper_core::types::edits::WarningKind;
use bumper_core::{DotNetVersion, ProcessingResult, UpgradeResult};
use rayon::prelude::*;
use xxhash_rust::xxh3::xxh3_64;

use super::{UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::tooling::{DotNetTooling, ToolRun};

const MINIMUM: DotNetVersion = DotNetVersion::new(8, 0);

/// Collection expressions, primary constructors and target-typed `new`.
const NET8_DIAGNOSTICS: &[&str] = &[
    "IDE0028", "IDE0090", "IDE0290", "IDE0300", "IDE0301", "IDE0302", "IDE0303", "IDE0304", "IDE0305",
];

/// `System.Threading.Lock`.
const NET9_DIAGNOSTICS: &[&str] = &["IDE0330"];

/// The diagnostics to fix when targeting `channel`; empty below 8.0.
pub fn diagnostics_for(channel: DotNetVersion) -> Vec<&'static str> {
    let mut ids = Vec::new();
    if channel >= MINIMUM {
        ids.extend_from_slice(NET8_DIAGNOSTICS);
    }
    if channel >= DotNetVersion::new(9, 0) {
        ids.extend_from_slice(NET9_DIAGNOSTICS);
    }
    ids
}

pub struct CodeStyleUpgrader {
    tooling: Option<Arc<dyn DotNetTooling>>,
}

impl CodeStyleUpgrader {
    pub fn new(tooling: Option<Arc<dyn DotNetTooling>>) -> Self {
        Self { tooling }
    }
}

/// Content hash of every file in `files`. Unreadable files are left out.
fn hash_files(files: &[PathBuf]) -> BTreeMap<PathBuf, u64> {
    files
        .par_iter()
        .filter_map(|path| match std::fs::read(path) {
            Ok(bytes) => Some((path.clone(), xxh3_64(&bytes))),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "failed to hash source file");
                None
            }
        })
        .collect()
}

impl Upgrader for CodeStyleUpgrader {
    fn name(&self) -> &'static str {
        "code-style"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let Some(tooling) = &self.tooling else {
            return Ok(ProcessingResult::None);
        };
        let diagnostics = diagnostics_for(request.upgrade.channel);
        if diagnostics.is_empty() {
            return Ok(ProcessingResult::None);
        }
        let projects = request.find(&FilePatterns::new(&["*.csproj"]))?;
        if projects.is_empty() {
            return Ok(ProcessingResult::None);
        }

        let sources = FilePatterns::new(&["*.cs"]);
        let before = hash_files(&request.find(&sources)?);
        let mut result = ProcessingResult::None;

        for project in &projects {
            request.cancel.check()?;
            let relative = request.relative(project);
            match tooling.format_style(project, &diagnostics, request.cancel)? {
                ToolRun::Unavailable => {
                    tracing::debug!("dotnet is not available; skipping code style fixes");
                    return Ok(ProcessingResult::None);
                }
                ToolRun::Succeeded => {
                    tracing::debug!(path = %relative.display(), "applied code style fixes");
                }
                ToolRun::Failed { message } => {
                    tracing::warn!(path = %relative.display(), error = %message, "dotnet format failed");
                    request.context.record_warning(
                        self.name(),
                        &relative,
                        WarningKind::ToolFailure,
                        format!("dotnet format failed: {message}"),
                    );
                    result = result.merge(ProcessingResult::Warning);
                }
            }
        }

        let after = hash_files(&request.find(&sources)?);
        for (path, hash) in &after {
            if before.get(path) != Some(hash) {
                let relative = request.relative(path);
                tracing::info!(path = %relative.display(), "code style updated");
                request
                    .context
                    .log_change(format!("Apply code style fixes in {}", relative.display()));
                result = result.merge(ProcessingResult::Success);
            }
        }
        Ok(result)
    }
}
