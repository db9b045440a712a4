//! Per-format upgraders and the contract they share.
//!
//! Every upgrader enumerates its own candidate files under the project root,
//! decides per file what to rewrite, and writes each file at most once after
//! the whole new content has been computed. Malformed files and gated
//! transitions yield warnings, never errors.

pub mod aws;
pub mod code_style;
pub mod dockerfile;
pub mod github_actions;
pub mod global_json;
pub mod lambda_tools;
pub mod package_version;
pub mod project_file;
pub mod sam_template;
pub mod scripts;
pub mod serverless;
pub mod vscode;
pub mod vsconfig;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bumper_core::errors::{RegistryError, TextError};
use bumper_core::text::TextFile;
use bumper_core::types::edits::WarningKind;
use bumper_core::{
    BumperConfig, CancellationToken, ProcessingResult, UpgradeContext, UpgradeInfo, UpgradeResult,
};

use crate::discovery::{self, FilePatterns};
use crate::documents::DocumentError;
use crate::registry::{
    ContainerRegistry, DigestCache, HttpContainerRegistry, NuGetPackageSource, PackageVersionSource,
};
use crate::tooling::{DotNetTooling, ProcessDotNetTooling};

pub use code_style::CodeStyleUpgrader;
pub use dockerfile::DockerfileUpgrader;
pub use github_actions::GitHubActionsUpgrader;
pub use global_json::GlobalJsonUpgrader;
pub use lambda_tools::LambdaToolsUpgrader;
pub use package_version::PackageVersionUpgrader;
pub use project_file::ProjectFileUpgrader;
pub use sam_template::SamTemplateUpgrader;
pub use scripts::ScriptUpgrader;
pub use serverless::ServerlessUpgrader;
pub use vscode::VsCodeUpgrader;
pub use vsconfig::VsConfigUpgrader;

/// Everything one upgrader invocation may read or append to.
pub struct UpgradeRequest<'a> {
    pub upgrade: &'a UpgradeInfo,
    pub root: &'a Path,
    pub config: &'a BumperConfig,
    pub context: &'a UpgradeContext,
    pub cancel: &'a CancellationToken,
}

impl UpgradeRequest<'_> {
    /// Candidate files under the project root, sorted.
    pub fn find(&self, patterns: &FilePatterns) -> UpgradeResult<Vec<PathBuf>> {
        discovery::find_files(self.root, patterns, &self.config.scan, self.cancel)
    }

    pub fn relative(&self, path: &Path) -> PathBuf {
        discovery::relative_to(self.root, path)
    }
}

/// One file format the pipeline knows how to move to a new release.
pub trait Upgrader: Send + Sync {
    /// Stable name used in logs and step reports.
    fn name(&self) -> &'static str;

    /// Rewrite every applicable file under `request.root`.
    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult>;
}

/// External collaborators injected into the upgraders that need them.
#[derive(Clone, Default)]
pub struct UpgraderServices {
    pub digests: Option<Arc<DigestCache>>,
    pub packages: Option<Arc<dyn PackageVersionSource>>,
    pub tooling: Option<Arc<dyn DotNetTooling>>,
}

impl UpgraderServices {
    /// Services backed by public registries, nuget.org and the local `dotnet`.
    pub fn online() -> Result<Self, RegistryError> {
        let registry: Arc<dyn ContainerRegistry> = Arc::new(HttpContainerRegistry::new()?);
        Ok(Self {
            digests: Some(Arc::new(DigestCache::new(registry))),
            packages: Some(Arc::new(NuGetPackageSource::new()?)),
            tooling: Some(Arc::new(ProcessDotNetTooling::new())),
        })
    }
}

/// The built-in upgraders in the order the pipeline runs them.
///
/// Project files come before package references so packages are judged
/// against already-updated target frameworks.
pub fn default_upgraders(services: &UpgraderServices) -> Vec<Box<dyn Upgrader>> {
    vec![
        Box::new(GlobalJsonUpgrader),
        Box::new(ProjectFileUpgrader),
        Box::new(PackageVersionUpgrader::new(services.packages.clone())),
        Box::new(DockerfileUpgrader::new(services.digests.clone())),
        Box::new(GitHubActionsUpgrader),
        Box::new(LambdaToolsUpgrader),
        Box::new(SamTemplateUpgrader),
        Box::new(ServerlessUpgrader),
        Box::new(ScriptUpgrader),
        Box::new(VsCodeUpgrader),
        Box::new(VsConfigUpgrader),
        Box::new(CodeStyleUpgrader::new(services.tooling.clone())),
    ]
}

/// The decision for a single file.
#[derive(Debug, Default)]
pub(crate) struct FileOutcome {
    /// New content, when anything changed.
    pub content: Option<String>,
    /// Changelog entries, without the file path.
    pub changes: Vec<String>,
    pub warnings: Vec<(WarningKind, String)>,
}

impl FileOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn malformed(error: &DocumentError) -> Self {
        Self::default().with_warning(WarningKind::Malformed, error.to_string())
    }

    pub fn with_warning(mut self, kind: WarningKind, message: impl Into<String>) -> Self {
        self.warnings.push((kind, message.into()));
        self
    }

    /// Record the edited text if it differs from `original`.
    pub fn with_content(mut self, original: &str, edited: String, changes: Vec<String>) -> Self {
        if edited != original {
            self.content = Some(edited);
            self.changes = changes;
        }
        self
    }
}

/// Read, decide, and write each file in turn.
///
/// Cancellation is checked between files, so a cancelled run leaves every
/// file either fully rewritten or untouched.
pub(crate) fn process_files<F>(
    name: &str,
    request: &UpgradeRequest<'_>,
    files: &[PathBuf],
    mut decide: F,
) -> UpgradeResult<ProcessingResult>
where
    F: FnMut(&TextFile, &Path) -> UpgradeResult<FileOutcome>,
{
    let mut result = ProcessingResult::None;
    for path in files {
        request.cancel.check()?;
        let relative = request.relative(path);
        let file = match TextFile::read(path) {
            Ok(file) => file,
            Err(e @ TextError::Undecodable { .. }) => {
                tracing::warn!(path = %relative.display(), error = %e, "skipping undecodable file");
                request
                    .context
                    .record_warning(name, &relative, WarningKind::Malformed, e.to_string());
                result = result.merge(ProcessingResult::Warning);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = decide(&file, &relative)?;

        if let Some(content) = &outcome.content {
            file.write(content)?;
            tracing::info!(path = %relative.display(), changes = outcome.changes.len(), "updated file");
            for change in &outcome.changes {
                request
                    .context
                    .log_change(format!("{change} in {}", relative.display()));
            }
            result = result.merge(ProcessingResult::Success);
        } else {
            tracing::debug!(path = %relative.display(), "no change needed");
        }

        for (kind, message) in outcome.warnings {
            tracing::warn!(path = %relative.display(), kind = kind.code(), "{message}");
            request.context.record_warning(name, &relative, kind, message);
            result = result.merge(ProcessingResult::Warning);
        }
    }
    Ok(result)
}
