//! NuGet package versions aligned with the .NET release train.

use std::sync::Arc;

use bumper_core::errors::RegistryError;
use bumper_core::types::edits::WarningKind;
use bumper_core::{
    BumperConfig, ProcessingResult, SemanticVersion, UpgradeError, UpgradeInfo, UpgradeResult,
};

use super::project_file::PROJECT_FILE_PATTERNS;
use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{msbuild, TextEdits};
use crate::registry::PackageVersionSource;

/// Package id prefixes versioned in lockstep with .NET.
pub const ALIGNED_PREFIXES: &[&str] = &[
    "Microsoft.AspNetCore.",
    "Microsoft.EntityFrameworkCore",
    "Microsoft.Extensions.",
    "System.",
];

/// Matches a prefix but follows its own release cadence.
const NOT_ALIGNED: &[&str] = &["Microsoft.NET.Test.Sdk"];

pub struct PackageVersionUpgrader {
    source: Option<Arc<dyn PackageVersionSource>>,
}

impl PackageVersionUpgrader {
    pub fn new(source: Option<Arc<dyn PackageVersionSource>>) -> Self {
        Self { source }
    }
}

/// Whether `id` should move with the target release.
pub fn is_eligible(id: &str, config: &BumperConfig) -> bool {
    if config.is_package_excluded(id) {
        return false;
    }
    if config.is_package_included(id) {
        return true;
    }
    let lower = id.to_ascii_lowercase();
    !NOT_ALIGNED.iter().any(|n| n.eq_ignore_ascii_case(id))
        && ALIGNED_PREFIXES
            .iter()
            .any(|p| lower.starts_with(&p.to_ascii_lowercase()))
}

/// The newest published version on the target channel.
///
/// Prereleases only qualify while the target release itself is a prerelease.
pub fn latest_for_channel(versions: &[SemanticVersion], upgrade: &UpgradeInfo) -> Option<SemanticVersion> {
    versions
        .iter()
        .filter(|v| v.channel() == upgrade.channel)
        .filter(|v| !v.is_prerelease() || upgrade.is_prerelease())
        .max()
        .cloned()
}

impl Upgrader for PackageVersionUpgrader {
    fn name(&self) -> &'static str {
        "package-versions"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let Some(source) = &self.source else {
            tracing::debug!("no package source configured");
            return Ok(ProcessingResult::None);
        };
        let files = request.find(&FilePatterns::new(PROJECT_FILE_PATTERNS))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, _| {
            let doc = match msbuild::scan(&file.content) {
                Ok(doc) => doc,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let mut edits = TextEdits::new();
            let mut changes = Vec::new();
            let mut outcome = FileOutcome::unchanged();

            for package in &doc.packages {
                let Some(version) = &package.version else {
                    continue;
                };
                if !is_eligible(&package.id, request.config) {
                    continue;
                }
                // Ranges, floating versions and MSBuild properties are left alone.
                let Ok(current) = version.value.trim().parse::<SemanticVersion>() else {
                    continue;
                };
                if u64::from(upgrade.channel.major) <= current.major {
                    continue;
                }

                request.cancel.check()?;
                let available = match source.versions(&package.id, request.cancel) {
                    Ok(versions) => versions,
                    Err(RegistryError::Cancelled) => return Err(UpgradeError::Cancelled),
                    Err(RegistryError::NotFound { .. }) => {
                        tracing::debug!(package = %package.id, "package not found on feed");
                        continue;
                    }
                    Err(e) => {
                        outcome = outcome.with_warning(
                            WarningKind::Transient,
                            format!("could not look up versions of {}: {e}", package.id),
                        );
                        continue;
                    }
                };
                let Some(latest) = latest_for_channel(&available, upgrade) else {
                    continue;
                };
                if latest > current {
                    changes.push(format!("Update {} from {current} to {latest}", package.id));
                    edits.replace(version.range.clone(), latest.to_string());
                }
            }

            if edits.is_empty() {
                return Ok(outcome);
            }
            Ok(outcome.with_content(&file.content, edits.apply(&file.content), changes))
        })
    }
}
