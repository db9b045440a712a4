//! Project-wide scan for version references older than the target.
//!
//! Nothing is rewritten. Each hit is recorded in the upgrade context as a
//! (line, column, text) triple for the report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use bumper_core::config::ScanConfig;
use bumper_core::text::TextFile;
use bumper_core::types::edits::RemainingReference;
use bumper_core::versioning::rid::{NON_PORTABLE_RID, PORTABLE_RID_THRESHOLD};
use bumper_core::versioning::TargetFramework;
use bumper_core::{
    CancellationToken, DotNetVersion, PotentialEdit, ProcessingResult, UpgradeInfo, UpgradeResult,
};
use rayon::prelude::*;
use regex::Regex;

use super::media::{is_binary_extension, looks_binary};
use crate::discovery::{relative_to, walk_files};
use crate::documents::lines::split_lines;
use crate::engine::PostProcessor;
use crate::upgraders::aws::upgraded_runtime;
use crate::upgraders::UpgradeRequest;

/// Cheap substring test run before the regexes on every line.
static PREFILTER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build([
            "net", "win", "osx", "ubuntu", "alpine", "debian", "rhel", "centos", "fedora", "opensuse",
            "sles", "ol.", "linuxmint",
        ])
        .expect("prefilter patterns are valid")
});

static MONIKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnet(?:coreapp)?\d+\.\d+\b").expect("moniker regex is valid"));

static LAMBDA_RUNTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdotnet(?:core)?\d+(?:\.\d+)?\b").expect("runtime regex is valid"));

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"mcr\.microsoft\.com/dotnet/(?:nightly/)?[a-z-]+:(?P<major>\d+)\.(?P<minor>\d+)")
        .expect("image regex is valid")
});

/// Old version references in `content`, ordered by line and column.
pub fn find_references(content: &str, upgrade: &UpgradeInfo) -> Vec<PotentialEdit> {
    let target = upgrade.channel;
    let mut found = Vec::new();

    for line in split_lines(content) {
        if !PREFILTER.is_match(line.text) {
            continue;
        }
        let mut push = |start: usize, text: &str| {
            let column = line.text[..start].chars().count() + 1;
            found.push(PotentialEdit::new(line.number, column, text));
        };

        for m in MONIKER.find_iter(line.text) {
            if TargetFramework::parse(m.as_str()).is_some_and(|tfm| tfm.is_older_than(target)) {
                push(m.start(), m.as_str());
            }
        }
        for m in LAMBDA_RUNTIME.find_iter(line.text) {
            if upgraded_runtime(m.as_str(), upgrade).is_some() {
                push(m.start(), m.as_str());
            }
        }
        for caps in IMAGE.captures_iter(line.text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            let version = caps["major"]
                .parse::<u32>()
                .ok()
                .zip(caps["minor"].parse::<u32>().ok())
                .map(|(major, minor)| DotNetVersion::new(major, minor));
            if version.is_some_and(|v| v < target) {
                push(m.start(), m.as_str());
            }
        }
        if target >= PORTABLE_RID_THRESHOLD {
            for m in NON_PORTABLE_RID.find_iter(line.text) {
                push(m.start(), m.as_str());
            }
        }
    }

    found.sort();
    found
}

/// Scans the project once the upgraders are done.
#[derive(Debug, Clone, Default)]
pub struct RemainingReferenceScanner {
    ignore_globs: Vec<String>,
}

impl RemainingReferenceScanner {
    /// `ignore_globs` are skipped on top of the project's ignore files.
    pub fn new(ignore_globs: Vec<String>) -> Self {
        Self { ignore_globs }
    }

    /// Every remaining reference under `root`, ordered by path, line and column.
    pub fn scan(
        &self,
        root: &Path,
        upgrade: &UpgradeInfo,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> UpgradeResult<Vec<RemainingReference>> {
        let files = walk_files(root, config, &self.ignore_globs, cancel, &|relative| {
            !is_binary_extension(relative)
        })?;

        let per_file: Vec<(PathBuf, Vec<PotentialEdit>)> = files
            .par_iter()
            .filter_map(|path| {
                if cancel.is_cancelled() {
                    return None;
                }
                let bytes = match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                        return None;
                    }
                };
                if looks_binary(&bytes) {
                    return None;
                }
                let file = TextFile::decode(path, &bytes).ok()?;
                let edits = find_references(&file.content, upgrade);
                (!edits.is_empty()).then(|| (relative_to(root, path), edits))
            })
            .collect();
        cancel.check()?;

        let mut references: Vec<RemainingReference> = per_file
            .into_iter()
            .flat_map(|(path, edits)| {
                edits
                    .into_iter()
                    .map(move |edit| RemainingReference { path: path.clone(), edit })
            })
            .collect();
        references.sort();
        Ok(references)
    }
}

impl PostProcessor for RemainingReferenceScanner {
    fn name(&self) -> &'static str {
        "remaining-references"
    }

    fn process(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let references = self.scan(request.root, request.upgrade, &request.config.scan, request.cancel)?;
        if references.is_empty() {
            return Ok(ProcessingResult::None);
        }
        tracing::warn!(count = references.len(), "references to older .NET versions remain");

        let mut by_file: BTreeMap<PathBuf, Vec<PotentialEdit>> = BTreeMap::new();
        for reference in references {
            by_file.entry(reference.path).or_default().push(reference.edit);
        }
        for (path, edits) in by_file {
            request.context.record_remaining(path, edits);
        }
        Ok(ProcessingResult::Warning)
    }
}

#[cfg(test)]
mod tests {
    use bumper_core::{ReleaseType, SupportPhase};

    use super::*;

    #[test]
    fn finds_old_tokens_only() {
        let eight = UpgradeInfo::new("8.0".parse().unwrap(), ReleaseType::Lts, SupportPhase::Active, "8.0.100".parse().unwrap());
        let content = "\
<TargetFramework>net6.0</TargetFramework>
path: bin/Release/net8.0/app.dll
runtime: dotnet6
FROM mcr.microsoft.com/dotnet/sdk:7.0 AS build
rid: win10-x64 and linux-x64
framework: net48
";
        let texts: Vec<_> = find_references(content, &eight)
            .into_iter()
            .map(|e| (e.line, e.column, e.text))
            .collect();
        assert_eq!(
            texts,
            vec![
                (1, 18, "net6.0".to_string()),
                (3, 10, "dotnet6".to_string()),
                (4, 6, "mcr.microsoft.com/dotnet/sdk:7.0".to_string()),
                (5, 6, "win10-x64".to_string()),
            ]
        );
    }
}
