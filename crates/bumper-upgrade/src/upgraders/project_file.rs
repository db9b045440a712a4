//! MSBuild project and property files: target frameworks and runtime identifiers.

use std::ops::Range;

use bumper_core::versioning::moniker::{monikers_to_append, MonikerListChange};
use bumper_core::versioning::rid::portable_rid_for;
use bumper_core::versioning::TargetFramework;
use bumper_core::{ProcessingResult, UpgradeResult};

use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::msbuild::{self, XmlValue};
use crate::documents::TextEdits;

/// MSBuild files the project upgraders read.
pub const PROJECT_FILE_PATTERNS: &[&str] = &[
    "*.csproj", "*.fsproj", "*.vbproj", "*.props", "*.targets", "*.pubxml",
];

pub struct ProjectFileUpgrader;

/// The trimmed value and its byte range, or `None` for empty values and
/// MSBuild expressions that must not be touched.
fn literal(value: &XmlValue) -> Option<(&str, Range<usize>)> {
    let trimmed = value.value.trim();
    if trimmed.is_empty() || trimmed.contains("$(") || value.value.len() != value.range.len() {
        return None;
    }
    let start = value.range.start + (value.value.len() - value.value.trim_start().len());
    Some((trimmed, start..start + trimmed.len()))
}

impl Upgrader for ProjectFileUpgrader {
    fn name(&self) -> &'static str {
        "project-files"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(PROJECT_FILE_PATTERNS))?;
        let channel = request.upgrade.channel;

        process_files(self.name(), request, &files, |file, _| {
            let doc = match msbuild::scan(&file.content) {
                Ok(doc) => doc,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let mut edits = TextEdits::new();
            let mut changes = Vec::new();

            for property in &doc.properties {
                let name = property.name.as_str();
                if name.eq_ignore_ascii_case("TargetFramework") {
                    let Some((value, range)) = literal(&property.value) else {
                        continue;
                    };
                    let Some(tfm) = TargetFramework::parse(value) else {
                        continue;
                    };
                    if tfm.is_older_than(channel) {
                        let updated = tfm.retarget(channel).to_string();
                        changes.push(format!("Update target framework from {value} to {updated}"));
                        edits.replace(range, updated);
                    }
                } else if name.eq_ignore_ascii_case("TargetFrameworks") {
                    let Some((value, range)) = literal(&property.value) else {
                        continue;
                    };
                    if let MonikerListChange::Appended(added) = monikers_to_append(value, channel) {
                        let separator = if value.ends_with(';') { "" } else { ";" };
                        changes.push(format!("Add target framework {}", added.join(", ")));
                        edits.insert(range.end, format!("{separator}{}", added.join(";")));
                    }
                } else if name.eq_ignore_ascii_case("RuntimeIdentifier") {
                    let Some((value, range)) = literal(&property.value) else {
                        continue;
                    };
                    if let Some(portable) = portable_rid_for(value, channel) {
                        changes.push(format!("Update runtime identifier from {value} to {portable}"));
                        edits.replace(range, portable);
                    }
                } else if name.eq_ignore_ascii_case("RuntimeIdentifiers") {
                    let Some((value, range)) = literal(&property.value) else {
                        continue;
                    };
                    let mut rewritten: Vec<String> = Vec::new();
                    let mut changed = false;
                    for rid in value.split(';').map(str::trim).filter(|r| !r.is_empty()) {
                        let next = portable_rid_for(rid, channel).unwrap_or_else(|| rid.to_string());
                        changed |= next != rid;
                        if !rewritten.contains(&next) {
                            rewritten.push(next);
                        }
                    }
                    if changed {
                        let updated = rewritten.join(";");
                        changes.push(format!("Update runtime identifiers from {value} to {updated}"));
                        edits.replace(range, updated);
                    }
                }
            }

            if edits.is_empty() {
                return Ok(FileOutcome::unchanged());
            }
            Ok(FileOutcome::unchanged().with_content(&file.content, edits.apply(&file.content), changes))
        })
    }
}
