//! Serverless Framework descriptors.

use bumper_core::types::edits::WarningKind;
use bumper_core::{ProcessingResult, UpgradeResult};

use super::aws::{gate_warning, upgraded_runtime};
use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{yaml, TextEdits};

const RUNTIME_PATHS: &[&[&str]] = &[&["provider", "runtime"], &["functions", "*", "runtime"]];

pub struct ServerlessUpgrader;

impl Upgrader for ServerlessUpgrader {
    fn name(&self) -> &'static str {
        "serverless"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(&["serverless.yml", "serverless.yaml"]))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, _| {
            let documents = match yaml::validate(&file.content) {
                Ok(documents) => documents,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let has_provider = documents
                .first()
                .and_then(|doc| doc.as_mapping())
                .is_some_and(|map| map.contains_key("provider"));
            if !has_provider {
                return Ok(FileOutcome::unchanged());
            }

            let mut edits = TextEdits::new();
            let mut changes = Vec::new();
            for entry in yaml::scalar_entries(&file.content) {
                if !RUNTIME_PATHS.iter().any(|p| entry.matches(p)) {
                    continue;
                }
                if let Some(next) = upgraded_runtime(&entry.value, upgrade) {
                    changes.push(format!("Update AWS Lambda runtime from {} to {next}", entry.value));
                    edits.replace(entry.range, next);
                }
            }

            if edits.is_empty() {
                return Ok(FileOutcome::unchanged());
            }
            if let Some(warning) = gate_warning(upgrade) {
                return Ok(FileOutcome::unchanged().with_warning(WarningKind::Unsupported, warning));
            }
            Ok(FileOutcome::unchanged().with_content(&file.content, edits.apply(&file.content), changes))
        })
    }
}
