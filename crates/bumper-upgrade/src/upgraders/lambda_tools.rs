//! `aws-lambda-tools-defaults.json`: deployment runtime and target framework.

use bumper_core::types::edits::WarningKind;
use bumper_core::versioning::TargetFramework;
use bumper_core::{ProcessingResult, UpgradeResult};

use super::aws::{gate_warning, upgraded_runtime};
use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{jsonc, TextEdits};

pub struct LambdaToolsUpgrader;

impl Upgrader for LambdaToolsUpgrader {
    fn name(&self) -> &'static str {
        "aws-lambda-tools"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(&["aws-lambda-tools-defaults.json"]))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, _| {
            let root = match jsonc::parse(&file.content) {
                Ok(root) => root,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let mut edits = TextEdits::new();
            let mut changes = Vec::new();

            if let Some(node) = root.get("function-runtime") {
                if let Some(next) = node.as_str().and_then(|v| upgraded_runtime(v, upgrade)) {
                    changes.push(format!(
                        "Update AWS Lambda runtime from {} to {next}",
                        node.as_str().unwrap_or_default()
                    ));
                    edits.replace(node.span.clone(), jsonc::encode_string(&next));
                }
            }
            if let Some(node) = root.get("framework") {
                let current = node.as_str().and_then(TargetFramework::parse);
                if let Some(tfm) = current.filter(|t| t.is_older_than(upgrade.channel)) {
                    let next = tfm.retarget(upgrade.channel).to_string();
                    changes.push(format!("Update target framework from {tfm} to {next}"));
                    edits.replace(node.span.clone(), jsonc::encode_string(&next));
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
