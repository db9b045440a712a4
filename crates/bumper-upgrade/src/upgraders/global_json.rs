//! `global.json` SDK pin.

use bumper_core::{ProcessingResult, SemanticVersion, UpgradeResult};

use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{jsonc, TextEdits};

pub struct GlobalJsonUpgrader;

impl Upgrader for GlobalJsonUpgrader {
    fn name(&self) -> &'static str {
        "global.json"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(&["global.json"]))?;
        let target = &request.upgrade.sdk_version;

        process_files(self.name(), request, &files, |file, _| {
            let root = match jsonc::parse(&file.content) {
                Ok(root) => root,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let Some(node) = root.pointer("/sdk/version") else {
                return Ok(FileOutcome::unchanged());
            };
            let Some(current) = node.as_str().and_then(|v| v.parse::<SemanticVersion>().ok()) else {
                return Ok(FileOutcome::unchanged());
            };
            if current >= *target {
                return Ok(FileOutcome::unchanged());
            }

            let mut edits = TextEdits::new();
            edits.replace(node.span.clone(), jsonc::encode_string(&target.to_string()));
            Ok(FileOutcome::unchanged().with_content(
                &file.content,
                edits.apply(&file.content),
                vec![format!("Update .NET SDK from {current} to {target}")],
            ))
        })
    }
}
