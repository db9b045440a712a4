//! VS Code launch configurations that point at build output folders.

use std::sync::LazyLock;

use bumper_core::versioning::TargetFramework;
use bumper_core::{ProcessingResult, UpgradeResult};
use regex::Regex;

use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{jsonc, TextEdits};

/// A moniker used as a whole path segment, e.g. `bin/Debug/net6.0/App.dll`.
static MONIKER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[/\\])(?P<tfm>net(?:coreapp)?\d+\.\d+)(?:[/\\]|$)").expect("moniker segment regex is valid")
});

pub struct VsCodeUpgrader;

impl Upgrader for VsCodeUpgrader {
    fn name(&self) -> &'static str {
        "vscode"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(&[".vscode/launch.json"]))?;
        let channel = request.upgrade.channel;

        process_files(self.name(), request, &files, |file, _| {
            let root = match jsonc::parse(&file.content) {
                Ok(root) => root,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let Some(configurations) = root.get("configurations") else {
                return Ok(FileOutcome::unchanged());
            };

            let mut edits = TextEdits::new();
            let mut changes = Vec::new();
            for node in configurations.strings() {
                // Inside the quotes, escapes left as written.
                let inner = node.span.start + 1..node.span.end - 1;
                let raw = &file.content[inner.clone()];
                for caps in MONIKER_SEGMENT.captures_iter(raw) {
                    let Some(m) = caps.name("tfm") else {
                        continue;
                    };
                    let Some(tfm) = TargetFramework::parse(m.as_str()) else {
                        continue;
                    };
                    if !tfm.is_older_than(channel) {
                        continue;
                    }
                    let next = tfm.retarget(channel).to_string();
                    changes.push(format!("Update launch path from {} to {next}", m.as_str()));
                    edits.replace(inner.start + m.start()..inner.start + m.end(), next);
                }
            }

            if edits.is_empty() {
                return Ok(FileOutcome::unchanged());
            }
            Ok(FileOutcome::unchanged().with_content(&file.content, edits.apply(&file.content), changes))
        })
    }
}
