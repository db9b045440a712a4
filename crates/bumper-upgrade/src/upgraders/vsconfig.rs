//! Visual Studio `.vsconfig` workload manifests.

use std::sync::LazyLock;

use bumper_core::{DotNetVersion, ProcessingResult, UpgradeResult};
use regex::Regex;

use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{jsonc, TextEdits};

static RUNTIME_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Microsoft\.NetCore\.Component\.Runtime\.(?P<major>\d+)\.(?P<minor>\d+)$")
        .expect("runtime component regex is valid")
});

pub struct VsConfigUpgrader;

fn runtime_component(channel: DotNetVersion) -> String {
    format!("Microsoft.NetCore.Component.Runtime.{channel}")
}

fn component_version(id: &str) -> Option<DotNetVersion> {
    let caps = RUNTIME_COMPONENT.captures(id)?;
    Some(DotNetVersion::new(caps["major"].parse().ok()?, caps["minor"].parse().ok()?))
}

impl Upgrader for VsConfigUpgrader {
    fn name(&self) -> &'static str {
        "vsconfig"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(&[".vsconfig"]))?;
        let channel = request.upgrade.channel;

        process_files(self.name(), request, &files, |file, _| {
            let root = match jsonc::parse(&file.content) {
                Ok(root) => root,
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };
            let Some(components) = root.get("components").and_then(|c| c.as_array()) else {
                return Ok(FileOutcome::unchanged());
            };

            let runtimes: Vec<_> = components
                .iter()
                .filter_map(|node| Some((node, component_version(node.as_str()?)?)))
                .collect();
            if runtimes.iter().any(|(_, version)| *version >= channel) {
                return Ok(FileOutcome::unchanged());
            }
            // The newest older runtime is the one the solution builds against.
            let Some((node, version)) = runtimes.into_iter().max_by_key(|(_, version)| *version) else {
                return Ok(FileOutcome::unchanged());
            };

            let next = runtime_component(channel);
            let mut edits = TextEdits::new();
            edits.replace(node.span.clone(), jsonc::encode_string(&next));
            Ok(FileOutcome::unchanged().with_content(
                &file.content,
                edits.apply(&file.content),
                vec![format!("Update component {} to {next}", runtime_component(version))],
            ))
        })
    }
}
