//! AWS SAM and CloudFormation templates, in both JSON and YAML.

use std::ops::Range;

use bumper_core::types::edits::WarningKind;
use bumper_core::{ProcessingResult, UpgradeInfo, UpgradeResult};

use super::aws::{gate_warning, upgraded_runtime};
use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::{jsonc, yaml, DocumentError, TextEdits};

pub const TEMPLATE_PATTERNS: &[&str] = &[
    "*.template",
    "template.json",
    "template.yaml",
    "template.yml",
    "*.template.json",
    "*.template.yaml",
    "*.template.yml",
];

const RUNTIME_PATHS: &[&[&str]] = &[
    &["Resources", "*", "Properties", "Runtime"],
    &["Globals", "Function", "Runtime"],
];

pub struct SamTemplateUpgrader;

/// A runtime value and the byte range to overwrite with its replacement.
struct RuntimeSlot {
    current: String,
    range: Range<usize>,
    quoted: bool,
}

fn json_slots(source: &str) -> Result<Option<Vec<RuntimeSlot>>, DocumentError> {
    let root = jsonc::parse(source)?;
    let Some(resources) = root.get("Resources").and_then(|r| r.as_object()) else {
        return Ok(None);
    };
    let mut nodes: Vec<&jsonc::JsonNode> = resources
        .iter()
        .filter_map(|(_, resource)| resource.pointer("/Properties/Runtime"))
        .collect();
    nodes.extend(root.pointer("/Globals/Function/Runtime"));
    Ok(Some(
        nodes
            .into_iter()
            .filter_map(|node| {
                Some(RuntimeSlot {
                    current: node.as_str()?.to_string(),
                    range: node.span.clone(),
                    quoted: true,
                })
            })
            .collect(),
    ))
}

fn yaml_slots(source: &str) -> Result<Option<Vec<RuntimeSlot>>, DocumentError> {
    let documents = yaml::validate(source)?;
    let has_resources = documents
        .first()
        .and_then(|doc| doc.as_mapping())
        .is_some_and(|map| map.get("Resources").is_some_and(|r| r.is_mapping()));
    if !has_resources {
        return Ok(None);
    }
    Ok(Some(
        yaml::scalar_entries(source)
            .into_iter()
            .filter(|entry| RUNTIME_PATHS.iter().any(|p| entry.matches(p)))
            .map(|entry| RuntimeSlot {
                current: entry.value,
                range: entry.range,
                quoted: false,
            })
            .collect(),
    ))
}

/// Edits for the runtimes in `slots`, with their changelog entries.
fn runtime_edits(slots: &[RuntimeSlot], upgrade: &UpgradeInfo) -> (TextEdits, Vec<String>) {
    let mut edits = TextEdits::new();
    let mut changes = Vec::new();
    for slot in slots {
        let Some(next) = upgraded_runtime(&slot.current, upgrade) else {
            continue;
        };
        changes.push(format!("Update AWS Lambda runtime from {} to {next}", slot.current));
        let text = if slot.quoted { jsonc::encode_string(&next) } else { next };
        edits.replace(slot.range.clone(), text);
    }
    (edits, changes)
}

impl Upgrader for SamTemplateUpgrader {
    fn name(&self) -> &'static str {
        "aws-sam-templates"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(TEMPLATE_PATTERNS))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, _| {
            let is_json = file.content.trim_start().starts_with('{');
            let slots = if is_json {
                json_slots(&file.content)
            } else {
                yaml_slots(&file.content)
            };
            let slots = match slots {
                Ok(Some(slots)) => slots,
                Ok(None) => return Ok(FileOutcome::unchanged()),
                Err(e) => return Ok(FileOutcome::malformed(&e)),
            };

            let (edits, changes) = runtime_edits(&slots, upgrade);
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
