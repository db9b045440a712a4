//! GitHub Actions workflows: `actions/setup-dotnet` inputs and `run:` scripts.

use std::sync::LazyLock;

use bumper_core::versioning::sdk_pin::{upgrade_pin_list, PinListChange, SdkPin};
use bumper_core::{ProcessingResult, UpgradeInfo, UpgradeResult};
use regex::Regex;

use super::scripts::command_edits;
use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::lines::{split_lines, Line};
use crate::documents::{yaml, TextEdits};

pub const WORKFLOW_PATTERNS: &[&str] = &[".github/workflows/*.yml", ".github/workflows/*.yaml"];

static SETUP_DOTNET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:-\s+)?uses:\s*["']?actions/setup-dotnet@"#).expect("setup-dotnet regex is valid")
});

static DOTNET_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>\s*)dotnet-version:\s*(?P<rest>.*)$").expect("dotnet-version regex is valid")
});

static RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<indent>\s*)(?:-\s+)?run:\s*(?P<rest>.*)$").expect("run regex is valid"));

static FLOW_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?P<q>["']?)(?P<value>[^\s,"'\[\]]+)["']?"#).expect("flow item regex is valid"));

pub struct GitHubActionsUpgrader;

/// Lines that are neither blank nor YAML comments.
fn is_content(line: &Line<'_>) -> bool {
    !line.is_blank() && !line.is_comment(&["#"])
}

/// Indent of the key on `line`, counting a leading `- ` as indentation.
fn key_indent(line: &Line<'_>) -> usize {
    let trimmed = line.text.trim_start();
    match trimmed.strip_prefix('-') {
        Some(rest) if rest.starts_with([' ', '\t']) => {
            line.indent() + 1 + (rest.len() - rest.trim_start().len())
        }
        _ => line.indent(),
    }
}

/// Whether the sequence item enclosing line `index` uses `actions/setup-dotnet`.
fn in_setup_dotnet_step(lines: &[Line<'_>], index: usize) -> bool {
    let mut floor = lines[index].indent();
    let mut start = None;
    for i in (0..index).rev() {
        let line = &lines[i];
        if !is_content(line) || line.indent() >= floor {
            continue;
        }
        if line.text.trim_start().starts_with('-') {
            start = Some(i);
            break;
        }
        floor = line.indent();
    }
    let Some(start) = start else {
        return false;
    };

    let dash = lines[start].indent();
    if SETUP_DOTNET.is_match(lines[start].text) {
        return true;
    }
    lines[start + 1..]
        .iter()
        .filter(|l| is_content(l))
        .take_while(|l| l.indent() > dash)
        .any(|l| SETUP_DOTNET.is_match(l.text))
}

/// Strip quotes and a trailing comment from an inline scalar, returning the
/// value and its offset within `rest`.
fn inline_scalar(rest: &str) -> Option<(usize, &str)> {
    let rest = rest.trim_end();
    match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let close = rest[1..].find(quote)?;
            Some((1, &rest[1..1 + close]))
        }
        _ => {
            let value = rest.split(" #").next().unwrap_or(rest).trim_end();
            (!value.is_empty()).then_some((0, value))
        }
    }
}

fn describe(change: &PinListChange, old: &[&str]) -> Option<String> {
    match change {
        PinListChange::Unchanged => None,
        PinListChange::Replace { index, pin } => Some(format!(
            "Update .NET SDK from {} to {pin}",
            old.get(*index).copied().unwrap_or_default()
        )),
        PinListChange::Append(pin) => Some(format!("Add .NET SDK {pin}")),
    }
}

/// Edits for one `dotnet-version:` input starting at `lines[index]`.
fn version_edits(
    lines: &[Line<'_>],
    index: usize,
    upgrade: &UpgradeInfo,
    edits: &mut TextEdits,
    changes: &mut Vec<String>,
) {
    let line = &lines[index];
    let Some(caps) = DOTNET_VERSION.captures(line.text) else {
        return;
    };
    let Some(rest) = caps.name("rest") else {
        return;
    };
    let rest_start = line.start + rest.start();
    let key_indent = caps["indent"].len();

    match rest.as_str().chars().next() {
        Some('|' | '>') => {
            let mut entries: Vec<(&Line<'_>, usize, &str)> = Vec::new();
            for item in lines[index + 1..].iter() {
                if item.is_blank() {
                    continue;
                }
                if item.indent() <= key_indent {
                    break;
                }
                let value = item.text.trim();
                let offset = item.text.len() - item.text.trim_start().len();
                entries.push((item, offset, value));
            }
            let parsed: Vec<(usize, SdkPin)> = entries
                .iter()
                .enumerate()
                .filter_map(|(i, (_, _, value))| SdkPin::parse(value).map(|pin| (i, pin)))
                .collect();
            let pins: Vec<SdkPin> = parsed.iter().map(|(_, pin)| pin.clone()).collect();
            let values: Vec<&str> = parsed.iter().map(|(i, _)| entries[*i].2).collect();
            let change = upgrade_pin_list(&pins, upgrade);
            let Some(message) = describe(&change, &values) else {
                return;
            };
            match change {
                PinListChange::Replace { index, pin } => {
                    let (item, offset, value) = entries[parsed[index].0];
                    let start = item.start + offset;
                    edits.replace(start..start + value.len(), pin.to_string());
                }
                PinListChange::Append(pin) => {
                    let Some((last, offset, _)) = parsed.last().map(|(i, _)| entries[*i]) else {
                        return;
                    };
                    let eol = if last.eol.is_empty() { line.eol } else { last.eol };
                    let eol = if eol.is_empty() { "\n" } else { eol };
                    let indent = &last.text[..offset];
                    edits.insert(last.end(), format!("{eol}{indent}{pin}"));
                }
                PinListChange::Unchanged => return,
            }
            changes.push(message);
        }
        Some('[') => {
            let Some(close) = rest.as_str().find(']') else {
                return;
            };
            let inner = &rest.as_str()[1..close];
            let items: Vec<_> = FLOW_ITEM
                .captures_iter(inner)
                .filter_map(|c| {
                    let value = c.name("value")?;
                    let pin = SdkPin::parse(value.as_str())?;
                    Some((value.range(), c["q"].to_string(), pin))
                })
                .collect();
            let pins: Vec<SdkPin> = items.iter().map(|(_, _, pin)| pin.clone()).collect();
            let values: Vec<&str> = items.iter().map(|(r, _, _)| &inner[r.clone()]).collect();
            let change = upgrade_pin_list(&pins, upgrade);
            let Some(message) = describe(&change, &values) else {
                return;
            };
            let inner_start = rest_start + 1;
            match change {
                PinListChange::Replace { index, pin } => {
                    let range = items[index].0.clone();
                    edits.replace(inner_start + range.start..inner_start + range.end, pin.to_string());
                }
                PinListChange::Append(pin) => {
                    let Some((range, quote, _)) = items.last() else {
                        return;
                    };
                    let end = inner_start + range.end + quote.len();
                    edits.insert(end, format!(", {quote}{pin}{quote}"));
                }
                PinListChange::Unchanged => return,
            }
            changes.push(message);
        }
        _ => {
            let Some((offset, value)) = inline_scalar(rest.as_str()) else {
                return;
            };
            let Some(next) = SdkPin::parse(value).and_then(|pin| pin.upgrade_single(upgrade)) else {
                return;
            };
            let start = rest_start + offset;
            edits.replace(start..start + value.len(), next.to_string());
            changes.push(format!("Update .NET SDK from {value} to {next}"));
        }
    }
}

impl Upgrader for GitHubActionsUpgrader {
    fn name(&self) -> &'static str {
        "github-actions"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(WORKFLOW_PATTERNS))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, _| {
            if let Err(e) = yaml::validate(&file.content) {
                return Ok(FileOutcome::malformed(&e));
            }
            let lines = split_lines(&file.content);
            let mut edits = TextEdits::new();
            let mut changes = Vec::new();
            let mut script_indent: Option<usize> = None;

            for (index, line) in lines.iter().enumerate() {
                if let Some(indent) = script_indent {
                    if line.is_blank() || line.indent() > indent {
                        if !line.is_comment(&["#"]) {
                            for edit in command_edits(line.text, upgrade) {
                                edits.replace(line.start + edit.range.start..line.start + edit.range.end, edit.replacement);
                                changes.push(edit.change);
                            }
                        }
                        continue;
                    }
                    script_indent = None;
                }
                if !is_content(line) {
                    continue;
                }

                if DOTNET_VERSION.is_match(line.text) {
                    if in_setup_dotnet_step(&lines, index) {
                        version_edits(&lines, index, upgrade, &mut edits, &mut changes);
                    }
                    continue;
                }

                if let Some(caps) = RUN.captures(line.text) {
                    let rest = caps.name("rest").map_or("", |m| m.as_str());
                    if rest.starts_with(['|', '>']) {
                        script_indent = Some(key_indent(line));
                    } else {
                        for edit in command_edits(line.text, upgrade) {
                            edits.replace(line.start + edit.range.start..line.start + edit.range.end, edit.replacement);
                            changes.push(edit.change);
                        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_enclosing_step() {
        let source = "\
steps:
  - uses: actions/checkout@v4
    with:
      dotnet-version: 6.0.x
  - name: Setup
    uses: actions/setup-dotnet@v4
    with:
      dotnet-version: 8.0.x
";
        let lines = split_lines(source);
        assert!(!in_setup_dotnet_step(&lines, 3));
        assert!(in_setup_dotnet_step(&lines, 7));
    }

    #[test]
    fn inline_scalars() {
        assert_eq!(inline_scalar("'8.0.x' # sdk"), Some((1, "8.0.x")));
        assert_eq!(inline_scalar("8.0.x # sdk"), Some((0, "8.0.x")));
        assert_eq!(inline_scalar(""), None);
    }
}
