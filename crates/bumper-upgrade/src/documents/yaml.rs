//! YAML validation and key-path scalar lookup.
//!
//! Files are validated with `serde_yaml`, which would drop comments on a
//! round trip, so edits are located line by line: an indentation stack tracks
//! the key path of every `key: value` line, and the scalar's byte range is
//! spliced directly.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::lines::split_lines;
use super::DocumentError;

static KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?P<indent> *)(?P<dash>- +)?(?P<key>"[^"]*"|'[^']*'|[^\s#'"{}\[\]\-][^:#]*?|-[^\s:#][^:#]*?) *:(?: +(?P<rest>.*))?$"#)
        .expect("yaml key regex is valid")
});

/// Parse every document in `source`, failing on the first syntax error.
pub fn validate(source: &str) -> Result<Vec<serde_yaml::Value>, DocumentError> {
    serde_yaml::Deserializer::from_str(source)
        .map(|doc| {
            serde_yaml::Value::deserialize(doc).map_err(|e| DocumentError::Yaml {
                message: e.to_string(),
            })
        })
        .collect()
}

/// A `key: value` scalar with its key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarEntry {
    /// 1-based line number.
    pub line: usize,
    /// Keys from the document root; sequence items appear as `-`.
    pub path: Vec<String>,
    /// The scalar text without quotes or trailing comment.
    pub value: String,
    /// Byte range of `value` in the source.
    pub range: Range<usize>,
}

impl ScalarEntry {
    pub fn matches(&self, pattern: &[&str]) -> bool {
        path_matches(&self.path, pattern)
    }
}

/// `*` in `pattern` matches any single key.
pub fn path_matches(path: &[String], pattern: &[&str]) -> bool {
    path.len() == pattern.len()
        && path
            .iter()
            .zip(pattern)
            .all(|(key, want)| *want == "*" || key == want)
}

/// Every plain or quoted scalar value that follows a mapping key.
///
/// Block scalars, flow collections, anchors, aliases and tagged values are
/// skipped.
pub fn scalar_entries(source: &str) -> Vec<ScalarEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<(usize, String)> = Vec::new();
    let mut block_indent: Option<usize> = None;

    for line in split_lines(source) {
        if line.is_blank() {
            continue;
        }
        let indent = line.indent();
        if let Some(block) = block_indent {
            if indent > block {
                continue;
            }
            block_indent = None;
        }
        if line.is_comment(&["#"]) {
            continue;
        }

        let Some(caps) = KEY_LINE.captures(line.text) else {
            // A bare sequence item still closes deeper keys.
            if line.text.trim_start().starts_with('-') {
                stack.retain(|(i, _)| *i < indent);
                stack.push((indent, "-".into()));
            }
            continue;
        };

        let mut key_indent = caps["indent"].len();
        if let Some(dash) = caps.name("dash") {
            stack.retain(|(i, _)| *i < key_indent);
            stack.push((key_indent, "-".into()));
            key_indent += dash.as_str().len();
        }
        stack.retain(|(i, _)| *i < key_indent);
        let key = caps["key"].trim_matches(['"', '\'']).to_string();
        stack.push((key_indent, key));

        let Some(rest) = caps.name("rest") else {
            continue;
        };
        let rest_start = line.start + rest.start();
        let raw = rest.as_str();
        match raw.chars().next() {
            Some('|' | '>') => block_indent = Some(key_indent),
            Some(quote @ ('"' | '\'')) => {
                if let Some(close) = raw[1..].find(quote) {
                    entries.push(ScalarEntry {
                        line: line.number,
                        path: stack.iter().map(|(_, k)| k.clone()).collect(),
                        value: raw[1..1 + close].to_string(),
                        range: rest_start + 1..rest_start + 1 + close,
                    });
                }
            }
            Some('{' | '[' | '&' | '*' | '!' | '#') | None => {}
            Some(_) => {
                let value = raw.split(" #").next().unwrap_or(raw).trim_end();
                if !value.is_empty() {
                    entries.push(ScalarEntry {
                        line: line.number,
                        path: stack.iter().map(|(_, k)| k.clone()).collect(),
                        value: value.to_string(),
                        range: rest_start..rest_start + value.len(),
                    });
                }
            }
        }
    }
    entries
}
