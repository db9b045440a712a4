//! Dockerfiles: official .NET image tags, their digests and the default port.

use std::sync::{Arc, LazyLock};

use bumper_core::errors::RegistryError;
use bumper_core::types::edits::WarningKind;
use bumper_core::versioning::docker_tag::{is_dotnet_repository, is_sdk_repository, DockerTag};
use bumper_core::{DotNetVersion, ProcessingResult, UpgradeError, UpgradeResult};
use regex::Regex;

use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::lines::split_lines;
use crate::documents::{DocumentError, TextEdits};
use crate::registry::DigestCache;

pub const DOCKERFILE_PATTERNS: &[&str] = &["Dockerfile", "Dockerfile.*", "*.Dockerfile"];

/// The release where ASP.NET Core images started listening on 8080 instead of 80.
const PORT_CHANGE: DotNetVersion = DotNetVersion::new(8, 0);

static FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*FROM\s+(?:--platform=\S+\s+)?(?P<image>[^\s:@]+)(?::(?P<tag>[^\s@]+))?(?:@(?P<digest>[a-z0-9]+:[a-f0-9]+))?(?:\s+AS\s+\S+)?\s*(?:#.*)?$")
        .expect("FROM regex is valid")
});

static FROM_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*FROM(?:\s+|$)").expect("FROM keyword regex is valid"));

static EXPOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*EXPOSE\s").expect("EXPOSE regex is valid"));

static OLD_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(?P<port>80)(?:/tcp)?(?:\s|$)").expect("port regex is valid"));

pub struct DockerfileUpgrader {
    digests: Option<Arc<DigestCache>>,
}

impl DockerfileUpgrader {
    pub fn new(digests: Option<Arc<DigestCache>>) -> Self {
        Self { digests }
    }
}

impl Upgrader for DockerfileUpgrader {
    fn name(&self) -> &'static str {
        "dockerfiles"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(DOCKERFILE_PATTERNS))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, _| {
            let mut edits = TextEdits::new();
            let mut changes = Vec::new();
            let mut outcome = FileOutcome::unchanged();
            let mut crossed_port_change = false;
            let lines = split_lines(&file.content);

            for line in &lines {
                if line.is_comment(&["#"]) || !FROM_KEYWORD.is_match(line.text) {
                    continue;
                }
                let Some(caps) = FROM.captures(line.text) else {
                    return Ok(FileOutcome::malformed(&DocumentError::Script {
                        line: line.number,
                        message: "FROM instruction without an image".into(),
                    }));
                };
                let image = &caps["image"];
                let Some(tag) = caps.name("tag") else {
                    continue;
                };
                // ARG-templated references are resolved at build time.
                if image.contains('$') || tag.as_str().contains('$') || !is_dotnet_repository(image) {
                    continue;
                }
                let Some(parsed) = DockerTag::parse(tag.as_str()) else {
                    continue;
                };
                let Some(next) = parsed.upgrade(is_sdk_repository(image), upgrade) else {
                    continue;
                };

                if let Some(digest) = caps.name("digest") {
                    let range = line.start + digest.start()..line.start + digest.end();
                    let resolved = match &self.digests {
                        Some(cache) => cache.resolve(image, &next.tag, request.cancel),
                        None => Err(RegistryError::Transient {
                            message: "no container registry configured".into(),
                        }),
                    };
                    match resolved {
                        Ok(new_digest) => {
                            if new_digest != digest.as_str() {
                                edits.replace(range, new_digest);
                            }
                        }
                        Err(RegistryError::Cancelled) => return Err(UpgradeError::Cancelled),
                        // A pinned reference must never point at a tag the registry does not have.
                        Err(e @ RegistryError::NotFound { .. }) => {
                            outcome = outcome.with_warning(
                                WarningKind::Unsupported,
                                format!("{image}:{} was left unchanged: {e}", tag.as_str()),
                            );
                            continue;
                        }
                        Err(e) => {
                            outcome = outcome.with_warning(
                                WarningKind::Transient,
                                format!(
                                    "digest for {image}:{} could not be resolved and was left unchanged: {e}",
                                    next.tag
                                ),
                            );
                        }
                    }
                }

                edits.replace(line.start + tag.start()..line.start + tag.end(), next.tag.clone());
                changes.push(format!("Update {image} from {} to {}", tag.as_str(), next.tag));
                if next.previous < PORT_CHANGE && upgrade.channel >= PORT_CHANGE {
                    crossed_port_change = true;
                }
            }

            if crossed_port_change {
                for line in lines.iter().filter(|l| EXPOSE.is_match(l.text)) {
                    for caps in OLD_PORT.captures_iter(line.text) {
                        let port = &caps["port"];
                        let start = line.start + caps.name("port").map_or(0, |m| m.start());
                        edits.replace(start..start + port.len(), "8080");
                        changes.push("Update exposed port from 80 to 8080".to_string());
                    }
                }
            }

            if edits.is_empty() {
                return Ok(outcome);
            }
            Ok(outcome.with_content(&file.content, edits.apply(&file.content), changes))
        })
    }
}
