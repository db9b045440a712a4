//! Docker image tags published for the official .NET container images.
//!
//! A tag is `<version>[-preview|-rc[.N]][-<os>][-<variant>...]`, for example
//! `8.0-jammy-chiseled-extra`, `9.0-preview`, `6.0-alpine3.16-amd64` or
//! `8.0-cbl-mariner2.0-distroless`.

use std::sync::LazyLock;

use regex::Regex;

use super::{DotNetVersion, SemanticVersion};
use crate::types::upgrade::UpgradeInfo;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<version>\d+\.\d+(?:\.\d+)?)(?P<pre>-(?:preview|rc)(?:\.[0-9]+)*)?(?P<rest>(?:-[A-Za-z0-9.]+)*)$")
        .expect("docker tag regex is valid")
});

static REPOSITORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^mcr\.microsoft\.com/dotnet/(?:nightly/)?(?P<name>sdk|aspnet|runtime|runtime-deps)$")
        .expect("repository regex is valid")
});

static ALPINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^alpine(?P<version>\d+\.\d+)?$").expect("alpine regex is valid"));

static MARINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<family>cbl-mariner|azurelinux)(?P<version>\d+\.\d+)$").expect("mariner regex is valid")
});

const DEBIAN: &[&str] = &["stretch", "buster", "bullseye", "bookworm", "trixie"];
const UBUNTU: &[&str] = &["bionic", "focal", "jammy", "noble"];

/// Whether `repository` is an official .NET image whose tags we may rewrite.
///
/// Anything else (including images that merely use .NET-looking tags) is left alone.
pub fn is_dotnet_repository(repository: &str) -> bool {
    REPOSITORY.is_match(&repository.to_ascii_lowercase())
}

/// Whether `repository` is the .NET SDK image.
pub fn is_sdk_repository(repository: &str) -> bool {
    REPOSITORY
        .captures(&repository.to_ascii_lowercase())
        .is_some_and(|caps| &caps["name"] == "sdk")
}

/// Debian codenames published for a .NET major version, oldest first.
pub fn debian_codenames(major: u32) -> &'static [&'static str] {
    match major {
        0..=5 => &["buster", "bullseye"],
        6 => &["bullseye"],
        7 => &["bullseye", "bookworm"],
        8 | 9 => &["bookworm"],
        _ => &["trixie"],
    }
}

/// Ubuntu codenames published for a .NET major version, oldest first.
pub fn ubuntu_codenames(major: u32) -> &'static [&'static str] {
    match major {
        0..=5 => &["bionic", "focal"],
        6 => &["focal", "jammy"],
        7 => &["jammy"],
        8 => &["jammy", "noble"],
        _ => &["noble"],
    }
}

/// Alpine minor versions supported for a .NET major version, oldest first.
pub fn alpine_versions(major: u32) -> &'static [&'static str] {
    match major {
        0..=5 => &["3.15", "3.16"],
        6 | 7 => &["3.17", "3.18", "3.19"],
        8 => &["3.18", "3.19", "3.20", "3.21"],
        9 => &["3.20", "3.21", "3.22"],
        _ => &["3.22"],
    }
}

/// CBL-Mariner / Azure Linux images per .NET major version, oldest first.
/// CBL-Mariner was renamed Azure Linux and the rename became the only option in .NET 9.
pub fn mariner_images(major: u32) -> &'static [&'static str] {
    match major {
        0..=6 => &["cbl-mariner1.0", "cbl-mariner2.0"],
        7 => &["cbl-mariner2.0"],
        8 => &["cbl-mariner2.0", "azurelinux3.0"],
        _ => &["azurelinux3.0"],
    }
}

/// A parsed .NET image tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerTag {
    /// `8.0` or `8.0.100`.
    pub version: String,
    pub channel: DotNetVersion,
    /// `-preview`, `-rc.1` etc., including the leading dash.
    pub prerelease: Option<String>,
    /// Everything after the version, without the leading dash.
    pub suffix: Option<String>,
}

/// The rewritten tag plus the channel it was moved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpgrade {
    pub tag: String,
    pub previous: DotNetVersion,
}

impl DockerTag {
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = TAG.captures(tag)?;
        let version = caps["version"].to_string();
        let mut numbers = version.split('.');
        let major = numbers.next()?.parse().ok()?;
        let minor = numbers.next()?.parse().ok()?;
        Some(Self {
            version,
            channel: DotNetVersion::new(major, minor),
            prerelease: caps.name("pre").map(|m| m.as_str().to_string()),
            suffix: caps
                .name("rest")
                .map(|m| m.as_str().trim_start_matches('-').to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    fn has_patch(&self) -> bool {
        self.version.matches('.').count() >= 2
    }

    /// Compute the tag to use for `upgrade`, or `None` when this tag is already current.
    pub fn upgrade(&self, is_sdk: bool, upgrade: &UpgradeInfo) -> Option<TagUpgrade> {
        let target = upgrade.channel;
        let promote_preview =
            self.channel == target && self.prerelease.is_some() && !upgrade.is_prerelease();
        if self.channel > target || (self.channel == target && !promote_preview) {
            return None;
        }

        let mut tag = if upgrade.is_prerelease() {
            format!("{target}-preview")
        } else if is_sdk && self.has_patch() {
            sdk_tag_version(&upgrade.sdk_version)
        } else {
            target.to_string()
        };

        if let Some(suffix) = &self.suffix {
            tag.push('-');
            tag.push_str(&upgrade_suffix(suffix, target.major));
        }

        Some(TagUpgrade {
            tag,
            previous: self.channel,
        })
    }
}

fn sdk_tag_version(sdk: &SemanticVersion) -> String {
    format!("{}.{}.{}", sdk.major, sdk.minor, sdk.patch)
}

/// Rewrite the OS portion of a tag suffix for `major`, keeping every variant component.
pub fn upgrade_suffix(suffix: &str, major: u32) -> String {
    // cbl-mariner contains a dash, so fold it into a single component first.
    let folded = suffix.replace("cbl-mariner", "cbl_mariner");
    folded
        .split('-')
        .map(|component| {
            let component = component.replace("cbl_mariner", "cbl-mariner");
            upgrade_os_component(&component, major).unwrap_or(component)
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn upgrade_os_component(component: &str, major: u32) -> Option<String> {
    if DEBIAN.contains(&component) {
        return latest_unless_supported(component, debian_codenames(major));
    }
    if UBUNTU.contains(&component) {
        return latest_unless_supported(component, ubuntu_codenames(major));
    }
    if let Some(caps) = ALPINE.captures(component) {
        // A floating `alpine` tag always tracks the newest supported release.
        let version = caps.name("version")?.as_str();
        let supported = alpine_versions(major);
        if supported.contains(&version) {
            return None;
        }
        return supported.last().map(|v| format!("alpine{v}"));
    }
    if MARINER.is_match(component) {
        return latest_unless_supported(component, mariner_images(major));
    }
    None
}

fn latest_unless_supported(current: &str, supported: &[&str]) -> Option<String> {
    if supported.contains(&current) {
        None
    } else {
        supported.last().map(|s| s.to_string())
    }
}
