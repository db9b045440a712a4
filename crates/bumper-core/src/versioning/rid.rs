//! Runtime identifiers and their portable equivalents.
//!
//! From .NET 8 the SDK only understands portable RIDs (`win-x64`,
//! `linux-musl-arm64`); version-qualified ones such as `win10-x64` or
//! `ubuntu.22.04-x64` must be rewritten.

use std::sync::LazyLock;

use regex::Regex;

use super::DotNetVersion;

/// The first channel whose SDK rejects version-qualified RIDs.
pub const PORTABLE_RID_THRESHOLD: DotNetVersion = DotNetVersion::new(8, 0);

static RID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<os>[a-z]+)(?P<osver>\.?[0-9][0-9.]*)?(?P<musl>-musl)?-(?P<arch>x64|x86|arm64|arm|s390x|ppc64le|loongarch64)$")
        .expect("rid regex is valid")
});

/// Matches non-portable RIDs inside free text.
pub static NON_PORTABLE_RID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:win(?:7|8|81|10)|(?:osx|ubuntu|alpine|debian|rhel|centos|fedora|opensuse|sles|ol|linuxmint)\.[0-9]+(?:\.[0-9]+)*)-(?:x64|x86|arm64|arm)\b")
        .expect("non-portable rid regex is valid")
});

/// A parsed runtime identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeIdentifier {
    pub os: String,
    pub os_version: Option<String>,
    pub musl: bool,
    pub architecture: String,
}

impl RuntimeIdentifier {
    pub fn parse(value: &str) -> Option<Self> {
        let caps = RID.captures(value.trim())?;
        Some(Self {
            os: caps["os"].to_string(),
            os_version: caps
                .name("osver")
                .map(|m| m.as_str().trim_start_matches('.').to_string()),
            musl: caps.name("musl").is_some(),
            architecture: caps["arch"].to_string(),
        })
    }

    /// Whether the RID pins an OS version or distribution.
    pub fn is_portable(&self) -> bool {
        self.os_version.is_none() && matches!(self.os.as_str(), "win" | "osx" | "linux" | "unix" | "any" | "freebsd" | "browser" | "wasi" | "android" | "ios" | "maccatalyst" | "tvos")
    }

    /// The portable RID this one maps to, if it is not already portable.
    pub fn to_portable(&self) -> Option<String> {
        if self.is_portable() {
            return None;
        }
        let os = match self.os.as_str() {
            "win" => "win",
            "osx" => "osx",
            "alpine" => "linux-musl",
            "linux" if self.musl => "linux-musl",
            "ubuntu" | "debian" | "rhel" | "centos" | "fedora" | "opensuse" | "sles" | "ol"
            | "linuxmint" | "linux" => "linux",
            _ => return None,
        };
        Some(format!("{os}-{}", self.architecture))
    }
}

/// Rewrite `value` to its portable form when the target channel requires it.
pub fn portable_rid_for(value: &str, target: DotNetVersion) -> Option<String> {
    if target < PORTABLE_RID_THRESHOLD {
        return None;
    }
    RuntimeIdentifier::parse(value)?.to_portable()
}
