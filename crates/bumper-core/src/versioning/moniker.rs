//! Target framework monikers (`net8.0`, `net8.0-windows`, `netcoreapp3.1`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::DotNetVersion;

static MONIKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^net(?P<core>coreapp)?(?P<major>\d+)\.(?P<minor>\d+)(?:-(?P<platform>[A-Za-z][A-Za-z0-9.]*))?$")
        .expect("moniker regex is valid")
});

/// A parsed .NET (Core) target framework moniker.
///
/// .NET Framework (`net48`) and .NET Standard (`netstandard2.0`) monikers do
/// not parse; upgraders leave them alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFramework {
    pub version: DotNetVersion,
    pub is_core_app: bool,
    pub platform: Option<String>,
}

impl TargetFramework {
    pub fn parse(value: &str) -> Option<Self> {
        let caps = MONIKER.captures(value.trim())?;
        let version = DotNetVersion::new(caps["major"].parse().ok()?, caps["minor"].parse().ok()?);
        let is_core_app = caps.name("core").is_some();
        // netcoreapp5.0 and later never existed.
        if is_core_app && version.major >= 5 {
            return None;
        }
        // net4x.y is not a .NET Core moniker.
        if !is_core_app && version.major < 5 {
            return None;
        }
        Some(Self {
            version,
            is_core_app,
            platform: caps.name("platform").map(|m| m.as_str().to_string()),
        })
    }

    /// The same moniker retargeted to `channel`, keeping the platform suffix.
    pub fn retarget(&self, channel: DotNetVersion) -> Self {
        Self {
            version: channel,
            is_core_app: false,
            platform: self.platform.clone(),
        }
    }

    /// Whether this moniker is strictly older than `channel`.
    pub fn is_older_than(&self, channel: DotNetVersion) -> bool {
        self.version < channel
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_core_app {
            write!(f, "netcoreapp{}", self.version)?;
        } else {
            write!(f, "net{}", self.version)?;
        }
        if let Some(platform) = &self.platform {
            write!(f, "-{platform}")?;
        }
        Ok(())
    }
}

/// Outcome of upgrading a semicolon-delimited `TargetFrameworks` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonikerListChange {
    Unchanged,
    Appended(Vec<String>),
}

/// Compute the monikers to append to a multi-targeting list.
///
/// Existing entries are never replaced. One new moniker is added for each
/// platform suffix present on the newest entries, unless the list already
/// targets `channel` or later.
pub fn monikers_to_append(list: &str, channel: DotNetVersion) -> MonikerListChange {
    let parsed: Vec<TargetFramework> = list
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(TargetFramework::parse)
        .collect();

    let Some(newest) = parsed.iter().map(|tfm| tfm.version).max() else {
        return MonikerListChange::Unchanged;
    };
    if newest >= channel {
        return MonikerListChange::Unchanged;
    }

    let mut additions: Vec<String> = Vec::new();
    for tfm in parsed.iter().filter(|tfm| tfm.version == newest) {
        let candidate = tfm.retarget(channel).to_string();
        if !additions.contains(&candidate) {
            additions.push(candidate);
        }
    }
    MonikerListChange::Appended(additions)
}
