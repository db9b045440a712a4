//! Top-level user configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ScanConfig;
use crate::errors::ConfigError;

/// File names tried by [`BumperConfig::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".dotnet-bumper.json",
    ".dotnet-bumper.yaml",
    ".dotnet-bumper.yml",
];

/// Settings read from an optional JSON or YAML file in the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BumperConfig {
    /// NuGet package ids never bumped by the package upgrader.
    #[serde(rename = "excludeNuGetPackages")]
    pub exclude_nuget_packages: Vec<String>,
    /// Extra NuGet package ids the package upgrader should consider.
    #[serde(rename = "includeNuGetPackages")]
    pub include_nuget_packages: Vec<String>,
    /// Warning codes to leave out of the report.
    pub no_warn: Vec<String>,
    /// Additional gitignore-style globs skipped by the remaining-reference scan.
    pub remaining_references_ignore: Vec<String>,
    pub scan: ScanConfig,
}

impl BumperConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty YAML document deserializes as null.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config file, choosing the parser from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Load the first config file found in `project_root`, or defaults.
    pub fn discover(project_root: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let candidate = project_root.join(name);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading configuration");
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Whether a package id is excluded (case-insensitive, as NuGet ids are).
    pub fn is_package_excluded(&self, id: &str) -> bool {
        self.exclude_nuget_packages
            .iter()
            .any(|p| p.eq_ignore_ascii_case(id))
    }

    pub fn is_package_included(&self, id: &str) -> bool {
        self.include_nuget_packages
            .iter()
            .any(|p| p.eq_ignore_ascii_case(id))
    }
}
