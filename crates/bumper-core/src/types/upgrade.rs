//! The upgrade descriptor: an immutable description of the migration target.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::versioning::{DotNetVersion, SemanticVersion};

/// Support lifetime class of a release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Long-term support.
    Lts,
    /// Standard-term support.
    Sts,
}

/// Maturity stage of a release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportPhase {
    /// Nightly builds from the main branch.
    Daily,
    Preview,
    /// Release candidates with a go-live license.
    GoLive,
    Active,
    Maintenance,
    EndOfLife,
}

impl SupportPhase {
    /// Whether the channel has not shipped a stable release yet.
    pub fn is_prerelease(self) -> bool {
        matches!(self, Self::Daily | Self::Preview | Self::GoLive)
    }
}

impl fmt::Display for SupportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Daily => "daily",
            Self::Preview => "preview",
            Self::GoLive => "go-live",
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::EndOfLife => "end-of-life",
        };
        f.write_str(s)
    }
}

/// Describes the version every upgrader moves the project to.
///
/// Resolved once per run by an external release-metadata lookup and shared
/// read-only with every upgrader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeInfo {
    pub channel: DotNetVersion,
    pub release_type: ReleaseType,
    pub support_phase: SupportPhase,
    pub end_of_life: Option<NaiveDate>,
    pub sdk_version: SemanticVersion,
}

impl UpgradeInfo {
    pub fn new(
        channel: DotNetVersion,
        release_type: ReleaseType,
        support_phase: SupportPhase,
        sdk_version: SemanticVersion,
    ) -> Self {
        Self {
            channel,
            release_type,
            support_phase,
            end_of_life: None,
            sdk_version,
        }
    }

    pub fn with_end_of_life(mut self, date: NaiveDate) -> Self {
        self.end_of_life = Some(date);
        self
    }

    /// The target framework moniker for this channel, e.g. `net8.0`.
    pub fn moniker(&self) -> String {
        format!("net{}", self.channel)
    }

    /// Feature band of the target SDK (`1` for `8.0.1xx`).
    pub fn feature_band(&self) -> u64 {
        self.sdk_version.feature_band()
    }

    pub fn is_prerelease(&self) -> bool {
        self.support_phase.is_prerelease()
    }
}
