//! Support-phase gating for deployment descriptors.
//!
//! Managed cloud runtimes (AWS Lambda `dotnetN`, Serverless Framework runtime
//! fields) only exist for LTS releases once they are fully supported. Every
//! upgrader that edits such a descriptor asks [`managed_runtime_gate`], so they
//! all reach the same decision for the same descriptor.

use serde::Serialize;

use crate::types::upgrade::{ReleaseType, SupportPhase, UpgradeInfo};

/// Decision returned by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateDecision {
    Allow,
    /// Leave the file untouched and report a warning.
    Warn(GateReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateReason {
    /// The release is standard-term support.
    ShortTermSupport,
    /// The release has not shipped a stable build yet.
    Prerelease,
    /// The release is out of support.
    EndOfLife,
}

impl GateReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::ShortTermSupport => "the target is a short-term support release",
            Self::Prerelease => "the target is not yet a stable release",
            Self::EndOfLife => "the target is out of support",
        }
    }
}

/// Whether a managed runtime identifier may be moved to `upgrade`.
pub fn managed_runtime_gate(upgrade: &UpgradeInfo) -> GateDecision {
    match upgrade.support_phase {
        SupportPhase::Daily | SupportPhase::Preview | SupportPhase::GoLive => {
            GateDecision::Warn(GateReason::Prerelease)
        }
        SupportPhase::EndOfLife => GateDecision::Warn(GateReason::EndOfLife),
        SupportPhase::Active | SupportPhase::Maintenance => match upgrade.release_type {
            ReleaseType::Lts => GateDecision::Allow,
            ReleaseType::Sts => GateDecision::Warn(GateReason::ShortTermSupport),
        },
    }
}
