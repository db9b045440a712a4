//! AWS Lambda managed runtime identifiers shared by the AWS upgraders.

use std::sync::LazyLock;

use bumper_core::support::{managed_runtime_gate, GateDecision};
use bumper_core::UpgradeInfo;
use regex::Regex;

static LAMBDA_RUNTIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^dotnet(?:core)?(?P<major>\d+)(?:\.(?P<minor>\d+))?$").expect("lambda runtime regex is valid")
});

/// The managed runtime name for `upgrade`, e.g. `dotnet8`.
pub fn target_runtime(upgrade: &UpgradeInfo) -> String {
    format!("dotnet{}", upgrade.channel.major)
}

/// The replacement for a .NET Lambda runtime older than the target.
///
/// Node.js, Python, Java, `provided` and every other runtime yield `None`.
pub fn upgraded_runtime(value: &str, upgrade: &UpgradeInfo) -> Option<String> {
    let caps = LAMBDA_RUNTIME.captures(value.trim())?;
    let major: u32 = caps["major"].parse().ok()?;
    (major < upgrade.channel.major).then(|| target_runtime(upgrade))
}

/// The warning to raise instead of editing, if the target may not be used
/// for managed runtimes.
pub fn gate_warning(upgrade: &UpgradeInfo) -> Option<String> {
    match managed_runtime_gate(upgrade) {
        GateDecision::Allow => None,
        GateDecision::Warn(reason) => Some(format!(
            "not updating AWS Lambda runtime to {}: {}",
            target_runtime(upgrade),
            reason.describe()
        )),
    }
}
