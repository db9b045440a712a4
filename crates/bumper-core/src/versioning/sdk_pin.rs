//! SDK version pins as written in CI inputs and install scripts.
//!
//! Supported shapes: `8.x`, `8.0`, `8.0.x`, `8.0.1xx` and exact builds such as
//! `8.0.100` or `9.0.100-preview.7.24407.12`. Upgrading a pin keeps its shape.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::{DotNetVersion, SemanticVersion};
use crate::types::upgrade::UpgradeInfo;

static SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<major>\d+)\.(?:(?P<major_x>[xX*])|(?P<minor>\d+)(?:\.(?:(?P<minor_x>[xX*])|(?P<band>\d)[xX]{2}))?)$")
        .expect("pin regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkPin {
    /// `8.x`
    Major(u32),
    /// `8.0`
    Channel(DotNetVersion),
    /// `8.0.x`
    ChannelWildcard(DotNetVersion),
    /// `8.0.1xx`
    FeatureBand(DotNetVersion, u64),
    /// `8.0.100`, `9.0.100-rc.1.24452.12`
    Exact(SemanticVersion),
}

impl SdkPin {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(caps) = SHAPE.captures(value) {
            let major: u32 = caps["major"].parse().ok()?;
            if caps.name("major_x").is_some() {
                return Some(Self::Major(major));
            }
            let channel = DotNetVersion::new(major, caps.name("minor")?.as_str().parse().ok()?);
            if caps.name("minor_x").is_some() {
                return Some(Self::ChannelWildcard(channel));
            }
            if let Some(band) = caps.name("band") {
                return Some(Self::FeatureBand(channel, band.as_str().parse().ok()?));
            }
            return Some(Self::Channel(channel));
        }
        let version: SemanticVersion = value.parse().ok()?;
        if version.revision.is_some() {
            return None;
        }
        Some(Self::Exact(version))
    }

    /// The channel this pin selects, if it names one.
    pub fn channel(&self) -> Option<DotNetVersion> {
        match self {
            Self::Major(_) => None,
            Self::Channel(c) | Self::ChannelWildcard(c) | Self::FeatureBand(c, _) => Some(*c),
            Self::Exact(v) => Some(v.channel()),
        }
    }

    /// Whether any build of `channel` satisfies this pin.
    fn covers_channel(&self, channel: DotNetVersion) -> bool {
        match self {
            Self::Major(major) => *major == channel.major,
            Self::Channel(c) | Self::ChannelWildcard(c) => *c == channel,
            _ => false,
        }
    }

    fn is_newer_than(&self, channel: DotNetVersion) -> bool {
        match self {
            Self::Major(major) => *major > channel.major,
            _ => self.channel().is_some_and(|c| c > channel),
        }
    }

    /// This pin rewritten for `upgrade`, keeping its shape.
    pub fn upgraded(&self, upgrade: &UpgradeInfo) -> Self {
        let target = upgrade.channel;
        match self {
            Self::Major(_) => Self::Major(target.major),
            Self::Channel(_) => Self::Channel(target),
            Self::ChannelWildcard(_) => Self::ChannelWildcard(target),
            Self::FeatureBand(_, _) => Self::FeatureBand(target, upgrade.feature_band()),
            Self::Exact(_) => Self::Exact(upgrade.sdk_version.clone()),
        }
    }

    /// The replacement for a pin that is the only value of its setting.
    pub fn upgrade_single(&self, upgrade: &UpgradeInfo) -> Option<Self> {
        let target = upgrade.channel;
        let needs_upgrade = match self {
            Self::Major(major) => *major < target.major,
            Self::Channel(c) | Self::ChannelWildcard(c) => *c < target,
            Self::FeatureBand(c, band) => *c < target || (*c == target && *band < upgrade.feature_band()),
            Self::Exact(v) => v.channel() < target || (v.channel() == target && *v < upgrade.sdk_version),
        };
        needs_upgrade.then(|| self.upgraded(upgrade))
    }
}

impl fmt::Display for SdkPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major(major) => write!(f, "{major}.x"),
            Self::Channel(c) => write!(f, "{c}"),
            Self::ChannelWildcard(c) => write!(f, "{c}.x"),
            Self::FeatureBand(c, band) => write!(f, "{c}.{band}xx"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// How a multi-value pin list should change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinListChange {
    Unchanged,
    /// Update the entry at `index` in place.
    Replace { index: usize, pin: SdkPin },
    /// Add a new entry after the last one.
    Append(SdkPin),
}

/// Decide how a list of pins (one per line) moves to `upgrade`.
///
/// Entries for other channels are kept so multi-targeting keeps working. An
/// entry of the same channel and feature band, or a same-channel preview, is
/// updated in place; otherwise a new entry shaped like the last one is appended.
pub fn upgrade_pin_list(pins: &[SdkPin], upgrade: &UpgradeInfo) -> PinListChange {
    let target = upgrade.channel;
    let Some(last) = pins.last() else {
        return PinListChange::Unchanged;
    };
    if pins.iter().any(|p| p.is_newer_than(target) || p.covers_channel(target)) {
        return PinListChange::Unchanged;
    }

    let band = upgrade.feature_band();
    let mut replace = None;
    for (index, pin) in pins.iter().enumerate() {
        if pin.channel() != Some(target) {
            continue;
        }
        match pin {
            SdkPin::FeatureBand(_, b) if *b == band => return PinListChange::Unchanged,
            SdkPin::Exact(v) if *v >= upgrade.sdk_version => return PinListChange::Unchanged,
            SdkPin::Exact(v) if v.is_prerelease() || v.feature_band() == band => {
                replace.get_or_insert(index);
            }
            _ => {}
        }
    }

    match replace {
        Some(index) => PinListChange::Replace {
            index,
            pin: pins[index].upgraded(upgrade),
        },
        None => PinListChange::Append(last.upgraded(upgrade)),
    }
}
