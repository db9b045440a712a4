//! `major.minor` release channel versions such as `8.0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A .NET release channel (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DotNetVersion {
    pub major: u32,
    pub minor: u32,
}

impl DotNetVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for DotNetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a channel string is not `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid .NET channel version: {0:?}")]
pub struct ParseChannelError(pub String);

impl FromStr for DotNetVersion {
    type Err = ParseChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseChannelError(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
        Ok(Self {
            major: major.parse().map_err(|_| err())?,
            minor: minor.parse().map_err(|_| err())?,
        })
    }
}

impl TryFrom<String> for DotNetVersion {
    type Error = ParseChannelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DotNetVersion> for String {
    fn from(value: DotNetVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_channels() {
        let six: DotNetVersion = "6.0".parse().unwrap();
        let ten: DotNetVersion = "10.0".parse().unwrap();
        assert!(six < ten);
        assert_eq!(ten.to_string(), "10.0");
        assert!("8".parse::<DotNetVersion>().is_err());
        assert!("8.x".parse::<DotNetVersion>().is_err());
    }
}
