//! User configuration: optional `.dotnet-bumper.json` / `.yaml` overrides.

pub mod bumper_config;
pub mod scan_config;

pub use bumper_config::BumperConfig;
pub use scan_config::ScanConfig;
