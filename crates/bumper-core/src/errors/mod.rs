//! Error types for every bumper subsystem.
//! Each enum maps its variants to stable codes through [`BumperErrorCode`].

mod config_error;
mod registry_error;
mod text_error;
mod upgrade_error;

pub use config_error::ConfigError;
pub use registry_error::RegistryError;
pub use text_error::TextError;
pub use upgrade_error::{UpgradeError, UpgradeResult};

/// Stable, machine-readable error codes for reports and CI annotations.
pub trait BumperErrorCode {
    fn error_code(&self) -> &'static str;
}
