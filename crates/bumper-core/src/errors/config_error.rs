//! Configuration loading errors.

use std::path::PathBuf;

use super::BumperErrorCode;

/// Errors raised while loading a user configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl BumperErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONFIG_IO_ERROR",
            Self::Json(_) | Self::Yaml(_) => "CONFIG_PARSE_ERROR",
            Self::UnsupportedFormat(_) => "CONFIG_UNSUPPORTED_FORMAT",
        }
    }
}
