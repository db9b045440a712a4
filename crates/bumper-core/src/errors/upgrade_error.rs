//! Top-level error for upgrader and pipeline operations.

use std::path::PathBuf;

use super::{BumperErrorCode, ConfigError, RegistryError, TextError};

/// Errors that abort an upgrader or the whole run.
///
/// Malformed documents and gated transitions are *not* errors; they surface as
/// warning outcomes. Only unexpected I/O, tooling faults and cancellation end up here.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upgrade cancelled")]
    Cancelled,

    #[error("text error: {0}")]
    Text(#[from] TextError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("tool `{tool}` failed: {message}")]
    Tool { tool: String, message: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl UpgradeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Registry(RegistryError::Cancelled))
    }
}

impl BumperErrorCode for UpgradeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Text(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
            Self::Tool { .. } => "TOOL_FAILED",
            Self::Config(e) => e.error_code(),
        }
    }
}

/// Convenience type alias.
pub type UpgradeResult<T> = Result<T, UpgradeError>;
