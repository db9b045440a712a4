//! Errors from remote lookups (container registry, NuGet feed).

use super::BumperErrorCode;

/// Errors that can occur while resolving remote metadata.
///
/// Callers treat [`RegistryError::Transient`] as "keep what the file already
/// has" rather than a reason to abort the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no manifest found for {name}:{reference}")]
    NotFound { name: String, reference: String },

    #[error("transient registry failure: {message}")]
    Transient { message: String },

    #[error("invalid registry response: {message}")]
    InvalidResponse { message: String },

    #[error("registry lookup cancelled")]
    Cancelled,

    #[error("could not create HTTP client: {message}")]
    Client { message: String },
}

impl RegistryError {
    /// Whether retrying later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl BumperErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "REGISTRY_NOT_FOUND",
            Self::Transient { .. } => "REGISTRY_TRANSIENT",
            Self::InvalidResponse { .. } => "REGISTRY_INVALID_RESPONSE",
            Self::Cancelled => "CANCELLED",
            Self::Client { .. } => "REGISTRY_CLIENT",
        }
    }
}
