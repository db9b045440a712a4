//! Text file read/write errors.

use std::path::PathBuf;

use super::BumperErrorCode;

/// Errors that can occur while reading or writing an encoded text file.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid {encoding} text")]
    Undecodable { path: PathBuf, encoding: &'static str },
}

impl BumperErrorCode for TextError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "TEXT_IO_ERROR",
            Self::Undecodable { .. } => "TEXT_UNDECODABLE",
        }
    }
}
