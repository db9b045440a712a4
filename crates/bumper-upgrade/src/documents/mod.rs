//! Format helpers shared by the upgraders.
//!
//! None of these own a document. They locate byte ranges of the values an
//! upgrader may rewrite so edits can be spliced into the original text,
//! leaving comments, whitespace and layout untouched.

pub mod edits;
pub mod jsonc;
pub mod lines;
pub mod msbuild;
pub mod yaml;

use bumper_core::BumperErrorCode;

pub use edits::TextEdits;

/// A file of a recognised kind that could not be read structurally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("malformed YAML: {message}")]
    Yaml { message: String },

    #[error("malformed script at line {line}: {message}")]
    Script { line: usize, message: String },
}

impl BumperErrorCode for DocumentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Json { .. } => "MALFORMED_JSON",
            Self::Xml { .. } => "MALFORMED_XML",
            Self::Yaml { .. } => "MALFORMED_YAML",
            Self::Script { .. } => "MALFORMED_SCRIPT",
        }
    }
}
