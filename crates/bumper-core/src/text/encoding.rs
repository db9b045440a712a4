//! Read a text file capturing BOM, encoding and line endings; write it back the same way.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::LineEnding;
use crate::errors::TextError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
        }
    }

    fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8 => UTF8_BOM,
            Self::Utf16Le => UTF16_LE_BOM,
            Self::Utf16Be => UTF16_BE_BOM,
        }
    }
}

/// A candidate file held in memory for one read-modify-write cycle.
#[derive(Debug, Clone)]
pub struct TextFile {
    pub path: PathBuf,
    pub content: String,
    pub has_bom: bool,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
}

impl TextFile {
    pub fn read(path: &Path) -> Result<Self, TextError> {
        let bytes = std::fs::read(path).map_err(|source| TextError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(path, &bytes)
    }

    /// Decode raw bytes, detecting the BOM and encoding.
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, TextError> {
        let (encoding, has_bom, body) = if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
            (TextEncoding::Utf8, true, rest)
        } else if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
            (TextEncoding::Utf16Le, true, rest)
        } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
            (TextEncoding::Utf16Be, true, rest)
        } else {
            (TextEncoding::Utf8, false, bytes)
        };

        let undecodable = || TextError::Undecodable {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        };

        let content = match encoding {
            TextEncoding::Utf8 => String::from_utf8(body.to_vec()).map_err(|_| undecodable())?,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                if body.len() % 2 != 0 {
                    return Err(undecodable());
                }
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|pair| match encoding {
                        TextEncoding::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|_| undecodable())?
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            line_ending: LineEnding::detect(&content),
            content,
            has_bom,
            encoding,
        })
    }

    /// Encode `content` with this file's BOM, encoding and line endings.
    pub fn encode(&self, content: &str) -> Vec<u8> {
        let normalized = self.line_ending.normalize(content);
        let mut bytes = Vec::with_capacity(normalized.len() + 3);
        if self.has_bom {
            bytes.extend_from_slice(self.encoding.bom());
        }
        match self.encoding {
            TextEncoding::Utf8 => bytes.extend_from_slice(normalized.as_bytes()),
            TextEncoding::Utf16Le => {
                for unit in normalized.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
            }
            TextEncoding::Utf16Be => {
                for unit in normalized.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
        bytes
    }

    /// Replace the file on disk with `content`.
    ///
    /// The whole output is computed in memory first and then written in one
    /// call, which truncates the file to the new length.
    pub fn write(&self, content: &str) -> Result<(), TextError> {
        std::fs::write(&self.path, self.encode(content)).map_err(|source| TextError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
