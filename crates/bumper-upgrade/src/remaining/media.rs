//! Binary and media file detection.

use std::path::Path;

/// Extensions of files that are never worth reading as text.
const BINARY_EXTENSIONS: &[&str] = &[
    "7z", "avi", "bmp", "class", "db", "dll", "dylib", "eot", "exe", "gif", "gz", "ico", "jar",
    "jpeg", "jpg", "mov", "mp3", "mp4", "nupkg", "otf", "pdb", "pdf", "pfx", "png", "snk",
    "snupkg", "so", "sqlite", "tar", "tgz", "ttf", "wav", "webm", "webp", "woff", "woff2", "zip",
];

/// How many leading bytes are sniffed for NUL, as git does.
const SNIFF_LEN: usize = 8000;

pub fn is_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.iter().any(|b| b.eq_ignore_ascii_case(ext)))
}

/// Whether `bytes` look like binary content. UTF-16 text with a BOM is text.
pub fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return false;
    }
    bytes.iter().take(SNIFF_LEN).any(|b| *b == 0)
}
