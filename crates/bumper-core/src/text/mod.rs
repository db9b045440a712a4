//! Encoding- and line-ending-preserving text file I/O.

pub mod encoding;
pub mod line_endings;

pub use encoding::{TextEncoding, TextFile};
pub use line_endings::LineEnding;
