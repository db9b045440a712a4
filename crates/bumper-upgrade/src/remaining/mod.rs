//! Advisory scan for version references no upgrader rewrote.

pub mod media;
pub mod scanner;

pub use scanner::{find_references, RemainingReferenceScanner};
