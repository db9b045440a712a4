//! # bumper-upgrade
//!
//! The upgrade pipeline: file discovery, format helpers, the container
//! registry client and digest cache, every per-format upgrader, the
//! sequencing engine and the remaining-reference scanner.

pub mod discovery;
pub mod documents;
pub mod engine;
pub mod registry;
pub mod remaining;
pub mod tooling;
pub mod upgraders;

pub use engine::{PostProcessor, RunReport, StepOutcome, UpgradePipeline};
pub use registry::{ContainerRegistry, DigestCache, PackageVersionSource};
pub use remaining::RemainingReferenceScanner;
pub use tooling::DotNetTooling;
pub use upgraders::{Upgrader, UpgraderServices};
