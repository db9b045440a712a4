//! # bumper-core
//!
//! Foundation crate for the bumper upgrade pipeline.
//! Defines the upgrade descriptor, processing outcomes, edit records, the shared
//! upgrade context, cancellation, errors, configuration, version utilities and
//! encoding-preserving text I/O. Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod config;
pub mod context;
pub mod errors;
pub mod support;
pub mod text;
pub mod tracing;
pub mod types;
pub mod versioning;

// Re-export the most commonly used types at the crate root.
pub use cancellation::CancellationToken;
pub use config::BumperConfig;
pub use context::UpgradeContext;
pub use errors::{BumperErrorCode, UpgradeError, UpgradeResult};
pub use types::edits::PotentialEdit;
pub use types::outcome::ProcessingResult;
pub use types::upgrade::{ReleaseType, SupportPhase, UpgradeInfo};
pub use versioning::{DotNetVersion, SemanticVersion};
