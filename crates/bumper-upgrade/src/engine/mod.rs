//! Sequencing engine: runs every upgrader in order, then post-processors.

pub mod pipeline;
pub mod post_process;
pub mod types;

pub use pipeline::UpgradePipeline;
pub use post_process::PostProcessor;
pub use types::{RunReport, StepOutcome};
