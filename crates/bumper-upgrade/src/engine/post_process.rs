//! Steps that run after the upgraders, only when something changed.

use bumper_core::{ProcessingResult, UpgradeResult};

use crate::upgraders::UpgradeRequest;

/// A read-mostly step run once the upgraders have finished editing.
///
/// Post-processors see the same request as the upgraders, so they can report
/// through the shared context. They never run when no upgrader made a change.
pub trait PostProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult>;
}
