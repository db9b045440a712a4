//! The upgrade pipeline.
//!
//! Upgraders run one at a time in registration order, because later steps
//! read what earlier ones wrote (package versions are judged after target
//! frameworks move). Post-processors run afterwards, and only if something
//! changed. Cancellation stops the run between steps and between files;
//! files already written stay written.

use std::path::Path;
use std::time::Instant;

use bumper_core::{
    BumperConfig, CancellationToken, ProcessingResult, UpgradeContext, UpgradeInfo, UpgradeResult,
};

use super::post_process::PostProcessor;
use super::types::{RunReport, StepOutcome};
use crate::remaining::RemainingReferenceScanner;
use crate::upgraders::{default_upgraders, UpgradeRequest, Upgrader, UpgraderServices};

pub struct UpgradePipeline {
    config: BumperConfig,
    upgraders: Vec<Box<dyn Upgrader>>,
    post_processors: Vec<Box<dyn PostProcessor>>,
}

impl UpgradePipeline {
    /// An empty pipeline; register steps before running it.
    pub fn new(config: BumperConfig) -> Self {
        Self {
            config,
            upgraders: Vec::new(),
            post_processors: Vec::new(),
        }
    }

    /// Every built-in upgrader followed by the remaining-reference scan.
    pub fn with_defaults(config: BumperConfig, services: &UpgraderServices) -> Self {
        let scanner = RemainingReferenceScanner::new(config.remaining_references_ignore.clone());
        let mut pipeline = Self::new(config);
        for upgrader in default_upgraders(services) {
            pipeline.upgraders.push(upgrader);
        }
        pipeline.register_post_processor(Box::new(scanner));
        pipeline
    }

    pub fn register(&mut self, upgrader: Box<dyn Upgrader>) {
        self.upgraders.push(upgrader);
    }

    pub fn register_post_processor(&mut self, processor: Box<dyn PostProcessor>) {
        self.post_processors.push(processor);
    }

    pub fn upgrader_names(&self) -> Vec<&'static str> {
        self.upgraders.iter().map(|u| u.name()).collect()
    }

    pub fn config(&self) -> &BumperConfig {
        &self.config
    }

    /// Upgrade the project at `root` to `upgrade`.
    pub fn run(
        &self,
        upgrade: &UpgradeInfo,
        root: &Path,
        cancel: &CancellationToken,
    ) -> UpgradeResult<RunReport> {
        let context = UpgradeContext::with_suppressed_warnings(self.config.no_warn.iter().cloned());
        let request = UpgradeRequest {
            upgrade,
            root,
            config: &self.config,
            context: &context,
            cancel,
        };
        tracing::info!(root = %root.display(), target = %upgrade.channel, sdk = %upgrade.sdk_version, "starting upgrade");

        let mut steps = Vec::with_capacity(self.upgraders.len());
        for upgrader in &self.upgraders {
            cancel.check()?;
            let name = upgrader.name();
            let span = tracing::info_span!("upgrader", upgrader = name);
            let _guard = span.enter();
            let start = Instant::now();
            let result = upgrader.upgrade(&request)?;
            let duration = start.elapsed();
            tracing::debug!(result = %result, elapsed_ms = duration.as_millis() as u64, "step finished");
            steps.push(StepOutcome {
                name: name.to_string(),
                result,
                duration,
            });
        }

        let mut post_processing = Vec::new();
        if steps.iter().any(|step| step.result.made_changes()) {
            for processor in &self.post_processors {
                cancel.check()?;
                let name = processor.name();
                let span = tracing::info_span!("post_process", processor = name);
                let _guard = span.enter();
                let start = Instant::now();
                let result = processor.process(&request)?;
                post_processing.push(StepOutcome {
                    name: name.to_string(),
                    result,
                    duration: start.elapsed(),
                });
            }
        } else {
            tracing::info!("no changes made; skipping post-processing");
        }

        let result = ProcessingResult::reduce(
            steps
                .iter()
                .chain(&post_processing)
                .map(|step| step.result),
        );
        tracing::info!(result = %result, changes = context.changelog().len(), "upgrade finished");

        Ok(RunReport {
            result,
            steps,
            post_processing,
            warnings: context.warnings(),
            remaining_references: context.remaining_references(),
            changelog: context.into_changelog(),
        })
    }
}
