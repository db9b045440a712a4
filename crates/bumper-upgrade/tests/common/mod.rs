//! Shared fixtures and in-memory fakes for the upgrader tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bumper_core::errors::RegistryError;
use bumper_core::{
    BumperConfig, CancellationToken, ProcessingResult, ReleaseType, SemanticVersion, SupportPhase,
    UpgradeContext, UpgradeInfo, UpgradeResult,
};
use bumper_upgrade::registry::{ContainerRegistry, PackageVersionSource};
use bumper_upgrade::tooling::{DotNetTooling, ToolRun};
use bumper_upgrade::upgraders::{UpgradeRequest, Upgrader};
use tempfile::TempDir;

pub fn upgrade(channel: &str, sdk: &str, release_type: ReleaseType, phase: SupportPhase) -> UpgradeInfo {
    UpgradeInfo::new(channel.parse().unwrap(), release_type, phase, sdk.parse().unwrap())
}

pub fn net8() -> UpgradeInfo {
    upgrade("8.0", "8.0.100", ReleaseType::Lts, SupportPhase::Active)
}

pub fn net9() -> UpgradeInfo {
    upgrade("9.0", "9.0.100", ReleaseType::Sts, SupportPhase::Active)
}

pub fn net9_preview() -> UpgradeInfo {
    upgrade("9.0", "9.0.100-preview.7.24407.12", ReleaseType::Sts, SupportPhase::Preview)
}

/// A throwaway project directory plus the state one upgrader run needs.
pub struct Fixture {
    dir: TempDir,
    pub config: BumperConfig,
    pub context: UpgradeContext,
    pub cancel: CancellationToken,
}

impl Fixture {
    pub fn new() -> Self {
        bumper_core::tracing::init_test_tracing();
        Self {
            dir: TempDir::new().unwrap(),
            config: BumperConfig::default(),
            context: UpgradeContext::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        self.write_bytes(relative, content.as_bytes());
    }

    pub fn write_bytes(&self, relative: &str, bytes: &[u8]) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, bytes).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn read_bytes(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative)).unwrap()
    }

    pub fn try_run(&self, upgrader: &dyn Upgrader, upgrade: &UpgradeInfo) -> UpgradeResult<ProcessingResult> {
        let request = UpgradeRequest {
            upgrade,
            root: self.root(),
            config: &self.config,
            context: &self.context,
            cancel: &self.cancel,
        };
        upgrader.upgrade(&request)
    }

    pub fn run(&self, upgrader: &dyn Upgrader, upgrade: &UpgradeInfo) -> ProcessingResult {
        self.try_run(upgrader, upgrade).unwrap()
    }

    /// Run twice, asserting the second run finds nothing left to do.
    pub fn run_idempotent(&self, upgrader: &dyn Upgrader, upgrade: &UpgradeInfo) -> ProcessingResult {
        let first = self.run(upgrader, upgrade);
        let snapshot = self.snapshot();
        let second = self.run(upgrader, upgrade);
        assert_eq!(second, ProcessingResult::None, "second run of {} changed something", upgrader.name());
        assert_eq!(snapshot, self.snapshot(), "second run of {} rewrote files", upgrader.name());
        first
    }

    pub fn changelog(&self) -> Vec<String> {
        self.context.changelog()
    }

    /// Every file under the root with its bytes.
    pub fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files = Vec::new();
        let mut pending = vec![self.root().to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.push((path.clone(), fs::read(&path).unwrap()));
                }
            }
        }
        files.sort();
        files
    }
}

/// Resolves digests from a fixed table and counts lookups.
#[derive(Default)]
pub struct FakeRegistry {
    digests: HashMap<(String, String), Result<String, RegistryError>>,
    pub calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn with(mut self, image: &str, tag: &str, result: Result<&str, RegistryError>) -> Self {
        self.digests
            .insert((image.to_string(), tag.to_string()), result.map(str::to_string));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContainerRegistry for FakeRegistry {
    fn resolve_digest(&self, image: &str, tag: &str, _cancel: &CancellationToken) -> Result<String, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.digests
            .get(&(image.to_string(), tag.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(RegistryError::NotFound {
                    name: image.to_string(),
                    reference: tag.to_string(),
                })
            })
    }
}

/// Serves package versions from a fixed table.
#[derive(Default)]
pub struct FakePackages {
    versions: HashMap<String, Result<Vec<SemanticVersion>, RegistryError>>,
}

impl FakePackages {
    pub fn with(mut self, id: &str, versions: &[&str]) -> Self {
        let parsed = versions.iter().map(|v| v.parse().unwrap()).collect();
        self.versions.insert(id.to_ascii_lowercase(), Ok(parsed));
        self
    }

    pub fn failing(mut self, id: &str, error: RegistryError) -> Self {
        self.versions.insert(id.to_ascii_lowercase(), Err(error));
        self
    }
}

impl PackageVersionSource for FakePackages {
    fn versions(&self, id: &str, _cancel: &CancellationToken) -> Result<Vec<SemanticVersion>, RegistryError> {
        match self.versions.get(&id.to_ascii_lowercase()) {
            Some(result) => result.clone(),
            None => Err(RegistryError::NotFound {
                name: id.to_string(),
                reference: "index.json".to_string(),
            }),
        }
    }
}

/// Stands in for `dotnet format`, optionally rewriting one file.
pub struct FakeTooling {
    pub outcome: ToolRun,
    pub rewrite: Option<(PathBuf, String)>,
    pub invocations: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeTooling {
    pub fn new(outcome: ToolRun) -> Self {
        Self {
            outcome,
            rewrite: None,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn rewriting(mut self, path: PathBuf, content: &str) -> Self {
        self.rewrite = Some((path, content.to_string()));
        self
    }
}

impl DotNetTooling for FakeTooling {
    fn format_style(&self, project: &Path, diagnostics: &[&str], cancel: &CancellationToken) -> UpgradeResult<ToolRun> {
        cancel.check()?;
        self.invocations
            .lock()
            .unwrap()
            .push((project.to_path_buf(), diagnostics.iter().map(|d| d.to_string()).collect()));
        if let Some((path, content)) = &self.rewrite {
            fs::write(path, content).unwrap();
        }
        Ok(self.outcome.clone())
    }
}
