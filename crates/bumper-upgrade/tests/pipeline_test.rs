//! End-to-end runs of the upgrade pipeline.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bumper_core::{BumperConfig, CancellationToken, ProcessingResult, UpgradeError, UpgradeResult};
use bumper_upgrade::upgraders::{UpgradeRequest, Upgrader, UpgraderServices};
use bumper_upgrade::{PostProcessor, UpgradePipeline};
use common::{net8, Fixture};

fn project(fixture: &Fixture) {
    fixture.write(
        "src/App/App.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net6.0</TargetFramework>\n  </PropertyGroup>\n</Project>\n",
    );
    fixture.write("global.json", "{ \"sdk\": { \"version\": \"6.0.400\" } }\n");
    fixture.write("src/App/Dockerfile", "FROM mcr.microsoft.com/dotnet/aspnet:6.0\nEXPOSE 80\n");
    fixture.write(
        ".github/workflows/build.yml",
        "jobs:\n  build:\n    steps:\n      - uses: actions/setup-dotnet@v4\n        with:\n          dotnet-version: |\n            6.0.x\n",
    );
}

fn pipeline(config: BumperConfig) -> UpgradePipeline {
    UpgradePipeline::with_defaults(config, &UpgraderServices::default())
}

#[test]
fn upgrades_a_project_then_finds_nothing_to_do() {
    let fixture = Fixture::new();
    project(&fixture);
    let pipeline = pipeline(BumperConfig::default());
    let cancel = CancellationToken::new();

    let first = pipeline.run(&net8(), fixture.root(), &cancel).unwrap();

    assert_eq!(first.result, ProcessingResult::Success);
    for name in ["global.json", "project-files", "dockerfiles", "github-actions"] {
        assert_eq!(first.step(name).map(|s| s.result), Some(ProcessingResult::Success), "{name}");
    }
    assert_eq!(first.step("remaining-references").map(|s| s.result), Some(ProcessingResult::None));
    assert!(first.warnings.is_empty(), "{:?}", first.warnings);
    assert!(first.changelog.len() >= 4, "{:?}", first.changelog);
    assert!(fixture.read("src/App/App.csproj").contains("<TargetFramework>net8.0</TargetFramework>"));
    assert_eq!(fixture.read("src/App/Dockerfile"), "FROM mcr.microsoft.com/dotnet/aspnet:8.0\nEXPOSE 8080\n");
    assert!(fixture.read(".github/workflows/build.yml").ends_with("            6.0.x\n            8.0.x\n"));

    let snapshot = fixture.snapshot();
    let second = pipeline.run(&net8(), fixture.root(), &cancel).unwrap();

    assert_eq!(second.result, ProcessingResult::None);
    assert!(second.steps.iter().all(|s| s.result == ProcessingResult::None), "{:?}", second.steps);
    assert!(second.post_processing.is_empty());
    assert!(second.changelog.is_empty());
    assert!(!second.made_changes());
    assert_eq!(snapshot, fixture.snapshot());
}

#[test]
fn leftover_references_are_reported() {
    let fixture = Fixture::new();
    project(&fixture);
    fixture.write("docs/README.md", "Built for net6.0.\n");

    let report = pipeline(BumperConfig::default())
        .run(&net8(), fixture.root(), &CancellationToken::new())
        .unwrap();

    assert_eq!(report.result, ProcessingResult::Warning);
    assert_eq!(report.remaining_references.len(), 1);
    let reference = &report.remaining_references[0];
    assert!(reference.path.ends_with("README.md"));
    assert_eq!((reference.edit.line, reference.edit.column), (1, 11));
    assert_eq!(reference.edit.text, "net6.0");
}

#[test]
fn remaining_reference_ignores_come_from_configuration() {
    let fixture = Fixture::new();
    project(&fixture);
    fixture.write("docs/README.md", "Built for net6.0.\n");
    let config = BumperConfig {
        remaining_references_ignore: vec!["docs/".to_string()],
        ..BumperConfig::default()
    };

    let report = pipeline(config).run(&net8(), fixture.root(), &CancellationToken::new()).unwrap();

    assert_eq!(report.result, ProcessingResult::Success);
    assert!(report.remaining_references.is_empty());
}

#[test]
fn suppressed_warning_codes_are_dropped() {
    let fixture = Fixture::new();
    fixture.write("Broken.csproj", "<Project><PropertyGroup></Project>");
    let config = BumperConfig {
        no_warn: vec!["BUMPER001".to_string()],
        ..BumperConfig::default()
    };

    let report = pipeline(config).run(&net8(), fixture.root(), &CancellationToken::new()).unwrap();

    assert_eq!(report.step("project-files").map(|s| s.result), Some(ProcessingResult::Warning));
    assert!(report.warnings.is_empty());
}

#[test]
fn cancelled_runs_stop_before_any_write() {
    let fixture = Fixture::new();
    project(&fixture);
    let snapshot = fixture.snapshot();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = pipeline(BumperConfig::default()).run(&net8(), fixture.root(), &cancel);

    assert!(matches!(result, Err(UpgradeError::Cancelled)));
    assert_eq!(snapshot, fixture.snapshot());
}

struct Recorder {
    name: &'static str,
    result: ProcessingResult,
    order: Arc<Mutex<Vec<&'static str>>>,
}

impl Upgrader for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn upgrade(&self, _request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        self.order.lock().unwrap().push(self.name);
        Ok(self.result)
    }
}

struct Counter(Arc<AtomicUsize>);

impl PostProcessor for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn process(&self, _request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(ProcessingResult::None)
    }
}

#[test]
fn steps_run_in_registration_order() {
    let fixture = Fixture::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));

    for (results, expected_calls) in [([ProcessingResult::None; 2], 0), ([ProcessingResult::None, ProcessingResult::Success], 1)] {
        order.lock().unwrap().clear();
        calls.store(0, Ordering::SeqCst);
        let mut pipeline = UpgradePipeline::new(BumperConfig::default());
        for (name, result) in ["first", "second"].into_iter().zip(results) {
            pipeline.register(Box::new(Recorder {
                name,
                result,
                order: order.clone(),
            }));
        }
        pipeline.register_post_processor(Box::new(Counter(calls.clone())));

        let report = pipeline.run(&net8(), fixture.root(), &CancellationToken::new()).unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(pipeline.upgrader_names(), vec!["first", "second"]);
        assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
        assert_eq!(report.post_processing.len(), expected_calls);
    }
}

#[test]
fn online_services_wire_every_collaborator() {
    let services = UpgraderServices::online().unwrap();
    assert!(services.digests.is_some());
    assert!(services.packages.is_some());
    assert!(services.tooling.is_some());
    assert_eq!(UpgradePipeline::with_defaults(BumperConfig::default(), &services).upgrader_names().len(), 12);
}
