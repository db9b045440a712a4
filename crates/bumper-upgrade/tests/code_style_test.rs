//! `dotnet format` code style fixes.

mod common;

use std::sync::Arc;

use bumper_core::types::edits::WarningKind;
use bumper_core::{ProcessingResult, ReleaseType, SupportPhase};
use bumper_upgrade::tooling::{DotNetTooling, ToolRun};
use bumper_upgrade::upgraders::CodeStyleUpgrader;
use common::{net8, net9, upgrade, FakeTooling, Fixture};

fn project(fixture: &Fixture) {
    fixture.write("src/App/App.csproj", "<Project Sdk=\"Microsoft.NET.Sdk\"></Project>");
    fixture.write("src/App/Program.cs", "var list = new List<int>();\n");
    fixture.write("src/App/Other.cs", "class Other { }\n");
}

fn upgrader(tooling: &Arc<FakeTooling>) -> CodeStyleUpgrader {
    let tooling: Arc<dyn DotNetTooling> = tooling.clone();
    CodeStyleUpgrader::new(Some(tooling))
}

#[test]
fn changed_sources_are_logged() {
    let fixture = Fixture::new();
    project(&fixture);
    let tooling = Arc::new(
        FakeTooling::new(ToolRun::Succeeded).rewriting(fixture.path("src/App/Program.cs"), "List<int> list = [];\n"),
    );

    assert_eq!(fixture.run(&upgrader(&tooling), &net9()), ProcessingResult::Success);

    assert_eq!(fixture.read("src/App/Program.cs"), "List<int> list = [];\n");
    assert_eq!(fixture.changelog(), vec!["Apply code style fixes in src/App/Program.cs".to_string()]);
    let invocations = tooling.invocations.lock().unwrap();
    assert_eq!(invocations.len(), 1);
    assert!(invocations[0].0.ends_with("App.csproj"));
    assert!(invocations[0].1.contains(&"IDE0330".to_string()));
}

#[test]
fn nothing_changed_is_none() {
    let fixture = Fixture::new();
    project(&fixture);
    let tooling = Arc::new(FakeTooling::new(ToolRun::Succeeded));

    assert_eq!(fixture.run(&upgrader(&tooling), &net8()), ProcessingResult::None);
    assert!(fixture.changelog().is_empty());
}

#[test]
fn missing_dotnet_is_skipped() {
    let fixture = Fixture::new();
    project(&fixture);
    let tooling = Arc::new(FakeTooling::new(ToolRun::Unavailable));

    assert_eq!(fixture.run(&upgrader(&tooling), &net8()), ProcessingResult::None);
    assert!(fixture.context.warnings().is_empty());
}

#[test]
fn tool_failure_is_a_warning() {
    let fixture = Fixture::new();
    project(&fixture);
    let tooling = Arc::new(FakeTooling::new(ToolRun::Failed {
        message: "restore failed".into(),
    }));

    assert_eq!(fixture.run(&upgrader(&tooling), &net8()), ProcessingResult::Warning);
    let warnings = fixture.context.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::ToolFailure);
}

#[test]
fn older_targets_do_not_invoke_the_tool() {
    let fixture = Fixture::new();
    project(&fixture);
    let tooling = Arc::new(FakeTooling::new(ToolRun::Succeeded));
    let seven = upgrade("7.0", "7.0.100", ReleaseType::Sts, SupportPhase::Active);

    assert_eq!(fixture.run(&upgrader(&tooling), &seven), ProcessingResult::None);
    assert!(tooling.invocations.lock().unwrap().is_empty());
}
