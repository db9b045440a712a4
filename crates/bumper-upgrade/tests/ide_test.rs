//! VS Code launch configurations and Visual Studio `.vsconfig` manifests.

mod common;

use bumper_core::ProcessingResult;
use bumper_upgrade::upgraders::{VsCodeUpgrader, VsConfigUpgrader};
use common::{net8, net9, Fixture};

#[test]
fn launch_paths_are_retargeted() {
    let fixture = Fixture::new();
    let content = r#"{
    // Use IntelliSense to learn about possible attributes.
    "version": "0.2.0",
    "configurations": [
        {
            "name": ".NET Core Launch (web)",
            "type": "coreclr",
            "program": "${workspaceFolder}/src/Api/bin/Debug/net6.0/Api.dll",
            "cwd": "${workspaceFolder}\\src\\Api\\bin\\Debug\\netcoreapp3.1",
            "args": ["--framework", "net6.0-windows"],
        }
    ]
}
"#;
    fixture.write(".vscode/launch.json", content);

    assert_eq!(fixture.run_idempotent(&VsCodeUpgrader, &net8()), ProcessingResult::Success);

    let expected = content
        .replace("Debug/net6.0/Api.dll", "Debug/net8.0/Api.dll")
        .replace("Debug\\\\netcoreapp3.1", "Debug\\\\net8.0");
    assert_eq!(fixture.read(".vscode/launch.json"), expected);
}

#[test]
fn launch_json_outside_vscode_is_ignored() {
    let fixture = Fixture::new();
    let content = r#"{ "configurations": [ { "program": "bin/Debug/net6.0/App.dll" } ] }"#;
    fixture.write("launch.json", content);

    assert_eq!(fixture.run(&VsCodeUpgrader, &net8()), ProcessingResult::None);
    assert_eq!(fixture.read("launch.json"), content);
}

#[test]
fn vsconfig_replaces_the_newest_runtime_component() {
    let fixture = Fixture::new();
    let content = r#"{
  "version": "1.0",
  "components": [
    "Microsoft.VisualStudio.Component.CoreEditor",
    "Microsoft.NetCore.Component.Runtime.6.0",
    "Microsoft.NetCore.Component.Runtime.7.0",
    "Microsoft.NetCore.Component.SDK"
  ]
}
"#;
    fixture.write(".vsconfig", content);

    assert_eq!(fixture.run_idempotent(&VsConfigUpgrader, &net9()), ProcessingResult::Success);
    assert_eq!(
        fixture.read(".vsconfig"),
        content.replace("Runtime.7.0", "Runtime.9.0")
    );
}

#[test]
fn vsconfig_with_the_target_runtime_is_unchanged() {
    let fixture = Fixture::new();
    let content = r#"{ "components": ["Microsoft.NetCore.Component.Runtime.6.0", "Microsoft.NetCore.Component.Runtime.8.0"] }"#;
    fixture.write(".vsconfig", content);

    assert_eq!(fixture.run(&VsConfigUpgrader, &net8()), ProcessingResult::None);
    assert_eq!(fixture.read(".vsconfig"), content);
}
