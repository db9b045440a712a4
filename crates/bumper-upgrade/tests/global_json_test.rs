//! `global.json` SDK pins.

mod common;

use bumper_core::ProcessingResult;
use bumper_upgrade::upgraders::GlobalJsonUpgrader;
use common::{net8, net9_preview, Fixture};

#[test]
fn updates_only_the_sdk_version() {
    let fixture = Fixture::new();
    let content = r#"{
  // Pinned for reproducible builds.
  "sdk": {
    "version": "6.0.400",
    "rollForward": "latestFeature",
  },
  "msbuild-sdks": { "Microsoft.Build.Traversal": "4.1.0" }
}
"#;
    fixture.write("global.json", content);

    assert_eq!(fixture.run_idempotent(&GlobalJsonUpgrader, &net8()), ProcessingResult::Success);
    assert_eq!(fixture.read("global.json"), content.replace("6.0.400", "8.0.100"));
    assert_eq!(fixture.changelog(), vec!["Update .NET SDK from 6.0.400 to 8.0.100 in global.json".to_string()]);
}

#[test]
fn newer_pins_are_kept() {
    let fixture = Fixture::new();
    let content = "{ \"sdk\": { \"version\": \"8.0.303\" } }";
    fixture.write("global.json", content);

    assert_eq!(fixture.run(&GlobalJsonUpgrader, &net8()), ProcessingResult::None);
    assert_eq!(fixture.read("global.json"), content);
}

#[test]
fn preview_sdks_are_pinned_exactly() {
    let fixture = Fixture::new();
    fixture.write("global.json", "{\"sdk\":{\"version\":\"8.0.100\"}}");

    fixture.run_idempotent(&GlobalJsonUpgrader, &net9_preview());
    assert_eq!(fixture.read("global.json"), "{\"sdk\":{\"version\":\"9.0.100-preview.7.24407.12\"}}");
}

#[test]
fn files_without_an_sdk_section_do_not_apply() {
    let fixture = Fixture::new();
    fixture.write("global.json", "{ \"msbuild-sdks\": {} }");
    fixture.write("tools/global.json", "[1, 2, 3]");

    assert_eq!(fixture.run(&GlobalJsonUpgrader, &net8()), ProcessingResult::None);
}

#[test]
fn malformed_json_is_a_warning() {
    let fixture = Fixture::new();
    let content = "{ \"sdk\": { \"version\": \"6.0.100\" ";
    fixture.write("global.json", content);

    assert_eq!(fixture.run(&GlobalJsonUpgrader, &net8()), ProcessingResult::Warning);
    assert_eq!(fixture.read("global.json"), content);
}
