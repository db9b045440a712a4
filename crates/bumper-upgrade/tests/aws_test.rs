//! AWS Lambda descriptors: tools defaults, SAM templates and Serverless.

mod common;

use bumper_core::types::edits::WarningKind;
use bumper_core::{ProcessingResult, ReleaseType, SupportPhase};
use bumper_upgrade::upgraders::{LambdaToolsUpgrader, SamTemplateUpgrader, ServerlessUpgrader, Upgrader};
use common::{net8, upgrade, Fixture};

const TOOLS_DEFAULTS: &str = r#"{
  // Written by the AWS toolkit
  "profile": "default",
  "region": "eu-west-1",
  "configuration": "Release",
  "function-runtime": "dotnet6",
  "function-memory-size": 256,
  "framework": "net6.0",
}
"#;

const SAM_YAML: &str = "\
AWSTemplateFormatVersion: '2010-09-09'
Transform: AWS::Serverless-2016-10-31
Globals:
  Function:
    Runtime: dotnet6 # shared
    Timeout: 30
Resources:
  Api:
    Type: AWS::Serverless::Function
    Properties:
      Handler: Api::Api.Function::Handler
      CodeUri: !Ref Code
      Runtime: dotnet6
  Authorizer:
    Type: AWS::Serverless::Function
    Properties:
      Runtime: nodejs18.x
";

const SAM_JSON: &str = r#"{
  "AWSTemplateFormatVersion": "2010-09-09",
  "Resources": {
    "Function": {
      "Type": "AWS::Lambda::Function",
      "Properties": { "Runtime": "dotnetcore3.1", "Handler": "App::App.Function::Handler" }
    },
    "Other": {
      "Type": "AWS::Lambda::Function",
      "Properties": { "Runtime": "python3.12" }
    }
  }
}
"#;

const SERVERLESS: &str = "\
service: orders
provider:
  name: aws
  runtime: dotnet6
functions:
  create:
    handler: Orders::Orders.Create::Handle
  report:
    handler: report.handler
    runtime: python3.12
  export:
    handler: Orders::Orders.Export::Handle
    runtime: 'dotnet6'
";

fn write_all(fixture: &Fixture) {
    fixture.write("src/Api/aws-lambda-tools-defaults.json", TOOLS_DEFAULTS);
    fixture.write("template.yaml", SAM_YAML);
    fixture.write("infra/stack.template.json", SAM_JSON);
    fixture.write("serverless.yml", SERVERLESS);
}

fn upgraders() -> Vec<Box<dyn Upgrader>> {
    vec![Box::new(LambdaToolsUpgrader), Box::new(SamTemplateUpgrader), Box::new(ServerlessUpgrader)]
}

#[test]
fn lts_targets_update_every_descriptor() {
    let fixture = Fixture::new();
    write_all(&fixture);

    for upgrader in upgraders() {
        assert_eq!(fixture.run_idempotent(upgrader.as_ref(), &net8()), ProcessingResult::Success, "{}", upgrader.name());
    }

    assert_eq!(
        fixture.read("src/Api/aws-lambda-tools-defaults.json"),
        TOOLS_DEFAULTS.replace("\"dotnet6\"", "\"dotnet8\"").replace("\"net6.0\"", "\"net8.0\"")
    );
    assert_eq!(fixture.read("template.yaml"), SAM_YAML.replace("dotnet6", "dotnet8"));
    assert_eq!(fixture.read("infra/stack.template.json"), SAM_JSON.replace("dotnetcore3.1", "dotnet8"));
    assert_eq!(fixture.read("serverless.yml"), SERVERLESS.replace("dotnet6", "dotnet8"));
}

#[test]
fn gating_is_identical_across_descriptors() {
    let matrix = [
        (ReleaseType::Lts, SupportPhase::Active, true),
        (ReleaseType::Lts, SupportPhase::Maintenance, true),
        (ReleaseType::Lts, SupportPhase::Preview, false),
        (ReleaseType::Lts, SupportPhase::GoLive, false),
        (ReleaseType::Lts, SupportPhase::Daily, false),
        (ReleaseType::Sts, SupportPhase::Active, false),
        (ReleaseType::Lts, SupportPhase::EndOfLife, false),
    ];

    for (release_type, phase, allowed) in matrix {
        let target = upgrade("8.0", "8.0.100", release_type, phase);
        let fixture = Fixture::new();
        write_all(&fixture);
        let before = fixture.snapshot();

        let results: Vec<_> = upgraders().iter().map(|u| fixture.run(u.as_ref(), &target)).collect();

        let expected = if allowed { ProcessingResult::Success } else { ProcessingResult::Warning };
        assert!(results.iter().all(|r| *r == expected), "{release_type:?}/{phase:?}: {results:?}");
        if !allowed {
            assert_eq!(before, fixture.snapshot(), "{release_type:?}/{phase:?} edited a gated file");
            let warnings = fixture.context.warnings();
            assert_eq!(warnings.len(), 4);
            assert!(warnings.iter().all(|w| w.kind == WarningKind::Unsupported));
        }
    }
}

#[test]
fn non_dotnet_runtimes_are_untouched() {
    let fixture = Fixture::new();
    let content = "provider:\n  name: aws\n  runtime: nodejs18.x\nfunctions:\n  a:\n    runtime: provided.al2023\n";
    fixture.write("serverless.yaml", content);

    assert_eq!(fixture.run(&ServerlessUpgrader, &net8()), ProcessingResult::None);
    assert_eq!(fixture.read("serverless.yaml"), content);
}

#[test]
fn gate_only_warns_when_an_edit_was_needed() {
    let fixture = Fixture::new();
    fixture.write("serverless.yml", "provider:\n  runtime: dotnet8\n");
    let preview = upgrade("9.0", "9.0.100-rc.1.24452.12", ReleaseType::Sts, SupportPhase::GoLive);
    let current = upgrade("8.0", "8.0.100", ReleaseType::Lts, SupportPhase::Preview);

    assert_eq!(fixture.run(&ServerlessUpgrader, &current), ProcessingResult::None);
    assert_eq!(fixture.run(&ServerlessUpgrader, &preview), ProcessingResult::Warning);
}

#[test]
fn schema_mismatch_is_not_a_warning() {
    let fixture = Fixture::new();
    fixture.write("template.json", r#"{ "name": "not a template", "Runtime": "dotnet6" }"#);
    fixture.write("serverless.yml", "service: nothing-here\n");

    assert_eq!(fixture.run(&SamTemplateUpgrader, &net8()), ProcessingResult::None);
    assert_eq!(fixture.run(&ServerlessUpgrader, &net8()), ProcessingResult::None);
}

#[test]
fn malformed_descriptors_are_warnings() {
    let fixture = Fixture::new();
    fixture.write("aws-lambda-tools-defaults.json", "{ \"function-runtime\": \"dotnet6\"");
    fixture.write("template.yml", "Resources: [\n");

    assert_eq!(fixture.run(&LambdaToolsUpgrader, &net8()), ProcessingResult::Warning);
    assert_eq!(fixture.run(&SamTemplateUpgrader, &net8()), ProcessingResult::Warning);
    assert!(fixture
        .context
        .warnings()
        .iter()
        .all(|w| w.kind == WarningKind::Malformed));
}
