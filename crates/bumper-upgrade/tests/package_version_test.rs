//! NuGet package references that move with the .NET release.

mod common;

use std::sync::Arc;

use bumper_core::errors::RegistryError;
use bumper_core::types::edits::WarningKind;
use bumper_core::ProcessingResult;
use bumper_upgrade::registry::PackageVersionSource;
use bumper_upgrade::upgraders::PackageVersionUpgrader;
use common::{net8, net9_preview, FakePackages, Fixture};

const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <ItemGroup>
    <PackageReference Include="Microsoft.Extensions.Http" Version="6.0.0" />
    <PackageReference Include="Microsoft.EntityFrameworkCore.SqlServer">
      <Version>6.0.10</Version>
    </PackageReference>
    <PackageReference Include="Microsoft.NET.Test.Sdk" Version="16.0.0" />
    <PackageReference Include="Serilog" Version="2.12.0" />
    <PackageReference Include="System.Text.Json" Version="$(JsonVersion)" />
  </ItemGroup>
</Project>
"#;

fn feed() -> FakePackages {
    FakePackages::default()
        .with("Microsoft.Extensions.Http", &["6.0.0", "7.0.0", "8.0.0", "8.0.1", "9.0.0-preview.7.24405.7"])
        .with("Microsoft.EntityFrameworkCore.SqlServer", &["6.0.10", "8.0.0-rc.2.23480.1", "8.0.8"])
        .with("Microsoft.NET.Test.Sdk", &["17.0.0", "17.11.0"])
        .with("Serilog", &["8.0.0"])
}

fn upgrader(source: FakePackages) -> PackageVersionUpgrader {
    let source: Arc<dyn PackageVersionSource> = Arc::new(source);
    PackageVersionUpgrader::new(Some(source))
}

#[test]
fn aligned_packages_move_to_the_latest_stable_release() {
    let fixture = Fixture::new();
    fixture.write("src/Api/Api.csproj", PROJECT);

    assert_eq!(fixture.run_idempotent(&upgrader(feed()), &net8()), ProcessingResult::Success);

    assert_eq!(
        fixture.read("src/Api/Api.csproj"),
        PROJECT
            .replace("\"Microsoft.Extensions.Http\" Version=\"6.0.0\"", "\"Microsoft.Extensions.Http\" Version=\"8.0.1\"")
            .replace("<Version>6.0.10</Version>", "<Version>8.0.8</Version>")
    );
    assert_eq!(
        fixture.changelog(),
        vec![
            "Update Microsoft.Extensions.Http from 6.0.0 to 8.0.1 in src/Api/Api.csproj".to_string(),
            "Update Microsoft.EntityFrameworkCore.SqlServer from 6.0.10 to 8.0.8 in src/Api/Api.csproj".to_string(),
        ]
    );
}

#[test]
fn prereleases_only_for_prerelease_targets() {
    let fixture = Fixture::new();
    fixture.write(
        "Directory.Packages.props",
        "<Project><ItemGroup><PackageVersion Include=\"Microsoft.Extensions.Http\" Version=\"8.0.0\" /></ItemGroup></Project>",
    );

    fixture.run_idempotent(&upgrader(feed()), &net9_preview());
    assert!(fixture
        .read("Directory.Packages.props")
        .contains("Version=\"9.0.0-preview.7.24405.7\""));
}

#[test]
fn configuration_includes_and_excludes_packages() {
    let mut fixture = Fixture::new();
    fixture.config.exclude_nuget_packages = vec!["microsoft.extensions.http".to_string()];
    fixture.config.include_nuget_packages = vec!["Serilog".to_string()];
    fixture.write("App.csproj", PROJECT);

    fixture.run(&upgrader(feed()), &net8());

    let updated = fixture.read("App.csproj");
    assert!(updated.contains("\"Microsoft.Extensions.Http\" Version=\"6.0.0\""), "{updated}");
    assert!(updated.contains("\"Serilog\" Version=\"8.0.0\""), "{updated}");
    assert!(updated.contains("<Version>8.0.8</Version>"), "{updated}");
}

#[test]
fn lookup_failures() {
    let fixture = Fixture::new();
    fixture.write("App.csproj", PROJECT);
    let source = FakePackages::default()
        .failing(
            "Microsoft.Extensions.Http",
            RegistryError::Transient {
                message: "503 Service Unavailable".into(),
            },
        )
        .with("Microsoft.EntityFrameworkCore.SqlServer", &["8.0.8"]);

    assert_eq!(fixture.run(&upgrader(source), &net8()), ProcessingResult::Warning);

    let updated = fixture.read("App.csproj");
    assert!(updated.contains("\"Microsoft.Extensions.Http\" Version=\"6.0.0\""));
    assert!(updated.contains("<Version>8.0.8</Version>"));
    let warnings = fixture.context.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::Transient);
}

#[test]
fn unknown_packages_are_skipped_quietly() {
    let fixture = Fixture::new();
    fixture.write("App.csproj", PROJECT);

    assert_eq!(fixture.run(&upgrader(FakePackages::default()), &net8()), ProcessingResult::None);
    assert_eq!(fixture.read("App.csproj"), PROJECT);
}

#[test]
fn no_source_means_no_work() {
    let fixture = Fixture::new();
    fixture.write("App.csproj", PROJECT);

    assert_eq!(fixture.run(&PackageVersionUpgrader::new(None), &net8()), ProcessingResult::None);
}
