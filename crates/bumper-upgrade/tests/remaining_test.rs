//! The remaining-reference scan over a whole project.

mod common;

use std::path::PathBuf;

use bumper_core::config::ScanConfig;
use bumper_core::CancellationToken;
use bumper_upgrade::RemainingReferenceScanner;
use common::{net8, Fixture};

fn scan(fixture: &Fixture, ignore: &[&str]) -> Vec<(PathBuf, usize, usize, String)> {
    let scanner = RemainingReferenceScanner::new(ignore.iter().map(|s| s.to_string()).collect());
    scanner
        .scan(fixture.root(), &net8(), &ScanConfig::default(), &CancellationToken::new())
        .unwrap()
        .into_iter()
        .map(|r| (r.path, r.edit.line, r.edit.column, r.edit.text))
        .collect()
}

#[test]
fn references_are_ordered_by_path_line_and_column() {
    let fixture = Fixture::new();
    fixture.write("README.md", "# App\nRequires net6.0 or netcoreapp3.1.\n");
    fixture.write("deploy/values.yaml", "image: mcr.microsoft.com/dotnet/aspnet:6.0\nruntime: dotnet6\n");
    fixture.write("src/App.csproj", "<TargetFramework>net8.0</TargetFramework>\n");

    assert_eq!(
        scan(&fixture, &[]),
        vec![
            (PathBuf::from("README.md"), 2, 10, "net6.0".to_string()),
            (PathBuf::from("README.md"), 2, 20, "netcoreapp3.1".to_string()),
            (PathBuf::from("deploy/values.yaml"), 1, 8, "mcr.microsoft.com/dotnet/aspnet:6.0".to_string()),
            (PathBuf::from("deploy/values.yaml"), 2, 10, "dotnet6".to_string()),
        ]
    );
}

#[test]
fn binary_files_are_skipped() {
    let fixture = Fixture::new();
    fixture.write("lib/App.dll", "net6.0");
    let mut bytes = b"net6.0".to_vec();
    bytes.push(0);
    fixture.write_bytes("data/blob.txt", &bytes);

    assert!(scan(&fixture, &[]).is_empty());
}

#[test]
fn ignore_files_and_globs_are_honoured() {
    let fixture = Fixture::new();
    fixture.write(".gitignore", "generated/\n");
    fixture.write("generated/App.g.cs", "// net6.0\n");
    fixture.write("docs/history.md", "net6.0\n");
    fixture.write("obj/project.assets.json", "\"net6.0\"\n");
    fixture.write("src/Notes.txt", "net6.0\n");

    let found = scan(&fixture, &["docs/**"]);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].0, PathBuf::from("src/Notes.txt"));
}

#[test]
fn cancelled_scan_is_an_error() {
    let fixture = Fixture::new();
    fixture.write("README.md", "net6.0\n");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = RemainingReferenceScanner::default().scan(fixture.root(), &net8(), &ScanConfig::default(), &cancel);
    assert!(result.is_err());
}
