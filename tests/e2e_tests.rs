//! End-to-end tests for the depsight CLI
//!
//! These tests verify:
//! - `scan` produces the expected text and JSON output
//! - Exit codes are correct for various scenarios
//! - Argument errors are reported before any network access
//!
//! Only commands that never reach a registry are exercised here.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn depsight() -> Command {
    Command::new(env!("CARGO_BIN_EXE_depsight"))
}

/// Create a test directory with a small project tree
fn create_test_project() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    fs::write(
        temp_dir.path().join("Versions.props"),
        r#"<Project>
  <PropertyGroup>
    <SerilogVersion>2.10.0</SerilogVersion>
  </PropertyGroup>
</Project>
"#,
    )
    .unwrap();

    let app = temp_dir.path().join("src").join("App");
    fs::create_dir_all(&app).unwrap();
    fs::write(
        app.join("App.csproj"),
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <Import Project="..\..\Versions.props" />
  <ItemGroup>
    <PackageReference Include="Serilog" Version="$(SerilogVersion)" />
    <PackageReference Include="Dapper" Version="2.1.35" />
  </ItemGroup>
</Project>
"#,
    )
    .unwrap();

    temp_dir
}

mod scan_output {
    use super::*;

    #[test]
    fn test_scan_text_output() {
        let dir = create_test_project();

        depsight()
            .args(["scan", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("App.csproj"))
            .stdout(predicate::str::contains("Serilog"))
            .stdout(predicate::str::contains("Summary"));
    }

    #[test]
    fn test_scan_json_output_schema() {
        let dir = create_test_project();

        let output = depsight()
            .args(["scan", dir.path().to_str().unwrap(), "--json"])
            .output()
            .expect("Failed to execute command");
        assert!(output.status.success());

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        assert_eq!(json["command"], "scan");
        assert_eq!(json["summary"]["projects"], 1);
        assert_eq!(json["summary"]["dependencies"], 2);

        let project = &json["projects"][0];
        assert_eq!(project["name"], "App.csproj");
        assert!(project["parameterFile"]
            .as_str()
            .unwrap()
            .ends_with("Versions.props"));
        assert_eq!(project["parameters"]["SerilogVersion"], "2.10.0");

        let serilog = &project["dependencies"][0];
        assert_eq!(serilog["isParameter"], true);
        assert_eq!(serilog["parameterName"], "SerilogVersion");
        assert_eq!(serilog["currentVersion"], "2.10.0");
        assert_eq!(serilog["isChecked"], false);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        let output = depsight()
            .args(["scan", dir.path().to_str().unwrap(), "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["projects"], serde_json::json!([]));
        assert_eq!(json["sources"], serde_json::json!([]));
    }

    #[test]
    fn test_scan_without_path_uses_current_directory() {
        let dir = create_test_project();

        let output = depsight()
            .args(["scan", "--json"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(json["rootPath"], root.to_str().unwrap());
        assert_eq!(json["projects"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["projects"][0]["file"],
            root.join("src").join("App").join("App.csproj").to_str().unwrap()
        );
    }

    #[test]
    fn test_scan_quiet() {
        let dir = create_test_project();

        depsight()
            .args(["-q", "scan", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::diff("1 project(s), 2 dependencies\n"));
    }

    #[test]
    fn test_scan_verbose_lists_sources() {
        let dir = create_test_project();

        depsight()
            .args(["scan", dir.path().to_str().unwrap(), "--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Sources:"))
            .stdout(predicate::str::contains("SerilogVersion = 2.10.0"))
            .stderr(predicate::str::contains("depsight v"));
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn test_exit_code_help() {
        depsight()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("depsight"));
    }

    #[test]
    fn test_exit_code_version() {
        depsight()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_exit_code_nonexistent_path() {
        depsight()
            .args(["scan", "/nonexistent/path/that/does/not/exist"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("path not found"));
    }

    #[test]
    fn test_exit_code_skipped_manifest() {
        let dir = create_test_project();
        fs::write(dir.path().join("Broken.csproj"), "<Project><ItemGroup>").unwrap();

        let output = depsight()
            .args(["scan", dir.path().to_str().unwrap(), "--json"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2));

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["projects"].as_array().unwrap().len(), 1);
        assert!(json["issues"][0]["file"]
            .as_str()
            .unwrap()
            .ends_with("Broken.csproj"));
    }

    #[test]
    fn test_missing_subcommand() {
        depsight().assert().failure();
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        depsight()
            .args(["check", ".", "--timeout", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("timeout"));
    }

    #[test]
    fn test_malformed_credentials_fail_before_lookup() {
        let dir = create_test_project();

        depsight()
            .args([
                "check",
                dir.path().to_str().unwrap(),
                "--credentials-env",
                "DEPSIGHT_E2E_CREDENTIALS",
            ])
            .env("DEPSIGHT_E2E_CREDENTIALS", "{not json")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error:"));
    }
}
