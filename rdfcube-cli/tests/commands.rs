//! End-to-end runs of the `rdfcube` binary and library entry point.
#![expect(clippy::expect_used, reason = "tests fail fast on fixture errors")]

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command as Process, Output};

use clap::Parser;
use rdfcube_cli::cli::{Cli, ExecutionSummary, run_cli};
use rdfcube_test_support::fixtures::{DescriptionFiles, write_cube_directory};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const PACKAGE: &str = r#"{
  "name": "station-rain",
  "title": "Station rainfall",
  "version": "3.1.0",
  "created": "2024-02-01",
  "contributors": [
    { "title": "Meteo", "path": "https://example.org/org/meteo", "role": "author" }
  ],
  "resources": [{
    "name": "rain",
    "path": "rain.csv",
    "dialect": { "delimiter": ";" },
    "schema": {
      "fields": [
        { "name": "Year", "type": "year" },
        { "name": "Station", "type": "string" },
        { "name": "Rainfall", "type": "number" }
      ],
      "primaryKey": ["Year", "Station"],
      "missingValues": ["", "NA"]
    }
  }]
}"#;

const RAIN: &str = "Year;Station;Rainfall\n2020;Bern;812.5\n2020;Basel;NA\n2021;Bern;790\n";

#[fixture]
fn workspace() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn rdfcube(args: &[&str], cwd: &Path) -> Output {
    Process::new(env!("CARGO_BIN_EXE_rdfcube"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("RDFCUBE_LOG_FORMAT")
        .output()
        .expect("binary runs")
}

#[rstest]
fn serialize_writes_relative_output_and_prints_the_cube(workspace: TempDir) {
    write_cube_directory(&workspace.path().join("rain"), DescriptionFiles::Yaml)
        .expect("fixture written");
    let output = rdfcube(&["serialize", "rain", "rain.ttl"], workspace.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    assert!(stdout.starts_with("Cube <https://example.org/cube/rainfall/1>\n"));
    let turtle = fs::read_to_string(workspace.path().join("rain.ttl")).expect("ttl written");
    assert!(turtle.contains("a cube:Cube, schema:Dataset, dcat:Dataset ;"));
}

#[rstest]
fn missing_description_exits_with_failure(workspace: TempDir) {
    write_cube_directory(&workspace.path().join("rain"), DescriptionFiles::None)
        .expect("fixture written");
    let output = rdfcube(&["serialize", "rain", "rain.ttl"], workspace.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 stderr");
    assert!(stderr.contains("ERROR: command execution failed"), "stderr: {stderr}");
    assert!(stderr.contains("neither description.yml nor description.json"));
    assert!(!stderr.contains('\u{1b}'), "colour escapes written to a pipe");
    assert!(!workspace.path().join("rain.ttl").exists());
}

#[rstest]
fn cube_failures_log_their_code(workspace: TempDir) {
    let root = write_cube_directory(&workspace.path().join("rain"), DescriptionFiles::Yaml)
        .expect("fixture written");
    fs::write(root.join("data.csv"), "Jahr,Station,Wert,Standardfehler\n,Bern,1,0.1\n")
        .expect("csv written");
    let output = rdfcube(&["serialize", "rain", "rain.ttl"], workspace.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("utf-8 stderr");
    assert!(stderr.contains("code=CUBE_MISSING_KEY_VALUE"), "stderr: {stderr}");
}

#[rstest]
fn single_verbose_flag_enables_debug_output(workspace: TempDir) {
    write_cube_directory(&workspace.path().join("rain"), DescriptionFiles::Yaml)
        .expect("fixture written");
    let quiet = rdfcube(&["serialize", "rain", "quiet.ttl"], workspace.path());
    let verbose = rdfcube(&["serialize", "rain", "verbose.ttl", "-v"], workspace.path());
    let very = rdfcube(&["serialize", "rain", "very.ttl", "-vv"], workspace.path());

    let has_debug = |output: &Output| String::from_utf8_lossy(&output.stderr).contains("DEBUG: ");
    assert!(!has_debug(&quiet));
    assert!(has_debug(&verbose));
    assert!(!has_debug(&very));
    assert!(String::from_utf8_lossy(&quiet.stderr).contains("INFO: command completed"));
}

#[rstest]
fn unsupported_log_format_is_rejected(workspace: TempDir) {
    let output = Process::new(env!("CARGO_BIN_EXE_rdfcube"))
        .args(["serialize", "rain", "rain.ttl"])
        .current_dir(workspace.path())
        .env("RDFCUBE_LOG_FORMAT", "xml")
        .output()
        .expect("binary runs");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("utf-8 stderr");
    assert!(stderr.contains("unsupported log format `xml`"));
}

#[rstest]
fn converted_packages_serialize(workspace: TempDir) {
    let package = workspace.path().join("package");
    fs::create_dir_all(&package).expect("package dir");
    fs::write(package.join("datapackage.json"), PACKAGE).expect("descriptor written");
    fs::write(package.join("rain.csv"), RAIN).expect("resource written");
    let cube_dir = workspace.path().join("cube");
    let ttl = workspace.path().join("rain.ttl");

    let descriptor = package.join("datapackage.json");
    let convert = Cli::try_parse_from([
        OsStr::new("rdfcube"),
        OsStr::new("frictionless"),
        descriptor.as_os_str(),
        cube_dir.as_os_str(),
    ])
    .expect("frictionless arguments parse");
    let summary = run_cli(convert).expect("conversion succeeds");
    assert!(matches!(summary, ExecutionSummary::Converted(ref c) if c.rows == 3));

    let serialize = Cli::try_parse_from([
        OsStr::new("rdfcube"),
        OsStr::new("serialize"),
        cube_dir.as_os_str(),
        ttl.as_os_str(),
    ])
    .expect("serialize arguments parse");
    run_cli(serialize).expect("converted directory serializes");

    let turtle = fs::read_to_string(&ttl).expect("ttl written");
    for expected in [
        "<https://example.org/cube/station-rain/3>",
        "schema:creator <https://example.org/org/meteo> ;",
        "schema:dateCreated \"2024-02-01\"^^xsd:date ;",
        "\"\"^^cube:Undefined",
    ] {
        assert!(turtle.contains(expected), "missing `{expected}` in:\n{turtle}");
    }
}
