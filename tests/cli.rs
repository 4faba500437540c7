// SPDX-License-Identifier: AGPL-3.0-only
// Integration smoke tests for the CLI to ensure end-to-end flows keep working.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use tempfile::tempdir;

const RECORD: &str = r#"{"name": "Alice", "joined": "2022-01-10", "tags": ["a", "b"]}"#;

#[test]
fn json_to_xml_writes_randomised_document() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("record.json");
    let output = dir.path().join("record.xml");
    fs::write(&input, RECORD).expect("write input");

    cargo_bin_cmd!("formatshift")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--type", "json_to_xml"])
        .assert()
        .success()
        .stderr(contains("data obfuscation completed successfully"));

    let xml = fs::read_to_string(&output).expect("output written");
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<root>"));
    assert!(xml.contains(">Alice<"));
    assert!(!xml.contains("<name>") && !xml.contains("<tags>"));
}

#[test]
fn date_obfuscation_rewrites_json_dates() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("record.json");
    let output = dir.path().join("out.json");
    fs::write(&input, RECORD).expect("write input");

    cargo_bin_cmd!("formatshift")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["-t", "date_obfuscation", "--seed", "17"])
        .assert()
        .success();

    let text = fs::read_to_string(&output).expect("output written");
    assert!(text.contains("\"name\": \"Alice\""));
    assert!(!text.contains("2022-01-10"));
    assert!(
        ["01/10/2022", "10.01.2022", "2022/01/10", "10-Jan-2022"]
            .iter()
            .any(|d| text.contains(d)),
        "{text}"
    );
}

#[test]
fn seeded_runs_are_repeatable() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("record.json");
    fs::write(&input, RECORD).expect("write input");

    let mut outputs = Vec::new();
    for name in ["one.xml", "two.xml"] {
        let output = dir.path().join(name);
        cargo_bin_cmd!("formatshift")
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .args(["-t", "json_to_xml", "--seed", "5"])
            .assert()
            .success();
        outputs.push(fs::read_to_string(&output).expect("output written"));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn missing_input_fails_without_output() {
    let dir = tempdir().expect("temp dir");
    let output = dir.path().join("out.xml");

    cargo_bin_cmd!("formatshift")
        .arg("-i")
        .arg(dir.path().join("absent.json"))
        .arg("-o")
        .arg(&output)
        .args(["-t", "json_to_xml"])
        .assert()
        .failure()
        .stderr(contains("input file not found").and(contains("absent.json")));

    assert!(!output.exists());
}

#[test]
fn unsupported_extension_is_reported() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("data.csv");
    fs::write(&input, "a,b\n1,2\n").expect("write input");

    cargo_bin_cmd!("formatshift")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.xml"))
        .args(["-t", "json_to_xml"])
        .assert()
        .failure()
        .stderr(contains("unsupported file type"));
}

#[test]
fn deeply_nested_xml_reports_the_depth_limit() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("deep.xml");
    let output = dir.path().join("out.xml");
    let levels = 100_000;
    let text = format!("{}x{}", "<a>".repeat(levels), "</a>".repeat(levels));
    fs::write(&input, text).expect("write input");

    cargo_bin_cmd!("formatshift")
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["-t", "date_obfuscation"])
        .assert()
        .failure()
        .stderr(contains("recursion limit of 256 levels"));

    assert!(!output.exists());
}

#[test]
fn unknown_transformation_is_rejected_by_the_parser() {
    cargo_bin_cmd!("formatshift")
        .args(["-i", "a.json", "-o", "b.xml", "-t", "xml_to_json"])
        .assert()
        .failure()
        .stderr(contains("xml_to_json"));
}

#[test]
fn version_flag_prints_banner() {
    cargo_bin_cmd!("formatshift")
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("formatshift"));
}
