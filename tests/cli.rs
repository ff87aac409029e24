use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/input/flow.json")
}

#[test]
fn generates_svg_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = fixture();
    assert!(fixture.exists(), "fixture chart should exist");

    let tmp = tempdir()?;
    let output_path = tmp.path().join("chart.svg");

    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("--input")
        .arg(&fixture)
        .arg("--output")
        .arg(&output_path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generated chart"));

    let svg_contents = fs::read_to_string(&output_path)?;
    assert!(
        svg_contents.contains("<svg"),
        "output should contain an <svg> element"
    );
    assert!(svg_contents.contains("background-color: white"));
    assert_eq!(svg_contents.matches("<path").count(), 4);

    Ok(())
}

#[test]
fn renders_stdin_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let definition = r#"{
        "nodes": [
            { "name": "a", "x": 50, "y": 130, "text": "x" },
            { "name": "b", "x": 150, "y": 130, "text": "y" }
        ],
        "edges": [ { "source": "a", "target": "b" } ]
    }"#;

    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("render")
        .arg("-i")
        .arg("-")
        .arg("-o")
        .arg("-")
        .arg("-b")
        .arg("#fafafa")
        .write_stdin(definition);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("M92,130L108,130"))
        .stdout(predicate::str::contains("background-color: #fafafa"));

    Ok(())
}

#[test]
fn document_background_survives_without_flag() -> Result<(), Box<dyn std::error::Error>> {
    let definition = r#"{
        "options": { "background": "black" },
        "nodes": [
            { "name": "a", "x": 50, "y": 130, "text": "x" },
            { "name": "b", "x": 150, "y": 130, "text": "y" }
        ],
        "edges": [ { "source": "a", "target": "b" } ]
    }"#;

    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("-i").arg("-").arg("-o").arg("-").write_stdin(definition);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("background-color: black"))
        .stdout(predicate::str::contains("background-color: white").not());

    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("-i")
        .arg("-")
        .arg("-o")
        .arg("-")
        .arg("--background-color")
        .arg("navy")
        .write_stdin(definition);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("background-color: navy"));

    Ok(())
}

#[test]
fn quiet_flag_suppresses_output_and_default_path_is_used() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("flow.json");
    fs::copy(fixture(), &input)?;

    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("-i")
        .arg(&input)
        .arg("--router")
        .arg("pattern")
        .arg("-q");

    cmd.assert().success().stdout(predicate::str::is_empty());

    let expected = tmp.path().join("flow.json.svg");
    assert!(expected.exists(), "default output should sit next to the input");

    Ok(())
}

#[test]
fn invalid_json_fails_with_error() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("broken.json");
    fs::write(&input, "{ \"nodes\": 5 }")?;

    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("-i").arg(&input).arg("-o").arg("-");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse chart"));

    Ok(())
}

#[test]
fn missing_input_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("orthoflow")?;
    cmd.arg("-i").arg("no/such/chart.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    Ok(())
}
