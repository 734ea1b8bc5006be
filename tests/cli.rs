use assert_cmd::Command;
use predicates::prelude::*;

use accuvote_convert::election::PaperSize;
use accuvote_convert::geometry::Side;

mod common;

use common::{oval, template, write_file, write_template, DefinitionBuilder};

fn card_files(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let xml = DefinitionBuilder::default()
        .contest(
            "Governor",
            &[
                ("Alice", Some("Republican"), oval(Side::Front, 12, 9)),
                ("Bob", Some("Democratic"), oval(Side::Front, 12, 13)),
            ],
        )
        .to_xml();
    let definition = write_file(dir, "card.xml", &xml);
    let detection = write_template(
        dir,
        "card.json",
        &template(PaperSize::Letter, &[(12, 9), (12, 13)], &[]),
    );
    (definition, detection)
}

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(format!("accuvote-convert {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn convert_writes_election_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, detection) = card_files(dir.path());

    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.arg("convert")
        .arg("--definition")
        .arg(&definition)
        .arg("--template")
        .arg(&detection);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"gridLayouts\""))
        .stdout(predicate::str::contains("\"state\": \"NH\""));
}

#[test]
fn convert_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, detection) = card_files(dir.path());
    let output = dir.path().join("election.json");

    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.arg("convert")
        .arg("-d")
        .arg(&definition)
        .arg("-t")
        .arg(&detection)
        .arg("-o")
        .arg(&output)
        .args(["--layout", "declared-order", "--jurisdiction", "Hillsborough"]);
    cmd.assert().success();

    let election: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(election["county"]["name"], "Hillsborough");
    assert_eq!(
        election["gridLayouts"][0]["gridPositions"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn convert_warnings_fail_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, _) = card_files(dir.path());
    let detection = write_template(
        dir.path(),
        "stray.json",
        &template(PaperSize::Letter, &[(12, 9), (12, 13), (20, 30)], &[]),
    );

    let mut lenient = Command::cargo_bin("accuvote-convert").unwrap();
    lenient
        .arg("convert")
        .arg("-d")
        .arg(&definition)
        .arg("-t")
        .arg(&detection);
    lenient
        .assert()
        .success()
        .stderr(predicate::str::contains("bubble_matching_failed"));

    let mut strict = Command::cargo_bin("accuvote-convert").unwrap();
    strict
        .arg("convert")
        .arg("-d")
        .arg(&definition)
        .arg("-t")
        .arg(&detection)
        .arg("--strict");
    strict.assert().failure();
}

#[test]
fn convert_reports_definition_errors() {
    let dir = tempfile::tempdir().unwrap();
    let xml = DefinitionBuilder {
        omit: vec!["ElectionID"],
        ..Default::default()
    }
    .to_xml();
    let definition = write_file(dir.path(), "bad.xml", &xml);
    let (_, detection) = card_files(dir.path());

    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.arg("convert")
        .arg("-d")
        .arg(&definition)
        .arg("-t")
        .arg(&detection);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ElectionID is missing"));
}

#[test]
fn convert_requires_one_template_per_definition() {
    let dir = tempfile::tempdir().unwrap();
    let (definition, detection) = card_files(dir.path());

    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.arg("convert")
        .arg("-d")
        .arg(&definition)
        .arg("-d")
        .arg(&definition)
        .arg("-t")
        .arg(&detection);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("one --template per --definition"));
}

#[test]
fn correct_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    card_files(dir.path());
    let config = write_file(
        dir.path(),
        "cards.json",
        r#"{"cards": [{"name": "card", "definition": "card.xml", "detection": "card.json", "output": "out"}]}"#,
    );

    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.arg("correct").arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("card: 2 corrected, 0 unchanged"));
    assert!(dir.path().join("out/card-corrected.xml").exists());
    assert!(dir.path().join("out/card-proof.json").exists());
}

#[test]
fn correct_rejects_missing_config() {
    let mut cmd = Command::cargo_bin("accuvote-convert").unwrap();
    cmd.args(["correct", "does-not-exist.yaml"]);
    cmd.assert().failure();
}
