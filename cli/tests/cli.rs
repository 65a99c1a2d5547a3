use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn chargen() -> Command {
    Command::cargo_bin("chargen").unwrap()
}

const FINISHED_FIGHTER: &str = r#"{
  "meta": { "name": "Thora", "race": "Dwarf", "subrace": "Mountain Dwarf", "class": "Fighter", "level": 1 },
  "abilities": {
    "method": "standard_array",
    "assigned": { "strength": 15, "dexterity": 14, "constitution": 13, "intelligence": 12, "wisdom": 10, "charisma": 8 }
  },
  "class_choices": {
    "skills": ["athletics", "perception"],
    "equipment": { "0": "chain mail", "1": "a martial weapon and a shield", "2": "two handaxes", "3": "an explorer's pack" }
  },
  "schema_version": 1
}"#;

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn new_prints_a_fresh_draft() {
    chargen()
        .args(["new", "--name", "Ash"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "Ash""#))
        .stdout(predicate::str::contains(r#""method": "point_buy""#));
}

#[test]
fn sheet_shows_derived_stats() {
    let tmp = tempfile::tempdir().unwrap();
    let draft = write(tmp.path(), "thora.json", FINISHED_FIGHTER);
    chargen()
        .args(["sheet", "--compact", "--draft"])
        .arg(&draft)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""hit_points":12"#))
        .stdout(predicate::str::contains(r#""complete":true"#));
}

#[test]
fn sheet_reads_files_with_a_bom() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bom.json");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(FINISHED_FIGHTER.as_bytes());
    fs::write(&path, bytes).unwrap();
    chargen()
        .args(["sheet", "--draft"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn validate_lists_errors_and_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let draft = write(tmp.path(), "empty.json", "{}");
    chargen()
        .args(["validate", "--step", "basics", "--draft"])
        .arg(&draft)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[basics] Character name is required"))
        .stdout(predicate::str::contains("[basics] Class selection is required"))
        .stderr(predicate::str::contains("3 validation error(s)"));
}

#[test]
fn validate_passes_a_finished_character() {
    let tmp = tempfile::tempdir().unwrap();
    let draft = write(tmp.path(), "thora.json", FINISHED_FIGHTER);
    chargen()
        .args(["validate", "--draft"])
        .arg(&draft)
        .assert()
        .success()
        .stdout("OK\n");
}

#[test]
fn validate_rejects_unknown_step() {
    let tmp = tempfile::tempdir().unwrap();
    let draft = write(tmp.path(), "empty.json", "{}");
    chargen()
        .args(["validate", "--step", "combat", "--draft"])
        .arg(&draft)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown step 'combat'"));
}

#[test]
fn slots_for_each_progression() {
    chargen()
        .args(["slots", "--class", "wizard", "--level", "3"])
        .assert()
        .success()
        .stdout("Wizard level 3: 4/2 (INT), max leveled spells 6\n");
    chargen()
        .args(["slots", "--class", "Paladin", "--level", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unlocks at level 2"));
    chargen()
        .args(["slots", "--class", "Warlock", "--level", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 pact slot(s) of level 3"));
    chargen()
        .args(["slots", "--class", "Fighter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no spellcasting"));
}

#[test]
fn export_writes_named_file_into_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let draft = write(tmp.path(), "thora.json", FINISHED_FIGHTER);
    let out = tmp.path().join("out");
    fs::create_dir(&out).unwrap();
    chargen()
        .args(["export", "--draft"])
        .arg(&draft)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Thora_character.json"));

    let text = fs::read_to_string(out.join("Thora_character.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["schema_version"], 1);
    assert_eq!(doc["abilities"]["strength"], 17);
}

#[test]
fn export_refuses_incomplete_draft() {
    let tmp = tempfile::tempdir().unwrap();
    let draft = write(tmp.path(), "empty.json", "{}");
    chargen()
        .args(["export", "--draft"])
        .arg(&draft)
        .assert()
        .failure()
        .stderr(predicate::str::contains("character is not complete"));
}
