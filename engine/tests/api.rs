use std::fs;

use chargen::api::{
    build_sheet, export_json, load_draft, load_rules, sheet_from_json, validate_json, SheetConfig,
};
use chargen::content::{builtin_rules, RULE_FILES};
use chargen::{Ability, CharacterDraft, GenerationMethod, RuleTables, WizardStep};
use chrono::Utc;

#[test]
fn builtin_rules_without_path() {
    let rules = load_rules(None).unwrap();
    assert!(rules.class("Fighter").is_some());
}

#[test]
fn rules_directory_override() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let src = builtin_rules();
    let texts = [src.races, src.classes, src.backgrounds, src.spells];
    for (file, text) in RULE_FILES.iter().zip(texts) {
        fs::write(dir.join(file), text).unwrap();
    }
    let rules = load_rules(dir.to_str()).unwrap();
    assert_eq!(rules.classes.len(), 12);

    fs::remove_file(dir.join("spells.yaml")).unwrap();
    let err = load_rules(dir.to_str()).unwrap_err();
    assert!(format!("{:#}", err).contains("spells.yaml"));
}

#[test]
fn sheet_from_file_config() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let path = dir.join("draft.json");
    let draft = CharacterDraft::new()
        .select_class("Wizard")
        .update_meta(|m| m.level = 3);
    fs::write(&path, draft.to_json().unwrap()).unwrap();

    let cfg: SheetConfig =
        serde_json::from_value(serde_json::json!({ "draft_path": path.to_str().unwrap() }))
            .unwrap();
    assert!(cfg.rules_path.is_none());
    let result = build_sheet(&cfg).unwrap();
    assert_eq!(result.derived.max_leveled_spells, 6);
    assert_eq!(result.points_remaining, Some(27));
    assert!(!result.complete);
    let equipment = result.equipment.unwrap();
    assert_eq!((equipment.chosen, equipment.total), (0, 4));

    assert!(load_draft(dir.join("missing.json").to_str().unwrap()).is_err());
}

#[test]
fn sheet_reports_method_hints() {
    let rules = RuleTables::builtin().unwrap();
    let draft = CharacterDraft::new()
        .switch_method(GenerationMethod::StandardArray)
        .assign_standard(15, Ability::Str)
        .unwrap();
    let result = sheet_from_json(&draft.to_json().unwrap(), &rules).unwrap();
    assert_eq!(result.points_remaining, None);
    assert_eq!(result.standard_array_open, vec![14, 13, 12, 10, 8]);

    let manual = draft
        .switch_method(GenerationMethod::Manual)
        .set_manual(Ability::Wis, "3")
        .unwrap();
    let result = sheet_from_json(&manual.to_json().unwrap(), &rules).unwrap();
    assert_eq!(result.manual_flags, vec![Ability::Wis]);
}

#[test]
fn validate_json_by_step() {
    let rules = RuleTables::builtin().unwrap();
    let json = CharacterDraft::new().to_json().unwrap();
    let abilities = validate_json(&json, &rules, Some(WizardStep::Abilities)).unwrap();
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].step, WizardStep::Abilities);

    let all = validate_json(&json, &rules, None).unwrap();
    assert!(all.len() > abilities.len());

    assert!(validate_json("[]", &rules, None).is_err());
}

#[test]
fn export_refuses_incomplete_drafts() {
    let rules = RuleTables::builtin().unwrap();
    let err = export_json(&CharacterDraft::new(), &rules, Utc::now()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("character is not complete"));
    assert!(msg.contains("[basics] Character name is required"));
}
