use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::RULE_FILES;
use crate::derived::{derive, DerivedStats};
use crate::draft::CharacterDraft;
use crate::generation::{manual_flags, AbilityGeneration};
use crate::rules::{RuleTables, RulesSource};
use crate::validate::{equipment_progress, validate_all, EquipmentProgress, StepError};
use crate::validate::{validate_step, WizardStep};
use crate::Ability;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SheetConfig {
    pub draft_path: String,
    /// Directory holding the four rule YAML files. Built-in rules when absent.
    #[serde(default)]
    pub rules_path: Option<String>,
}

/// Everything a wizard screen needs after an edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SheetResult {
    pub derived: DerivedStats,
    pub errors: Vec<StepError>,
    pub complete: bool,
    pub points_remaining: Option<i32>,
    pub standard_array_open: Vec<i32>,
    pub manual_flags: Vec<Ability>,
    pub equipment: Option<EquipmentProgress>,
}

pub fn load_rules(path: Option<&str>) -> Result<RuleTables> {
    let Some(dir) = path else {
        return RuleTables::builtin().context("built-in rules failed to load");
    };
    let dir = Path::new(dir);
    let mut texts = Vec::with_capacity(RULE_FILES.len());
    for file in RULE_FILES {
        let path = dir.join(file);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read rules file: {}", path.display()))?;
        texts.push(text);
    }
    let src = RulesSource {
        races: &texts[0],
        classes: &texts[1],
        backgrounds: &texts[2],
        spells: &texts[3],
    };
    RuleTables::from_source(src)
        .with_context(|| format!("failed to load rules from {}", dir.display()))
}

pub fn load_draft(path: &str) -> Result<CharacterDraft> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read draft JSON: {}", path))?;
    CharacterDraft::from_json(&text)
        .with_context(|| format!("failed to parse draft JSON: {}", path))
}

pub fn sheet(draft: &CharacterDraft, rules: &RuleTables) -> SheetResult {
    let errors = validate_all(draft, rules);
    let (points_remaining, standard_array_open, flags) = match &draft.abilities {
        AbilityGeneration::PointBuy(pb) => (Some(pb.points_remaining()), Vec::new(), Vec::new()),
        AbilityGeneration::StandardArray(sa) => (None, sa.unassigned_values(), Vec::new()),
        AbilityGeneration::Manual(m) => (None, Vec::new(), manual_flags(&m.scores())),
    };
    SheetResult {
        derived: derive(draft, rules),
        complete: errors.is_empty(),
        errors,
        points_remaining,
        standard_array_open,
        manual_flags: flags,
        equipment: draft
            .class(rules)
            .map(|c| equipment_progress(c, &draft.class_choices.equipment)),
    }
}

pub fn build_sheet(cfg: &SheetConfig) -> Result<SheetResult> {
    let rules = load_rules(cfg.rules_path.as_deref())?;
    let draft = load_draft(&cfg.draft_path)?;
    Ok(sheet(&draft, &rules))
}

pub fn sheet_from_json(json: &str, rules: &RuleTables) -> Result<SheetResult> {
    let draft = CharacterDraft::from_json(json).context("invalid draft")?;
    Ok(sheet(&draft, rules))
}

/// Errors for one step, or for every step when `step` is `None`.
pub fn validate_json(
    json: &str,
    rules: &RuleTables,
    step: Option<WizardStep>,
) -> Result<Vec<StepError>> {
    let draft = CharacterDraft::from_json(json).context("invalid draft")?;
    Ok(match step {
        Some(step) => validate_step(step, &draft, rules)
            .into_iter()
            .map(|message| StepError { step, message })
            .collect(),
        None => validate_all(&draft, rules),
    })
}

/// Pretty JSON export. Refuses drafts that still fail validation.
pub fn export_json(
    draft: &CharacterDraft,
    rules: &RuleTables,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    let errors = validate_all(draft, rules);
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(|e| format!("[{}] {}", e.step, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        bail!("character is not complete: {}", joined);
    }
    let doc = draft.export(rules, exported_at);
    doc.to_json().context("failed to serialize export")
}
