//! Selection and per-step validation. Validators never fail; they return the
//! violated rules as human-readable messages in a fixed order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derived::{self, leveled_spell_count, SpellcastingStatus};
use crate::draft::CharacterDraft;
use crate::rules::{ClassProfile, RuleTables, SpellData};
use crate::tables::{MAX_LEVEL, MIN_LEVEL};

/* ---------------- equipment ---------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentProgress {
    pub chosen: usize,
    pub total: usize,
}

impl EquipmentProgress {
    pub fn is_complete(&self) -> bool {
        self.chosen == self.total
    }
}

/// Groups with a valid pick, out of all groups the class offers.
pub fn equipment_progress(
    class: &ClassProfile,
    chosen: &IndexMap<usize, String>,
) -> EquipmentProgress {
    let picked = class
        .equipment_choices
        .iter()
        .enumerate()
        .filter(|(idx, group)| {
            chosen
                .get(idx)
                .is_some_and(|opt| group.options.contains(opt))
        })
        .count();
    EquipmentProgress {
        chosen: picked,
        total: class.equipment_choices.len(),
    }
}

pub fn validate_equipment(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    // A missing class is reported by the basics step.
    let Some(class) = draft.class(tables) else {
        return Vec::new();
    };
    let progress = equipment_progress(class, &draft.class_choices.equipment);
    if progress.is_complete() {
        Vec::new()
    } else {
        vec![format!(
            "Please select equipment for all {} choices ({}/{} selected)",
            progress.total, progress.chosen, progress.total
        )]
    }
}

/* ---------------- skills ---------------- */

pub fn validate_skills(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    let Some(class) = draft.class(tables) else {
        return Vec::new();
    };
    let picks = &draft.class_choices.skills;
    let mut errors = Vec::new();
    if picks.len() != class.skill_choices.choose {
        errors.push(format!(
            "Choose exactly {} skills for {}",
            class.skill_choices.choose, class.name
        ));
    }
    let mut invalid: Vec<&str> = picks
        .iter()
        .filter(|s| !class.skill_choices.from.contains(*s))
        .map(|s| s.label())
        .collect();
    if !invalid.is_empty() {
        invalid.sort_unstable();
        errors.push(format!("Invalid skill selections: {}", invalid.join(", ")));
    }
    errors
}

/// Free language slots granted by the background must all be filled.
pub fn validate_background_languages(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    let Some(bg) = draft.background(tables) else {
        return Vec::new();
    };
    let needed = usize::from(bg.language_choices);
    let picked = draft.background_languages.len();
    if picked == needed {
        Vec::new()
    } else {
        vec![format!(
            "Choose exactly {} background languages for {} ({}/{} selected)",
            needed, bg.name, picked, needed
        )]
    }
}

/* ---------------- spells ---------------- */

/// Toggle by name, ignoring case. Removal always succeeds; adding a leveled
/// spell once `max_leveled` are already selected leaves the selection
/// untouched. Cantrips are never capped.
pub fn toggle_spell(selected: &[SpellData], spell: &SpellData, max_leveled: usize) -> Vec<SpellData> {
    if selected.iter().any(|s| s.name.eq_ignore_ascii_case(&spell.name)) {
        return selected
            .iter()
            .filter(|s| !s.name.eq_ignore_ascii_case(&spell.name))
            .cloned()
            .collect();
    }
    if !spell.is_cantrip() && leveled_spell_count(selected) >= max_leveled {
        debug!(
            spell = %spell.name,
            max_leveled,
            "[SPELL] leveled spell cap reached; ignoring"
        );
        return selected.to_vec();
    }
    let mut next = selected.to_vec();
    next.push(spell.clone());
    next
}

pub fn validate_spells(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    let Some(class) = draft.class(tables) else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    match derived::spellcasting_status(class, draft.meta.level) {
        SpellcastingStatus::Absent => {
            if !draft.spells.is_empty() {
                errors.push(format!("{} has no spellcasting", class.name));
            }
        }
        SpellcastingStatus::Locked { unlocks_at, .. } => {
            if !draft.spells.is_empty() {
                errors.push(format!(
                    "{} cannot cast spells until level {}",
                    class.name, unlocks_at
                ));
            }
        }
        status @ SpellcastingStatus::Available { .. } => {
            let count = leveled_spell_count(&draft.spells);
            let max = status.max_leveled_spells();
            if count > max {
                errors.push(format!(
                    "Too many leveled spells selected ({}/{})",
                    count, max
                ));
            }
        }
    }
    errors
}

/* ---------------- identity & abilities ---------------- */

pub fn validate_identity(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    let meta = &draft.meta;
    let mut errors = Vec::new();
    if meta.name.trim().is_empty() {
        errors.push("Character name is required".to_string());
    }
    if meta.race.trim().is_empty() {
        errors.push("Race selection is required".to_string());
    }
    if meta.class.trim().is_empty() {
        errors.push("Class selection is required".to_string());
    }
    if meta.level < MIN_LEVEL {
        errors.push("Valid level is required".to_string());
    }
    if meta.level > MAX_LEVEL {
        errors.push(format!("Level must be between {} and {}", MIN_LEVEL, MAX_LEVEL));
    }
    if !meta.race.trim().is_empty() {
        match draft.race(tables) {
            None => errors.push(format!("Unknown race: {}", meta.race)),
            Some(race) => {
                if let Some(sub) = meta.subrace.as_deref().filter(|s| !s.trim().is_empty()) {
                    if race.subrace(sub).is_none() {
                        errors.push(format!("Unknown subrace for {}: {}", race.name, sub));
                    }
                }
            }
        }
    }
    if !meta.class.trim().is_empty() && draft.class(tables).is_none() {
        errors.push(format!("Unknown class: {}", meta.class));
    }
    if !meta.background.trim().is_empty() && draft.background(tables).is_none() {
        errors.push(format!("Unknown background: {}", meta.background));
    }
    errors
}

pub fn validate_abilities(draft: &CharacterDraft) -> Vec<String> {
    draft.abilities.validate_complete()
}

/* ---------------- steps ---------------- */

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Basics,
    Abilities,
    Equipment,
    Spells,
    Details,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Basics,
        WizardStep::Abilities,
        WizardStep::Equipment,
        WizardStep::Spells,
        WizardStep::Details,
        WizardStep::Review,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Basics => "basics",
            WizardStep::Abilities => "abilities",
            WizardStep::Equipment => "equipment",
            WizardStep::Spells => "spells",
            WizardStep::Details => "details",
            WizardStep::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .find(|step| step.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepError {
    pub step: WizardStep,
    pub message: String,
}

/// What keeps `step` from being left. Class skill picks and background
/// language picks are checked with the equipment step. Review covers every
/// step.
pub fn validate_step(step: WizardStep, draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    match step {
        WizardStep::Basics => validate_identity(draft, tables),
        WizardStep::Abilities => validate_abilities(draft),
        WizardStep::Equipment => {
            let mut errors = validate_skills(draft, tables);
            errors.extend(validate_background_languages(draft, tables));
            errors.extend(validate_equipment(draft, tables));
            errors
        }
        WizardStep::Spells => validate_spells(draft, tables),
        WizardStep::Details => Vec::new(),
        WizardStep::Review => validate_all(draft, tables)
            .into_iter()
            .map(|e| e.message)
            .collect(),
    }
}

/// Every step's errors, in wizard order.
pub fn validate_all(draft: &CharacterDraft, tables: &RuleTables) -> Vec<StepError> {
    WizardStep::ALL
        .into_iter()
        .filter(|step| *step != WizardStep::Review)
        .flat_map(|step| {
            validate_step(step, draft, tables)
                .into_iter()
                .map(move |message| StepError { step, message })
        })
        .collect()
}

/// True once the draft may be exported.
pub fn is_complete(draft: &CharacterDraft, tables: &RuleTables) -> bool {
    validate_all(draft, tables).is_empty()
}
