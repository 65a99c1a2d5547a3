//! The character draft threaded through every wizard step.
//!
//! A draft is a plain value. Every edit below borrows the current draft and
//! hands back a new one (or `Rejected`), so the orchestrating layer owns the
//! only mutable reference.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::derived::{self, DerivedStats};
use crate::error::{DraftError, Rejected};
use crate::generation::{AbilityGeneration, GenerationMethod};
use crate::rules::{BackgroundData, ClassProfile, RaceData, RuleTables, SpellData, SubraceData};
use crate::tables::SCHEMA_VERSION;
use crate::validate;
use crate::{Abilities, Ability, Skill};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CharacterMeta {
    pub name: String,
    pub player: String,
    pub race: String,
    pub subrace: Option<String>,
    pub class: String,
    pub level: i32,
    pub background: String,
    pub alignment: Option<String>,
}

impl Default for CharacterMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            player: String::new(),
            race: String::new(),
            subrace: None,
            class: String::new(),
            level: 1,
            background: String::new(),
            alignment: None,
        }
    }
}

/// Sub-options picked for the chosen class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassChoices {
    pub skills: Vec<Skill>,
    /// Equipment group index -> chosen option.
    pub equipment: IndexMap<usize, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Narrative {
    pub appearance: String,
    pub personality: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CharacterDraft {
    pub meta: CharacterMeta,
    pub abilities: AbilityGeneration,
    pub class_choices: ClassChoices,
    /// Languages picked for the background's free language slots.
    pub background_languages: Vec<String>,
    pub inventory: Vec<String>,
    pub spells: Vec<SpellData>,
    pub details: Narrative,
    pub schema_version: u32,
}

impl Default for CharacterDraft {
    fn default() -> Self {
        Self {
            meta: CharacterMeta::default(),
            abilities: AbilityGeneration::default(),
            class_choices: ClassChoices::default(),
            background_languages: Vec::new(),
            inventory: Vec::new(),
            spells: Vec::new(),
            details: Narrative::default(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl CharacterDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /* ---- lookups ---- */

    pub fn race<'t>(&self, tables: &'t RuleTables) -> Option<&'t RaceData> {
        tables.race(&self.meta.race)
    }

    pub fn subrace<'t>(&self, tables: &'t RuleTables) -> Option<&'t SubraceData> {
        let name = self.meta.subrace.as_deref()?;
        self.race(tables)?.subrace(name)
    }

    pub fn class<'t>(&self, tables: &'t RuleTables) -> Option<&'t ClassProfile> {
        tables.class(&self.meta.class)
    }

    pub fn background<'t>(&self, tables: &'t RuleTables) -> Option<&'t BackgroundData> {
        tables.background(&self.meta.background)
    }

    /// Scores produced by the active generation method.
    pub fn base_abilities(&self) -> Abilities {
        self.abilities.scores()
    }

    /// Base scores with racial bonuses applied.
    pub fn applied_abilities(&self, tables: &RuleTables) -> Abilities {
        derived::apply_racial_bonuses(
            &self.base_abilities(),
            self.race(tables),
            self.subrace(tables),
        )
    }

    /* ---- identity ---- */

    pub fn update_meta(&self, edit: impl FnOnce(&mut CharacterMeta)) -> Self {
        let mut next = self.clone();
        edit(&mut next.meta);
        next
    }

    /// Pick a race. A subrace that does not belong to the new race is dropped.
    pub fn select_race(&self, race: &str, subrace: Option<&str>, tables: &RuleTables) -> Self {
        let subrace = subrace
            .filter(|s| tables.race(race).is_some_and(|r| r.subrace(s).is_some()))
            .map(str::to_string);
        self.update_meta(|m| {
            m.race = race.to_string();
            m.subrace = subrace;
        })
    }

    /// Pick a class. Changing class clears its sub-options and spells.
    pub fn select_class(&self, class: &str) -> Self {
        if self.meta.class.eq_ignore_ascii_case(class.trim()) {
            return self.clone();
        }
        let mut next = self.update_meta(|m| m.class = class.to_string());
        next.class_choices = ClassChoices::default();
        next.spells.clear();
        next
    }

    /// Pick a background. Changing background clears its language picks.
    pub fn select_background(&self, background: &str) -> Self {
        if self.meta.background.eq_ignore_ascii_case(background.trim()) {
            return self.clone();
        }
        let mut next = self.update_meta(|m| m.background = background.to_string());
        next.background_languages.clear();
        next
    }

    /// Add or remove a background language pick. The count is checked by
    /// validation, not here.
    pub fn toggle_background_language(&self, language: &str) -> Self {
        let language = language.trim();
        let mut next = self.clone();
        if language.is_empty() {
            return next;
        }
        let picks = &mut next.background_languages;
        match picks.iter().position(|l| l.eq_ignore_ascii_case(language)) {
            Some(idx) => {
                picks.remove(idx);
            }
            None => picks.push(language.to_string()),
        }
        next
    }

    /* ---- abilities ---- */

    pub fn switch_method(&self, method: GenerationMethod) -> Self {
        let mut next = self.clone();
        next.abilities = self.abilities.switch_to(method);
        next
    }

    pub fn adjust_point_buy(&self, ability: Ability, delta: i32) -> Result<Self, Rejected> {
        let AbilityGeneration::PointBuy(pb) = &self.abilities else {
            return Err(Rejected::WrongMethod {
                expected: GenerationMethod::PointBuy.label(),
            });
        };
        let pb = pb.adjust(ability, delta)?;
        let mut next = self.clone();
        next.abilities = AbilityGeneration::PointBuy(pb);
        Ok(next)
    }

    pub fn assign_standard(&self, value: i32, ability: Ability) -> Result<Self, Rejected> {
        let AbilityGeneration::StandardArray(sa) = &self.abilities else {
            return Err(Rejected::WrongMethod {
                expected: GenerationMethod::StandardArray.label(),
            });
        };
        let sa = sa.assign(value, ability)?;
        let mut next = self.clone();
        next.abilities = AbilityGeneration::StandardArray(sa);
        Ok(next)
    }

    pub fn unassign_standard(&self, ability: Ability) -> Result<Self, Rejected> {
        let AbilityGeneration::StandardArray(sa) = &self.abilities else {
            return Err(Rejected::WrongMethod {
                expected: GenerationMethod::StandardArray.label(),
            });
        };
        let mut next = self.clone();
        next.abilities = AbilityGeneration::StandardArray(sa.unassign(ability));
        Ok(next)
    }

    pub fn set_manual(&self, ability: Ability, raw: &str) -> Result<Self, Rejected> {
        let AbilityGeneration::Manual(m) = &self.abilities else {
            return Err(Rejected::WrongMethod {
                expected: GenerationMethod::Manual.label(),
            });
        };
        let mut next = self.clone();
        next.abilities = AbilityGeneration::Manual(m.set(ability, raw));
        Ok(next)
    }

    /* ---- class choices ---- */

    /// Add or remove a class skill pick. Counts and membership are checked by
    /// validation, not here.
    pub fn toggle_skill(&self, skill: Skill) -> Self {
        let mut next = self.clone();
        let picks = &mut next.class_choices.skills;
        match picks.iter().position(|s| *s == skill) {
            Some(idx) => {
                picks.remove(idx);
            }
            None => picks.push(skill),
        }
        next
    }

    pub fn choose_equipment(
        &self,
        tables: &RuleTables,
        index: usize,
        option: &str,
    ) -> Result<Self, Rejected> {
        let class = self.class(tables).ok_or(Rejected::NoClass)?;
        let group = class
            .equipment_choices
            .get(index)
            .ok_or_else(|| Rejected::NoSuchEquipmentChoice {
                class: class.name.clone(),
                index,
            })?;
        let Some(option) = group.options.iter().find(|o| o.as_str() == option) else {
            debug!(index, option, "[EQUIP] unknown option");
            return Err(Rejected::UnknownEquipmentOption {
                index,
                option: option.to_string(),
            });
        };
        let mut next = self.clone();
        next.class_choices.equipment.insert(index, option.clone());
        Ok(next)
    }

    /// Replace the free-form inventory with the non-blank lines of `text`.
    pub fn set_inventory_text(&self, text: &str) -> Self {
        let mut next = self.clone();
        next.inventory = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        next
    }

    /* ---- spells ---- */

    /// Toggle a spell by name under the class's current slot cap. Additions
    /// that do not fit are ignored.
    pub fn toggle_spell(&self, tables: &RuleTables, spell: &SpellData) -> Self {
        let status = self
            .class(tables)
            .map(|c| derived::spellcasting_status(c, self.meta.level));
        let selected = self
            .spells
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&spell.name));
        if !selected && !status.is_some_and(|s| s.is_available()) {
            debug!(spell = %spell.name, "[SPELL] class cannot cast spells yet; ignoring");
            return self.clone();
        }
        let cap = status.map_or(0, |s| s.max_leveled_spells());
        let mut next = self.clone();
        next.spells = validate::toggle_spell(&self.spells, spell, cap);
        next
    }

    pub fn update_details(&self, edit: impl FnOnce(&mut Narrative)) -> Self {
        let mut next = self.clone();
        edit(&mut next.details);
        next
    }

    /* ---- persistence boundary ---- */

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, DraftError> {
        let draft: CharacterDraft = serde_json::from_str(text)?;
        if draft.schema_version != SCHEMA_VERSION {
            return Err(DraftError::SchemaVersion {
                found: draft.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(draft)
    }

    /// Reload a saved draft; anything unreadable is dropped for a fresh one.
    pub fn restore_or_new(text: &str) -> Self {
        match Self::from_json(text) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(error = %err, "[DRAFT] discarding unreadable draft");
                Self::new()
            }
        }
    }

    pub fn export(&self, tables: &RuleTables, exported_at: DateTime<Utc>) -> ExportDocument {
        let derived = derived::derive(self, tables);
        ExportDocument {
            schema_version: SCHEMA_VERSION,
            exported_at,
            base_abilities: derived.base_abilities,
            abilities: derived.abilities,
            character: self.clone(),
            derived,
        }
    }
}

/// Snapshot written when a character is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportDocument {
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub character: CharacterDraft,
    pub base_abilities: Abilities,
    pub abilities: Abilities,
    pub derived: DerivedStats,
}

impl ExportDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// `<name>_character.json`, or `character_character.json` when unnamed.
    pub fn file_name(&self) -> String {
        let name = self.character.meta.name.trim();
        let stem = if name.is_empty() { "character" } else { name };
        format!("{}_character.json", stem)
    }
}
