//! Derived statistics. Everything here is a pure function of the draft and
//! the rule tables; nothing is cached between calls.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::draft::CharacterDraft;
use crate::rules::{
    CasterProgression, ClassProfile, Feature, RaceData, RuleTables, SpellData, SubraceData,
};
use crate::tables::{
    level_index, FULL_CASTER_SLOTS, HALF_CASTER_EFFECTIVE_LEVEL, MANUAL_MAX, MANUAL_MIN, MAX_LEVEL,
    MIN_LEVEL, PROFICIENCY_BONUS, WARLOCK_PACT_SLOTS,
};
use crate::{ability_mod, Abilities, Ability, Skill};

/// Walking speed shown before a race is picked.
const DEFAULT_SPEED: i32 = 30;
const UNARMORED_BASE_AC: i32 = 10;
const PASSIVE_BASE: i32 = 10;
const SPELL_DC_BASE: i32 = 8;

pub fn proficiency_bonus(level: i32) -> i32 {
    PROFICIENCY_BONUS[level_index(level)]
}

/// Level 1 takes the full hit die; later levels add the fixed average
/// (`die / 2 + 1`). Every level contributes at least 1. Levels outside 1..=20
/// are clamped like the proficiency bonus.
pub fn hit_points(hit_die: i32, con_mod: i32, level: i32) -> i32 {
    let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    let first = (hit_die + con_mod).max(1);
    let per_level = (hit_die / 2 + 1 + con_mod).max(1);
    first + per_level * (level - 1)
}

pub fn initiative(dex_mod: i32) -> i32 {
    dex_mod
}

/// No skill proficiency contribution.
pub fn passive_perception(wis_mod: i32) -> i32 {
    PASSIVE_BASE + wis_mod
}

/// Unarmored baseline.
pub fn armor_class(dex_mod: i32) -> i32 {
    UNARMORED_BASE_AC + dex_mod
}

pub fn spell_save_dc(proficiency_bonus: i32, casting_mod: i32) -> i32 {
    SPELL_DC_BASE + proficiency_bonus + casting_mod
}

pub fn spell_attack_bonus(proficiency_bonus: i32, casting_mod: i32) -> i32 {
    proficiency_bonus + casting_mod
}

pub fn half_caster_effective_level(level: i32) -> i32 {
    HALF_CASTER_EFFECTIVE_LEVEL[level_index(level)]
}

/* ---------------- spell slots ---------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotBudget {
    /// Slot counts for spell levels 1..=9.
    Slots { slots: [u8; 9] },
    /// Pact magic: every slot is of `slot_level`.
    Pact { slots: u8, slot_level: u8 },
}

impl SlotBudget {
    /// Cap on selected spells of level 1 and up. Cantrips are never counted.
    pub fn max_leveled_spells(&self) -> usize {
        match self {
            SlotBudget::Slots { slots } => slots.iter().map(|&n| n as usize).sum(),
            SlotBudget::Pact { slots, .. } => *slots as usize,
        }
    }

    /// Slots of exactly `spell_level` (1..=9).
    pub fn slots_at(&self, spell_level: u8) -> u8 {
        match self {
            SlotBudget::Slots { slots } => match spell_level {
                1..=9 => slots[spell_level as usize - 1],
                _ => 0,
            },
            SlotBudget::Pact { slots, slot_level } => {
                if spell_level == *slot_level {
                    *slots
                } else {
                    0
                }
            }
        }
    }

    /// Highest spell level with at least one slot.
    pub fn highest_slot_level(&self) -> u8 {
        match self {
            SlotBudget::Slots { slots } => slots
                .iter()
                .rposition(|&n| n > 0)
                .map(|i| i as u8 + 1)
                .unwrap_or(0),
            SlotBudget::Pact { slot_level, .. } => *slot_level,
        }
    }
}

/// Raw table lookup. Does not consider whether the class has unlocked
/// spellcasting yet; see `spellcasting_status` for that.
pub fn spell_slot_budget(progression: CasterProgression, level: i32) -> SlotBudget {
    match progression {
        CasterProgression::Full => SlotBudget::Slots {
            slots: FULL_CASTER_SLOTS[level_index(level)],
        },
        CasterProgression::Half => SlotBudget::Slots {
            slots: FULL_CASTER_SLOTS[level_index(half_caster_effective_level(level))],
        },
        CasterProgression::Warlock => {
            let (slots, slot_level) = WARLOCK_PACT_SLOTS[level_index(level)];
            SlotBudget::Pact { slots, slot_level }
        }
    }
}

/// Whether a class casts spells at a level. `Absent` and `Locked` are
/// different answers: the first means the class never casts, the second
/// that it will once `unlocks_at` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpellcastingStatus {
    Absent,
    Locked {
        ability: Ability,
        progression: CasterProgression,
        unlocks_at: i32,
    },
    Available {
        ability: Ability,
        progression: CasterProgression,
        budget: SlotBudget,
    },
}

impl SpellcastingStatus {
    pub fn budget(&self) -> Option<&SlotBudget> {
        match self {
            SpellcastingStatus::Available { budget, .. } => Some(budget),
            _ => None,
        }
    }

    /// 0 unless spellcasting is available.
    pub fn max_leveled_spells(&self) -> usize {
        self.budget().map_or(0, SlotBudget::max_leveled_spells)
    }

    pub fn casting_ability(&self) -> Option<Ability> {
        match self {
            SpellcastingStatus::Absent => None,
            SpellcastingStatus::Locked { ability, .. }
            | SpellcastingStatus::Available { ability, .. } => Some(*ability),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SpellcastingStatus::Available { .. })
    }
}

pub fn spellcasting_status(class: &ClassProfile, level: i32) -> SpellcastingStatus {
    let Some(profile) = class.spellcasting else {
        return SpellcastingStatus::Absent;
    };
    let unlocks_at = profile.progression.unlocks_at();
    if level < unlocks_at {
        return SpellcastingStatus::Locked {
            ability: profile.ability,
            progression: profile.progression,
            unlocks_at,
        };
    }
    SpellcastingStatus::Available {
        ability: profile.ability,
        progression: profile.progression,
        budget: spell_slot_budget(profile.progression, level),
    }
}

pub fn leveled_spell_count(spells: &[SpellData]) -> usize {
    spells.iter().filter(|s| !s.is_cantrip()).count()
}

/* ---------------- race ---------------- */

/// Add race then subrace bonuses; results stay within 1..=20.
pub fn apply_racial_bonuses(
    base: &Abilities,
    race: Option<&RaceData>,
    subrace: Option<&SubraceData>,
) -> Abilities {
    let bonuses = race
        .into_iter()
        .flat_map(|r| r.ability_bonuses.iter())
        .chain(subrace.into_iter().flat_map(|s| s.ability_bonuses.iter()));
    let raised = bonuses.fold(*base, |acc, (&ability, &bonus)| {
        acc.with(ability, acc.get(ability) + bonus)
    });
    raised.iter().fold(raised, |acc, (ability, score)| {
        acc.with(ability, score.clamp(MANUAL_MIN, MANUAL_MAX))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub name: String,
    pub subrace: Option<String>,
    pub speed: i32,
    pub darkvision: Option<i32>,
    pub languages: Vec<String>,
    pub features: Vec<Feature>,
}

/// Merge race and subrace: subrace speed/darkvision win, languages and
/// features are race first.
pub fn race_summary(race: &RaceData, subrace: Option<&SubraceData>) -> RaceSummary {
    let mut languages = race.languages.clone();
    let mut features = race.features.clone();
    if let Some(sub) = subrace {
        for lang in &sub.additional_languages {
            if !languages.contains(lang) {
                languages.push(lang.clone());
            }
        }
        features.extend(sub.features.iter().cloned());
    }
    RaceSummary {
        name: race.name.clone(),
        subrace: subrace.map(|s| s.name.clone()),
        speed: subrace.and_then(|s| s.speed).unwrap_or(race.speed),
        darkvision: subrace.and_then(|s| s.darkvision).or(race.darkvision),
        languages,
        features,
    }
}

/* ---------------- proficiencies ---------------- */

pub fn skill_bonuses(
    abilities: &Abilities,
    proficient: &[Skill],
    proficiency_bonus: i32,
) -> IndexMap<Skill, i32> {
    Skill::ALL
        .into_iter()
        .map(|skill| {
            let mut bonus = abilities.mod_of(skill.ability());
            if proficient.contains(&skill) {
                bonus += proficiency_bonus;
            }
            (skill, bonus)
        })
        .collect()
}

pub fn saving_throws(
    abilities: &Abilities,
    class: Option<&ClassProfile>,
    proficiency_bonus: i32,
) -> IndexMap<Ability, i32> {
    Ability::ALL
        .into_iter()
        .map(|ability| {
            let proficient = class.is_some_and(|c| c.saving_throws.contains(&ability));
            let bonus = abilities.mod_of(ability) + if proficient { proficiency_bonus } else { 0 };
            (ability, bonus)
        })
        .collect()
}

/// Class skill picks followed by background skills, without repeats.
pub fn proficient_skills(draft: &CharacterDraft, tables: &RuleTables) -> Vec<Skill> {
    let mut skills = draft.class_choices.skills.clone();
    if let Some(bg) = draft.background(tables) {
        for skill in &bg.skills {
            if !skills.contains(skill) {
                skills.push(*skill);
            }
        }
    }
    skills
}

/// Race (and subrace) languages, then the background picks, without repeats.
pub fn known_languages(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    let mut languages = draft
        .race(tables)
        .map(|r| race_summary(r, draft.subrace(tables)).languages)
        .unwrap_or_default();
    for lang in &draft.background_languages {
        if !languages.iter().any(|l| l.eq_ignore_ascii_case(lang)) {
            languages.push(lang.clone());
        }
    }
    languages
}

pub fn tool_proficiencies(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    draft
        .background(tables)
        .map(|bg| bg.tools.clone())
        .unwrap_or_default()
}

/// Chosen class equipment in group order, then background gear, then
/// free-form inventory lines.
pub fn starting_inventory(draft: &CharacterDraft, tables: &RuleTables) -> Vec<String> {
    let mut items = Vec::new();
    if let Some(class) = draft.class(tables) {
        for index in 0..class.equipment_choices.len() {
            if let Some(option) = draft.class_choices.equipment.get(&index) {
                items.push(option.clone());
            }
        }
    }
    if let Some(bg) = draft.background(tables) {
        items.extend(bg.equipment.iter().cloned());
    }
    items.extend(draft.inventory.iter().cloned());
    items
}

/* ---------------- full record ---------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DerivedStats {
    pub level: i32,
    pub proficiency_bonus: i32,
    pub base_abilities: Abilities,
    pub abilities: Abilities,
    pub modifiers: IndexMap<Ability, i32>,
    pub race: Option<RaceSummary>,
    pub speed: i32,
    pub hit_die: Option<i32>,
    pub hit_points: Option<i32>,
    pub armor_class: i32,
    pub initiative: i32,
    pub passive_perception: i32,
    pub saving_throws: IndexMap<Ability, i32>,
    pub skills: IndexMap<Skill, i32>,
    pub languages: Vec<String>,
    pub tools: Vec<String>,
    pub spellcasting: SpellcastingStatus,
    pub spell_save_dc: Option<i32>,
    pub spell_attack_bonus: Option<i32>,
    pub max_leveled_spells: usize,
    pub inventory: Vec<String>,
}

/// Compute every derived value for a draft. Unknown or missing selections
/// simply leave their parts empty; validation reports them.
pub fn derive(draft: &CharacterDraft, tables: &RuleTables) -> DerivedStats {
    let level = draft.meta.level;
    let pb = proficiency_bonus(level);
    let base = draft.base_abilities();
    let abilities = draft.applied_abilities(tables);
    let class = draft.class(tables);

    let modifiers = abilities.iter().map(|(a, s)| (a, ability_mod(s))).collect();
    let race = draft
        .race(tables)
        .map(|r| race_summary(r, draft.subrace(tables)));
    let speed = race.as_ref().map_or(DEFAULT_SPEED, |r| r.speed);

    let spellcasting = class.map_or(SpellcastingStatus::Absent, |c| spellcasting_status(c, level));
    // Locked casters get no DC or attack bonus yet.
    let casting_mod = match spellcasting {
        SpellcastingStatus::Available { ability, .. } => Some(abilities.mod_of(ability)),
        _ => None,
    };

    DerivedStats {
        level,
        proficiency_bonus: pb,
        base_abilities: base,
        abilities,
        modifiers,
        race,
        speed,
        hit_die: class.map(|c| c.hit_die),
        hit_points: class.map(|c| hit_points(c.hit_die, abilities.mod_of(Ability::Con), level)),
        armor_class: armor_class(abilities.mod_of(Ability::Dex)),
        initiative: initiative(abilities.mod_of(Ability::Dex)),
        passive_perception: passive_perception(abilities.mod_of(Ability::Wis)),
        saving_throws: saving_throws(&abilities, class, pb),
        skills: skill_bonuses(&abilities, &proficient_skills(draft, tables), pb),
        languages: known_languages(draft, tables),
        tools: tool_proficiencies(draft, tables),
        spell_save_dc: casting_mod.map(|m| spell_save_dc(pb, m)),
        spell_attack_bonus: casting_mod.map(|m| spell_attack_bonus(pb, m)),
        max_leveled_spells: spellcasting.max_leveled_spells(),
        spellcasting,
        inventory: starting_inventory(draft, tables),
    }
}
