//! Shapes of the static rule tables (races, classes, backgrounds, spells) and
//! the read-only `RuleTables` the rest of the engine looks things up in.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::content;
use crate::error::RulesError;
use crate::{Ability, Skill};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RaceData {
    pub name: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub ability_bonuses: IndexMap<Ability, i32>,
    pub speed: i32,
    #[serde(default)]
    pub darkvision: Option<i32>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub subraces: Vec<SubraceData>,
}

impl RaceData {
    pub fn subrace(&self, name: &str) -> Option<&SubraceData> {
        self.subraces
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubraceData {
    pub name: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub ability_bonuses: IndexMap<Ability, i32>,
    #[serde(default)]
    pub speed: Option<i32>,
    #[serde(default)]
    pub darkvision: Option<i32>,
    #[serde(default)]
    pub additional_languages: Vec<String>,
}

/// `choose N from set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillChoice {
    pub choose: usize,
    pub from: Vec<Skill>,
}

/// One equipment group; exactly one option gets picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentChoice {
    pub options: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterProgression {
    Full,
    Half,
    Warlock,
}

impl CasterProgression {
    /// First character level at which the progression grants spells.
    pub fn unlocks_at(self) -> i32 {
        match self {
            CasterProgression::Full | CasterProgression::Warlock => 1,
            CasterProgression::Half => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellcastingProfile {
    pub ability: Ability,
    pub progression: CasterProgression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassProfile {
    pub name: String,
    pub hit_die: i32,
    pub saving_throws: [Ability; 2],
    pub skill_choices: SkillChoice,
    #[serde(default)]
    pub equipment_choices: Vec<EquipmentChoice>,
    #[serde(default)]
    pub spellcasting: Option<SpellcastingProfile>,
    /// Names resolved against the spell catalog.
    #[serde(default)]
    pub spell_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackgroundData {
    pub name: String,
    pub skills: Vec<Skill>,
    /// Number of languages of the player's choice.
    #[serde(default)]
    pub language_choices: u8,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub feature: Feature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellData {
    pub name: String,
    /// 0 for cantrips.
    pub level: u8,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub description: String,
}

impl SpellData {
    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }
}

/// Read-only reference dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleTables {
    pub races: Vec<RaceData>,
    pub classes: Vec<ClassProfile>,
    pub backgrounds: Vec<BackgroundData>,
    pub spells: Vec<SpellData>,
}

/// The four YAML documents a rule set is made of.
#[derive(Debug, Clone, Copy)]
pub struct RulesSource<'a> {
    pub races: &'a str,
    pub classes: &'a str,
    pub backgrounds: &'a str,
    pub spells: &'a str,
}

impl RuleTables {
    /// The rule set compiled into the crate.
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_source(content::builtin_rules())
    }

    pub fn from_source(src: RulesSource<'_>) -> Result<Self, RulesError> {
        let tables = Self {
            races: parse_section("races", src.races)?,
            classes: parse_section("classes", src.classes)?,
            backgrounds: parse_section("backgrounds", src.backgrounds)?,
            spells: parse_section("spells", src.spells)?,
        };
        tables.check()?;
        Ok(tables)
    }

    fn check(&self) -> Result<(), RulesError> {
        no_duplicates("races", self.races.iter().map(|r| r.name.as_str()))?;
        no_duplicates("classes", self.classes.iter().map(|c| c.name.as_str()))?;
        no_duplicates(
            "backgrounds",
            self.backgrounds.iter().map(|b| b.name.as_str()),
        )?;
        no_duplicates("spells", self.spells.iter().map(|s| s.name.as_str()))?;
        for class in &self.classes {
            for spell in &class.spell_list {
                if self.spell(spell).is_none() {
                    return Err(RulesError::UnknownSpell {
                        class: class.name.clone(),
                        spell: spell.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn race(&self, name: &str) -> Option<&RaceData> {
        find_named(&self.races, name, |r| &r.name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassProfile> {
        find_named(&self.classes, name, |c| &c.name)
    }

    pub fn background(&self, name: &str) -> Option<&BackgroundData> {
        find_named(&self.backgrounds, name, |b| &b.name)
    }

    pub fn spell(&self, name: &str) -> Option<&SpellData> {
        find_named(&self.spells, name, |s| &s.name)
    }

    /// Catalog entries on a class's spell list, in list order.
    pub fn spells_for_class(&self, class: &ClassProfile) -> Vec<&SpellData> {
        class
            .spell_list
            .iter()
            .filter_map(|name| self.spell(name))
            .collect()
    }
}

fn parse_section<T: for<'de> Deserialize<'de>>(
    section: &'static str,
    text: &str,
) -> Result<Vec<T>, RulesError> {
    serde_yaml::from_str(text).map_err(|source| RulesError::Parse { section, source })
}

fn no_duplicates<'a>(
    section: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), RulesError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            return Err(RulesError::Duplicate {
                section,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn find_named<'a, T>(items: &'a [T], name: &str, key: impl Fn(&T) -> &String) -> Option<&'a T> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    items.iter().find(|item| key(item).eq_ignore_ascii_case(name))
}
