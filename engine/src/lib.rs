use std::fmt;

use serde::{Deserialize, Serialize};

pub mod api;
pub mod content;
pub mod derived;
pub mod draft;
pub mod error;
pub mod generation;
pub mod rules;
pub mod tables;
pub mod validate;

pub use derived::{derive, DerivedStats, SlotBudget, SpellcastingStatus};
pub use draft::{CharacterDraft, CharacterMeta, ExportDocument};
pub use error::{DraftError, Rejected, RulesError};
pub use generation::{AbilityGeneration, GenerationMethod, Manual, PointBuy, StandardArray};
pub use rules::{
    BackgroundData, CasterProgression, ClassProfile, RaceData, RuleTables, SpellData,
    SpellcastingProfile, SubraceData,
};
pub use validate::{StepError, WizardStep};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "strength")]
    Str,
    #[serde(rename = "dexterity")]
    Dex,
    #[serde(rename = "constitution")]
    Con,
    #[serde(rename = "intelligence")]
    Int,
    #[serde(rename = "wisdom")]
    Wis,
    #[serde(rename = "charisma")]
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Ability::Str => "strength",
            Ability::Dex => "dexterity",
            Ability::Con => "constitution",
            Ability::Int => "intelligence",
            Ability::Wis => "wisdom",
            Ability::Cha => "charisma",
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }

    /// Case-insensitive lookup by full name or three-letter abbreviation.
    pub fn parse(s: &str) -> Option<Ability> {
        let s = s.trim();
        Ability::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s) || a.abbrev().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub const ALL: [Skill; 18] = [
        Skill::Acrobatics,
        Skill::AnimalHandling,
        Skill::Arcana,
        Skill::Athletics,
        Skill::Deception,
        Skill::History,
        Skill::Insight,
        Skill::Intimidation,
        Skill::Investigation,
        Skill::Medicine,
        Skill::Nature,
        Skill::Perception,
        Skill::Performance,
        Skill::Persuasion,
        Skill::Religion,
        Skill::SleightOfHand,
        Skill::Stealth,
        Skill::Survival,
    ];

    pub fn ability(self) -> Ability {
        use Skill::*;
        match self {
            Athletics => Ability::Str,
            Acrobatics | SleightOfHand | Stealth => Ability::Dex,
            Arcana | History | Investigation | Nature | Religion => Ability::Int,
            AnimalHandling | Insight | Medicine | Perception | Survival => Ability::Wis,
            Deception | Intimidation | Performance | Persuasion => Ability::Cha,
        }
    }

    pub fn label(self) -> &'static str {
        use Skill::*;
        match self {
            Acrobatics => "acrobatics",
            AnimalHandling => "animal handling",
            Arcana => "arcana",
            Athletics => "athletics",
            Deception => "deception",
            History => "history",
            Insight => "insight",
            Intimidation => "intimidation",
            Investigation => "investigation",
            Medicine => "medicine",
            Nature => "nature",
            Perception => "perception",
            Performance => "performance",
            Persuasion => "persuasion",
            Religion => "religion",
            SleightOfHand => "sleight of hand",
            Stealth => "stealth",
            Survival => "survival",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Abilities {
    pub const fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    /// Copy with one score replaced.
    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        let slot = match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        };
        *slot = score;
        self
    }

    pub fn mod_of(&self, ability: Ability) -> i32 {
        ability_mod(self.get(ability))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

impl Default for Abilities {
    fn default() -> Self {
        Self::uniform(8)
    }
}

/// D&D ability modifier = floor((score - 10) / 2) for integer scores.
pub fn ability_mod(score: i32) -> i32 {
    // `div_euclid` with positive divisor matches mathematical floor division.
    (score - 10).div_euclid(2)
}
