use thiserror::Error;

use crate::Ability;

/// Rule tables that could not be loaded.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to parse {section} rules: {source}")]
    Parse {
        section: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("duplicate {section} entry '{name}'")]
    Duplicate { section: &'static str, name: String },
    #[error("class '{class}' lists unknown spell '{spell}'")]
    UnknownSpell { class: String, spell: String },
}

/// A persisted draft that could not be restored.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("malformed draft: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported draft schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },
}

/// An edit that breaks a generation or selection rule. The caller keeps its
/// previous draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("adjustment must be +1 or -1, got {0}")]
    InvalidDelta(i32),
    #[error("{ability} would be {score}, outside {min}..={max}")]
    OutOfRange {
        ability: Ability,
        score: i32,
        min: i32,
        max: i32,
    },
    #[error("point-buy total would be {cost}, budget is {budget}")]
    OverBudget { cost: i32, budget: i32 },
    #[error("{0} is not a standard array value")]
    NotInStandardArray(i32),
    #[error("standard array value {0} is assigned more than once")]
    DuplicateStandardValue(i32),
    #[error("{expected} is not the active generation method")]
    WrongMethod { expected: &'static str },
    #[error("no class selected")]
    NoClass,
    #[error("class '{class}' has no equipment choice {index}")]
    NoSuchEquipmentChoice { class: String, index: usize },
    #[error("'{option}' is not an option for equipment choice {index}")]
    UnknownEquipmentOption { index: usize, option: String },
}
