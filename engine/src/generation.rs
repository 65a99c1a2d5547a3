//! Ability-score generation: point buy, standard array and manual entry.
//!
//! Each method owns only the state it needs. Every edit returns a new value;
//! a rejected edit returns `Err(Rejected)` and the caller keeps what it had.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Rejected;
use crate::tables::{
    point_buy_cost, DEFAULT_SCORE, MANUAL_MAX, MANUAL_MIN, POINT_BUY_BUDGET, POINT_BUY_MAX,
    POINT_BUY_MIN, STANDARD_ARRAY,
};
use crate::{Abilities, Ability};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    PointBuy,
    StandardArray,
    Manual,
}

impl GenerationMethod {
    pub fn label(self) -> &'static str {
        match self {
            GenerationMethod::PointBuy => "point buy",
            GenerationMethod::StandardArray => "standard array",
            GenerationMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/* ---------------- point buy ---------------- */

/// Total point cost of a score set. Fails if any score is off the cost table.
pub fn points_spent(scores: &Abilities) -> Result<i32, Rejected> {
    scores.iter().try_fold(0, |total, (ability, score)| {
        point_buy_cost(score)
            .map(|cost| total + cost)
            .ok_or(Rejected::OutOfRange {
                ability,
                score,
                min: POINT_BUY_MIN,
                max: POINT_BUY_MAX,
            })
    })
}

/// Move one score up or down by a single step under point-buy rules.
pub fn point_buy_adjust(
    current: &Abilities,
    ability: Ability,
    delta: i32,
) -> Result<Abilities, Rejected> {
    if delta != 1 && delta != -1 {
        return Err(Rejected::InvalidDelta(delta));
    }
    let score = current.get(ability) + delta;
    if !(POINT_BUY_MIN..=POINT_BUY_MAX).contains(&score) {
        return Err(Rejected::OutOfRange {
            ability,
            score,
            min: POINT_BUY_MIN,
            max: POINT_BUY_MAX,
        });
    }
    let next = current.with(ability, score);
    let cost = points_spent(&next)?;
    if cost > POINT_BUY_BUDGET {
        return Err(Rejected::OverBudget {
            cost,
            budget: POINT_BUY_BUDGET,
        });
    }
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PointBuyRepr")]
pub struct PointBuy {
    scores: Abilities,
}

#[derive(Deserialize)]
struct PointBuyRepr {
    scores: Abilities,
}

impl TryFrom<PointBuyRepr> for PointBuy {
    type Error = Rejected;

    fn try_from(repr: PointBuyRepr) -> Result<Self, Rejected> {
        let cost = points_spent(&repr.scores)?;
        if cost > POINT_BUY_BUDGET {
            return Err(Rejected::OverBudget {
                cost,
                budget: POINT_BUY_BUDGET,
            });
        }
        Ok(Self {
            scores: repr.scores,
        })
    }
}

impl PointBuy {
    /// Every score at 8, all 27 points unspent.
    pub fn new() -> Self {
        Self {
            scores: Abilities::uniform(POINT_BUY_MIN),
        }
    }

    pub fn scores(&self) -> Abilities {
        self.scores
    }

    pub fn points_spent(&self) -> i32 {
        // Scores are on the cost table by construction.
        points_spent(&self.scores).unwrap_or(POINT_BUY_BUDGET)
    }

    pub fn points_remaining(&self) -> i32 {
        POINT_BUY_BUDGET - self.points_spent()
    }

    pub fn adjust(&self, ability: Ability, delta: i32) -> Result<Self, Rejected> {
        match point_buy_adjust(&self.scores, ability, delta) {
            Ok(scores) => Ok(Self { scores }),
            Err(err) => {
                debug!(%ability, delta, error = %err, "[POINTBUY] adjustment rejected");
                Err(err)
            }
        }
    }

    /// Whether a +1 on `ability` would be accepted.
    pub fn can_increase(&self, ability: Ability) -> bool {
        point_buy_adjust(&self.scores, ability, 1).is_ok()
    }

    pub fn can_decrease(&self, ability: Ability) -> bool {
        point_buy_adjust(&self.scores, ability, -1).is_ok()
    }

    pub fn is_complete(&self) -> bool {
        self.points_remaining() == 0
    }
}

impl Default for PointBuy {
    fn default() -> Self {
        Self::new()
    }
}

/* ---------------- standard array ---------------- */

/// One-to-one assignment of {15,14,13,12,10,8} onto abilities.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "StandardArrayRepr")]
pub struct StandardArray {
    assigned: IndexMap<Ability, i32>,
}

#[derive(Deserialize)]
struct StandardArrayRepr {
    #[serde(default)]
    assigned: IndexMap<Ability, i32>,
}

impl TryFrom<StandardArrayRepr> for StandardArray {
    type Error = Rejected;

    fn try_from(repr: StandardArrayRepr) -> Result<Self, Rejected> {
        repr.assigned
            .iter()
            .try_fold(Self::new(), |acc, (&ability, &value)| {
                if acc.assigned.values().any(|v| *v == value) {
                    return Err(Rejected::DuplicateStandardValue(value));
                }
                acc.assign(value, ability)
            })
    }
}

impl StandardArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `value` on `ability`. Whatever ability held `value` before loses it,
    /// and whatever value `ability` held goes back to the pool.
    pub fn assign(&self, value: i32, ability: Ability) -> Result<Self, Rejected> {
        if !STANDARD_ARRAY.contains(&value) {
            debug!(%ability, value, "[STDARRAY] not a standard array value");
            return Err(Rejected::NotInStandardArray(value));
        }
        let mut next = self.clone();
        next.assigned.retain(|a, v| *a == ability || *v != value);
        next.assigned.insert(ability, value);
        Ok(next)
    }

    pub fn unassign(&self, ability: Ability) -> Self {
        let mut next = self.clone();
        next.assigned.shift_remove(&ability);
        next
    }

    pub fn value_of(&self, ability: Ability) -> Option<i32> {
        self.assigned.get(&ability).copied()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    /// Array values not yet placed, highest first.
    pub fn unassigned_values(&self) -> Vec<i32> {
        STANDARD_ARRAY
            .into_iter()
            .filter(|v| !self.assigned.values().any(|a| a == v))
            .collect()
    }

    /// Assigned values, with 8 for anything still open.
    pub fn scores(&self) -> Abilities {
        self.assigned
            .iter()
            .fold(Abilities::uniform(DEFAULT_SCORE), |acc, (&a, &v)| {
                acc.with(a, v)
            })
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count() == STANDARD_ARRAY.len()
    }
}

/* ---------------- manual ---------------- */

/// Parse a typed score. Unparseable input becomes 8; the result is clamped to 1..=20.
pub fn manual_set(current: &Abilities, ability: Ability, raw: &str) -> Abilities {
    let score = raw.trim().parse::<i32>().unwrap_or(DEFAULT_SCORE);
    current.with(ability, score.clamp(MANUAL_MIN, MANUAL_MAX))
}

/// Abilities outside the usual 8..=15 band. Display hint only.
pub fn manual_flags(scores: &Abilities) -> Vec<Ability> {
    scores
        .iter()
        .filter(|(_, s)| !(POINT_BUY_MIN..=POINT_BUY_MAX).contains(s))
        .map(|(a, _)| a)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ManualRepr")]
pub struct Manual {
    scores: Abilities,
}

#[derive(Deserialize)]
struct ManualRepr {
    scores: Abilities,
}

impl TryFrom<ManualRepr> for Manual {
    type Error = Rejected;

    fn try_from(repr: ManualRepr) -> Result<Self, Rejected> {
        match repr
            .scores
            .iter()
            .find(|(_, s)| !(MANUAL_MIN..=MANUAL_MAX).contains(s))
        {
            Some((ability, score)) => Err(Rejected::OutOfRange {
                ability,
                score,
                min: MANUAL_MIN,
                max: MANUAL_MAX,
            }),
            None => Ok(Self {
                scores: repr.scores,
            }),
        }
    }
}

impl Manual {
    pub fn new(scores: Abilities) -> Self {
        let clamped = scores
            .iter()
            .fold(scores, |acc, (a, s)| acc.with(a, s.clamp(MANUAL_MIN, MANUAL_MAX)));
        Self { scores: clamped }
    }

    pub fn scores(&self) -> Abilities {
        self.scores
    }

    pub fn set(&self, ability: Ability, raw: &str) -> Self {
        Self {
            scores: manual_set(&self.scores, ability, raw),
        }
    }

    pub fn flags(&self) -> Vec<Ability> {
        manual_flags(&self.scores)
    }
}

impl Default for Manual {
    fn default() -> Self {
        Self::new(Abilities::uniform(DEFAULT_SCORE))
    }
}

/* ---------------- tagged state ---------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AbilityGeneration {
    PointBuy(PointBuy),
    StandardArray(StandardArray),
    Manual(Manual),
}

impl Default for AbilityGeneration {
    fn default() -> Self {
        AbilityGeneration::PointBuy(PointBuy::new())
    }
}

impl AbilityGeneration {
    pub fn method(&self) -> GenerationMethod {
        match self {
            AbilityGeneration::PointBuy(_) => GenerationMethod::PointBuy,
            AbilityGeneration::StandardArray(_) => GenerationMethod::StandardArray,
            AbilityGeneration::Manual(_) => GenerationMethod::Manual,
        }
    }

    /// Base scores before racial bonuses.
    pub fn scores(&self) -> Abilities {
        match self {
            AbilityGeneration::PointBuy(pb) => pb.scores(),
            AbilityGeneration::StandardArray(sa) => sa.scores(),
            AbilityGeneration::Manual(m) => m.scores(),
        }
    }

    /// Start over with another method. Manual entry keeps the current scores
    /// as its starting point; the other two start fresh.
    pub fn switch_to(&self, method: GenerationMethod) -> Self {
        if method == self.method() {
            return self.clone();
        }
        match method {
            GenerationMethod::PointBuy => AbilityGeneration::PointBuy(PointBuy::new()),
            GenerationMethod::StandardArray => {
                AbilityGeneration::StandardArray(StandardArray::new())
            }
            GenerationMethod::Manual => AbilityGeneration::Manual(Manual::new(self.scores())),
        }
    }

    /// Errors that keep the ability step from completing, in display order.
    pub fn validate_complete(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match self {
            AbilityGeneration::PointBuy(pb) => {
                let remaining = pb.points_remaining();
                if remaining != 0 {
                    errors.push(format!(
                        "You have {} points remaining. Spend all points to continue.",
                        remaining
                    ));
                }
            }
            AbilityGeneration::StandardArray(sa) => {
                if !sa.is_complete() {
                    errors.push(format!(
                        "You must assign all {} standard array values. Currently assigned: {}/{}",
                        STANDARD_ARRAY.len(),
                        sa.assigned_count(),
                        STANDARD_ARRAY.len()
                    ));
                }
            }
            AbilityGeneration::Manual(_) => {}
        }
        errors
    }

    pub fn is_complete(&self) -> bool {
        self.validate_complete().is_empty()
    }
}
