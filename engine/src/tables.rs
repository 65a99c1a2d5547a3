//! Fixed numeric rule tables. Indexes are `level - 1` unless noted.

pub const POINT_BUY_BUDGET: i32 = 27;
pub const POINT_BUY_MIN: i32 = 8;
pub const POINT_BUY_MAX: i32 = 15;

/// Cost of each score from 8 through 15. Note the jump after 13.
pub const POINT_BUY_COSTS: [(i32, i32); 8] = [
    (8, 0),
    (9, 1),
    (10, 2),
    (11, 3),
    (12, 4),
    (13, 5),
    (14, 7),
    (15, 9),
];

pub const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];

pub const MANUAL_MIN: i32 = 1;
pub const MANUAL_MAX: i32 = 20;
/// Score every ability falls back to when nothing else sets it.
pub const DEFAULT_SCORE: i32 = 8;

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 20;

pub const PROFICIENCY_BONUS: [i32; 20] = [
    2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6,
];

/// Slots per spell level 1..=9 for full casters.
pub const FULL_CASTER_SLOTS: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Character level -> level used against `FULL_CASTER_SLOTS` for half casters.
pub const HALF_CASTER_EFFECTIVE_LEVEL: [i32; 20] = [
    1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10,
];

/// Pact magic: (slot count, slot level).
pub const WARLOCK_PACT_SLOTS: [(u8, u8); 20] = [
    (1, 1),
    (2, 1),
    (2, 2),
    (2, 2),
    (2, 3),
    (2, 3),
    (2, 4),
    (2, 4),
    (2, 5),
    (2, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (3, 5),
    (4, 5),
    (4, 5),
    (4, 5),
    (4, 5),
];

pub const SCHEMA_VERSION: u32 = 1;

pub fn point_buy_cost(score: i32) -> Option<i32> {
    POINT_BUY_COSTS
        .iter()
        .find(|(s, _)| *s == score)
        .map(|(_, cost)| *cost)
}

/// Clamp into 1..=20 and turn into a table index.
pub fn level_index(level: i32) -> usize {
    (level.clamp(MIN_LEVEL, MAX_LEVEL) - 1) as usize
}
