use crate::rules::RulesSource;

pub fn builtin_rules() -> RulesSource<'static> {
    RulesSource {
        races: include_str!("../content/races.yaml"),
        classes: include_str!("../content/classes.yaml"),
        backgrounds: include_str!("../content/backgrounds.yaml"),
        spells: include_str!("../content/spells.yaml"),
    }
}

/// File names a rules directory override must provide, in `RulesSource` order.
pub const RULE_FILES: [&str; 4] = [
    "races.yaml",
    "classes.yaml",
    "backgrounds.yaml",
    "spells.yaml",
];
