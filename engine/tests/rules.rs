use chargen::content::builtin_rules;
use chargen::rules::RulesSource;
use chargen::{Ability, CasterProgression, RuleTables, RulesError};

#[test]
fn builtin_rules_load() {
    let t = RuleTables::builtin().unwrap();
    assert_eq!(t.classes.len(), 12);
    assert!(t.races.len() >= 9);
    assert!(!t.backgrounds.is_empty());
    assert!(t.spells.iter().any(|s| s.is_cantrip()));
}

#[test]
fn lookups_ignore_case_and_whitespace() {
    let t = RuleTables::builtin().unwrap();
    assert_eq!(t.class(" wizard ").unwrap().name, "Wizard");
    assert_eq!(t.race("half-elf").unwrap().name, "Half-Elf");
    assert_eq!(t.spell("MAGIC MISSILE").unwrap().level, 1);
    assert!(t.class("").is_none());
    assert!(t.background("Pirate").is_none());
}

#[test]
fn class_profiles_carry_casting_data() {
    let t = RuleTables::builtin().unwrap();
    let warlock = t.class("Warlock").unwrap();
    let casting = warlock.spellcasting.unwrap();
    assert_eq!(casting.ability, Ability::Cha);
    assert_eq!(casting.progression, CasterProgression::Warlock);
    assert_eq!(warlock.saving_throws, [Ability::Wis, Ability::Cha]);

    let barbarian = t.class("Barbarian").unwrap();
    assert_eq!(barbarian.hit_die, 12);
    assert!(barbarian.spellcasting.is_none());
}

#[test]
fn duplicate_names_are_rejected() {
    let races = "- { name: Elf, speed: 30 }\n- { name: elf, speed: 30 }\n";
    let src = RulesSource {
        races,
        ..builtin_rules()
    };
    match RuleTables::from_source(src) {
        Err(RulesError::Duplicate { section, name }) => {
            assert_eq!(section, "races");
            assert_eq!(name, "elf");
        }
        other => panic!("expected duplicate error, got {:?}", other),
    }
}

#[test]
fn class_spell_must_exist() {
    let classes = r#"
- name: Hedge Mage
  hit_die: 6
  saving_throws: [intelligence, wisdom]
  skill_choices: { choose: 1, from: [arcana] }
  spellcasting: { ability: intelligence, progression: full }
  spell_list: [wish]
"#;
    let src = RulesSource {
        classes,
        ..builtin_rules()
    };
    assert!(matches!(
        RuleTables::from_source(src),
        Err(RulesError::UnknownSpell { .. })
    ));
}

#[test]
fn malformed_yaml_names_the_section() {
    let src = RulesSource {
        spells: "- { name: Broken, level: high }",
        ..builtin_rules()
    };
    let err = RuleTables::from_source(src).unwrap_err();
    assert!(err.to_string().starts_with("failed to parse spells rules"), "{}", err);
}
