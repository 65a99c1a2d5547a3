use chargen::derived::{
    apply_racial_bonuses, armor_class, half_caster_effective_level, hit_points, initiative,
    passive_perception, proficiency_bonus, race_summary, spell_attack_bonus, spell_save_dc,
    spell_slot_budget, spellcasting_status,
};
use chargen::{
    ability_mod, derive, Abilities, Ability, CasterProgression, CharacterDraft, GenerationMethod,
    RuleTables, SlotBudget, SpellcastingStatus,
};

fn tables() -> RuleTables {
    RuleTables::builtin().unwrap()
}

#[test]
fn ability_modifier_floors() {
    assert_eq!(ability_mod(10), 0);
    assert_eq!(ability_mod(11), 0);
    assert_eq!(ability_mod(8), -1);
    assert_eq!(ability_mod(9), -1);
    assert_eq!(ability_mod(15), 2);
    assert_eq!(ability_mod(1), -5);
    assert_eq!(ability_mod(20), 5);
}

#[test]
fn proficiency_by_tier_and_clamped() {
    assert_eq!(proficiency_bonus(1), 2);
    assert_eq!(proficiency_bonus(4), 2);
    assert_eq!(proficiency_bonus(5), 3);
    assert_eq!(proficiency_bonus(9), 4);
    assert_eq!(proficiency_bonus(13), 5);
    assert_eq!(proficiency_bonus(17), 6);
    assert_eq!(proficiency_bonus(20), 6);
    assert_eq!(proficiency_bonus(0), 2);
    assert_eq!(proficiency_bonus(42), 6);
}

#[test]
fn hit_points_floor_at_one() {
    assert_eq!(hit_points(8, -2, 1), 6);
    assert_eq!(hit_points(6, -5, 1), 1);
    assert_eq!(hit_points(12, 3, 1), 15);
}

#[test]
fn hit_points_past_first_level_use_average() {
    // d10, +2 CON: 12 at 1st, then 6 + 2 = 8 per level.
    assert_eq!(hit_points(10, 2, 1), 12);
    assert_eq!(hit_points(10, 2, 3), 28);
    // d6, -5 CON: every level still adds 1.
    assert_eq!(hit_points(6, -5, 4), 4);
}

#[test]
fn hit_points_clamp_out_of_range_levels() {
    assert_eq!(hit_points(8, 0, i32::MAX), hit_points(8, 0, 20));
    assert_eq!(hit_points(10, 2, 25), hit_points(10, 2, 20));
    assert_eq!(hit_points(10, 2, 20), 12 + 8 * 19);
    assert_eq!(hit_points(10, 2, i32::MIN), 12);
    assert_eq!(hit_points(10, 2, 0), 12);
}

#[test]
fn derive_survives_absurd_levels() {
    let t = tables();
    for level in [21, 2_000_000_000, i32::MAX] {
        let draft = CharacterDraft::new()
            .select_class("Fighter")
            .update_meta(|m| m.level = level);
        let stats = derive(&draft, &t);
        assert_eq!(stats.proficiency_bonus, 6);
        // d10 with CON 8 (-1): 9, then 5 for each of 19 more levels.
        assert_eq!(stats.hit_points, Some(9 + 5 * 19));
    }
}

#[test]
fn locked_casters_have_no_spell_dc() {
    let t = tables();
    let paladin = CharacterDraft::new().select_class("Paladin");
    let stats = derive(&paladin, &t);
    assert!(matches!(stats.spellcasting, SpellcastingStatus::Locked { .. }));
    assert_eq!(stats.spell_save_dc, None);
    assert_eq!(stats.spell_attack_bonus, None);

    let stats = derive(&paladin.update_meta(|m| m.level = 2), &t);
    // CHA 8 (-1), PB 2.
    assert_eq!(stats.spell_save_dc, Some(9));
    assert_eq!(stats.spell_attack_bonus, Some(1));
}

#[test]
fn languages_and_tools_come_from_race_and_background() {
    let t = tables();
    let draft = CharacterDraft::new()
        .select_race("Dwarf", Some("Hill Dwarf"), &t)
        .select_background("Noble")
        .toggle_background_language("Elvish")
        .toggle_background_language("dwarvish");
    let stats = derive(&draft, &t);
    assert_eq!(stats.languages, vec!["Common", "Dwarvish", "Elvish"]);
    assert_eq!(stats.tools, vec!["one type of gaming set"]);
    assert_eq!(draft.applied_abilities(&t), stats.abilities);
}

#[test]
fn simple_combat_numbers() {
    assert_eq!(initiative(3), 3);
    assert_eq!(passive_perception(-1), 9);
    assert_eq!(armor_class(2), 12);
    assert_eq!(spell_save_dc(2, 3), 13);
    assert_eq!(spell_attack_bonus(2, 3), 5);
}

#[test]
fn full_caster_third_level_slots() {
    let budget = spell_slot_budget(CasterProgression::Full, 3);
    assert_eq!(
        budget,
        SlotBudget::Slots {
            slots: [4, 2, 0, 0, 0, 0, 0, 0, 0]
        }
    );
    assert_eq!(budget.max_leveled_spells(), 6);
    assert_eq!(budget.slots_at(2), 2);
    assert_eq!(budget.highest_slot_level(), 2);
}

#[test]
fn half_caster_uses_halved_level() {
    assert_eq!(half_caster_effective_level(3), 2);
    assert_eq!(half_caster_effective_level(20), 10);
    let budget = spell_slot_budget(CasterProgression::Half, 3);
    assert_eq!(
        budget,
        SlotBudget::Slots {
            slots: [3, 0, 0, 0, 0, 0, 0, 0, 0]
        }
    );
    assert_eq!(budget.max_leveled_spells(), 3);
}

#[test]
fn warlock_pact_slots() {
    let budget = spell_slot_budget(CasterProgression::Warlock, 5);
    assert_eq!(
        budget,
        SlotBudget::Pact {
            slots: 2,
            slot_level: 3
        }
    );
    assert_eq!(budget.max_leveled_spells(), 2);
    assert_eq!(budget.slots_at(3), 2);
    assert_eq!(budget.slots_at(1), 0);
}

#[test]
fn spellcasting_status_distinguishes_absent_and_locked() {
    let t = tables();
    let fighter = t.class("Fighter").unwrap();
    assert_eq!(spellcasting_status(fighter, 5), SpellcastingStatus::Absent);

    let paladin = t.class("Paladin").unwrap();
    let locked = spellcasting_status(paladin, 1);
    assert!(matches!(
        locked,
        SpellcastingStatus::Locked { unlocks_at: 2, .. }
    ));
    assert_eq!(locked.max_leveled_spells(), 0);
    assert_eq!(locked.casting_ability(), Some(Ability::Cha));

    let open = spellcasting_status(paladin, 2);
    assert!(open.is_available());
    assert_eq!(open.max_leveled_spells(), 2);

    let warlock = t.class("Warlock").unwrap();
    assert!(spellcasting_status(warlock, 1).is_available());
}

#[test]
fn racial_bonuses_stack_and_cap() {
    let t = tables();
    let dwarf = t.race("Dwarf").unwrap();
    let hill = dwarf.subrace("Hill Dwarf");
    let base = Abilities::uniform(10).with(Ability::Con, 19);
    let applied = apply_racial_bonuses(&base, Some(dwarf), hill);
    assert_eq!(applied.constitution, 20);
    assert_eq!(applied.wisdom, 11);
    assert_eq!(applied.strength, 10);

    assert_eq!(apply_racial_bonuses(&base, None, None), base);
}

#[test]
fn race_summary_prefers_subrace_values() {
    let t = tables();
    let elf = t.race("elf").unwrap();

    let wood = race_summary(elf, elf.subrace("Wood Elf"));
    assert_eq!(wood.speed, 35);
    assert_eq!(wood.darkvision, Some(60));
    assert_eq!(wood.features.first().unwrap().name, "Keen Senses");
    assert_eq!(wood.features.last().unwrap().name, "Mask of the Wild");

    let drow = race_summary(elf, elf.subrace("Drow"));
    assert_eq!(drow.speed, 30);
    assert_eq!(drow.darkvision, Some(120));

    let high = race_summary(elf, elf.subrace("High Elf"));
    assert_eq!(high.languages, vec!["Common", "Elvish", "Choice"]);
}

#[test]
fn derive_on_empty_draft_has_defaults() {
    let t = tables();
    let stats = derive(&CharacterDraft::new(), &t);
    assert_eq!(stats.level, 1);
    assert_eq!(stats.proficiency_bonus, 2);
    assert_eq!(stats.abilities, Abilities::uniform(8));
    assert_eq!(stats.speed, 30);
    assert_eq!(stats.hit_points, None);
    assert_eq!(stats.armor_class, 9);
    assert_eq!(stats.passive_perception, 9);
    assert_eq!(stats.spellcasting, SpellcastingStatus::Absent);
    assert_eq!(stats.spell_save_dc, None);
    assert!(stats.inventory.is_empty());
}

#[test]
fn derive_full_record_for_hill_dwarf_cleric() {
    let t = tables();
    let mut draft = CharacterDraft::new()
        .select_race("Dwarf", Some("Hill Dwarf"), &t)
        .select_class("Cleric")
        .update_meta(|m| {
            m.background = "Acolyte".into();
            m.level = 3;
        })
        .switch_method(GenerationMethod::StandardArray);
    for (value, ability) in [
        (15, Ability::Wis),
        (14, Ability::Con),
        (13, Ability::Str),
        (12, Ability::Dex),
        (10, Ability::Cha),
        (8, Ability::Int),
    ] {
        draft = draft.assign_standard(value, ability).unwrap();
    }
    draft = draft
        .toggle_skill(chargen::Skill::Medicine)
        .toggle_skill(chargen::Skill::History)
        .choose_equipment(&t, 0, "a mace")
        .unwrap()
        .set_inventory_text("rope\n\n  lantern  \n");

    let stats = derive(&draft, &t);
    assert_eq!(stats.base_abilities.wisdom, 15);
    assert_eq!(stats.abilities.wisdom, 16);
    assert_eq!(stats.abilities.constitution, 16);
    assert_eq!(stats.modifiers[&Ability::Wis], 3);
    assert_eq!(stats.speed, 25);
    assert_eq!(stats.hit_die, Some(8));
    // 8 + 3, then (5 + 3) twice.
    assert_eq!(stats.hit_points, Some(27));
    assert_eq!(stats.armor_class, 11);
    assert_eq!(stats.initiative, 1);
    assert_eq!(stats.passive_perception, 13);
    assert_eq!(stats.saving_throws[&Ability::Wis], 5);
    assert_eq!(stats.saving_throws[&Ability::Str], 1);
    // Medicine from the class, Religion and Insight from the background.
    assert_eq!(stats.skills[&chargen::Skill::Medicine], 5);
    assert_eq!(stats.skills[&chargen::Skill::Religion], 1);
    assert_eq!(stats.skills[&chargen::Skill::Insight], 5);
    assert_eq!(stats.skills[&chargen::Skill::Perception], 3);
    assert_eq!(stats.spell_save_dc, Some(13));
    assert_eq!(stats.spell_attack_bonus, Some(5));
    assert_eq!(stats.max_leveled_spells, 6);
    assert_eq!(stats.inventory.first().map(String::as_str), Some("a mace"));
    assert_eq!(
        &stats.inventory[stats.inventory.len() - 2..],
        ["rope".to_string(), "lantern".to_string()]
    );
}
