// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::after_load_checks;
use crate::report::{ErrorKind, ErrorSink};
use crate::ruleset::Ruleset;

fn ruleset(sections: &[(&str, &str)]) -> Ruleset {
    let mut rs = Ruleset::new();
    rs.insert(
        "_mod_meta".to_string(),
        serde_yaml::from_str("[{id: base}]").unwrap(),
    );
    for (name, body) in sections {
        rs.insert((*name).to_string(), serde_yaml::from_str(body).unwrap());
    }
    rs
}

fn check(rs: &Ruleset) -> Vec<crate::report::ErrorRecord> {
    let mut sink = ErrorSink::lenient();
    after_load_checks(rs, &mut sink).unwrap();
    sink.into_records()
}

#[test]
fn test_clean_ruleset_passes() {
    let rs = ruleset(&[
        ("items", "[{type: STR_GUN, _mod_index: 0}]"),
        ("research", "[{name: STR_LASERS, _mod_index: 0}]"),
        (
            "manufacture",
            "[{name: STR_GUN, requires: [STR_LASERS], requiredItems: {STR_GUN: 1}, _mod_index: 0}]",
        ),
    ]);
    assert!(check(&rs).is_empty());
}

#[test]
fn test_manufacture_missing_research_and_items() {
    let rs = ruleset(&[
        ("items", "[{type: STR_GUN}]"),
        (
            "manufacture",
            "[{name: STR_GUN, requires: [STR_GHOST_TECH], requiredItems: {STR_GHOST_PART: 2}, _mod_index: 0}]",
        ),
    ]);
    let records = check(&rs);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.kind == ErrorKind::ReferentialIntegrityViolation));
    assert!(records[0].message.contains("STR_GHOST_TECH"));
    assert!(records[1].message.contains("STR_GHOST_PART"));
    assert!(records[0].message.contains("base/STR_GUN"));
}

#[test]
fn test_manufacture_implicit_produced_item() {
    // no producedItems means the project yields an item of its own name
    let rs = ruleset(&[(
        "manufacture",
        "[{name: STR_NOT_AN_ITEM, _mod_index: 0}]",
    )]);
    let records = check(&rs);
    assert_eq!(records.len(), 1);
    assert!(records[0].message.contains("produced items not defined"));
}

#[test]
fn test_crafts_and_units_count_as_items() {
    let rs = ruleset(&[
        ("crafts", "[{type: STR_SKYRANGER}]"),
        (
            "manufacture",
            "[{name: STR_SKYRANGER, producedItems: {STR_SKYRANGER: 1}, _mod_index: 0}]",
        ),
    ]);
    assert!(check(&rs).is_empty());
}

#[test]
fn test_research_dangling_references() {
    let rs = ruleset(&[(
        "research",
        "[{name: STR_A, dependencies: [STR_MISSING], _mod_index: 0}]",
    )]);
    let records = check(&rs);
    assert_eq!(records.len(), 1);
    assert!(records[0].message.contains("STR_MISSING"));
    assert_eq!(records[0].section, "research");
}

#[test]
fn test_need_item_unreachable() {
    let rs = ruleset(&[(
        "research",
        "[{name: STR_ALIEN_TOPIC, needItem: true, _mod_index: 0}]",
    )]);
    let records = check(&rs);
    assert_eq!(records.len(), 1);
    assert!(records[0].message.contains("unreachable research topic"));
}

#[test]
fn test_need_item_reachable_via_get_one_free() {
    let rs = ruleset(&[(
        "research",
        "[{name: STR_GRANTOR, getOneFree: [STR_ALIEN_TOPIC], _mod_index: 0}, {name: STR_ALIEN_TOPIC, needItem: true, _mod_index: 0}]",
    )]);
    assert!(check(&rs).is_empty());
}

#[test]
fn test_need_item_reachable_via_mission_unlock() {
    let rs = ruleset(&[
        (
            "research",
            "[{name: STR_CYDONIA, needItem: true, _mod_index: 0}]",
        ),
        (
            "alienDeployments",
            "[{type: STR_MARS, unlockedResearch: STR_CYDONIA}]",
        ),
    ]);
    assert!(check(&rs).is_empty());
}

#[test]
fn test_item_checks() {
    let rs = ruleset(&[
        ("itemCategories", "[{type: STR_WEAPONS}]"),
        (
            "items",
            "[{type: STR_RIFLE, compatibleAmmo: [STR_GHOST_CLIP], categories: [STR_WEAPONS, STR_GHOSTS], _mod_index: 0}]",
        ),
    ]);
    let records = check(&rs);
    assert_eq!(records.len(), 2);
    assert!(records[0].message.contains("STR_GHOST_CLIP"));
    assert!(records[1].message.contains("STR_GHOSTS"));
}

#[test]
fn test_unit_armor_check() {
    let rs = ruleset(&[
        ("armors", "[{type: STR_SECTOID_ARMOR}]"),
        (
            "units",
            "[{type: STR_SECTOID, armor: STR_SECTOID_ARMOR, _mod_index: 0}, {type: STR_FLOATER, armor: STR_GHOST_ARMOR, _mod_index: 0}]",
        ),
    ]);
    let records = check(&rs);
    assert_eq!(records.len(), 1);
    assert!(records[0].message.contains("STR_FLOATER"));
    assert!(records[0].message.contains("STR_GHOST_ARMOR"));
}

#[test]
fn test_base_func_provided_by_facility() {
    let rs = ruleset(&[
        (
            "facilities",
            "[{type: STR_LAB, provideBaseFunc: [STR_RESEARCH_FUNC]}]",
        ),
        (
            "research",
            "[{name: STR_A, requiresBaseFunc: [STR_RESEARCH_FUNC], _mod_index: 0}]",
        ),
    ]);
    assert!(check(&rs).is_empty());
}
