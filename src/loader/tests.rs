// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LoadOptions, load_ruleset};
use crate::error::OxmodError;
use crate::report::ErrorKind;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// a total conversion master avoids the vanilla resource seeding,
// which needs a real game install
const MASTER_META: &str =
    "id: magic\nname: Magic\nversion: '1.0'\nauthor: t\ndescription: tc\nisMaster: true\n";

fn install(active: &[&str]) -> TempDir {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    fs::create_dir_all(temp.path().join("standard")).unwrap();
    fs::create_dir_all(temp.path().join("user/mods")).unwrap();
    let mods = active
        .iter()
        .map(|id| format!("  - id: {id}\n    active: true"))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(
        temp.path().join("user/options.cfg"),
        format!("mods:\n{mods}\noptions:\n  language: en-US\n"),
    )
    .unwrap();
    temp
}

fn write_mod(root: &Path, dir: &str, metadata: &str, rules: &[(&str, &str)]) -> PathBuf {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("metadata.yml"), metadata).unwrap();
    for (name, body) in rules {
        let file = path.join(name);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, body).unwrap();
    }
    path
}

fn addon_meta(id: &str) -> String {
    format!("id: {id}\nname: {id}\nversion: '1.0'\nauthor: t\ndescription: d\nmaster: magic\n")
}

fn get_entry<'a>(value: &'a Value, field: &str, wanted: &str) -> &'a serde_yaml::Mapping {
    value
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(Value::as_mapping)
        .find(|m| m.get(field).and_then(Value::as_str) == Some(wanted))
        .unwrap_or_else(|| panic!("no entry with {field}={wanted}"))
}

#[test]
fn test_load_merges_addon_over_master() {
    let temp = install(&["magic", "addon"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[("items.rul", "items:\n  - type: STR_GUN\n    damage: 5\n    weight: 3\n")],
    );
    write_mod(
        &temp.path().join("user/mods"),
        "addon",
        &addon_meta("addon"),
        &[("patch.rul", "items:\n  - type: STR_GUN\n    damage: 7\n")],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();

    let items = outcome.ruleset.get("items").unwrap();
    let gun = get_entry(items, "type", "STR_GUN");
    assert_eq!(gun.get("damage").unwrap(), &Value::from(7));
    assert_eq!(gun.get("weight").unwrap(), &Value::from(3));
    assert_eq!(gun.get("_mod_index").unwrap(), &Value::from(1));
    assert!(outcome.report.is_empty());
}

#[test]
fn test_ruleset_subdir_is_loaded() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[
            ("base.rul", "items:\n  - type: STR_GUN\n"),
            ("Ruleset/extra.rul", "items:\n  - type: STR_AMMO\n"),
        ],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    let items = outcome.ruleset.get("items").unwrap();
    assert_eq!(items.as_sequence().unwrap().len(), 2);
}

#[test]
fn test_unknown_collection_is_fatal() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[("bad.rul", "noSuchCollection:\n  - type: X\n")],
    );

    let err = load_ruleset(temp.path(), &LoadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("unknown collection 'noSuchCollection'"));
}

#[test]
fn test_delete_of_missing_entry_is_reported_not_fatal() {
    let temp = install(&["magic", "addon"]);
    write_mod(&temp.path().join("standard"), "magic", MASTER_META, &[]);
    write_mod(
        &temp.path().join("user/mods"),
        "addon",
        &addon_meta("addon"),
        &[("del.rul", "items:\n  - delete: STR_GHOST\n")],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report[0].kind, ErrorKind::UnresolvedReference);
    assert!(outcome.report[0].file.ends_with("del.rul"));
    assert_eq!(outcome.report[0].section, "items");
}

#[test]
fn test_strict_mode_aborts_on_first_report() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[("del.rul", "items:\n  - delete: STR_GHOST\n")],
    );

    let options = LoadOptions::builder().strict(true).build();
    let err = load_ruleset(temp.path(), &options).unwrap_err();
    assert!(matches!(err, OxmodError::Strict(_)));
}

#[test]
fn test_mod_meta_and_config_attached() {
    let temp = install(&["magic"]);
    write_mod(&temp.path().join("standard"), "magic", MASTER_META, &[]);

    let options = LoadOptions::builder().language("de".to_string()).build();
    let outcome = load_ruleset(temp.path(), &options).unwrap();

    let meta = outcome.ruleset.get("_mod_meta").unwrap();
    let master = get_entry(meta, "id", "magic");
    assert_eq!(master.get("index").unwrap(), &Value::from(0));

    // the language override lands in the attached config
    let config = outcome.ruleset.get("_config").unwrap().as_mapping().unwrap();
    let options_map = config.get("options").unwrap().as_mapping().unwrap();
    assert_eq!(options_map.get("language").unwrap(), &Value::from("de"));
}

#[test]
fn test_integrity_findings_reach_the_report() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[(
            "units.rul",
            "units:\n  - type: STR_SECTOID\n    armor: STR_GHOST_ARMOR\n",
        )],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report[0].kind, ErrorKind::ReferentialIntegrityViolation);
    assert_eq!(outcome.report[0].file, "after_load_checks");
}

#[test]
fn test_soldier_name_delete_resets_accumulated_pools() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[
            ("SoldierName/Alpha.nam", ""),
            ("SoldierName/Beta.nam", ""),
            ("ExtraNames/Gamma.nam", ""),
            ("ExtraNames/readme.txt", ""),
            (
                "soldiers.rul",
                "soldiers:\n  - type: STR_SOLDIER\n    soldierNames:\n      - SoldierName/\n      - delete\n      - ExtraNames/\n",
            ),
        ],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty(), "unexpected: {:?}", outcome.report);

    let soldiers = outcome.ruleset.get("soldiers").unwrap();
    let soldier = get_entry(soldiers, "type", "STR_SOLDIER");
    let names = soldier.get("soldierNames").unwrap().as_sequence().unwrap();
    // 'delete' dropped the first pool; non-.nam files never qualify
    assert_eq!(names.len(), 1);
    assert!(names[0].as_str().unwrap().ends_with("Gamma.nam"));
}

#[test]
fn test_sprite_file_globs_expand_in_scope() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[
            ("Resources/sheet/a.png", ""),
            ("Resources/sheet/b.png", ""),
            ("Resources/single.png", ""),
            (
                "sprites.rul",
                "extraSprites:\n  - type: SHEET.PCK\n    width: 512\n    files:\n      0: Resources/sheet/*.png\n  - type: SINGLE.PCK\n    files:\n      0: Resources/single.png\n",
            ),
        ],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty(), "unexpected: {:?}", outcome.report);

    let sprites = outcome.ruleset.get("extraSprites").unwrap();

    let sheet = get_entry(sprites, "type", "SHEET.PCK");
    let files = sheet.get("files").unwrap().as_mapping().unwrap();
    let (_, expanded) = files.iter().next().unwrap();
    let parts = expanded.as_sequence().unwrap();
    assert_eq!(parts.len(), 2);
    assert!(parts[0].as_str().unwrap().ends_with("a.png"));
    assert!(parts[1].as_str().unwrap().ends_with("b.png"));

    // one match collapses back to a scalar path
    let single = get_entry(sprites, "type", "SINGLE.PCK");
    let files = single.get("files").unwrap().as_mapping().unwrap();
    let (_, expanded) = files.iter().next().unwrap();
    assert!(expanded.as_str().unwrap().ends_with("single.png"));
}

#[test]
fn test_vanilla_seeding_for_xcom1() {
    let temp = install(&["xcom1"]);
    let root = write_mod(
        &temp.path().join("standard"),
        "xcom1",
        "id: xcom1\nname: UFO\nversion: '1.0'\nauthor: t\ndescription: v\nisMaster: true\n",
        &[],
    );
    // minimal fake game data inside the mod's own scope
    for file in [
        "GEODATA/INTERWIN.DAT",
        "GEODATA/SCANG.DAT",
        "GEODATA/LOFTEMPS.DAT",
        "GEODATA/PALETTES.DAT",
        "GEODATA/BACKPALS.DAT",
        "GEOGRAPH/TEXTURE.DAT",
        "GEOGRAPH/BASEBITS.PCK",
        "GEOGRAPH/INTICON.PCK",
        "GEOGRAPH/BACK01.SCR",
        "UFOGRAPH/SPICONS.DAT",
        "UFOGRAPH/CURSOR.PCK",
        "UFOGRAPH/SMOKE.PCK",
        "UFOGRAPH/HIT.PCK",
        "UFOGRAPH/X1.PCK",
        "UFOGRAPH/MEDIBITS.DAT",
        "UFOGRAPH/DETBLOB.DAT",
        "UFOGRAPH/TAC00.SCR",
        "UNITS/HANDOB.PCK",
    ] {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }
    fs::create_dir_all(root.join("Language")).unwrap();
    fs::write(
        root.join("Language/en-US.yml"),
        "en-US:\n  STR_OK: OK\n  STR_UFO: UFO\n",
    )
    .unwrap();

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty(), "unexpected: {:?}", outcome.report);

    let sprites = outcome.ruleset.get("extraSprites").unwrap();
    let handob = get_entry(sprites, "type", "HANDOB02.PCK");
    assert_eq!(handob.get("subX").unwrap(), &Value::from(32));
    // the full-screen image picked up by glob
    get_entry(sprites, "type", "BACK01.SCR");

    let palettes = outcome.ruleset.get("_palettes").unwrap().as_mapping().unwrap();
    let graphs = palettes.get("PAL_GRAPHS").unwrap().as_mapping().unwrap();
    assert_eq!(graphs.get("offs").unwrap(), &Value::from(2 * (768 + 6)));
    assert_eq!(graphs.get("size").unwrap(), &Value::from(768));

    assert_eq!(outcome.ruleset.translate("STR_OK", "en-US"), "OK");
    // unknown language falls back to en-US
    assert_eq!(outcome.ruleset.translate("STR_UFO", "xx"), "UFO");
}

#[test]
fn test_vanilla_seeding_for_xcom2_body_screens() {
    let temp = install(&["xcom2"]);
    let root = write_mod(
        &temp.path().join("standard"),
        "xcom2",
        "id: xcom2\nname: TFTD\nversion: '1.0'\nauthor: t\ndescription: v\nisMaster: true\n",
        &[],
    );
    for file in [
        "GEODATA/INTERWIN.DAT",
        "GEODATA/SCANG.DAT",
        "GEODATA/PALETTES.DAT",
        "GEODATA/BACKPALS.DAT",
        "GEOGRAPH/TEXTURE.DAT",
        "GEOGRAPH/BASEBITS.PCK",
        "GEOGRAPH/INTICON.PCK",
        // TFTD keeps loftemps under TERRAIN
        "TERRAIN/LOFTEMPS.DAT",
        "UFOGRAPH/SPICONS.DAT",
        "UFOGRAPH/CURSOR.PCK",
        "UFOGRAPH/SMOKE.PCK",
        "UFOGRAPH/HIT.PCK",
        "UFOGRAPH/X1.PCK",
        "UFOGRAPH/MEDIBITS.DAT",
        "UFOGRAPH/DETBLOB.DAT",
        "UFOGRAPH/TAC00.SCR",
        "UFOGRAPH/ICONS.PCK",
        "UFOGRAPH/MANBDY.BDY",
        "UFOGRAPH/TAC01.BDY",
        "UFOGRAPH/CORBITS.BDY",
        "UNITS/HANDOB.PCK",
    ] {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty(), "unexpected: {:?}", outcome.report);

    let sprites = outcome.ruleset.get("extraSprites").unwrap();

    // optional screens always register as SPK
    let icons = get_entry(sprites, "type", "ICONS.PCK");
    assert_eq!(icons.get("resType").unwrap(), &Value::from("SPK"));
    assert_eq!(icons.get("singleImage").unwrap(), &Value::from(true));

    // body files stand in for the sheet named by their stem
    let man = get_entry(sprites, "type", "MANBDY.SPK");
    assert_eq!(man.get("resType").unwrap(), &Value::from("BDY"));
    let tac = get_entry(sprites, "type", "TAC01.SCR");
    assert_eq!(tac.get("resType").unwrap(), &Value::from("BDY"));
    let cor = get_entry(sprites, "type", "CORBITS.PCK");
    assert_eq!(cor.get("resType").unwrap(), &Value::from("BDY"));

    // loftemps resolved from the TFTD location
    let loft = get_entry(sprites, "type", "LOFTEMPS.DAT");
    let files = loft.get("files").unwrap().as_mapping().unwrap();
    let (_, path) = files.iter().next().unwrap();
    assert!(path.as_str().unwrap().ends_with("TERRAIN/LOFTEMPS.DAT"));
}
