// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the full load pipeline.
//!
//! Builds throwaway installations on disk and runs `load_ruleset` over
//! them, end to end.

use oxmod_rs::error::OxmodError;
use oxmod_rs::loader::{LoadOptions, load_ruleset};
use oxmod_rs::report::ErrorKind;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

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

fn write_mod(root: &Path, dir: &str, metadata: &str, files: &[(&str, &str)]) -> PathBuf {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("metadata.yml"), metadata).unwrap();
    for (name, body) in files {
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

// =============================================================================
// Merging across the load order
// =============================================================================

#[test]
fn load_merges_update_delete_and_insert() {
    let temp = install(&["magic", "patch", "total"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[(
            "items.rul",
            "items:\n  - type: STR_GUN\n    damage: 5\n    weight: 3\n  - type: STR_AMMO\n    damage: 0\n",
        )],
    );
    // two addons stacked on the master, in options.cfg order
    write_mod(
        &temp.path().join("user/mods"),
        "patch",
        &addon_meta("patch"),
        &[("a.rul", "items:\n  - type: STR_GUN\n    damage: 7\n")],
    );
    write_mod(
        &temp.path().join("user/mods"),
        "total",
        &addon_meta("total"),
        &[(
            "b.rul",
            "items:\n  - delete: STR_GUN\n  - type: STR_LASER\n    damage: 20\n",
        )],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty());

    let items = outcome.ruleset.get("items").unwrap();
    let seq = items.as_sequence().unwrap();
    assert_eq!(seq.len(), 2);
    // the gun was updated by 'patch' and then deleted by 'total'
    get_entry(items, "type", "STR_AMMO");
    let laser = get_entry(items, "type", "STR_LASER");
    assert_eq!(laser.get("_mod_index").unwrap(), &Value::from(2));
}

#[test]
fn load_extra_strings_accumulate_across_mods() {
    let temp = install(&["magic", "addon"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[(
            "strings.rul",
            "extraStrings:\n  - type: en-US\n    strings:\n      STR_A: alpha\n      STR_B: beta\n",
        )],
    );
    write_mod(
        &temp.path().join("user/mods"),
        "addon",
        &addon_meta("addon"),
        &[(
            "strings.rul",
            "extraStrings:\n  - type: en-US\n    strings:\n      STR_B: bravo\n",
        )],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert_eq!(outcome.ruleset.translate("STR_A", "en-US"), "alpha");
    assert_eq!(outcome.ruleset.translate("STR_B", "en-US"), "bravo");
    assert_eq!(outcome.ruleset.translate("STR_C", "en-US"), "STR_C");
}

#[test]
fn load_resolves_terrain_paths_in_mod_scope() {
    let temp = install(&["magic", "addon"]);
    let master_root = write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[
            ("MAPS/CULTA00.MAP", ""),
            ("ROUTES/CULTA00.RMP", ""),
            ("TERRAIN/CULTIVAT.MCD", ""),
            ("TERRAIN/CULTIVAT.PCK", ""),
            ("TERRAIN/CULTIVAT.TAB", ""),
        ],
    );
    // the addon overrides one map block file; the rest comes from the
    // master's scope
    let addon_root = write_mod(
        &temp.path().join("user/mods"),
        "addon",
        &addon_meta("addon"),
        &[
            ("maps/CULTA00.MAP", ""),
            (
                "terrain.rul",
                "terrains:\n  - name: CULTA\n    mapDataSets: [CULTIVAT]\n    mapBlocks:\n      - name: CULTA00\n        width: 10\n",
            ),
        ],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty(), "unexpected: {:?}", outcome.report);

    let terrains = outcome.ruleset.get("terrains").unwrap();
    let culta = get_entry(terrains, "name", "CULTA");

    let map_files = culta.get("mapFiles").unwrap().as_sequence().unwrap();
    let map = map_files[0].as_mapping().unwrap().get("map").unwrap().as_str().unwrap();
    assert!(Path::new(map).starts_with(&addon_root));

    let data_files = culta.get("mapDataFiles").unwrap().as_sequence().unwrap();
    let mcd = data_files[0].as_mapping().unwrap().get("mcd").unwrap().as_str().unwrap();
    assert!(Path::new(mcd).starts_with(&master_root));
}

#[test]
fn load_missing_map_files_become_null_placeholders() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[(
            "terrain.rul",
            "terrains:\n  - name: GHOST\n    mapDataSets: []\n    mapBlocks:\n      - name: NOWHERE\n",
        )],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report[0].kind, ErrorKind::UnresolvedReference);
    // expansion-time reports carry the file being expanded
    assert!(outcome.report[0].file.ends_with("terrain.rul"));
    assert_eq!(outcome.report[0].section, "terrains");

    let terrains = outcome.ruleset.get("terrains").unwrap();
    let ghost = get_entry(terrains, "name", "GHOST");
    let map_files = ghost.get("mapFiles").unwrap().as_sequence().unwrap();
    assert_eq!(map_files[0].as_mapping().unwrap().get("map").unwrap(), &Value::Null);
}

#[test]
fn cutscene_videos_skip_files_that_do_not_resolve() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[
            ("Resources/Videos/intro.mp4", ""),
            (
                "cutscenes.rul",
                "cutscenes:\n  - type: intro\n    videos:\n      - Resources/Videos/intro.mp4\n      - Resources/Videos/lost.mp4\n",
            ),
        ],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    // the missing video is reported once, against the file that named it
    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report[0].kind, ErrorKind::UnresolvedReference);
    assert!(outcome.report[0].file.ends_with("cutscenes.rul"));
    assert_eq!(outcome.report[0].section, "cutscenes");
    assert!(outcome.report[0].message.contains("lost.mp4"));

    // the entry survives with the resolvable video only
    let scenes = outcome.ruleset.get("cutscenes").unwrap();
    let intro = get_entry(scenes, "type", "intro");
    let videos = intro.get("videos").unwrap().as_sequence().unwrap();
    assert_eq!(videos.len(), 1);
    assert!(videos[0].as_str().unwrap().ends_with("intro.mp4"));
}

// =============================================================================
// Error accumulation and strict mode
// =============================================================================

#[test]
fn lenient_load_accumulates_every_problem() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[(
            "bad.rul",
            "items:\n  - delete: STR_GHOST_A\n  - delete: STR_GHOST_B\n  - damage: 1\n",
        )],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    let kinds: Vec<ErrorKind> = outcome.report.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::UnresolvedReference,
            ErrorKind::UnresolvedReference,
            ErrorKind::MalformedEntry,
        ]
    );
}

#[test]
fn strict_load_stops_at_the_first_problem() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[("bad.rul", "items:\n  - delete: STR_GHOST_A\n  - delete: STR_GHOST_B\n")],
    );

    let options = LoadOptions::builder().strict(true).build();
    let err = load_ruleset(temp.path(), &options).unwrap_err();
    match err {
        OxmodError::Strict(message) => assert!(message.contains("STR_GHOST_A")),
        other => panic!("expected strict error, got {other}"),
    }
}

#[test]
fn malformed_yaml_is_fatal_even_when_lenient() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[("broken.rul", "items:\n  - type: [unclosed\n")],
    );

    let err = load_ruleset(temp.path(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, OxmodError::Data(_)));
}

// =============================================================================
// Case-insensitive resource resolution
// =============================================================================

#[test]
fn resource_lookup_ignores_case() {
    let temp = install(&["magic"]);
    write_mod(
        &temp.path().join("standard"),
        "magic",
        MASTER_META,
        &[
            ("Resources/Globe/world.dat", ""),
            ("globe.rul", "globe:\n  data: RESOURCES/GLOBE/WORLD.DAT\n"),
        ],
    );

    let outcome = load_ruleset(temp.path(), &LoadOptions::default()).unwrap();
    assert!(outcome.report.is_empty());

    let globe = outcome.ruleset.get("globe").unwrap().as_mapping().unwrap();
    let data = globe.get("data").unwrap().as_str().unwrap();
    // the resolved path keeps the on-disk spelling
    assert!(data.ends_with("Resources/Globe/world.dat"));
}
