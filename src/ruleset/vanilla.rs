// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Vanilla resource seeding.
//!
//! The original game data carries no rule files: the engine hardcodes
//! its surface table, palette offsets and translation files. When the
//! root master is one of the two vanilla games, this module synthesizes
//! those resources as regular collections (`extraSprites`,
//! `extraStrings`, `_palettes`) so every later mod merges on top of a
//! uniform representation. Missing game files are reported, not fatal;
//! a partial install still loads what it can.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::debug;

use super::expand::ModScope;
use super::merge::{PROVENANCE_KEY, merge_collection};
use super::schema::{CustomMerge, MergeStrategy};
use crate::error::{DataError, OxmodResult};
use crate::report::{ErrorKind, ErrorSink};

/// Root master ids that get vanilla seeding.
pub const VANILLA_MASTERS: &[&str] = &["xcom1", "xcom2"];

/// Collection name the palette table is stored under. The leading
/// underscore keeps it out of the authored-rule namespace.
pub const PALETTES_KEY: &str = "_palettes";

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn num(value: u64) -> Value {
    Value::Number(serde_yaml::Number::from(value))
}

fn files_entry(path: Value) -> Value {
    let mut files = Mapping::new();
    files.insert(num(0), path);
    Value::Mapping(files)
}

/// Fixed-geometry sprite sheets, looked up at a known location.
/// `(type, pattern, resType, dimension fields)`
type FixedSurface = (&'static str, &'static str, Option<&'static str>, &'static [(&'static str, u64)]);

const GEOSCAPE_SURFACES: &[FixedSurface] = &[
    ("INTERWIN.DAT", "GEODATA/INTERWIN.DAT", Some("SCR"), &[("width", 160), ("height", 600), ("subX", 160)]),
    ("TEXTURE.DAT", "GEOGRAPH/TEXTURE.DAT", None, &[("subX", 32), ("subY", 32)]),
    ("BASEBITS.PCK", "GEOGRAPH/BASEBITS.PCK", None, &[("subX", 32), ("subY", 40)]),
    ("INTICON.PCK", "GEOGRAPH/INTICON.PCK", None, &[("subX", 32), ("subY", 40)]),
    ("SCANG.DAT", "GEODATA/SCANG.DAT", None, &[("subX", 4), ("subY", 4)]),
];

const BATTLESCAPE_SURFACES: &[FixedSurface] = &[
    ("SPICONS.DAT", "UFOGRAPH/SPICONS.DAT", None, &[("subX", 32), ("subY", 24)]),
    ("CURSOR.PCK", "UFOGRAPH/CURSOR.PCK", None, &[("subX", 32), ("subY", 40)]),
    ("SMOKE.PCK", "UFOGRAPH/SMOKE.PCK", None, &[("subX", 32), ("subY", 40)]),
    ("HIT.PCK", "UFOGRAPH/HIT.PCK", None, &[("subX", 32), ("subY", 40)]),
    ("X1.PCK", "UFOGRAPH/X1.PCK", None, &[("subX", 128), ("subY", 64)]),
    ("MEDIBITS.DAT", "UFOGRAPH/MEDIBITS.DAT", None, &[("subX", 52), ("subY", 58)]),
    ("DETBLOB.DAT", "UFOGRAPH/DETBLOB.DAT", None, &[("subX", 16), ("subY", 16)]),
];

/// Standalone full-screen images, loaded per-file where the glob
/// matches. Absence is normal; UFO and TFTD installs differ.
const OPTIONAL_SCREENS: &[&str] = &[
    "UFOGRAPH/TAC01.SCR",
    "UFOGRAPH/DETBORD.PCK",
    "UFOGRAPH/DETBORD2.PCK",
    "UFOGRAPH/ICONS.PCK",
    "UFOGRAPH/MEDIBORD.PCK",
    "UFOGRAPH/SCANBORD.PCK",
    "UFOGRAPH/UNIBORD.PCK",
];

const GEOSCAPE_PALETTES: &[&str] = &[
    "PAL_GEOSCAPE",
    "PAL_BASESCAPE",
    "PAL_GRAPHS",
    "PAL_UFOPAEDIA",
    "PAL_BATTLEPEDIA",
];

// each palette record in PALETTES.DAT is 256 RGB triplets + 6 bytes
const PALETTE_STRIDE: u64 = 768 + 6;

fn fixed_surface(stype: &str, res_type: Option<&str>, dims: &[(&str, u64)], path: Value) -> Value {
    let mut map = Mapping::new();
    map.insert(key("type"), key(stype));
    for (field, value) in dims {
        map.insert(key(field), num(*value));
    }
    if let Some(res) = res_type {
        map.insert(key("resType"), key(res));
    }
    map.insert(key("files"), files_entry(path));
    Value::Mapping(map)
}

/// One 320x200 single image per matched file; type is the file name,
/// resType the forced value or the file's extension.
fn single_image_surfaces(
    scope: &mut ModScope<'_>,
    pattern: &str,
    res_type: Option<&str>,
) -> Vec<Value> {
    let mut out = Vec::new();
    for path in scope.find_all(pattern) {
        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let res = res_type.map_or_else(
            || {
                path.extension()
                    .map_or_else(String::new, |e| e.to_string_lossy().to_uppercase())
            },
            str::to_string,
        );
        let mut map = Mapping::new();
        map.insert(key("type"), key(&name));
        map.insert(key("width"), num(320));
        map.insert(key("height"), num(200));
        map.insert(key("singleImage"), Value::Bool(true));
        map.insert(key("resType"), key(&res));
        map.insert(key("files"), files_entry(key(&path.display().to_string())));
        out.push(Value::Mapping(map));
    }
    out
}

fn palette_entry(file: &Value, offs: u64, size: u64) -> Value {
    let mut map = Mapping::new();
    map.insert(key("file"), file.clone());
    map.insert(key("offs"), num(offs));
    map.insert(key("size"), num(size));
    Value::Mapping(map)
}

fn found(scope: &mut ModScope<'_>, pattern: &str) -> Option<Value> {
    scope.find_first(pattern).map(|p| key(&p.display().to_string()))
}

/// Surface name a `UFOGRAPH/*.BDY` file stands in for: `MAN*` bodies
/// are SPK screens, `TAC01.BDY` is the `TAC01.SCR` overlay, the rest
/// replace PCK sheets.
fn bdy_surface_type(file_name: &str) -> String {
    let upper = file_name.to_uppercase();
    let stem = upper.strip_suffix("BDY").unwrap_or(&upper);
    if upper.starts_with("MAN") {
        format!("{stem}SPK")
    } else if stem == "TAC01." {
        "TAC01.SCR".to_string()
    } else {
        format!("{stem}PCK")
    }
}

fn surfaces(scope: &mut ModScope<'_>, sink: &mut ErrorSink) -> OxmodResult<Vec<Value>> {
    let mut out = Vec::new();
    for (stype, pattern, res, dims) in GEOSCAPE_SURFACES {
        match found(scope, pattern) {
            Some(path) => out.push(fixed_surface(stype, *res, dims, path)),
            None => sink.report(
                ErrorKind::UnresolvedReference,
                format!("vanilla surface {pattern} not found"),
            )?,
        }
    }

    out.extend(single_image_surfaces(scope, "GEOGRAPH/*.SCR", None));
    out.extend(single_image_surfaces(scope, "GEOGRAPH/*.BDY", None));
    out.extend(single_image_surfaces(scope, "GEOGRAPH/*.SPK", None));

    for (stype, pattern, res, dims) in BATTLESCAPE_SURFACES {
        match found(scope, pattern) {
            Some(path) => out.push(fixed_surface(stype, *res, dims, path)),
            None => sink.report(
                ErrorKind::UnresolvedReference,
                format!("vanilla surface {pattern} not found"),
            )?,
        }
    }

    // TFTD ships loftemps under TERRAIN, UFO under GEODATA
    let loftemps = scope
        .find_first("TERRAIN/LOFTEMPS.DAT")
        .or_else(|| scope.find_first("GEODATA/LOFTEMPS.DAT"));
    match loftemps {
        Some(path) => out.push(fixed_surface(
            "LOFTEMPS.DAT",
            Some("loftemps"),
            &[("subX", 16), ("subY", 16)],
            key(&path.display().to_string()),
        )),
        None => sink.report(
            ErrorKind::UnresolvedReference,
            "vanilla surface LOFTEMPS.DAT not found".to_string(),
        )?,
    }

    match found(scope, "UFOGRAPH/TAC00.SCR") {
        Some(path) => out.push(fixed_surface(
            "TAC00.SCR",
            None,
            &[("width", 320), ("height", 200)],
            path,
        )),
        None => sink.report(
            ErrorKind::UnresolvedReference,
            "vanilla surface UFOGRAPH/TAC00.SCR not found".to_string(),
        )?,
    }

    for pattern in OPTIONAL_SCREENS {
        out.extend(single_image_surfaces(scope, pattern, Some("SPK")));
    }

    // TFTD body-armor screens register under the sheet name they
    // replace, not their own file name
    for mut surface in single_image_surfaces(scope, "UFOGRAPH/*.BDY", None) {
        if let Value::Mapping(map) = &mut surface {
            let name = map
                .get("type")
                .and_then(Value::as_str)
                .map_or_else(String::new, bdy_surface_type);
            map.insert(key("type"), key(&name));
        }
        out.push(surface);
    }

    out.extend(single_image_surfaces(scope, "UFOGRAPH/*.SPK", None));

    // left-handed sprites reuse the right-handed sheet
    match found(scope, "UNITS/HANDOB.PCK") {
        Some(path) => out.push(fixed_surface(
            "HANDOB02.PCK",
            None,
            &[("subX", 32), ("subY", 40)],
            path,
        )),
        None => sink.report(
            ErrorKind::UnresolvedReference,
            "vanilla surface UNITS/HANDOB.PCK not found".to_string(),
        )?,
    }

    Ok(out)
}

fn palettes(scope: &mut ModScope<'_>, sink: &mut ErrorSink) -> OxmodResult<Value> {
    let mut out = Mapping::new();

    if let Some(path) = scope.find_first("GEODATA/PALETTES.DAT") {
        let file = key(&path.display().to_string());
        let mut offs = 0;
        for name in GEOSCAPE_PALETTES {
            out.insert(key(name), palette_entry(&file, offs, 256 * 3));
            offs += PALETTE_STRIDE;
        }
        out.insert(
            key("PAL_BATTLESCAPE"),
            palette_entry(&file, 4 * PALETTE_STRIDE, 256 * 3),
        );
    } else {
        sink.report(
            ErrorKind::UnresolvedReference,
            "GEODATA/PALETTES.DAT not found".to_string(),
        )?;
    }

    if let Some(path) = scope.find_first("GEODATA/BACKPALS.DAT") {
        let file = key(&path.display().to_string());
        out.insert(key("BACKPALS.DAT"), palette_entry(&file, 0, 128 * 3));
    } else {
        sink.report(
            ErrorKind::UnresolvedReference,
            "GEODATA/BACKPALS.DAT not found".to_string(),
        )?;
    }

    Ok(Value::Mapping(out))
}

/// Read every `Language/*.yml` translation file in scope. Files under a
/// `common` directory are the base layer; game-specific files merge on
/// top of them per language.
fn extra_strings(
    scope: &mut ModScope<'_>,
    mod_index: usize,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    let mut base: Vec<Value> = Vec::new();
    let mut specific: Vec<Value> = Vec::new();

    for path in scope.find_all("Language/*.yml") {
        let text = std::fs::read_to_string(&path).map_err(|e| DataError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let doc: Value = serde_yaml::from_str(&text).map_err(|e| DataError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let Value::Mapping(langs) = doc else {
            sink.set_context(path.display().to_string(), "extraStrings");
            sink.report(
                ErrorKind::MalformedEntry,
                "translation file is not a mapping".to_string(),
            )?;
            continue;
        };
        debug!("loading strings from {}", path.display());

        let is_common = path.to_string_lossy().to_lowercase().contains("common");
        for (lang, strings) in langs {
            let mut entry = Mapping::new();
            entry.insert(key("type"), lang);
            entry.insert(key("strings"), strings);
            if is_common {
                base.push(Value::Mapping(entry));
            } else {
                specific.push(Value::Mapping(entry));
            }
        }
    }

    merge_collection(
        MergeStrategy::Custom(CustomMerge::ExtraStrings),
        "extraStrings",
        &Value::Sequence(base),
        &Value::Sequence(specific),
        mod_index,
        sink,
    )
}

/// Whether the given root master id gets vanilla seeding at all.
#[must_use]
pub fn is_vanilla_master(id: &str) -> bool {
    VANILLA_MASTERS.contains(&id)
}

/// Synthesize the vanilla game's resources as seed collections for the
/// mod at `mod_index`.
///
/// # Errors
///
/// Unreadable translation files are fatal; missing game files are
/// reported through the sink and skipped.
pub fn load_vanilla(
    scope: &mut ModScope<'_>,
    mod_index: usize,
    root: &Path,
    sink: &mut ErrorSink,
) -> OxmodResult<IndexMap<String, Value>> {
    sink.set_context(root.display().to_string(), "vanilla");

    let mut sprites = surfaces(scope, sink)?;
    for sprite in &mut sprites {
        if let Value::Mapping(map) = sprite {
            map.insert(key(PROVENANCE_KEY), num(mod_index as u64));
        }
    }

    let mut seed = IndexMap::new();
    seed.insert("extraSprites".to_string(), Value::Sequence(sprites));
    seed.insert(
        "extraStrings".to_string(),
        extra_strings(scope, mod_index, sink)?,
    );
    seed.insert(PALETTES_KEY.to_string(), palettes(scope, sink)?);
    Ok(seed)
}
