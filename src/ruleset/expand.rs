// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resource path expansion.
//!
//! A handful of collections embed resource references that must be
//! resolved against the owning mod's scope before merging, so that a
//! later mod overriding the entry does not change which files an
//! earlier mod's rules point at. Unresolvable references become `null`
//! placeholders and an `UnresolvedReference` report.

use serde_yaml::{Mapping, Value};
use std::path::PathBuf;
use tracing::debug;

use crate::error::OxmodResult;
use crate::finder::Finder;
use crate::finder::dirs::GameDirs;
use crate::mods::order::ModSet;
use crate::report::{ErrorKind, ErrorSink};

/// Resource lookup scoped to one mod in the load order: its root, its
/// extra resource dirs, then its master chain.
pub struct ModScope<'a> {
    finder: &'a mut Finder,
    dirs: &'a GameDirs,
    set: &'a ModSet,
    index: usize,
}

impl<'a> ModScope<'a> {
    pub fn new(finder: &'a mut Finder, dirs: &'a GameDirs, set: &'a ModSet, index: usize) -> Self {
        Self { finder, dirs, set, index }
    }

    pub(crate) fn find_all(&mut self, pattern: &str) -> Vec<PathBuf> {
        self.set.find_all(self.finder, self.dirs, self.index, pattern)
    }

    pub(crate) fn find_first(&mut self, pattern: &str) -> Option<PathBuf> {
        self.set.find_first(self.finder, self.dirs, self.index, pattern)
    }
}

fn path_value(path: PathBuf) -> Value {
    Value::String(path.display().to_string())
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Resolve one reference or record its absence.
fn resolve(
    scope: &mut ModScope<'_>,
    pattern: &str,
    sink: &mut ErrorSink,
) -> OxmodResult<Option<Value>> {
    match scope.find_first(pattern) {
        Some(path) => Ok(Some(path_value(path))),
        None => {
            sink.report(ErrorKind::UnresolvedReference, format!("'{pattern}' not found"))?;
            Ok(None)
        }
    }
}

/// Expand the resource references inside one collection value, in
/// place of the raw relative paths the mod author wrote. Collections
/// without embedded references pass through untouched.
///
/// # Errors
///
/// `OxmodError::Strict` when a missing reference aborts a strict-mode
/// load.
pub fn expand_paths(
    scope: &mut ModScope<'_>,
    name: &str,
    value: Value,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    match name {
        "globe" => expand_globe(scope, value, sink),
        "fontName" => expand_font(scope, value, sink),
        "cutscenes" => expand_cutscenes(scope, value, sink),
        "soldiers" => expand_soldiers(scope, value),
        "terrains" => expand_terrains(scope, value, sink),
        "crafts" | "ufos" => expand_craft_terrain(scope, value, sink),
        "extraSprites" => expand_sprite_files(scope, value),
        _ => Ok(value),
    }
}

fn expand_globe(
    scope: &mut ModScope<'_>,
    mut value: Value,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    if let Value::Mapping(map) = &mut value
        && let Some(Value::String(data)) = map.get(&key("data"))
    {
        let resolved = resolve(scope, &data.clone(), sink)?.unwrap_or(Value::Null);
        map.insert(key("data"), resolved);
    }
    Ok(value)
}

// the font name implicitly lives under Language/
fn expand_font(
    scope: &mut ModScope<'_>,
    value: Value,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    let Value::String(name) = &value else {
        return Ok(value);
    };
    let pattern = format!("Language/{name}");
    Ok(resolve(scope, &pattern, sink)?.unwrap_or(Value::Null))
}

fn expand_cutscenes(
    scope: &mut ModScope<'_>,
    mut value: Value,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    let Value::Sequence(scenes) = &mut value else {
        return Ok(value);
    };
    for scene in scenes {
        let Value::Mapping(scene) = scene else {
            continue;
        };
        if let Some(Value::Sequence(videos)) = scene.get(&key("videos")) {
            // unresolvable videos are dropped rather than nulled; the
            // player falls through to the next one
            let mut resolved = Vec::with_capacity(videos.len());
            for video in videos.clone() {
                if let Value::String(path) = &video
                    && let Some(found) = resolve(scope, path, sink)?
                {
                    resolved.push(found);
                }
            }
            scene.insert(key("videos"), Value::Sequence(resolved));
        }
        if let Some(Value::Mapping(slideshow)) = scene.get_mut(&key("slideshow"))
            && let Some(Value::Sequence(slides)) = slideshow.get_mut(&key("slides"))
        {
            for slide in slides {
                let Value::Mapping(slide) = slide else {
                    continue;
                };
                if let Some(Value::String(path)) = slide.get(&key("imagePath")) {
                    let resolved = resolve(scope, &path.clone(), sink)?.unwrap_or(Value::Null);
                    slide.insert(key("imagePath"), resolved);
                }
            }
        }
    }
    Ok(value)
}

/// `soldierNames` entries are directory or file patterns; each expands
/// to the `.nam` files it matches. A literal `delete` resets the list
/// accumulated so far.
fn expand_soldiers(scope: &mut ModScope<'_>, mut value: Value) -> OxmodResult<Value> {
    let Value::Sequence(soldiers) = &mut value else {
        return Ok(value);
    };
    for soldier in soldiers {
        let Value::Mapping(soldier) = soldier else {
            continue;
        };
        let Some(Value::Sequence(patterns)) = soldier.get(&key("soldierNames")) else {
            continue;
        };
        let mut names: Vec<Value> = Vec::new();
        for pattern in patterns.clone() {
            let Value::String(pattern) = pattern else {
                continue;
            };
            if pattern == "delete" {
                names.clear();
                continue;
            }
            for path in scope.find_all(&pattern) {
                if path
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("nam"))
                {
                    names.push(path_value(path));
                }
            }
        }
        soldier.insert(key("soldierNames"), Value::Sequence(names));
    }
    Ok(value)
}

fn expand_terrains(
    scope: &mut ModScope<'_>,
    mut value: Value,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    if let Value::Sequence(terrains) = &mut value {
        for terrain in terrains {
            if let Value::Mapping(terrain) = terrain {
                expand_map_paths(scope, terrain, sink)?;
            }
        }
    }
    Ok(value)
}

fn expand_craft_terrain(
    scope: &mut ModScope<'_>,
    mut value: Value,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    let Value::Sequence(crafts) = &mut value else {
        return Ok(value);
    };
    for craft in crafts {
        let Value::Mapping(craft) = craft else {
            continue;
        };
        if craft.contains_key(&key("delete")) {
            continue;
        }
        if let Some(Value::Mapping(terrain)) = craft.get_mut(&key("battlescapeTerrainData")) {
            expand_map_paths(scope, terrain, sink)?;
        } else if let Some(Value::String(ctype)) = craft.get(&key("type")) {
            // vanilla defines several craft without terrain data
            debug!("{ctype} missing terrain data");
        }
    }
    Ok(value)
}

/// Resolve a terrain definition's map blocks and data sets into
/// concrete file paths (`mapFiles`, `mapDataFiles`).
fn expand_map_paths(
    scope: &mut ModScope<'_>,
    terrain: &mut Mapping,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    // a terrain without mapBlocks is a partial update; the merge fills
    // in the rest from the entry it lands on
    let Some(Value::Sequence(blocks)) = terrain.get(&key("mapBlocks")) else {
        return Ok(());
    };

    let mut map_files = Vec::with_capacity(blocks.len());
    for block in blocks.clone() {
        let Some(Value::String(name)) =
            block.as_mapping().and_then(|m| m.get(&key("name"))).cloned()
        else {
            continue;
        };
        let map = scope.find_first(&format!("MAPS/{name}.MAP"));
        let rmp = scope.find_first(&format!("ROUTES/{name}.RMP"));
        let mut entry = Mapping::new();
        entry.insert(key("type"), Value::String(name.clone()));
        if let (Some(map), Some(rmp)) = (map, rmp) {
            entry.insert(key("map"), path_value(map));
            entry.insert(key("rmp"), path_value(rmp));
        } else {
            entry.insert(key("map"), Value::Null);
            entry.insert(key("rmp"), Value::Null);
            sink.report(
                ErrorKind::UnresolvedReference,
                format!("mapBlock {name}: MAP or RMP file missing"),
            )?;
        }
        map_files.push(Value::Mapping(entry));
    }
    terrain.insert(key("mapFiles"), Value::Sequence(map_files));

    let sets = match terrain.get(&key("mapDataSets")) {
        Some(Value::Sequence(sets)) => sets.clone(),
        _ => Vec::new(),
    };
    let mut data_files = Vec::with_capacity(sets.len());
    for set in sets {
        let Value::String(name) = set else {
            continue;
        };
        let mcd = scope.find_first(&format!("TERRAIN/{name}.MCD"));
        let pck = scope.find_first(&format!("TERRAIN/{name}.PCK"));
        let tab = scope.find_first(&format!("TERRAIN/{name}.TAB"));
        let mut entry = Mapping::new();
        entry.insert(key("type"), Value::String(name.clone()));
        if let (Some(mcd), Some(pck), Some(tab)) = (mcd, pck, tab) {
            entry.insert(key("mcd"), path_value(mcd));
            entry.insert(key("pck"), path_value(pck));
            entry.insert(key("tab"), path_value(tab));
        } else {
            entry.insert(key("mcd"), Value::Null);
            entry.insert(key("pck"), Value::Null);
            entry.insert(key("tab"), Value::Null);
            sink.report(
                ErrorKind::UnresolvedReference,
                format!("mapDataSet {name}: MCD, PCK or TAB file missing"),
            )?;
        }
        data_files.push(Value::Mapping(entry));
    }
    terrain.insert(key("mapDataFiles"), Value::Sequence(data_files));
    Ok(())
}

/// `extraSprites` `files` values may be glob patterns assembling a
/// sprite sheet from a directory; a single match collapses back to a
/// scalar path.
fn expand_sprite_files(scope: &mut ModScope<'_>, mut value: Value) -> OxmodResult<Value> {
    let Value::Sequence(sprites) = &mut value else {
        return Ok(value);
    };
    for sprite in sprites {
        let Value::Mapping(sprite) = sprite else {
            continue;
        };
        let Some(Value::Mapping(files)) = sprite.get(&key("files")) else {
            continue;
        };
        let mut expanded = Mapping::new();
        for (idx, path) in files.clone() {
            let Value::String(pattern) = &path else {
                expanded.insert(idx, path);
                continue;
            };
            let mut found: Vec<Value> =
                scope.find_all(pattern).into_iter().map(path_value).collect();
            let resolved = if found.len() == 1 {
                found.remove(0)
            } else {
                Value::Sequence(found)
            };
            expanded.insert(idx, resolved);
        }
        sprite.insert(key("files"), Value::Mapping(expanded));
    }
    Ok(value)
}
