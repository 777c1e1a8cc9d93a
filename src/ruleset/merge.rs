// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The per-collection merge engine.
//!
//! ```text
//! merge_collection(strategy, left, right, mod_index)
//!   Replace       right wins wholesale, entries stamped
//!   UpsertBy(key) left -> key map (dup key = fatal)
//!                   {delete: k}  remove | UnresolvedReference
//!                   known key    shallow field update + stamp
//!                   new key      insert + stamp
//!   Custom        extraStrings | extraSprites | extraSounds | globe/ai
//! ```
//!
//! Every merge is a pure function of its inputs: `left` is never
//! mutated, so a merge can be replayed safely.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::schema::{CustomMerge, MergeStrategy};
use crate::error::{MergeError, OxmodResult};
use crate::report::{ErrorKind, ErrorSink};

/// Field stamped into every written entry: the index of the mod that
/// last wrote it.
pub const PROVENANCE_KEY: &str = "_mod_index";

fn provenance(mod_index: usize) -> Value {
    Value::Number(serde_yaml::Number::from(mod_index as u64))
}

/// Stamp a mapping entry with the writing mod's index. Non-mapping
/// values carry no provenance.
fn stamp(value: &mut Value, mod_index: usize) {
    if let Value::Mapping(map) = value {
        map.insert(Value::String(PROVENANCE_KEY.to_string()), provenance(mod_index));
    }
}

/// View a collection value as a list of entries. `Null` (a collection
/// seen for the first time) is an empty list.
fn as_entries<'a>(value: &'a Value, section: &str) -> OxmodResult<&'a [Value]> {
    match value {
        Value::Sequence(seq) => Ok(seq),
        Value::Null => Ok(&[]),
        other => Err(MergeError::ConstraintViolation {
            section: section.to_string(),
            message: format!("expected a list of entries, got {}", type_name(other)),
        }
        .into()),
    }
}

fn as_mapping<'a>(value: &'a Value, section: &str) -> OxmodResult<Mapping> {
    match value {
        Value::Mapping(map) => Ok(map.clone()),
        Value::Null => Ok(Mapping::new()),
        other => Err(MergeError::ConstraintViolation {
            section: section.to_string(),
            message: format!("expected a mapping, got {}", type_name(other)),
        }
        .into()),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Index a list of entries by its primary-key field.
///
/// A duplicate key inside one collection value is an authoring bug and
/// always fatal.
fn index_by_key(
    field: &str,
    entries: &[Value],
    section: &str,
) -> OxmodResult<IndexMap<Value, Value>> {
    let key = Value::String(field.to_string());
    let mut map = IndexMap::with_capacity(entries.len());
    for entry in entries {
        let Some(pk) = entry.as_mapping().and_then(|m| m.get(&key)) else {
            return Err(MergeError::ConstraintViolation {
                section: section.to_string(),
                message: format!("entry without primary key '{field}': {entry:?}"),
            }
            .into());
        };
        if map.insert(pk.clone(), entry.clone()).is_some() {
            return Err(MergeError::ConstraintViolation {
                section: section.to_string(),
                message: format!("duplicate primary key {pk:?}"),
            }
            .into());
        }
    }
    Ok(map)
}

/// Combine two values of one collection.
///
/// # Errors
///
/// Fatal `ConstraintViolation` on duplicate primary keys or malformed
/// delete directives; `OxmodError::Strict` when a non-fatal report
/// aborts a strict-mode load.
pub fn merge_collection(
    strategy: MergeStrategy,
    section: &str,
    left: &Value,
    right: &Value,
    mod_index: usize,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    match strategy {
        MergeStrategy::Replace => {
            debug!("{section}: overwrite all");
            let mut out = right.clone();
            match &mut out {
                Value::Sequence(seq) => {
                    for item in seq {
                        stamp(item, mod_index);
                    }
                }
                other => stamp(other, mod_index),
            }
            Ok(out)
        }
        MergeStrategy::UpsertBy(field) => {
            upsert_by_key(field, section, left, right, mod_index, sink)
        }
        MergeStrategy::Custom(custom) => match custom {
            CustomMerge::ExtraStrings => merge_extra_strings(section, left, right),
            CustomMerge::AppendSprites => merge_extra_sprites(section, left, right, mod_index),
            CustomMerge::SkipSounds => {
                debug!("{section}: merge not implemented, keeping existing entries");
                Ok(left.clone())
            }
            CustomMerge::DictUpdate => {
                let mut out = as_mapping(left, section)?;
                for (k, v) in as_mapping(right, section)? {
                    out.insert(k, v);
                }
                Ok(Value::Mapping(out))
            }
        },
    }
}

fn upsert_by_key(
    field: &str,
    section: &str,
    left: &Value,
    right: &Value,
    mod_index: usize,
    sink: &mut ErrorSink,
) -> OxmodResult<Value> {
    let delete_key = Value::String("delete".to_string());
    let pk_key = Value::String(field.to_string());

    let mut merged = index_by_key(field, as_entries(left, section)?, section)?;
    let mut deleted: Vec<Value> = Vec::new();

    for entry in as_entries(right, section)? {
        let Some(map) = entry.as_mapping() else {
            sink.report(
                ErrorKind::MalformedEntry,
                format!("entry is not a mapping: {entry:?}"),
            )?;
            continue;
        };

        if let Some(target) = map.get(&delete_key) {
            if map.len() != 1 {
                return Err(MergeError::ConstraintViolation {
                    section: section.to_string(),
                    message: format!("delete directive with extra fields: {entry:?}"),
                }
                .into());
            }
            if merged.shift_remove(target).is_some() {
                debug!("{section}: del {target:?}");
            } else {
                sink.report(
                    ErrorKind::UnresolvedReference,
                    format!("del {target:?}: missing item"),
                )?;
            }
            deleted.push(target.clone());
            continue;
        }

        let Some(pk) = map.get(&pk_key) else {
            sink.report(
                ErrorKind::MalformedEntry,
                format!("missing primary key '{field}' in {entry:?}"),
            )?;
            continue;
        };

        if let Some(Value::Mapping(existing)) = merged.get_mut(pk) {
            // shallow field-level update: incoming fields overwrite,
            // absent fields survive
            debug!("{section}: mod {pk:?}");
            for (k, v) in map {
                existing.insert(k.clone(), v.clone());
            }
            existing.insert(Value::String(PROVENANCE_KEY.to_string()), provenance(mod_index));
        } else {
            if deleted.contains(pk) {
                debug!("{section}: add {pk:?} (re-adds a key deleted this pass)");
            } else {
                debug!("{section}: add {pk:?}");
            }
            let mut fresh = Value::Mapping(map.clone());
            stamp(&mut fresh, mod_index);
            merged.insert(pk.clone(), fresh);
        }
    }

    Ok(Value::Sequence(merged.into_values().collect()))
}

/// Union per-language string tables. Entries are `{type: <lang>,
/// strings: {...}}`; incoming strings win key-by-key inside each
/// language.
fn merge_extra_strings(section: &str, left: &Value, right: &Value) -> OxmodResult<Value> {
    let strings_key = Value::String("strings".to_string());
    let type_key = Value::String("type".to_string());

    let mut langs = index_by_key("type", as_entries(left, section)?, section)?;
    for entry in index_by_key("type", as_entries(right, section)?, section)?.into_values() {
        let Some(map) = entry.as_mapping() else {
            continue;
        };
        let Some(lang) = map.get(&type_key).cloned() else {
            continue;
        };
        let incoming = match map.get(&strings_key) {
            Some(Value::Mapping(m)) => m.clone(),
            _ => Mapping::new(),
        };

        if let Some(Value::Mapping(existing)) = langs.get_mut(&lang) {
            debug!("extraStrings: updated {lang:?}");
            match existing.get_mut(&strings_key) {
                Some(Value::Mapping(strings)) => {
                    for (k, v) in incoming {
                        strings.insert(k, v);
                    }
                }
                _ => {
                    existing.insert(strings_key.clone(), Value::Mapping(incoming));
                }
            }
        } else {
            debug!("extraStrings: added {lang:?}");
            let mut fresh = Mapping::new();
            fresh.insert(type_key.clone(), lang.clone());
            fresh.insert(strings_key.clone(), Value::Mapping(incoming));
            langs.insert(lang, Value::Mapping(fresh));
        }
    }

    Ok(Value::Sequence(langs.into_values().collect()))
}

/// Sprite definitions accumulate: the `type` field here is a real
/// type, not a key, so incoming entries are appended with provenance.
fn merge_extra_sprites(
    section: &str,
    left: &Value,
    right: &Value,
    mod_index: usize,
) -> OxmodResult<Value> {
    let mut out = as_entries(left, section)?.to_vec();
    for entry in as_entries(right, section)? {
        let mut entry = entry.clone();
        stamp(&mut entry, mod_index);
        out.push(entry);
    }
    Ok(Value::Sequence(out))
}
