// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Post-load referential integrity checks.
//!
//! Runs over the fully merged ruleset, after every mod has had its
//! say: a reference that dangles here is a real defect in the combined
//! mod set, not a forward reference between load steps. Findings go
//! through the sink as `ReferentialIntegrityViolation`; none of them
//! stop a lenient load.
//!
//! Covered sections: manufacture, research, items, units. Other
//! sections (ufopaedia requirements, alienDeployments and so on) are
//! not checked yet.

#[cfg(test)]
mod tests;

use serde_yaml::Value;
use std::collections::HashSet;

use crate::error::OxmodResult;
use crate::report::{ErrorKind, ErrorSink};
use crate::ruleset::Ruleset;

/// Everything referable, precomputed once per run.
struct DefinedNames {
    /// Buyable or holdable things: items, crafts and units share one
    /// namespace wherever a rule names "an item".
    items: HashSet<String>,
    research: HashSet<String>,
    categories: HashSet<String>,
    base_funcs: HashSet<String>,
    armors: HashSet<String>,
    /// Research topics reachable indirectly: lookups, getOneFree
    /// grants, mission-unlocked topics. A `needItem` topic with no
    /// item may still be reachable through these.
    reachable_research: HashSet<String>,
}

fn field_str(entry: &Value, field: &str) -> Option<String> {
    entry.as_mapping()?.get(field)?.as_str().map(str::to_string)
}

fn str_list(entry: &Value, field: &str) -> Vec<String> {
    let Some(Value::Sequence(seq)) = entry.as_mapping().and_then(|m| m.get(field)) else {
        return Vec::new();
    };
    seq.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
}

fn map_keys(entry: &Value, field: &str) -> Vec<String> {
    let Some(Value::Mapping(map)) = entry.as_mapping().and_then(|m| m.get(field)) else {
        return Vec::new();
    };
    map.keys().filter_map(|k| k.as_str().map(str::to_string)).collect()
}

fn keyed_names(ruleset: &Ruleset, collection: &str, field: &str) -> HashSet<String> {
    ruleset
        .entries(collection)
        .iter()
        .filter_map(|e| field_str(e, field))
        .collect()
}

impl DefinedNames {
    fn collect(ruleset: &Ruleset) -> Self {
        let mut items = keyed_names(ruleset, "items", "type");
        items.extend(keyed_names(ruleset, "crafts", "type"));
        items.extend(keyed_names(ruleset, "units", "type"));

        let mut base_funcs = HashSet::new();
        for facility in ruleset.entries("facilities") {
            base_funcs.extend(str_list(facility, "provideBaseFunc"));
        }

        let mut reachable_research = HashSet::new();
        for topic in ruleset.entries("research") {
            if let Some(lookup) = field_str(topic, "lookup") {
                reachable_research.insert(lookup);
            }
            reachable_research.extend(str_list(topic, "getOneFree"));
            reachable_research.extend(str_list(topic, "sequentialGetOneFree"));
            if let Some(Value::Mapping(protected)) =
                topic.as_mapping().and_then(|m| m.get("getOneFreeProtected"))
            {
                for grants in protected.values() {
                    if let Value::Sequence(seq) = grants {
                        reachable_research
                            .extend(seq.iter().filter_map(|v| v.as_str().map(str::to_string)));
                    }
                }
            }
        }
        for deployment in ruleset.entries("alienDeployments") {
            if let Some(unlocked) = field_str(deployment, "unlockedResearch") {
                reachable_research.insert(unlocked);
            }
        }

        Self {
            items,
            research: keyed_names(ruleset, "research", "name"),
            categories: keyed_names(ruleset, "itemCategories", "type"),
            base_funcs,
            armors: keyed_names(ruleset, "armors", "type"),
            reachable_research,
        }
    }
}

/// Name of the mod that last wrote an entry, for error messages.
fn mod_name(ruleset: &Ruleset, entry: &Value) -> String {
    let index = entry
        .as_mapping()
        .and_then(|m| m.get("_mod_index"))
        .and_then(Value::as_u64);
    index
        .and_then(|i| {
            let meta = ruleset.entries("_mod_meta").get(i as usize)?;
            field_str(meta, "id")
        })
        .unwrap_or_else(|| "?".to_string())
}

fn report_missing(
    sink: &mut ErrorSink,
    missing: Vec<&String>,
    what: &str,
    mod_name: &str,
    entry_name: &str,
) -> OxmodResult<()> {
    if missing.is_empty() {
        return Ok(());
    }
    let mut missing: Vec<&str> = missing.into_iter().map(String::as_str).collect();
    missing.sort_unstable();
    sink.report(
        ErrorKind::ReferentialIntegrityViolation,
        format!("{what} for {mod_name}/{entry_name}: [{}]", missing.join(", ")),
    )
}

fn check_manufacture(
    ruleset: &Ruleset,
    defined: &DefinedNames,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    sink.set_context("after_load_checks", "manufacture");
    for project in ruleset.entries("manufacture") {
        let Some(name) = field_str(project, "name") else {
            continue;
        };
        let owner = mod_name(ruleset, project);

        let required_research = str_list(project, "requires");
        report_missing(
            sink,
            required_research.iter().filter(|r| !defined.research.contains(*r)).collect(),
            "required research not defined",
            &owner,
            &name,
        )?;

        let required_items = map_keys(project, "requiredItems");
        report_missing(
            sink,
            required_items.iter().filter(|i| !defined.items.contains(*i)).collect(),
            "required items not defined",
            &owner,
            &name,
        )?;

        let required_funcs = str_list(project, "requiresBaseFunc");
        report_missing(
            sink,
            required_funcs.iter().filter(|f| !defined.base_funcs.contains(*f)).collect(),
            "required base function not provided",
            &owner,
            &name,
        )?;

        // absent producedItems means the project yields itself
        let produced = match map_keys(project, "producedItems") {
            keys if keys.is_empty() => vec![name.clone()],
            keys => keys,
        };
        report_missing(
            sink,
            produced.iter().filter(|i| !defined.items.contains(*i)).collect(),
            "produced items not defined",
            &owner,
            &name,
        )?;
    }
    Ok(())
}

fn check_research(
    ruleset: &Ruleset,
    defined: &DefinedNames,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    sink.set_context("after_load_checks", "research");
    for topic in ruleset.entries("research") {
        let Some(name) = field_str(topic, "name") else {
            continue;
        };
        let owner = mod_name(ruleset, topic);

        let mut referenced: Vec<String> = Vec::new();
        for field in ["dependencies", "unlocks", "disables", "requires", "getOneFree"] {
            referenced.extend(str_list(topic, field));
        }
        if let Some(lookup) = field_str(topic, "lookup") {
            referenced.push(lookup);
        }
        if let Some(Value::Mapping(protected)) =
            topic.as_mapping().and_then(|m| m.get("getOneFreeProtected"))
        {
            for (guard, grants) in protected {
                if let Some(guard) = guard.as_str() {
                    referenced.push(guard.to_string());
                }
                if let Value::Sequence(seq) = grants {
                    referenced.extend(seq.iter().filter_map(|v| v.as_str().map(str::to_string)));
                }
            }
        }
        referenced.sort_unstable();
        referenced.dedup();
        report_missing(
            sink,
            referenced.iter().filter(|r| !defined.research.contains(*r)).collect(),
            "referenced research not defined",
            &owner,
            &name,
        )?;

        let required_funcs = str_list(topic, "requiresBaseFunc");
        report_missing(
            sink,
            required_funcs.iter().filter(|f| !defined.base_funcs.contains(*f)).collect(),
            "required base function not provided",
            &owner,
            &name,
        )?;

        // needItem: the topic must be obtainable from an item of the
        // same name, or reachable through a lookup or a free grant
        let needs_item = topic
            .as_mapping()
            .and_then(|m| m.get("needItem"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if needs_item
            && !defined.items.contains(&name)
            && !defined.reachable_research.contains(&name)
        {
            sink.report(
                ErrorKind::ReferentialIntegrityViolation,
                format!("unreachable research topic {owner}/{name}"),
            )?;
        }
    }
    Ok(())
}

fn check_items(
    ruleset: &Ruleset,
    defined: &DefinedNames,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    sink.set_context("after_load_checks", "item");
    for item in ruleset.entries("items") {
        let Some(name) = field_str(item, "type") else {
            continue;
        };
        let owner = mod_name(ruleset, item);

        let fixed = item
            .as_mapping()
            .and_then(|m| m.get("fixedWeapon"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if fixed && !defined.items.contains(&name) {
            sink.report(
                ErrorKind::ReferentialIntegrityViolation,
                format!("fixedWeapon item without an owning item/unit/craft: {owner}/{name}"),
            )?;
        }

        let mut required_research = str_list(item, "requires");
        required_research.extend(str_list(item, "requiresBuy"));
        report_missing(
            sink,
            required_research.iter().filter(|r| !defined.research.contains(*r)).collect(),
            "required research not defined",
            &owner,
            &name,
        )?;

        let required_funcs = str_list(item, "requiresBuyBaseFunc");
        report_missing(
            sink,
            required_funcs.iter().filter(|f| !defined.base_funcs.contains(*f)).collect(),
            "required base function not provided",
            &owner,
            &name,
        )?;

        let ammo = str_list(item, "compatibleAmmo");
        report_missing(
            sink,
            ammo.iter().filter(|a| !defined.items.contains(*a)).collect(),
            "compatible ammo not defined",
            &owner,
            &name,
        )?;

        let categories = str_list(item, "categories");
        report_missing(
            sink,
            categories.iter().filter(|c| !defined.categories.contains(*c)).collect(),
            "undefined item categories",
            &owner,
            &name,
        )?;
    }
    Ok(())
}

fn check_units(
    ruleset: &Ruleset,
    defined: &DefinedNames,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    sink.set_context("after_load_checks", "unit");
    for unit in ruleset.entries("units") {
        let Some(name) = field_str(unit, "type") else {
            continue;
        };
        if let Some(armor) = field_str(unit, "armor")
            && !defined.armors.contains(&armor)
        {
            let owner = mod_name(ruleset, unit);
            sink.report(
                ErrorKind::ReferentialIntegrityViolation,
                format!("armor not defined for unit {owner}/{name}: {armor}"),
            )?;
        }
    }
    Ok(())
}

/// Run every integrity check over the merged ruleset.
///
/// # Errors
///
/// `OxmodError::Strict` when the first finding aborts a strict-mode
/// load.
pub fn after_load_checks(ruleset: &Ruleset, sink: &mut ErrorSink) -> OxmodResult<()> {
    let defined = DefinedNames::collect(ruleset);
    check_manufacture(ruleset, &defined, sink)?;
    check_research(ruleset, &defined, sink)?;
    check_items(ruleset, &defined, sink)?;
    check_units(ruleset, &defined, sink)?;
    Ok(())
}
