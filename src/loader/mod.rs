// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The load pipeline, end to end.
//!
//! ```text
//! install root
//!     |
//! GameDirs + GameConfig (options.cfg)
//!     |
//! mods::discover -> order::resolve_load_order
//!     |
//! per mod, in order:
//!     vanilla seed (root master only)
//!     *.rul in mod root, then Ruleset/
//!       expand_paths -> merge_collection
//!     |
//! _mod_meta + _config attached
//!     |
//! validate::after_load_checks
//!     |
//!     v
//! LoadOutcome { ruleset, report }
//! ```

#[cfg(test)]
mod tests;

use bon::Builder;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{DataError, MergeError, OxmodResult};
use crate::finder::Finder;
use crate::finder::dirs::{GameConfig, GameDirs};
use crate::mods::discover;
use crate::mods::order::{ModSet, resolve_load_order};
use crate::report::{ErrorRecord, ErrorSink};
use crate::ruleset::expand::{ModScope, expand_paths};
use crate::ruleset::merge::merge_collection;
use crate::ruleset::schema::strategy_for;
use crate::ruleset::vanilla::{is_vanilla_master, load_vanilla};
use crate::ruleset::Ruleset;
use crate::validate::after_load_checks;

/// Knobs for one load run.
#[derive(Debug, Clone, Builder)]
pub struct LoadOptions {
    /// Abort on the first recorded problem instead of accumulating.
    #[builder(default = false)]
    pub strict: bool,
    /// Override the language from `options.cfg`.
    pub language: Option<String>,
    /// Rule file suffix.
    #[builder(default = String::from(".rul"))]
    pub rule_suffix: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// What a load run produces: the merged ruleset plus everything
/// non-fatal that went wrong on the way.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ruleset: Ruleset,
    pub set: ModSet,
    pub report: Vec<ErrorRecord>,
}

/// Discover and order the active mods without reading any rule files.
///
/// # Errors
///
/// Fatal graph and data errors; any recorded problem when `strict` is
/// set.
pub fn resolve_mods(root: &Path, strict: bool) -> OxmodResult<(ModSet, Vec<ErrorRecord>)> {
    let dirs = GameDirs::from_install(root)?;
    let config = GameConfig::load(&dirs.config_file())?;
    let mut sink = ErrorSink::new(strict);
    let registry = discover(&dirs, &config, &mut sink)?;
    let set = resolve_load_order(registry, &config)?;
    Ok((set, sink.into_records()))
}

/// List the rule files directly under `dir`, sorted by name. Not
/// recursive; nested rule files belong to the `Ruleset/` convention.
fn rule_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let suffix = suffix.to_lowercase();
    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().to_lowercase().ends_with(&suffix))
        })
        .collect();
    files.sort();
    files
}

/// Parse one rule file and merge each of its collections into the
/// accumulated ruleset.
fn merge_rule_file(
    path: &Path,
    ruleset: &mut Ruleset,
    scope: &mut ModScope<'_>,
    mod_index: usize,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    debug!("reading {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| DataError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let doc: Value = serde_yaml::from_str(&text).map_err(|e| DataError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let Value::Mapping(doc) = doc else {
        return Err(DataError::ParseError {
            path: path.display().to_string(),
            message: "rule file is not a mapping".to_string(),
        }
        .into());
    };

    for (name, value) in doc {
        let Value::String(name) = name else {
            return Err(DataError::ParseError {
                path: path.display().to_string(),
                message: format!("non-string collection name {name:?}"),
            }
            .into());
        };
        let Some(strategy) = strategy_for(&name) else {
            return Err(MergeError::UnknownCollection {
                name,
                file: path.display().to_string(),
            }
            .into());
        };
        // context first: expansion reports against this file too
        sink.set_context(path.display().to_string(), name.clone());
        let value = expand_paths(scope, &name, value, sink)?;

        let left = ruleset.get(&name).cloned().unwrap_or(Value::Null);
        let merged = merge_collection(strategy, &name, &left, &value, mod_index, sink)?;
        ruleset.insert(name, merged);
    }
    Ok(())
}

fn merge_rule_dir(
    dir: &Path,
    suffix: &str,
    ruleset: &mut Ruleset,
    scope: &mut ModScope<'_>,
    mod_index: usize,
    sink: &mut ErrorSink,
) -> OxmodResult<()> {
    for path in rule_files(dir, suffix) {
        merge_rule_file(&path, ruleset, scope, mod_index, sink)?;
    }
    Ok(())
}

/// Load the full ruleset from a self-contained installation at `root`.
///
/// # Errors
///
/// Fatal graph, merge and data errors; any recorded problem when
/// `options.strict` is set.
pub fn load_ruleset(root: &Path, options: &LoadOptions) -> OxmodResult<LoadOutcome> {
    let dirs = GameDirs::from_install(root)?;
    let config = GameConfig::load(&dirs.config_file())?;
    let mut sink = ErrorSink::new(options.strict);

    let registry = discover(&dirs, &config, &mut sink)?;
    info!("discovered {} mod packages", registry.len());
    let set = resolve_load_order(registry, &config)?;

    let mut finder = Finder::new();
    let mut ruleset = Ruleset::new();

    for index in 0..set.len() {
        let meta = match set.get(index) {
            Some(meta) => meta.clone(),
            None => break,
        };
        info!(
            "loading '{}' name='{}' version='{}' from {}",
            meta.id,
            meta.name,
            meta.version,
            meta.root.display()
        );

        let mut scope = ModScope::new(&mut finder, &dirs, &set, index);
        if meta.is_master && meta.master.is_none() {
            if is_vanilla_master(&meta.id) {
                for (name, value) in load_vanilla(&mut scope, index, &meta.root, &mut sink)? {
                    ruleset.insert(name, value);
                }
            } else {
                // a total conversion bringing all its own resources
                warn!("masterless master '{}' gets no vanilla resources", meta.id);
            }
        }

        merge_rule_dir(
            &meta.root,
            &options.rule_suffix,
            &mut ruleset,
            &mut scope,
            index,
            &mut sink,
        )?;
        let rul_dir = meta.root.join("Ruleset");
        if rul_dir.is_dir() {
            merge_rule_dir(
                &rul_dir,
                &options.rule_suffix,
                &mut ruleset,
                &mut scope,
                index,
                &mut sink,
            )?;
        }
    }

    let meta_values: Vec<Value> = set
        .iter()
        .map(serde_yaml::to_value)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| DataError::InvalidValue {
            key: "_mod_meta".to_string(),
            message: e.to_string(),
        })?;
    ruleset.insert("_mod_meta".to_string(), Value::Sequence(meta_values));

    let mut config = config;
    if let Some(lang) = &options.language {
        config.options.language = Some(lang.clone());
    }
    let config_value = serde_yaml::to_value(&config).map_err(|e| DataError::InvalidValue {
        key: "_config".to_string(),
        message: e.to_string(),
    })?;
    ruleset.insert("_config".to_string(), config_value);

    after_load_checks(&ruleset, &mut sink)?;

    Ok(LoadOutcome {
        ruleset,
        set,
        report: sink.into_records(),
    })
}
