// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Active-set construction and load ordering.
//!
//! ```text
//! registry + options.cfg
//!        |
//!   single active master     (DuplicateMaster if two)
//!        |
//!   active set:
//!     active mods with master == active master | none
//!     + master's ancestor chain, force-activated
//!        |
//!   Kahn's variant: emit first pending mod whose
//!   master is none or already emitted
//!        |
//!        v
//!   ModSet, indices 0..n    (RequiredMasterMissing on cycle)
//! ```

use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::{ModMeta, ModRegistry};
use crate::error::{GraphError, OxmodResult};
use crate::finder::Finder;
use crate::finder::dirs::{GameConfig, GameDirs};

/// The resolved load order. Mods carry their assigned index and a link
/// to their master's index; resource lookups walk that chain.
#[derive(Debug)]
pub struct ModSet {
    mods: Vec<ModMeta>,
}

impl ModSet {
    #[must_use]
    pub fn mods(&self) -> &[ModMeta] {
        &self.mods
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModMeta> {
        self.mods.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ModMeta> {
        self.mods.get(index)
    }

    /// Resolve `pattern` within the scope of the mod at `index`: its
    /// own root first, then its extra resource dirs (against the data
    /// root, plus `common`), then recursively the master's scope.
    /// The first group with any match wins.
    pub fn find_all(
        &self,
        finder: &mut Finder,
        dirs: &GameDirs,
        index: usize,
        pattern: &str,
    ) -> Vec<PathBuf> {
        let Some(meta) = self.mods.get(index) else {
            return Vec::new();
        };

        let own = finder.find_all(pattern, std::slice::from_ref(&meta.root));
        if !own.is_empty() {
            return own;
        }

        if !meta.res_dirs.is_empty() {
            let roots: Vec<PathBuf> = meta
                .res_dirs
                .iter()
                .map(|d| dirs.data().join(d))
                .chain(std::iter::once(dirs.data().join("common")))
                .collect();
            let found = finder.find_all(pattern, &roots);
            if !found.is_empty() {
                return found;
            }
        }

        meta.master_index
            .map_or_else(Vec::new, |m| self.find_all(finder, dirs, m, pattern))
    }

    /// First match within the mod's scope, or `None`.
    pub fn find_first(
        &self,
        finder: &mut Finder,
        dirs: &GameDirs,
        index: usize,
        pattern: &str,
    ) -> Option<PathBuf> {
        self.find_all(finder, dirs, index, pattern).into_iter().next()
    }
}

/// Determine the single active master mod.
fn active_master(registry: &ModRegistry, config: &GameConfig) -> OxmodResult<String> {
    let mut master: Option<&ModMeta> = None;
    for record in &config.mods {
        if !record.active {
            continue;
        }
        let Some(meta) = registry.get(&record.id) else {
            warn!("options.cfg lists unknown mod '{}'", record.id);
            continue;
        };
        if meta.is_master && meta.valid {
            if let Some(first) = master {
                return Err(GraphError::DuplicateMaster {
                    first: first.id.clone(),
                    second: meta.id.clone(),
                }
                .into());
            }
            master = Some(meta);
        }
    }
    master.map(|m| m.id.clone()).ok_or_else(|| {
        GraphError::RequiredMasterMissing("no active master mod in options.cfg".to_string()).into()
    })
}

/// Resolve the active set and its load order.
///
/// # Errors
///
/// `DuplicateMaster` when two active mods claim mastership;
/// `RequiredMasterMissing` when no master is active, an ancestor master
/// cannot be found, or the active set cannot be fully ordered.
pub fn resolve_load_order(
    mut registry: ModRegistry,
    config: &GameConfig,
) -> OxmodResult<ModSet> {
    let master_id = active_master(&registry, config)?;

    // gather active mods that depend on the active master (or nothing)
    let mut active: IndexMap<String, ModMeta> = IndexMap::new();
    let dependents: Vec<String> = registry
        .iter()
        .filter(|m| {
            m.active
                && m.valid
                && !m.is_master
                && (m.master.as_deref() == Some(master_id.as_str()) || m.master.is_none())
        })
        .map(|m| m.id.clone())
        .collect();

    // chainload the master's own ancestry, activating inactive links
    let mut chain: Vec<String> = Vec::new();
    let mut current = master_id.clone();
    loop {
        if chain.contains(&current) {
            // looped chain; the ordering pass below reports it
            break;
        }
        let Some(meta) = registry.get(&current) else {
            return Err(GraphError::RequiredMasterMissing(current).into());
        };
        if !meta.is_master && current != master_id {
            return Err(GraphError::RequiredMasterMissing(format!(
                "'{current}' in the master chain is not a master mod"
            ))
            .into());
        }
        let next = meta.master.clone();
        chain.push(current);
        match next {
            Some(id) => {
                debug!("chainloading ancestor master '{id}'");
                current = id;
            }
            None => break,
        }
    }

    for id in chain.into_iter().chain(dependents) {
        if let Some(meta) = registry.take(&id) {
            active.insert(id, meta);
        }
    }

    // drop anything whose master did not make it into the active set
    let orphans: Vec<String> = active
        .values()
        .filter(|m| m.master.as_ref().is_some_and(|mid| !active.contains_key(mid)))
        .map(|m| m.id.clone())
        .collect();
    for id in orphans {
        warn!("dropping '{id}': its master is not in the active set");
        active.shift_remove(&id);
    }

    // topological order, first-eligible-in-discovery-order tie-break
    let mut ordered: Vec<ModMeta> = Vec::with_capacity(active.len());
    let mut emitted: IndexMap<String, usize> = IndexMap::new();
    while !active.is_empty() {
        let eligible = active.values().find_map(|m| {
            let parent = match &m.master {
                None => None,
                Some(mid) => Some(*emitted.get(mid)?),
            };
            Some((m.id.clone(), parent))
        });
        let Some((id, master_index)) = eligible else {
            let pending: Vec<&str> = active.keys().map(String::as_str).collect();
            return Err(GraphError::RequiredMasterMissing(format!(
                "cannot order mods [{}] (cycle or dangling master)",
                pending.join(", ")
            ))
            .into());
        };
        let mut meta = active
            .shift_remove(&id)
            .ok_or_else(|| GraphError::RequiredMasterMissing(id.clone()))?;
        meta.index = Some(ordered.len());
        meta.master_index = master_index;
        emitted.insert(id, ordered.len());
        ordered.push(meta);
    }

    info!(
        "load order: {}",
        ordered
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );
    Ok(ModSet { mods: ordered })
}
