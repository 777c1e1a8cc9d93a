// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mod discovery and metadata.
//!
//! ```text
//! <data>/standard/*   <user>/mods/*
//!         \               /
//!          v             v
//!      metadata.yml per package
//!              |
//!              v
//!        ModRegistry (discovery order)
//!              |
//!        order::resolve_load_order
//!              |
//!              v
//!           ModSet (indexed, master-linked)
//! ```
//!
//! Packages with unreadable or incomplete metadata are recorded as
//! `MissingMetadata` and excluded from the active set, but stay in the
//! registry so a master chain can still reach them.

pub mod order;


use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::OxmodResult;
use crate::finder::dirs::{GameConfig, GameDirs};
use crate::report::{ErrorKind, ErrorSink};

/// `metadata.yml` as authored. `id`, `master`, `isMaster` and
/// `loadResources` are optional; the rest are required.
#[derive(Debug, Deserialize)]
struct MetadataDoc {
    name: String,
    version: String,
    author: String,
    description: String,
    id: Option<String>,
    master: Option<String>,
    #[serde(rename = "isMaster", default)]
    is_master: bool,
    #[serde(rename = "loadResources", default)]
    load_resources: Vec<String>,
}

/// One discovered mod package.
#[derive(Debug, Clone, Serialize)]
pub struct ModMeta {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    /// Master mod this package depends on. A metadata value of `"*"`
    /// normalizes to `None`.
    pub master: Option<String>,
    pub is_master: bool,
    /// Extra resource directories (`loadResources`), relative to the
    /// data root.
    pub res_dirs: Vec<String>,
    /// Package root directory.
    pub root: PathBuf,
    /// Marked active in `options.cfg`.
    pub active: bool,
    /// False when metadata was unreadable or incomplete.
    pub valid: bool,
    /// Load-order index, assigned during resolution, immutable after.
    pub index: Option<usize>,
    /// Load-order index of the master, resolved during ordering.
    pub master_index: Option<usize>,
}

impl ModMeta {
    /// Defaults used when `metadata.yml` is missing or broken, matching
    /// what the game assumes for bare resource directories.
    fn fallback(root: &Path) -> Self {
        let dirname = root
            .file_name()
            .map_or_else(|| "(unnamed)".to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            id: dirname.clone(),
            name: dirname,
            version: "1.0".to_string(),
            author: "unknown author".to_string(),
            description: "No description".to_string(),
            master: Some("xcom1".to_string()),
            is_master: false,
            res_dirs: Vec::new(),
            root: root.to_path_buf(),
            active: false,
            valid: false,
            index: None,
            master_index: None,
        }
    }

    /// Read one package's metadata.
    ///
    /// # Errors
    ///
    /// Only in strict mode, when the `MissingMetadata` report aborts.
    pub(crate) fn read(root: &Path, sink: &mut ErrorSink) -> OxmodResult<Self> {
        let md_path = root.join("metadata.yml");
        sink.set_context(md_path.display().to_string(), "metadata");

        let text = match std::fs::read_to_string(&md_path) {
            Ok(text) => text,
            Err(e) => {
                sink.report(
                    ErrorKind::MissingMetadata,
                    format!("no metadata for {}: {e}", root.display()),
                )?;
                return Ok(Self::fallback(root));
            }
        };

        let doc: MetadataDoc = match serde_yaml::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                sink.report(
                    ErrorKind::MissingMetadata,
                    format!("bad metadata for {}: {e}", root.display()),
                )?;
                return Ok(Self::fallback(root));
            }
        };

        let dirname = root
            .file_name()
            .map_or_else(|| "(unnamed)".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            id: doc.id.unwrap_or(dirname),
            name: doc.name,
            version: doc.version,
            author: doc.author,
            description: doc.description,
            master: doc.master.filter(|m| m != "*"),
            is_master: doc.is_master,
            res_dirs: doc.load_resources,
            root: root.to_path_buf(),
            active: false,
            valid: true,
            index: None,
            master_index: None,
        })
    }
}

/// All discovered packages, keyed by id, in discovery order. Discovery
/// order is the deterministic tie-break for load ordering.
#[derive(Debug, Default)]
pub struct ModRegistry {
    mods: IndexMap<String, ModMeta>,
}

impl ModRegistry {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModMeta> {
        self.mods.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModMeta> {
        self.mods.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    pub(crate) fn take(&mut self, id: &str) -> Option<ModMeta> {
        self.mods.shift_remove(id)
    }
}

/// List the package directories under one root, sorted by name.
fn package_dirs(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        debug!("no mod directory at {}", root.display());
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Discover all packages under `<data>/standard` and `<user>/mods`,
/// reading each one's metadata and marking it active per `options.cfg`.
///
/// # Errors
///
/// Only in strict mode, when a `MissingMetadata` report aborts.
pub fn discover(
    dirs: &GameDirs,
    config: &GameConfig,
    sink: &mut ErrorSink,
) -> OxmodResult<ModRegistry> {
    let mut registry = ModRegistry::default();
    for root in package_dirs(&dirs.standard_mods())
        .into_iter()
        .chain(package_dirs(&dirs.user_mods()))
    {
        let mut meta = ModMeta::read(&root, sink)?;
        meta.active = config.is_active(&meta.id);
        debug!(
            "discovered mod id='{}' master={:?} active={} at {}",
            meta.id,
            meta.master,
            meta.active,
            root.display()
        );
        if let Some(previous) = registry.mods.insert(meta.id.clone(), meta) {
            warn!(
                "duplicate mod id '{}'; {} shadows an earlier copy",
                previous.id,
                root.display()
            );
        }
    }
    Ok(registry)
}
