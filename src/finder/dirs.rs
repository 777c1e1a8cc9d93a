// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Game directory layout and the `options.cfg` configuration file.
//!
//! ```text
//! <data>/               vanilla assets, standard/ built-in mods
//! <user>/mods/          user mod packages
//! <cfg>/options.cfg     active mod list + preferred language
//! ```
//!
//! A self-contained installation keeps user and config data under
//! `<root>/user`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DataError;

/// Resolved data/user/config roots for one installation.
#[derive(Debug, Clone)]
pub struct GameDirs {
    data: PathBuf,
    user: PathBuf,
    cfg: PathBuf,
}

impl GameDirs {
    /// Build from explicit roots.
    ///
    /// # Errors
    ///
    /// Returns `DataError::NotFound` if any root is not a directory.
    pub fn new(data: PathBuf, user: PathBuf, cfg: PathBuf) -> Result<Self, DataError> {
        for dir in [&data, &user, &cfg] {
            if !dir.is_dir() {
                return Err(DataError::NotFound(dir.display().to_string()));
            }
        }
        Ok(Self { data, user, cfg })
    }

    /// Map a self-contained installation: `<root>` is the data root,
    /// `<root>/user` holds both user mods and `options.cfg`.
    ///
    /// # Errors
    ///
    /// Returns `DataError::NotFound` if the layout is incomplete.
    pub fn from_install(root: &Path) -> Result<Self, DataError> {
        let user = root.join("user");
        Self::new(root.to_path_buf(), user.clone(), user)
    }

    /// Data root (vanilla assets plus `standard/`).
    #[must_use]
    pub fn data(&self) -> &Path {
        &self.data
    }

    /// User root (`mods/`).
    #[must_use]
    pub fn user(&self) -> &Path {
        &self.user
    }

    /// Directory of built-in master mod packages.
    #[must_use]
    pub fn standard_mods(&self) -> PathBuf {
        self.data.join("standard")
    }

    /// Directory of user mod packages.
    #[must_use]
    pub fn user_mods(&self) -> PathBuf {
        self.user.join("mods")
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.cfg.join("options.cfg")
    }
}

/// One `mods:` entry in `options.cfg`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModRecord {
    pub id: String,
    pub active: bool,
}

/// The `options:` section. Only the keys this loader cares about;
/// the game writes many more, all ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameOptions {
    #[serde(default)]
    pub language: Option<String>,
}

/// Parsed `options.cfg`: which mods are active, and the preferred
/// language for translation lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub mods: Vec<ModRecord>,
    #[serde(default)]
    pub options: GameOptions,
}

impl GameConfig {
    /// Read and parse `options.cfg`.
    ///
    /// # Errors
    ///
    /// Returns `DataError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path).map_err(|source| DataError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|e| DataError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Whether `options.cfg` marks the given mod id active.
    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.mods.iter().any(|m| m.id == id && m.active)
    }
}
