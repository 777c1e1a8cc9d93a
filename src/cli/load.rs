// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments for the load-pipeline commands.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `load` command.
#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Path to a self-contained installation (data root with a user/
    /// directory inside).
    #[arg(value_name = "INSTALL")]
    pub install: PathBuf,

    /// Writes the merged ruleset as JSON to this file.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rule file suffix.
    #[arg(long = "rule-suffix", value_name = "SUFFIX", default_value = ".rul")]
    pub rule_suffix: String,
}

/// Arguments for the `mods` command.
#[derive(Debug, Clone, Args)]
pub struct ModsArgs {
    /// Path to a self-contained installation.
    #[arg(value_name = "INSTALL")]
    pub install: PathBuf,
}

/// Arguments for the `translate` command.
#[derive(Debug, Clone, Args)]
pub struct TranslateArgs {
    /// Path to a self-contained installation.
    #[arg(value_name = "INSTALL")]
    pub install: PathBuf,

    /// String keys to translate, e.g. STR_PLASMA_RIFLE.
    #[arg(value_name = "KEY", required = true)]
    pub keys: Vec<String>,
}
