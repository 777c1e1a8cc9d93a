// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for oxmod-rs using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! oxmod [global options] <command>
//! load <install> [-o out.json]
//! mods <install>
//! translate <install> <key>...
//! version
//! ```

pub mod global;
pub mod load;


use crate::cli::global::GlobalOptions;
use crate::cli::load::{LoadArgs, ModsArgs, TranslateArgs};
use clap::{Parser, Subcommand};

/// OpenXcom Mod Loader - Rust Port
#[derive(Debug, Parser)]
#[command(
    name = "oxmod",
    author,
    version,
    about = "OpenXcom mod loader",
    long_about = "oxmod-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Resolves the active mod set of an OpenXcom installation,\n\
                  merges every rule file in dependency order and reports\n\
                  anything that dangles. `oxmod load <install>` does the full\n\
                  run; see `oxmod <command> --help` for details."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Loads and merges the full ruleset of an installation.
    Load(LoadArgs),

    /// Shows the resolved load order without merging rules.
    Mods(ModsArgs),

    /// Translates string keys with the merged string tables.
    Translate(TranslateArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
