// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |          load / mods / translate
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          loader           |
//!              |   the full load pipeline  |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!              mods        ruleset   validate
//!           discovery,   merge/expand  integrity
//!           load order    /vanilla      checks
//!                 |           |
//!                 +-----+-----+
//!                       v
//!                    finder
//!             case-insensitive paths
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, report    |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod error;
pub mod finder;
pub mod loader;
pub mod logging;
pub mod mods;
pub mod report;
pub mod ruleset;
pub mod validate;
