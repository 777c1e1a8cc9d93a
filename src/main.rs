// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   Load | Mods | Translate | Version
//! ```

use std::process::ExitCode;

use oxmod_rs::cli::global::GlobalOptions;
use oxmod_rs::cli::{self, Command};
use oxmod_rs::cmd::load::{run_load_command, run_mods_command, run_translate_command};
use oxmod_rs::logging::{LogConfig, LogLevel, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli)
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

fn dispatch_command(cli: &cli::Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Load(args)) => run_load_command(args, &cli.global),
        Some(Command::Mods(args)) => run_mods_command(args, &cli.global),
        Some(Command::Translate(args)) => run_translate_command(args, &cli.global),
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}
