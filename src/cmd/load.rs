// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Handlers for `load`, `mods` and `translate`.

use anyhow::Context as _;
use tracing::info;

use crate::cli::global::GlobalOptions;
use crate::cli::load::{LoadArgs, ModsArgs, TranslateArgs};
use crate::error::Result;
use crate::loader::{LoadOptions, LoadOutcome, load_ruleset, resolve_mods};
use crate::report::ErrorRecord;
use crate::ruleset::FALLBACK_LANG;

fn load_options(global: &GlobalOptions, rule_suffix: Option<&str>) -> LoadOptions {
    LoadOptions::builder()
        .strict(global.strict)
        .maybe_language(global.lang.clone())
        .rule_suffix(rule_suffix.unwrap_or(".rul").to_string())
        .build()
}

fn print_records(records: &[ErrorRecord]) {
    if records.is_empty() {
        return;
    }
    eprintln!("{} problem(s) recorded:", records.len());
    for record in records {
        eprintln!("  {record}");
    }
}

fn print_report(outcome: &LoadOutcome) {
    print_records(&outcome.report);
}

/// Runs the `load` command.
///
/// # Errors
///
/// Fatal load errors, or I/O errors while writing the output file.
pub fn run_load_command(args: &LoadArgs, global: &GlobalOptions) -> Result<()> {
    let options = load_options(global, Some(&args.rule_suffix));
    let outcome = load_ruleset(&args.install, &options)?;

    info!(
        "merged {} collections from {} mods",
        outcome.ruleset.len(),
        outcome.set.len()
    );
    print_report(&outcome);

    if let Some(output) = &args.output {
        let json = serde_json::to_string_pretty(&outcome.ruleset)
            .context("serializing merged ruleset")?;
        std::fs::write(output, json)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("wrote {}", output.display());
    } else {
        for (name, _) in outcome.ruleset.collections() {
            println!("{name}");
        }
    }
    Ok(())
}

/// Runs the `mods` command: resolve and print the load order only.
/// Rule files are never read, so a broken mod still lists.
///
/// # Errors
///
/// Fatal discovery and ordering errors.
pub fn run_mods_command(args: &ModsArgs, global: &GlobalOptions) -> Result<()> {
    let (set, report) = resolve_mods(&args.install, global.strict)?;

    for meta in set.iter() {
        let role = if meta.is_master { "master" } else { "mod" };
        println!(
            "{:3}  {role:6} {} '{}' {} ({})",
            meta.index.unwrap_or(0),
            meta.id,
            meta.name,
            meta.version,
            meta.root.display()
        );
    }
    print_records(&report);
    Ok(())
}

/// Runs the `translate` command.
///
/// # Errors
///
/// Fatal load errors.
pub fn run_translate_command(args: &TranslateArgs, global: &GlobalOptions) -> Result<()> {
    let options = load_options(global, None);
    let outcome = load_ruleset(&args.install, &options)?;

    // CLI override, then the install's configured language
    let configured = outcome
        .ruleset
        .get("_config")
        .and_then(|c| c.as_mapping()?.get("options")?.as_mapping()?.get("language")?.as_str())
        .map(str::to_string);
    let lang = global
        .lang
        .clone()
        .or(configured)
        .unwrap_or_else(|| FALLBACK_LANG.to_string());
    for key in &args.keys {
        println!("{key}: {}", outcome.ruleset.translate(key, &lang));
    }
    Ok(())
}
