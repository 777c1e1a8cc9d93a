// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Case-insensitive, multi-root path resolution.
//!
//! ```text
//! find_all("MAPS/foo*.map", roots)
//!        |
//!   split into uppercased components
//!        |
//!   breadth-first expansion, root by root:
//!     listdir (cached, sorted, uppercased)
//!     exact compare      no wildcard in pattern (fast path)
//!     wax glob compare   otherwise
//!        |
//!        v
//!   matches in root-priority order
//! ```
//!
//! A pattern ending in `/` lists the whole directory (`*` appended).
//! `find_first` returns `None` for absent optional resources; callers
//! decide fatality.

pub mod dirs;


use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use wax::{Glob, Program as _};

/// Directory entry: original name plus its uppercased form, cached so
/// repeated lookups pay for `read_dir` and `to_uppercase` only once.
type DirListing = Vec<(String, String)>;

/// Case-insensitive file finder with a per-load directory cache.
///
/// The cache is local to one load invocation and discarded with the
/// finder; concurrent loads must each use their own instance.
#[derive(Debug, Default)]
pub struct Finder {
    cache: HashMap<PathBuf, DirListing>,
}

impl Finder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List a directory through the cache. Unreadable directories list
    /// as empty. Entries are sorted by name so resolution order is
    /// deterministic for a fixed tree.
    fn listdir(&mut self, dir: &Path) -> &[(String, String)] {
        if !self.cache.contains_key(dir) {
            let mut listing: DirListing = match std::fs::read_dir(dir) {
                Ok(entries) => entries
                    .filter_map(std::result::Result::ok)
                    .map(|e| {
                        let name = e.file_name().to_string_lossy().into_owned();
                        let upper = name.to_uppercase();
                        (name, upper)
                    })
                    .collect(),
                Err(_) => Vec::new(),
            };
            listing.sort();
            self.cache.insert(dir.to_path_buf(), listing);
        }
        self.cache.get(dir).map_or(&[], Vec::as_slice)
    }

    /// Find all paths matching `pattern` under the given roots,
    /// case-insensitively, in root-priority order.
    ///
    /// `pattern` is a relative path whose components may contain glob
    /// wildcards (`*`, `?`, `[...]`). A trailing `/` lists the whole
    /// directory.
    pub fn find_all(&mut self, pattern: &str, roots: &[PathBuf]) -> Vec<PathBuf> {
        let normalized = pattern.replace('\\', "/");

        let mut components: Vec<String> = normalized
            .split('/')
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .collect();
        if normalized.ends_with('/') {
            components.push("*".to_string());
        }
        if components.is_empty() {
            return Vec::new();
        }

        // about 5x speedup on big mods if we skip glob matching when
        // the pattern has no wildcard characters at all
        let wildcard =
            normalized.contains(['*', '?', '[']) || normalized.ends_with('/');

        let mut candidates: Vec<PathBuf> = roots.to_vec();
        for component in &components {
            let glob = if wildcard {
                match Glob::new(component) {
                    Ok(g) => Some(g),
                    Err(e) => {
                        warn!("invalid glob component '{component}': {e}");
                        return Vec::new();
                    }
                }
            } else {
                None
            };

            let mut next = Vec::new();
            for dir in &candidates {
                for (name, upper) in self.listdir(dir) {
                    let matched = glob
                        .as_ref()
                        .map_or_else(|| upper == component, |g| g.is_match(upper.as_str()));
                    if matched {
                        next.push(dir.join(name));
                    }
                }
            }
            candidates = next;
        }
        candidates
    }

    /// First match for `pattern` under the given roots, or `None`.
    pub fn find_first(&mut self, pattern: &str, roots: &[PathBuf]) -> Option<PathBuf> {
        self.find_all(pattern, roots).into_iter().next()
    }
}
