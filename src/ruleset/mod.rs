// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The merged ruleset and its merge machinery.
//!
//! ```text
//! rule file (yaml)          schema::strategy_for
//!      |                           |
//!      v                           v
//! expand::expand_paths ---> merge::merge_collection
//!                                  |
//!                                  v
//!                          Ruleset (collection -> Value)
//! ```
//!
//! Collections keep their first-seen order so two loads of the same
//! install produce byte-identical output.

pub mod expand;
pub mod merge;
pub mod schema;
pub mod vanilla;


use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

/// Translation language used when the requested one has no entry.
pub const FALLBACK_LANG: &str = "en-US";

/// The merged rule state: every collection the load has seen so far,
/// by name.
#[derive(Debug, Default, Serialize)]
pub struct Ruleset {
    #[serde(flatten)]
    collections: IndexMap<String, Value>,
}

impl Ruleset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, collection: &str) -> Option<&Value> {
        self.collections.get(collection)
    }

    pub fn insert(&mut self, collection: String, value: Value) {
        self.collections.insert(collection, value);
    }

    pub fn collections(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.collections.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Entries of a list-shaped collection, or an empty slice.
    #[must_use]
    pub fn entries(&self, collection: &str) -> &[Value] {
        match self.collections.get(collection) {
            Some(Value::Sequence(seq)) => seq,
            _ => &[],
        }
    }

    fn strings_for(&self, lang: &str) -> Option<&serde_yaml::Mapping> {
        let type_key = Value::String("type".to_string());
        let strings_key = Value::String("strings".to_string());
        self.entries("extraStrings").iter().find_map(|entry| {
            let map = entry.as_mapping()?;
            if map.get(&type_key)?.as_str()? != lang {
                return None;
            }
            map.get(&strings_key)?.as_mapping()
        })
    }

    /// Translate `key` into `lang`, falling back to [`FALLBACK_LANG`]
    /// and then to the key itself.
    #[must_use]
    pub fn translate<'a>(&'a self, text_key: &'a str, lang: &str) -> &'a str {
        let lookup = |lang: &str| -> Option<&'a str> {
            self.strings_for(lang)?
                .get(Value::String(text_key.to_string()))?
                .as_str()
        };
        lookup(lang)
            .or_else(|| lookup(FALLBACK_LANG))
            .unwrap_or(text_key)
    }
}
