// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              OxmodError (~24 bytes)
//!                     |
//!        +--------+---+----+--------+
//!        |        |        |        |
//!        v        v        v        v
//!      Graph    Merge    Data    Io/Strict/Other
//!       Box      Box      Box       Box
//!
//! Sub-errors (unboxed internally):
//!   Graph   DuplicateMaster, RequiredMasterMissing
//!   Merge   ConstraintViolation, UnknownCollection
//!   Data    ReadError, ParseError, InvalidValue, NotFound
//!
//! Graph and Merge errors are always fatal: without a valid load
//! order or merge semantics the ruleset is undefined. Per-item
//! errors go through report::ErrorSink instead and only surface
//! here as Strict when strict mode is on.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`OxmodError`].
pub type OxmodResult<T> = std::result::Result<T, OxmodError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum OxmodError {
    /// Dependency graph error.
    #[error("mod graph error: {0}")]
    Graph(#[from] Box<GraphError>),

    /// Ruleset merge error.
    #[error("merge error: {0}")]
    Merge(#[from] Box<MergeError>),

    /// Document read/parse error.
    #[error("data error: {0}")]
    Data(#[from] Box<DataError>),

    /// A recorded per-item error promoted to fatal by strict mode.
    #[error("strict mode: {0}")]
    Strict(Box<str>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for OxmodError {
                fn from(err: $error) -> Self {
                    OxmodError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GraphError => Graph,
    MergeError => Merge,
    DataError => Data,
    std::io::Error => Io,
}

// --- Graph Errors ---

/// Dependency graph and load-order errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// More than one active mod claims to be the master.
    #[error("two master mods active: '{first}' and '{second}'")]
    DuplicateMaster { first: String, second: String },

    /// A master reference cannot be resolved, or the active set
    /// cannot be fully ordered (cycle or dangling reference).
    #[error("required master missing: {0}")]
    RequiredMasterMissing(String),
}

// --- Merge Errors ---

/// Ruleset merge errors. Always authoring bugs in rule documents.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Duplicate primary key within one collection value, or a
    /// malformed delete directive.
    #[error("constraint violation in '{section}': {message}")]
    ConstraintViolation { section: String, message: String },

    /// Top-level rule document key not present in the strategy registry.
    #[error("unknown collection '{name}' in {file}")]
    UnknownCollection { name: String, file: String },
}

// --- Data Errors ---

/// Document read and parse errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// Failed to read a file.
    #[error("failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a YAML document.
    #[error("failed to parse '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A required file or directory was not found.
    #[error("not found: {0}")]
    NotFound(String),
}
