// oxmod-rs: OpenXcom Mod Loader - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error sink: per-item error accumulation with a strict/lenient switch.
//!
//! ```text
//! ErrorSink::lenient()          ErrorSink::strict()
//!   report() -> push record       report() -> Err(Strict) at once
//!        |
//!        v
//!   records() -> ordered report (empty = clean load)
//! ```
//!
//! Structural errors (duplicate master, broken load order, duplicate
//! primary keys) never pass through here; they abort via `OxmodError`
//! regardless of mode.

use serde::Serialize;
use std::fmt;

use crate::error::{OxmodError, OxmodResult};

/// Classification of a recorded, potentially non-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Mod metadata unreadable or incomplete; mod excluded from load order.
    MissingMetadata,
    /// A delete directive targeted a nonexistent key, or a resource
    /// path failed to resolve.
    UnresolvedReference,
    /// A collection entry is missing its primary-key field.
    MalformedEntry,
    /// Post-merge dangling reference between collections.
    ReferentialIntegrityViolation,
}

impl ErrorKind {
    /// Short string representation for report output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingMetadata => "missing-metadata",
            Self::UnresolvedReference => "unresolved-reference",
            Self::MalformedEntry => "malformed-entry",
            Self::ReferentialIntegrityViolation => "referential-integrity",
        }
    }
}

/// One recorded violation. Created during load or validation, never
/// mutated, read once at the end to produce the report.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    /// Source file (rule document path), or a pseudo-file for
    /// post-load phases.
    pub file: String,
    /// Collection or section name the error was found in.
    pub section: String,
    pub message: String,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.file,
            self.section,
            self.kind.as_str(),
            self.message
        )
    }
}

/// Accumulates per-item errors for one load invocation.
///
/// In lenient mode records are appended and processing continues; in
/// strict mode the first report aborts the load. The file/section
/// context is set by the loader as it walks rule documents.
#[derive(Debug)]
pub struct ErrorSink {
    strict: bool,
    file: String,
    section: String,
    records: Vec<ErrorRecord>,
}

impl ErrorSink {
    /// Create a sink that accumulates errors and continues.
    #[must_use]
    pub fn lenient() -> Self {
        Self::new(false)
    }

    /// Create a sink that aborts the load on the first recorded error.
    #[must_use]
    pub fn strict() -> Self {
        Self::new(true)
    }

    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            file: "(none)".to_string(),
            section: "(none)".to_string(),
            records: Vec::new(),
        }
    }

    /// Whether this sink aborts on the first recorded error.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Set the file/section context attached to subsequent records.
    pub fn set_context(&mut self, file: impl Into<String>, section: impl Into<String>) {
        self.file = file.into();
        self.section = section.into();
    }

    /// Record one violation.
    ///
    /// # Errors
    ///
    /// In strict mode, returns `OxmodError::Strict` carrying the
    /// formatted record; lenient mode always returns `Ok(())`.
    pub fn report(&mut self, kind: ErrorKind, message: impl Into<String>) -> OxmodResult<()> {
        let record = ErrorRecord {
            kind,
            file: self.file.clone(),
            section: self.section.clone(),
            message: message.into(),
        };
        tracing::warn!("{record}");
        self.records.push(record);
        if self.strict {
            let last = &self.records[self.records.len() - 1];
            return Err(OxmodError::Strict(last.to_string().into_boxed_str()));
        }
        Ok(())
    }

    /// All records accumulated so far, in report order.
    #[must_use]
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Consume the sink, yielding the final report.
    #[must_use]
    pub fn into_records(self) -> Vec<ErrorRecord> {
        self.records
    }
}
