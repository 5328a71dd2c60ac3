// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error taxonomy for the transformer kernel (spec.md §7).
//!
//! Every variant below corresponds to exactly one row of the §7 table.
//! [`Severity`] encodes that table's "Policy" column mechanically so the
//! driver-level continue/abort decision does not depend on matching
//! individual variants.

use crate::qualified_name::QualifiedName;
use core::fmt;

/// Policy attached to every [`TransformError`], mirroring spec.md §7's
/// "Policy" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Aborts the whole compilation unit (package body, type body, ...).
    FatalForUnit,
    /// Aborts only the one routine being transformed; siblings continue.
    FatalForRoutine,
    /// The identifier or construct is passed through unchanged; a warning
    /// is recorded instead of failing.
    NonFatal,
}

/// A source position, in byte offsets from the start of the cleaned text
/// handed to the scanner/parser, plus a human 1-based line/column for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("malformed source at {pos}: {reason}")]
    MalformedSource { pos: SourcePos, reason: String },

    #[error("unterminated routine {name} starting at {pos}")]
    UnterminatedRoutine { name: String, pos: SourcePos },

    #[error("parse error in {routine} at {pos}: {message}")]
    ParseError {
        routine: QualifiedName,
        pos: SourcePos,
        message: String,
    },

    #[error("unknown reference '{name}' in {routine}")]
    UnknownReference {
        routine: QualifiedName,
        name: String,
    },

    #[error("unsupported construct in {routine}: {construct} — {hint}")]
    UnsupportedConstruct {
        routine: QualifiedName,
        construct: String,
        hint: String,
    },

    #[error("transform inconsistency in {routine}: {detail}")]
    TransformInconsistency {
        routine: QualifiedName,
        detail: String,
    },

    #[error("routine source for {name} not found in RoutineStore")]
    StorageMiss { name: QualifiedName },
}

impl TransformError {
    /// The §7 "Policy" classification for this error kind.
    pub fn severity(&self) -> Severity {
        match self {
            TransformError::MalformedSource { .. } => Severity::FatalForUnit,
            TransformError::UnterminatedRoutine { .. } => Severity::FatalForUnit,
            TransformError::ParseError { .. } => Severity::FatalForRoutine,
            TransformError::UnknownReference { .. } => Severity::NonFatal,
            TransformError::UnsupportedConstruct { .. } => Severity::FatalForRoutine,
            TransformError::TransformInconsistency { .. } => Severity::FatalForUnit,
            TransformError::StorageMiss { .. } => Severity::FatalForUnit,
        }
    }
}

/// A non-fatal diagnostic recorded during transformation (§7: "Warnings are
/// collected in a per-run structured report"). Distinct from
/// [`TransformError`] because warnings never abort anything; they are
/// purely informational and accumulate in [`crate::context::TransformContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub routine: QualifiedName,
    pub pos: SourcePos,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.routine, self.pos, self.message)
    }
}

pub type Result<T> = core::result::Result<T, TransformError>;
