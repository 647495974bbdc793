// Copyright 2025 eraflo
//
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

//! Outcome values reported by every fallible engine operation.
//!
//! An [`Outcome`] is a small `Copy` value made of a [`Severity`] and the hash
//! of a [`Kind`] (the category tag). It never carries data of its own; richer
//! context travels through the diagnostic registry or through events.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How serious an [`Outcome`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The operation went as expected.
    Info,
    /// The operation completed, but something deserves attention.
    Warning,
    /// The operation failed.
    Error,
}

impl Severity {
    /// Returns the human-readable name of the severity.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Severity`] values, used to filter outcomes and records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeverityMask {
    bits: u8,
}

impl SeverityMask {
    /// No severity.
    pub const NONE: Self = Self { bits: 0 };
    /// Informational outcomes only.
    pub const INFO: Self = Self { bits: 1 << 0 };
    /// Warnings only.
    pub const WARNING: Self = Self { bits: 1 << 1 };
    /// Errors only.
    pub const ERROR: Self = Self { bits: 1 << 2 };
    /// Warnings and errors, the default failure set.
    pub const FAILURES: Self = Self {
        bits: Self::WARNING.bits | Self::ERROR.bits,
    };
    /// Every severity.
    pub const ALL: Self = Self {
        bits: Self::INFO.bits | Self::WARNING.bits | Self::ERROR.bits,
    };

    /// Creates a mask holding a single severity.
    pub const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::INFO,
            Severity::Warning => Self::WARNING,
            Severity::Error => Self::ERROR,
        }
    }

    /// Returns the raw bits.
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Combines two masks.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Checks if the mask contains `severity`.
    pub const fn contains(&self, severity: Severity) -> bool {
        let bits = Self::from_severity(severity).bits;
        (self.bits & bits) == bits
    }

    /// Checks if the mask is empty.
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl Default for SeverityMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<Severity> for SeverityMask {
    fn from(severity: Severity) -> Self {
        Self::from_severity(severity)
    }
}

impl std::ops::BitOr for SeverityMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for SeverityMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the bytes of `name`, usable in `const` context.
pub const fn fnv1a32(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// A category tag for outcomes: a static name and its hash.
///
/// Only the hash travels inside an [`Outcome`]; the name is recovered through
/// [`DiagnosticRegistry::kind_name`](crate::DiagnosticRegistry::kind_name)
/// once the kind has been registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    name: &'static str,
    hash: u32,
}

impl Kind {
    /// Creates a kind from its name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            hash: fnv1a32(name),
        }
    }

    /// The human-readable name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The hash stored in outcomes of this kind.
    pub const fn hash(&self) -> u32 {
        self.hash
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Kinds used by the engine itself. Registered at startup by the SDK.
pub mod kinds {
    use super::Kind;

    /// Generic outcome with no specific category.
    pub const GLOBAL: Kind = Kind::new("Global Result");
    /// A checked runtime condition.
    pub const CONDITION: Kind = Kind::new("Condition Result");
    /// A debug assertion.
    pub const ASSERTION: Kind = Kind::new("Assertion Result");
    /// A file-system check.
    pub const FILE: Kind = Kind::new("File Result");
    /// A drivable resource's creation step.
    pub const RESOURCE_CREATION: Kind = Kind::new("Resource Creation Result");
    /// A drivable resource's per-tick execution step.
    pub const RESOURCE_EXECUTION: Kind = Kind::new("Resource Execution Result");
    /// A type-erased value did not hold the expected type.
    pub const TYPE_MISMATCH: Kind = Kind::new("Type Mismatch Result");

    /// Every kind above, in registration order.
    pub const ALL: [Kind; 7] = [
        GLOBAL,
        CONDITION,
        ASSERTION,
        FILE,
        RESOURCE_CREATION,
        RESOURCE_EXECUTION,
        TYPE_MISMATCH,
    ];
}

/// The result value of an engine operation: a severity and a category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outcome {
    severity: Severity,
    kind: u32,
}

impl Outcome {
    /// Informational outcome of the global kind.
    pub const SUCCESS: Self = Self::new(Severity::Info, kinds::GLOBAL);
    /// Warning of the global kind.
    pub const WARNING: Self = Self::new(Severity::Warning, kinds::GLOBAL);
    /// Error of the global kind.
    pub const FAILURE: Self = Self::new(Severity::Error, kinds::GLOBAL);

    /// Creates an outcome of the given kind.
    pub const fn new(severity: Severity, kind: Kind) -> Self {
        Self {
            severity,
            kind: kind.hash(),
        }
    }

    /// Creates an informational outcome of the given kind.
    pub const fn info(kind: Kind) -> Self {
        Self::new(Severity::Info, kind)
    }

    /// Creates a warning of the given kind.
    pub const fn warning(kind: Kind) -> Self {
        Self::new(Severity::Warning, kind)
    }

    /// Creates an error of the given kind.
    pub const fn error(kind: Kind) -> Self {
        Self::new(Severity::Error, kind)
    }

    /// The severity.
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// The hash of the kind this outcome belongs to.
    pub const fn kind_hash(&self) -> u32 {
        self.kind
    }

    /// Returns `true` if this outcome belongs to `kind`.
    pub const fn is_kind(&self, kind: Kind) -> bool {
        self.kind == kind.hash()
    }

    /// Returns `true` if the severity is `Info`.
    pub const fn succeeded(&self) -> bool {
        self.succeeded_with(SeverityMask::INFO)
    }

    /// Returns `true` if the severity is part of `success`.
    pub const fn succeeded_with(&self, success: SeverityMask) -> bool {
        success.contains(self.severity)
    }

    /// Returns `true` if the severity is `Warning` or `Error`.
    pub const fn failed(&self) -> bool {
        self.failed_with(SeverityMask::FAILURES)
    }

    /// Returns `true` if the severity is part of `failure`.
    pub const fn failed_with(&self, failure: SeverityMask) -> bool {
        failure.contains(self.severity)
    }

    /// Returns `true` if the severity is `Error`.
    pub const fn fatal(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Converts a failing outcome into an [`OutcomeError`] so it can be
    /// propagated with `?`.
    pub fn into_result(self) -> Result<Outcome, OutcomeError> {
        if self.failed() {
            Err(OutcomeError::new(self))
        } else {
            Ok(self)
        }
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010x})", self.severity, self.kind)
    }
}

/// A failing [`Outcome`] promoted to an error value.
#[derive(Debug, Clone, Error)]
#[error(
    "Type: {}, Severity: {}{}",
    .kind_name.unwrap_or("Unknown"),
    .outcome.severity(),
    .message.as_ref().map(|m| format!(", Message: {m}")).unwrap_or_default()
)]
pub struct OutcomeError {
    outcome: Outcome,
    kind_name: Option<&'static str>,
    message: Option<String>,
}

impl OutcomeError {
    /// Wraps `outcome` with no name or message attached.
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            kind_name: None,
            message: None,
        }
    }

    /// Attaches the resolved name of the outcome's kind.
    #[must_use]
    pub fn with_kind_name(mut self, name: &'static str) -> Self {
        self.kind_name = Some(name);
        self
    }

    /// Attaches a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The wrapped outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}
