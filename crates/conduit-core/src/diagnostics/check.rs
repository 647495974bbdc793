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

//! Check helpers that turn a failed precondition into a diagnostic record.
//!
//! None of these panic. They return [`Outcome::SUCCESS`] or the pushed
//! error, so call sites can propagate it with [`Outcome::into_result`].

use super::record::{ConditionInfo, FileInfo, SourceLocation};
use super::DiagnosticRegistry;
use crate::outcome::{kinds, Outcome};
use std::path::Path;

/// Pushes a `Condition Result` error when `condition` is `false`.
pub fn check_condition(
    registry: &DiagnosticRegistry,
    condition: bool,
    name: &'static str,
    location: SourceLocation,
    message: &str,
) -> Outcome {
    if condition {
        return Outcome::SUCCESS;
    }
    let outcome = Outcome::error(kinds::CONDITION);
    registry.push_described(outcome, message, ConditionInfo { name, location });
    outcome
}

/// Like [`check_condition`] but only evaluated in debug builds.
///
/// Release builds always report success and push nothing.
pub fn check_assertion(
    registry: &DiagnosticRegistry,
    condition: bool,
    name: &'static str,
    location: SourceLocation,
    message: &str,
) -> Outcome {
    if !cfg!(debug_assertions) || condition {
        return Outcome::SUCCESS;
    }
    let outcome = Outcome::error(kinds::ASSERTION);
    registry.push_described(outcome, message, ConditionInfo { name, location });
    outcome
}

/// Pushes a `File Result` error when `path` does not exist.
pub fn check_file(
    registry: &DiagnosticRegistry,
    path: impl AsRef<Path>,
    location: SourceLocation,
    message: &str,
) -> Outcome {
    let path = path.as_ref();
    if path.exists() {
        return Outcome::SUCCESS;
    }
    let outcome = Outcome::error(kinds::FILE);
    registry.push_described(
        outcome,
        message,
        FileInfo {
            path: path.to_path_buf(),
            location,
        },
    );
    outcome
}

/// Checks a condition against a [`DiagnosticRegistry`], capturing its source text and location.
///
/// ```
/// use conduit_core::{conduit_check, DiagnosticRegistry, SeverityMask};
///
/// let registry = DiagnosticRegistry::new();
/// let width = 0;
/// let outcome = conduit_check!(registry, width > 0, "window width must be positive");
/// assert!(outcome.fatal());
/// assert_eq!(registry.drain_current(SeverityMask::ERROR).len(), 1);
/// ```
#[macro_export]
macro_rules! conduit_check {
    ($registry:expr, $cond:expr, $msg:expr) => {
        $crate::diagnostics::check_condition(
            &$registry,
            $cond,
            stringify!($cond),
            $crate::diagnostics::SourceLocation::new(file!(), line!()),
            $msg,
        )
    };
}

/// Debug-only counterpart of [`conduit_check!`].
#[macro_export]
macro_rules! conduit_assert {
    ($registry:expr, $cond:expr, $msg:expr) => {
        $crate::diagnostics::check_assertion(
            &$registry,
            $cond,
            stringify!($cond),
            $crate::diagnostics::SourceLocation::new(file!(), line!()),
            $msg,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::SeverityMask;

    #[test]
    fn test_passing_condition_pushes_nothing() {
        let registry = DiagnosticRegistry::new();
        assert!(crate::conduit_check!(registry, 1 + 1 == 2, "math").succeeded());
        assert!(registry.drain_current(SeverityMask::ALL).is_empty());
    }

    #[test]
    fn test_failing_condition_records_source_text() {
        let registry = DiagnosticRegistry::new();
        let count = 3;
        let outcome = crate::conduit_check!(registry, count > 10, "not enough");
        assert!(outcome.is_kind(kinds::CONDITION));

        let records = registry.drain_current(SeverityMask::ERROR);
        assert_eq!(records.len(), 1);
        assert!(records[0].outcome().is_kind(kinds::CONDITION));
        assert_eq!(records[0].message(), "not enough");

        let info = records[0].extra::<ConditionInfo>().expect("Missing condition info");
        assert_eq!(info.name, "count > 10");
        assert!(records[0].description().starts_with("Condition: count > 10\n"));
    }

    #[test]
    fn test_assertion_follows_build_profile() {
        let registry = DiagnosticRegistry::new();
        let outcome = crate::conduit_assert!(registry, false, "unreachable state");
        let records = registry.drain_current(SeverityMask::ALL);

        if cfg!(debug_assertions) {
            assert!(outcome.fatal());
            assert_eq!(records.len(), 1);
            assert!(records[0].outcome().is_kind(kinds::ASSERTION));
        } else {
            assert!(outcome.succeeded());
            assert!(records.is_empty());
        }
    }

    #[test]
    fn test_missing_file_is_reported() {
        let registry = DiagnosticRegistry::new();
        let here = SourceLocation::new(file!(), line!());

        let found = check_file(&registry, env!("CARGO_MANIFEST_DIR"), here, "manifest dir");
        assert!(found.succeeded());
        let missing = check_file(&registry, "does/not/exist.cfg", here, "config missing");
        assert!(missing.is_kind(kinds::FILE));

        let records = registry.drain_current(SeverityMask::ALL);
        assert_eq!(records.len(), 1);
        let info = records[0].extra::<FileInfo>().expect("Missing file info");
        assert_eq!(info.path, Path::new("does/not/exist.cfg"));
    }
}
