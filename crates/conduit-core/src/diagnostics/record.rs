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

use crate::outcome::{Outcome, SeverityMask};
use crate::queue::{Entry, MailboxQueue, Payload};
use std::any::Any;
use std::fmt;
use std::path::PathBuf;

/// Extra payloads that can render themselves as a human-readable description.
pub trait Describe {
    /// Returns a multi-line description of the payload.
    fn describe(&self) -> String;
}

/// Where in the source a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file, as given by `file!()`.
    pub file: &'static str,
    /// Line number, as given by `line!()`.
    pub line: u32,
}

impl SourceLocation {
    /// Creates a location.
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl Describe for SourceLocation {
    fn describe(&self) -> String {
        format!("File: {}\nLine: {}", self.file, self.line)
    }
}

/// A checked condition (or assertion) that evaluated to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionInfo {
    /// The condition as written in the source.
    pub name: &'static str,
    /// Where it was checked.
    pub location: SourceLocation,
}

impl Describe for ConditionInfo {
    fn describe(&self) -> String {
        format!("Condition: {}\n{}", self.name, self.location.describe())
    }
}

/// A file that was expected to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// The path that was checked.
    pub path: PathBuf,
    /// Where it was checked.
    pub location: SourceLocation,
}

impl Describe for FileInfo {
    fn describe(&self) -> String {
        format!("Path: {}\n{}", self.path.display(), self.location.describe())
    }
}

/// Metadata stored with every record in a per-thread queue.
#[derive(Debug, Clone)]
pub(crate) struct RecordHeader {
    pub(crate) outcome: Outcome,
    pub(crate) message: String,
    pub(crate) description: String,
}

/// The per-thread queue of pending records.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticQueue {
    records: MailboxQueue<RecordHeader>,
}

impl DiagnosticQueue {
    pub(crate) fn push(&mut self, header: RecordHeader, extra: Payload) {
        self.records.push_payload(header, extra);
    }

    pub(crate) fn take(&mut self, mask: SeverityMask) -> Vec<DiagnosticRecord> {
        self.records
            .drain_matching(|entry| mask.contains(entry.meta().outcome.severity()))
            .into_iter()
            .map(|entry| DiagnosticRecord { entry })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Drops every record and returns how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.records.len();
        self.records.clear();
        dropped
    }
}

/// A diagnostic detached from its thread's queue.
///
/// Holds the outcome, the message, a description rendered from the extra
/// payload (when it implements [`Describe`]) and the extra payload itself.
pub struct DiagnosticRecord {
    entry: Entry<RecordHeader>,
}

impl DiagnosticRecord {
    /// The reported outcome.
    pub fn outcome(&self) -> Outcome {
        self.entry.meta().outcome
    }

    /// The message given at the push site.
    pub fn message(&self) -> &str {
        &self.entry.meta().message
    }

    /// The extended description, empty when the extra payload does not
    /// describe itself.
    pub fn description(&self) -> &str {
        &self.entry.meta().description
    }

    /// Returns `true` if an extra payload was attached.
    pub fn has_extra(&self) -> bool {
        !self.entry.payload().is_empty()
    }

    /// Returns `true` if the extra payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.entry.is::<T>()
    }

    /// Borrows the extra payload as a `T`.
    pub fn extra<T: Any>(&self) -> Option<&T> {
        self.entry.get::<T>()
    }
}

impl fmt::Debug for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticRecord")
            .field("outcome", &self.outcome())
            .field("message", &self.message())
            .field("description", &self.description())
            .field("extra", &self.entry.payload().type_name())
            .finish()
    }
}
