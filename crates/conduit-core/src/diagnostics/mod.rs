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

//! Per-thread diagnostic records and the registry of outcome kind names.
//!
//! Any failed precondition, assertion or platform call can be funneled into a
//! [`DiagnosticRegistry`]. Records are appended to the queue of the thread
//! that raised them and stay there until a collaborator drains them; the
//! registry never decides whether a failure is fatal.

mod check;
mod record;

pub use self::check::{check_assertion, check_condition, check_file};
pub use self::record::{ConditionInfo, Describe, DiagnosticRecord, FileInfo, SourceLocation};

use self::record::{DiagnosticQueue, RecordHeader};
use crate::outcome::{Kind, Outcome, OutcomeError, Severity, SeverityMask};
use crate::queue::Payload;
use crate::sync::{lock, read, write};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, ThreadId};

/// Process-wide sink for diagnostics, constructed and torn down explicitly.
///
/// Holds one queue per thread that ever pushed a record, and a table mapping
/// outcome kind hashes to their names. Both are guarded by their own lock.
/// Share it through an `Arc`.
#[derive(Debug, Default)]
pub struct DiagnosticRegistry {
    names: RwLock<HashMap<u32, &'static str>>,
    queues: Mutex<HashMap<ThreadId, Arc<Mutex<DiagnosticQueue>>>>,
    mirror_to_log: bool,
}

impl DiagnosticRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that also forwards every push to the `log` facade.
    pub fn with_log_mirror(mirror_to_log: bool) -> Self {
        Self {
            mirror_to_log,
            ..Self::default()
        }
    }

    /// Records the name of `kind`. Registering the same kind twice is harmless.
    pub fn register_kind(&self, kind: Kind) {
        write(&self.names).insert(kind.hash(), kind.name());
    }

    /// Registers every kind of `kinds`.
    pub fn register_kinds(&self, kinds: impl IntoIterator<Item = Kind>) {
        let mut names = write(&self.names);
        for kind in kinds {
            names.insert(kind.hash(), kind.name());
        }
    }

    /// The registered name of the outcome's kind.
    pub fn kind_name(&self, outcome: Outcome) -> Option<&'static str> {
        read(&self.names).get(&outcome.kind_hash()).copied()
    }

    /// Builds an error value for `outcome`, resolving its kind name.
    pub fn error_for(&self, outcome: Outcome, message: impl Into<String>) -> OutcomeError {
        let error = OutcomeError::new(outcome).with_message(message);
        match self.kind_name(outcome) {
            Some(name) => error.with_kind_name(name),
            None => error,
        }
    }

    /// Appends a record with no extra payload to the calling thread's queue.
    pub fn push(&self, outcome: Outcome, message: impl Into<String>) {
        self.push_header(outcome, message.into(), String::new(), Payload::empty());
    }

    /// Appends a record carrying a typed extra payload.
    pub fn push_with<T: Any + Send>(&self, outcome: Outcome, message: impl Into<String>, extra: T) {
        self.push_header(outcome, message.into(), String::new(), Payload::new(extra));
    }

    /// Appends a record whose description is rendered from `extra`.
    pub fn push_described<T>(&self, outcome: Outcome, message: impl Into<String>, extra: T)
    where
        T: Describe + Any + Send,
    {
        let description = extra.describe();
        self.push_header(outcome, message.into(), description, Payload::new(extra));
    }

    /// Pops every record of `thread` whose severity is in `mask`, oldest first.
    pub fn drain(&self, thread: ThreadId, mask: SeverityMask) -> Vec<DiagnosticRecord> {
        let queue = lock(&self.queues).get(&thread).cloned();
        match queue {
            Some(queue) => lock(&queue).take(mask),
            None => Vec::new(),
        }
    }

    /// Pops the calling thread's records whose severity is in `mask`.
    pub fn drain_current(&self, mask: SeverityMask) -> Vec<DiagnosticRecord> {
        self.drain(thread::current().id(), mask)
    }

    /// Snapshot of every thread that has pushed at least one record.
    pub fn threads(&self) -> Vec<ThreadId> {
        lock(&self.queues).keys().copied().collect()
    }

    /// The number of records waiting in `thread`'s queue.
    pub fn pending(&self, thread: ThreadId) -> usize {
        let queue = lock(&self.queues).get(&thread).cloned();
        queue.map_or(0, |queue| lock(&queue).len())
    }

    /// Drops every queued record and the kind name table, and returns how many
    /// records were dropped.
    ///
    /// Per-thread queues stay registered, so a push racing with `clear` lands
    /// in a queue that later drains still see.
    pub fn clear(&self) -> usize {
        write(&self.names).clear();
        let queues: Vec<_> = lock(&self.queues).values().cloned().collect();
        queues.iter().map(|queue| lock(queue).clear()).sum()
    }

    fn push_header(&self, outcome: Outcome, message: String, description: String, extra: Payload) {
        if self.mirror_to_log {
            self.mirror(outcome, &message);
        }

        let queue = self.current_queue();
        lock(&queue).push(
            RecordHeader {
                outcome,
                message,
                description,
            },
            extra,
        );
    }

    fn current_queue(&self) -> Arc<Mutex<DiagnosticQueue>> {
        let mut queues = lock(&self.queues);
        Arc::clone(queues.entry(thread::current().id()).or_default())
    }

    fn mirror(&self, outcome: Outcome, message: &str) {
        let name = self.kind_name(outcome).unwrap_or("Unknown");
        match outcome.severity() {
            Severity::Info => log::debug!("[{name}] {message}"),
            Severity::Warning => log::warn!("[{name}] {message}"),
            Severity::Error => log::error!("[{name}] {message}"),
        }
    }
}
