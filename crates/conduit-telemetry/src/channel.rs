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

//! The log channel: a recorded history plus live fan-out to listeners.

use crate::line::{LogLine, TimeStamp};
use conduit_core::{Broadcaster, Event, Listener, Severity};
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Records every logged line and broadcasts it to subscribed [`LogListener`]s.
///
/// Lines may carry a typed attachment, delivered alongside the line to
/// listeners but not kept in the history.
pub struct LogChannel {
    broadcaster: Broadcaster<LogLine>,
    history: Mutex<VecDeque<LogLine>>,
    history_limit: Option<usize>,
}

impl LogChannel {
    /// Creates a channel keeping the full history.
    pub fn new() -> Self {
        Self {
            broadcaster: Broadcaster::new(),
            history: Mutex::new(VecDeque::new()),
            history_limit: None,
        }
    }

    /// Creates a channel keeping at most `limit` lines, dropping the oldest first.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history_limit: Some(limit),
            ..Self::new()
        }
    }

    /// Logs `message` at `severity`.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.log_line(LogLine::new(severity, message));
    }

    /// Logs `message` with a typed attachment for listeners.
    pub fn log_with<T>(&self, severity: Severity, message: impl Into<String>, data: T)
    where
        T: Any + Send + Clone,
    {
        self.record(LogLine::new(severity, message), data);
    }

    /// Logs a prepared line.
    pub fn log_line(&self, line: LogLine) {
        self.record(line, ());
    }

    /// Creates a listener receiving every line logged from now on.
    pub fn subscribe(&self) -> LogListener {
        LogListener {
            inner: self.broadcaster.subscribe(),
        }
    }

    /// Snapshot of the recorded lines, oldest first.
    pub fn history(&self) -> Vec<LogLine> {
        self.lock_history().iter().cloned().collect()
    }

    /// The number of recorded lines.
    pub fn len(&self) -> usize {
        self.lock_history().len()
    }

    /// Returns `true` if nothing has been logged (or the history was cleared).
    pub fn is_empty(&self) -> bool {
        self.lock_history().is_empty()
    }

    /// Drops the recorded history. Listeners keep their pending lines.
    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    /// Serializes the history as a JSON array.
    pub fn export_json(&self) -> serde_json::Result<String> {
        let history = self.lock_history();
        serde_json::to_string_pretty(&*history)
    }

    fn record<T>(&self, line: LogLine, data: T)
    where
        T: Any + Send + Clone,
    {
        // History and delivery happen under one lock so every listener sees
        // lines in history order.
        let mut history = self.lock_history();
        self.broadcaster.post(line.clone(), data);
        history.push_back(line);
        if let Some(limit) = self.history_limit {
            while history.len() > limit {
                history.pop_front();
            }
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, VecDeque<LogLine>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogChannel")
            .field("lines", &self.len())
            .field("listeners", &self.broadcaster.listener_count())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

/// Receiving end of a [`LogChannel`] subscription.
#[derive(Debug, Default)]
pub struct LogListener {
    inner: Listener<LogLine>,
}

impl LogListener {
    /// Drops the current subscription, if any, and subscribes to `channel`.
    pub fn listen(&mut self, channel: &LogChannel) {
        *self = channel.subscribe();
    }

    /// Drops the subscription. Pending lines are discarded.
    pub fn stop_listening(&mut self) {
        self.inner.unsubscribe();
    }

    /// Returns `true` while attached to a channel.
    pub fn is_listening(&self) -> bool {
        self.inner.is_subscribed()
    }

    /// Pops the oldest pending line without blocking.
    pub fn receive(&self) -> Option<LogEvent> {
        self.inner.receive().map(|event| LogEvent { event })
    }

    /// Pops pending lines until none is left.
    pub fn drain(&self) -> impl Iterator<Item = LogEvent> + '_ {
        self.inner.drain().map(|event| LogEvent { event })
    }
}

/// A line popped from a [`LogListener`], with its optional attachment.
#[derive(Debug)]
pub struct LogEvent {
    event: Event<LogLine>,
}

impl LogEvent {
    /// The logged line.
    pub fn line(&self) -> &LogLine {
        self.event.meta()
    }

    /// Shorthand for `line().severity`.
    pub fn severity(&self) -> Severity {
        self.line().severity
    }

    /// Shorthand for `line().stamp`.
    pub fn stamp(&self) -> TimeStamp {
        self.line().stamp
    }

    /// Shorthand for `line().message`.
    pub fn message(&self) -> &str {
        &self.line().message
    }

    /// Returns `true` if the line was logged with an attachment.
    pub fn has_data(&self) -> bool {
        !self.event.is::<()>()
    }

    /// Returns `true` if the attachment is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.event.is::<T>()
    }

    /// Borrows the attachment as a `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.event.get::<T>()
    }

    /// Renders the line as [`LogLine::format`] does.
    pub fn format(&self) -> String {
        self.line().format()
    }
}
