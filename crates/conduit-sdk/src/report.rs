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

//! Snapshot of queued diagnostics, drained from every thread at once.

use conduit_core::{DiagnosticRecord, DiagnosticRegistry, SeverityMask};
use std::fmt;
use std::thread::ThreadId;

/// One drained record with its kind name resolved.
#[derive(Debug)]
pub struct ReportedRecord {
    /// The registered name of the record's kind, if any.
    pub kind_name: Option<&'static str>,
    /// The record itself.
    pub record: DiagnosticRecord,
}

/// The records drained from one thread, oldest first.
#[derive(Debug)]
pub struct ThreadDiagnostics {
    /// The thread that pushed them.
    pub thread: ThreadId,
    /// The records.
    pub records: Vec<ReportedRecord>,
}

/// Every diagnostic matching a mask, grouped by thread.
#[derive(Debug, Default)]
pub struct DiagnosticReport {
    threads: Vec<ThreadDiagnostics>,
}

impl DiagnosticReport {
    /// Drains every thread's queue of the records matching `mask`.
    pub fn collect(registry: &DiagnosticRegistry, mask: SeverityMask) -> Self {
        let threads = registry
            .threads()
            .into_iter()
            .filter_map(|thread| {
                let records: Vec<ReportedRecord> = registry
                    .drain(thread, mask)
                    .into_iter()
                    .map(|record| ReportedRecord {
                        kind_name: registry.kind_name(record.outcome()),
                        record,
                    })
                    .collect();
                (!records.is_empty()).then_some(ThreadDiagnostics { thread, records })
            })
            .collect();
        Self { threads }
    }

    /// The per-thread groups.
    pub fn threads(&self) -> &[ThreadDiagnostics] {
        &self.threads
    }

    /// Iterates every record, thread by thread.
    pub fn records(&self) -> impl Iterator<Item = &ReportedRecord> {
        self.threads.iter().flat_map(|t| t.records.iter())
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.threads.iter().map(|t| t.records.len()).sum()
    }

    /// Returns `true` if nothing was drained.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Returns `true` if any record is an error.
    pub fn has_fatal(&self) -> bool {
        self.records().any(|r| r.record.outcome().fatal())
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No queued diagnostics.");
        }
        for group in &self.threads {
            writeln!(f, "{:?}: {} record(s)", group.thread, group.records.len())?;
            for entry in &group.records {
                let outcome = entry.record.outcome();
                writeln!(
                    f,
                    "  [{}] {}: {}",
                    outcome.severity(),
                    entry.kind_name.unwrap_or("Unknown"),
                    entry.record.message()
                )?;
                for line in entry.record.description().lines() {
                    writeln!(f, "      {line}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::diagnostics::SourceLocation;
    use conduit_core::outcome::kinds;
    use conduit_core::Outcome;
    use std::thread;

    #[test]
    fn test_collect_groups_by_thread_and_formats() {
        let registry = DiagnosticRegistry::new();
        registry.register_kinds(kinds::ALL);

        registry.push_described(
            Outcome::error(kinds::CONDITION),
            "width must be positive",
            SourceLocation::new("window.rs", 7),
        );
        thread::scope(|s| {
            s.spawn(|| registry.push(Outcome::WARNING, "slow frame"));
        });
        registry.push(Outcome::SUCCESS, "not collected");

        let report = DiagnosticReport::collect(&registry, SeverityMask::FAILURES);
        assert_eq!(report.threads().len(), 2);
        assert_eq!(report.len(), 2);
        assert!(report.has_fatal());

        let text = report.to_string();
        assert!(text.contains("[Error] Condition Result: width must be positive"));
        assert!(text.contains("      File: window.rs"));
        assert!(text.contains("[Warning] Global Result: slow frame"));

        let current = thread::current().id();
        assert_eq!(registry.pending(current), 1);
    }

    #[test]
    fn test_empty_report() {
        let registry = DiagnosticRegistry::new();
        let report = DiagnosticReport::collect(&registry, SeverityMask::ALL);
        assert!(report.is_empty());
        assert!(!report.has_fatal());
        assert_eq!(report.to_string(), "No queued diagnostics.\n");
    }
}
