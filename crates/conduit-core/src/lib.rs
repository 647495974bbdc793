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

//! # Conduit Core
//!
//! Foundational crate containing the cross-thread communication substrate of
//! the engine: outcome values, the heterogeneous mailbox queue, the broadcast
//! channel built on it, the per-thread diagnostic registry and the contract
//! that drivable resources implement.

#![warn(missing_docs)]

pub mod diagnostics;
pub mod event;
pub mod outcome;
pub mod queue;
pub mod resource;

#[doc(hidden)]
pub mod sync;

pub use diagnostics::{DiagnosticRecord, DiagnosticRegistry, Describe};
pub use event::{Broadcaster, Event, EventSource, Listener};
pub use outcome::{Kind, Outcome, OutcomeError, Severity, SeverityMask};
pub use queue::{Entry, MailboxQueue, Payload};
pub use resource::{Drivable, ResourceContext, ResourceHandle};
