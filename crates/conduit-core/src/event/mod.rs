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

//! Provides foundational primitives for event-driven communication.
//!
//! The primary component is the [`Broadcaster`], a one-to-many fan-out of
//! heterogeneous messages into independently owned listener mailboxes. Each
//! [`Listener`] drains its own mailbox at its own pace; a dropped listener is
//! pruned from the broadcaster the next time something is posted.
//!
//! Messages are not tied to a single type: every `post` may carry a different
//! payload type, and receivers check the type of each [`Event`] they pop.

mod broadcast;

pub use self::broadcast::{Broadcaster, Event, Listener};

/// Implemented by components that publish events on a [`Broadcaster`] of their own.
///
/// Collaborators use it to subscribe without knowing the concrete component.
pub trait EventSource {
    /// The broadcaster events are published on.
    fn events(&self) -> &Broadcaster;

    /// Creates a listener that receives every event posted from now on.
    fn subscribe(&self) -> Listener {
        self.events().subscribe()
    }
}
