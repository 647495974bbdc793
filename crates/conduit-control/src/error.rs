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

use std::io;

/// Errors raised while setting up a scheduler.
///
/// Resource failures are never returned as errors; they are posted as
/// [`ResourceFailure`](crate::ResourceFailure) events.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn scheduler thread '{name}'")]
    Spawn {
        /// The requested thread name.
        name: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}
