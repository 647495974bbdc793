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

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// How a scheduler runs its resources, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingMode {
    /// Resources are created inline by `add_resource` and driven by explicit
    /// `drive_once` calls from the owning thread.
    Cooperative,
    /// A background thread creates and drives resources.
    Worker,
}

/// Which [`SchedulingMode`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModeSelection {
    /// `Worker` when more than one hardware thread is available, `Cooperative` otherwise.
    #[default]
    Auto,
    /// Always cooperative.
    Cooperative,
    /// Always spawn a worker.
    Worker,
}

impl ModeSelection {
    /// Resolves the selection against the machine.
    pub fn resolve(self) -> SchedulingMode {
        match self {
            ModeSelection::Cooperative => SchedulingMode::Cooperative,
            ModeSelection::Worker => SchedulingMode::Worker,
            ModeSelection::Auto => {
                let threads = thread::available_parallelism().map_or(1, |n| n.get());
                if threads > 1 {
                    SchedulingMode::Worker
                } else {
                    SchedulingMode::Cooperative
                }
            }
        }
    }
}

/// Configuration for the resource scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Mode selection.
    pub mode: ModeSelection,
    /// Name given to the worker thread.
    pub thread_name: String,
    /// Maximum number of drive passes per second on the worker. `0` drives as
    /// fast as possible.
    pub tick_rate: u32,
}

impl SchedulerConfig {
    /// The minimum duration of one worker iteration, if throttled.
    pub fn tick_duration(&self) -> Option<Duration> {
        (self.tick_rate > 0)
            .then(|| Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate)))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: ModeSelection::Auto,
            thread_name: "conduit-scheduler".to_string(),
            tick_rate: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_resolve_as_asked() {
        assert_eq!(ModeSelection::Cooperative.resolve(), SchedulingMode::Cooperative);
        assert_eq!(ModeSelection::Worker.resolve(), SchedulingMode::Worker);
    }

    #[test]
    fn test_auto_follows_available_parallelism() {
        let threads = thread::available_parallelism().map_or(1, |n| n.get());
        let expected = if threads > 1 {
            SchedulingMode::Worker
        } else {
            SchedulingMode::Cooperative
        };
        assert_eq!(ModeSelection::Auto.resolve(), expected);
    }

    #[test]
    fn test_tick_duration() {
        let mut config = SchedulerConfig {
            tick_rate: 50,
            ..Default::default()
        };
        assert_eq!(config.tick_duration(), Some(Duration::from_millis(20)));

        config.tick_rate = 0;
        assert_eq!(config.tick_duration(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "mode": "Cooperative" }"#).expect("valid config");
        assert_eq!(config.mode, ModeSelection::Cooperative);
        assert_eq!(config.tick_rate, 120);
        assert_eq!(config.thread_name, "conduit-scheduler");
    }
}
