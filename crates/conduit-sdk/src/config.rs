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

use anyhow::{Context, Result};
use conduit_control::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete engine configuration.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resource scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Forward every diagnostic push to the `log` facade.
    pub mirror_diagnostics_to_log: bool,
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub log_filter: String,
    /// Maximum number of lines kept in the log history. `None` keeps everything.
    pub log_history_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            mirror_diagnostics_to_log: true,
            log_filter: "info".to_string(),
            log_history_limit: Some(4096),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse engine configuration")
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine configuration '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid engine configuration in '{}'", path.display()))
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize engine configuration")?;
        fs::write(path, json).with_context(|| {
            format!("Failed to write engine configuration to '{}'", path.display())
        })
    }
}
