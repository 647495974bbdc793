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

//! The public-facing entry point of Conduit.
//!
//! An [`Engine`] owns one diagnostic registry, one log channel and one resource
//! scheduler, wired together from an [`EngineConfig`]. Applications build it
//! once at startup and hand out references to the parts they need.

#![warn(missing_docs)]

pub mod config;
pub mod report;

use anyhow::{Context, Result};
use conduit_control::ResourceScheduler;
use conduit_core::outcome::kinds;
use conduit_core::{DiagnosticRegistry, Outcome, ResourceContext, SeverityMask};
use conduit_telemetry::LogChannel;
use std::sync::Arc;

pub use config::EngineConfig;
pub use report::DiagnosticReport;

/// Everything an application usually needs, in one import.
pub mod prelude {
    pub use crate::{DiagnosticReport, Engine, EngineConfig};
    pub use conduit_control::{FailureStage, ResourceFailure, ResourceScheduler, SchedulingMode};
    pub use conduit_core::diagnostics::SourceLocation;
    pub use conduit_core::outcome::kinds;
    pub use conduit_core::{
        conduit_assert, conduit_check, Drivable, EventSource, Kind, Listener, Outcome,
        ResourceContext, ResourceHandle, Severity, SeverityMask,
    };
    pub use conduit_telemetry::{LogChannel, LogListener};
}

/// The assembled engine services.
///
/// Dropping the engine shuts the scheduler down.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    diagnostics: Arc<DiagnosticRegistry>,
    log: Arc<LogChannel>,
    scheduler: ResourceScheduler,
}

impl Engine {
    /// Builds the engine with an empty resource context.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_context(config, ResourceContext::new())
    }

    /// Builds the engine around `context`.
    ///
    /// The diagnostic registry and the log channel are inserted into the context
    /// as `Arc`s, so resources can reach them from `Drivable::create`.
    pub fn with_context(config: EngineConfig, mut context: ResourceContext) -> Result<Self> {
        let diagnostics = Arc::new(DiagnosticRegistry::with_log_mirror(
            config.mirror_diagnostics_to_log,
        ));
        diagnostics.register_kinds(kinds::ALL);

        let log = Arc::new(match config.log_history_limit {
            Some(limit) => LogChannel::with_history_limit(limit),
            None => LogChannel::new(),
        });

        context.insert(Arc::clone(&diagnostics));
        context.insert(Arc::clone(&log));

        let scheduler = ResourceScheduler::new(config.scheduler.clone(), Arc::new(context))
            .context("Failed to start the resource scheduler")?;

        log::info!("Engine started in {:?} mode", scheduler.mode());

        Ok(Self {
            config,
            diagnostics,
            log,
            scheduler,
        })
    }

    /// Routes the `log` facade into this engine's log channel.
    ///
    /// Fails if a global logger is already installed.
    pub fn install_logger(&self) -> Result<()> {
        conduit_telemetry::init(Arc::clone(&self.log), &self.config.log_filter)
            .context("Failed to install the engine logger")
    }

    /// The configuration the engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The diagnostic registry.
    pub fn diagnostics(&self) -> &Arc<DiagnosticRegistry> {
        &self.diagnostics
    }

    /// The log channel.
    pub fn log(&self) -> &Arc<LogChannel> {
        &self.log
    }

    /// The resource scheduler.
    pub fn scheduler(&self) -> &ResourceScheduler {
        &self.scheduler
    }

    /// Drains every thread's diagnostics matching `mask`.
    pub fn report_diagnostics(&self, mask: SeverityMask) -> DiagnosticReport {
        DiagnosticReport::collect(&self.diagnostics, mask)
    }

    /// Turns a failing outcome into an error carrying its kind name and `message`.
    ///
    /// Warnings count as failures here; use [`Outcome::fatal`] first to let them through.
    pub fn ensure(&self, outcome: Outcome, message: &str) -> Result<Outcome> {
        if outcome.failed() {
            return Err(self.diagnostics.error_for(outcome, message).into());
        }
        Ok(outcome)
    }

    /// Stops the scheduler, then drops every queued diagnostic and kind name.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        self.diagnostics.clear();
    }
}
