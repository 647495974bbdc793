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

//! Bridge from the `log` facade into a [`LogChannel`], with a console mirror.

use crate::channel::LogChannel;
use crate::line::LogLine;
use conduit_core::Severity;
use env_logger::Env;
use log::{Level, Log, Metadata, Record, SetLoggerError};
use std::sync::Arc;

/// A [`log::Log`] implementation that records into a [`LogChannel`] and
/// writes to the console through `env_logger`.
///
/// Filtering follows `env_logger` rules: `RUST_LOG` overrides the default
/// filter given at construction.
pub struct ChannelLogger {
    channel: Arc<LogChannel>,
    console: env_logger::Logger,
    mirror_to_console: bool,
}

impl ChannelLogger {
    /// Creates a logger for `channel`, using `default_filter` when `RUST_LOG` is unset.
    pub fn new(channel: Arc<LogChannel>, default_filter: &str) -> Self {
        let builder =
            env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));
        Self::from_builder(channel, builder)
    }

    /// Creates a logger for `channel` with exactly `filter`, ignoring the environment.
    pub fn with_filter(channel: Arc<LogChannel>, filter: &str) -> Self {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(filter);
        Self::from_builder(channel, builder)
    }

    fn from_builder(channel: Arc<LogChannel>, mut builder: env_logger::Builder) -> Self {
        let console = builder.format_timestamp_millis().build();
        Self {
            channel,
            console,
            mirror_to_console: true,
        }
    }

    /// Enables or disables the console mirror. The channel always records.
    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.mirror_to_console = enabled;
        self
    }

    /// The most verbose level this logger accepts.
    pub fn max_level(&self) -> log::LevelFilter {
        self.console.filter()
    }

    /// The channel records are forwarded to.
    pub fn channel(&self) -> &Arc<LogChannel> {
        &self.channel
    }
}

/// Maps a `log` level onto the engine's three severities.
pub fn severity_of(level: Level) -> Severity {
    match level {
        Level::Error => Severity::Error,
        Level::Warn => Severity::Warning,
        Level::Info | Level::Debug | Level::Trace => Severity::Info,
    }
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.console.matches(record) {
            return;
        }
        if self.mirror_to_console {
            self.console.log(record);
        }
        let line = LogLine::new(severity_of(record.level()), record.args().to_string())
            .with_target(record.target());
        self.channel.log_line(line);
    }

    fn flush(&self) {
        self.console.flush();
    }
}

/// Installs a [`ChannelLogger`] for `channel` as the global logger.
///
/// Fails if a global logger is already set.
pub fn init(channel: Arc<LogChannel>, default_filter: &str) -> Result<(), SetLoggerError> {
    let logger = ChannelLogger::new(channel, default_filter);
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(logger: &ChannelLogger, level: Level, target: &str, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{message}"))
                .build(),
        );
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_of(Level::Error), Severity::Error);
        assert_eq!(severity_of(Level::Warn), Severity::Warning);
        assert_eq!(severity_of(Level::Debug), Severity::Info);
    }

    #[test]
    fn test_forwarded_records_reach_channel() {
        let channel = Arc::new(LogChannel::new());
        let listener = channel.subscribe();
        let logger = ChannelLogger::with_filter(Arc::clone(&channel), "trace").with_console(false);

        record_at(&logger, Level::Warn, "conduit::scheduler", "resource failed");

        let event = listener.receive().expect("forwarded line");
        assert_eq!(event.severity(), Severity::Warning);
        assert_eq!(event.message(), "resource failed");
        assert_eq!(event.line().target, "conduit::scheduler");
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_filtered_records_are_dropped() {
        let channel = Arc::new(LogChannel::new());
        let logger = ChannelLogger::with_filter(Arc::clone(&channel), "warn").with_console(false);
        assert_eq!(logger.max_level(), log::LevelFilter::Warn);

        record_at(&logger, Level::Debug, "any", "hidden");
        record_at(&logger, Level::Error, "any", "shown");

        let messages: Vec<String> = channel.history().into_iter().map(|l| l.message).collect();
        assert_eq!(messages, vec!["shown"]);
    }
}
