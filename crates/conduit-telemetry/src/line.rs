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

//! A single logged line and the wall-clock stamp attached to it.

use conduit_core::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Time of day (UTC) at which a line was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TimeStamp {
    /// Hours, `0..24`.
    pub hours: u8,
    /// Minutes, `0..60`.
    pub minutes: u8,
    /// Seconds, `0..60`.
    pub seconds: u8,
    /// Milliseconds, `0..1000`.
    pub milliseconds: u16,
}

impl TimeStamp {
    /// Stamps the current time.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Converts a system time to its UTC time of day. Times before the epoch map to midnight.
    pub fn from_system_time(time: SystemTime) -> Self {
        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        let of_day = since_epoch.as_secs() % 86_400;
        Self {
            hours: (of_day / 3_600) as u8,
            minutes: (of_day / 60 % 60) as u8,
            seconds: (of_day % 60) as u8,
            milliseconds: since_epoch.subsec_millis() as u16,
        }
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// One line of the log history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// How serious the line is.
    pub severity: Severity,
    /// When it was logged.
    pub stamp: TimeStamp,
    /// The module path or custom target of the producer. Empty for direct calls.
    pub target: String,
    /// The text.
    pub message: String,
}

impl LogLine {
    /// Creates a line stamped with the current time.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            stamp: TimeStamp::now(),
            target: String::new(),
            message: message.into(),
        }
    }

    /// Sets the producer target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Renders `[hh:mm:ss]\t<SEVERITY>  message`, the tag padded to a fixed width.
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = format!("<{}>", self.severity.as_str().to_uppercase());
        write!(f, "[{}]\t{:<11}{}", self.stamp, tag, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stamp_from_system_time() {
        let time = UNIX_EPOCH + Duration::from_millis((26 * 3_600 + 5 * 60 + 9) * 1_000 + 250);
        let stamp = TimeStamp::from_system_time(time);
        assert_eq!(
            stamp,
            TimeStamp {
                hours: 2,
                minutes: 5,
                seconds: 9,
                milliseconds: 250
            }
        );
        assert_eq!(stamp.to_string(), "02:05:09");
    }

    #[test]
    fn test_format_pads_severity_tag() {
        let mut line = LogLine::new(Severity::Warning, "swapchain out of date");
        line.stamp = TimeStamp {
            hours: 13,
            minutes: 4,
            seconds: 0,
            milliseconds: 0,
        };
        assert_eq!(line.format(), "[13:04:00]\t<WARNING>  swapchain out of date");

        line.severity = Severity::Info;
        assert_eq!(line.format(), "[13:04:00]\t<INFO>     swapchain out of date");
    }
}
