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

//! Logging for the engine.
//!
//! A [`LogChannel`] keeps the history of logged lines and broadcasts each one
//! to any number of [`LogListener`]s. [`ChannelLogger`] plugs the channel into
//! the `log` facade so `log::info!` and friends land in it, mirrored to the
//! console through `env_logger`.

#![warn(missing_docs)]

pub mod channel;
pub mod line;
pub mod logger;

pub use channel::{LogChannel, LogEvent, LogListener};
pub use line::{LogLine, TimeStamp};
pub use logger::{init, ChannelLogger};
