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

use conduit_core::Outcome;
use std::fmt;

/// Which resource operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// The creation function.
    Create,
    /// A per-tick drive call.
    Drive,
}

/// Event posted on the scheduler's broadcaster when a resource operation
/// returns a failing outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceFailure {
    /// The outcome the resource returned.
    pub outcome: Outcome,
    /// The operation that returned it.
    pub stage: FailureStage,
    /// The resource type.
    pub type_name: &'static str,
}

impl fmt::Display for ResourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.stage {
            FailureStage::Create => "create",
            FailureStage::Drive => "drive",
        };
        write!(f, "{} failed to {}: {}", self.type_name, stage, self.outcome)
    }
}
