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

//! The contract between the resource scheduler and the resources it drives.
//!
//! A scheduler only ever calls [`Drivable::create`] once and then
//! [`Drivable::drive`] once per tick. It never inspects the resource otherwise.

mod context;

pub use self::context::ResourceContext;

use crate::outcome::Outcome;
use crate::sync::lock;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// A resource that can be created from a descriptor and then driven every tick.
///
/// `Default` provides the inert value stored before creation has run.
pub trait Drivable: Default + Send + 'static {
    /// The creation parameters.
    type Descriptor: Send + 'static;

    /// Builds the resource. Called exactly once, before any call to [`drive`](Self::drive).
    fn create(&mut self, context: &ResourceContext, descriptor: Self::Descriptor) -> Outcome;

    /// Runs one tick of work.
    fn drive(&mut self) -> Outcome;
}

/// Shared handle to a resource owned by a scheduler.
///
/// The scheduler holds its own clone; the resource stays alive as long as
/// either side does.
pub struct ResourceHandle<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> ResourceHandle<R> {
    /// Wraps `resource` in a new handle.
    pub fn new(resource: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(resource)),
        }
    }

    /// Locks the resource. Blocks while the scheduler is creating or driving it.
    pub fn lock(&self) -> MutexGuard<'_, R> {
        lock(&self.inner)
    }

    /// Runs `f` with the resource locked.
    pub fn with<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.lock())
    }

    /// Returns `true` if both handles point to the same resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Default> Default for ResourceHandle<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R> Clone for ResourceHandle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for ResourceHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("type", &std::any::type_name::<R>())
            .field("owners", &Arc::strong_count(&self.inner))
            .finish()
    }
}
