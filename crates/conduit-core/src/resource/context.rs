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

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// The collaborator context handed to every resource creation call.
///
/// A type-keyed map of the services a resource may need while it is being
/// created (a device, a window, the diagnostic registry). It is filled before
/// the scheduler starts and read-only afterwards.
///
/// # Example
///
/// ```rust
/// use conduit_core::resource::ResourceContext;
///
/// struct Adapter { index: u32 }
///
/// let mut context = ResourceContext::new();
/// context.insert(Adapter { index: 1 });
///
/// assert_eq!(context.get::<Adapter>().map(|a| a.index), Some(1));
/// ```
#[derive(Default)]
pub struct ResourceContext {
    services: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ResourceContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `service`, replacing any previous service of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: T) {
        self.services.insert(TypeId::of::<T>(), Box::new(service));
    }

    /// Borrows the service of type `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Returns `true` if a service of type `T` is present.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// The number of services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if the context holds no service.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ResourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceContext")
            .field("services", &self.services.len())
            .finish()
    }
}
