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

//! Type-erased creation and drive entry points.
//!
//! The function pointers are instantiated per resource type when a resource is
//! added, so the payload they receive always holds the type they expect. The
//! mismatch branches only exist to keep the erased signatures total.

use conduit_core::outcome::kinds;
use conduit_core::queue::Entry;
use conduit_core::{Drivable, Outcome, Payload, ResourceContext, ResourceHandle};
use std::any;
use std::fmt;

type DriveFn = fn(&Payload) -> Outcome;
type ShareFn = fn(&Payload) -> Payload;
type CreateFn = fn(&Payload, &ResourceContext, Payload) -> Outcome;

/// Metadata stored with every live resource.
#[derive(Clone, Copy)]
pub(crate) struct ResourceVTable {
    pub(crate) drive: DriveFn,
    /// Clones the stored handle so a drive pass can run without the live-set lock.
    pub(crate) share: ShareFn,
    pub(crate) type_name: &'static str,
}

impl ResourceVTable {
    pub(crate) fn of<R: Drivable>() -> Self {
        Self {
            drive: drive_erased::<R>,
            share: share_erased::<R>,
            type_name: any::type_name::<R>(),
        }
    }
}

impl fmt::Debug for ResourceVTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceVTable")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A resource waiting for its creation function to run.
pub(crate) struct PendingCreation {
    target: Payload,
    descriptor: Payload,
    create: CreateFn,
    vtable: ResourceVTable,
}

impl PendingCreation {
    pub(crate) fn new<R: Drivable>(target: ResourceHandle<R>, descriptor: R::Descriptor) -> Self {
        Self {
            target: Payload::new(target),
            descriptor: Payload::new(descriptor),
            create: create_erased::<R>,
            vtable: ResourceVTable::of::<R>(),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.vtable.type_name
    }

    /// Runs the creation function and returns its outcome together with the
    /// entry to store in the live set.
    pub(crate) fn run(self, context: &ResourceContext) -> (Outcome, Entry<ResourceVTable>) {
        let outcome = (self.create)(&self.target, context, self.descriptor);
        (outcome, Entry::new(self.vtable, self.target))
    }
}

fn create_erased<R: Drivable>(
    target: &Payload,
    context: &ResourceContext,
    descriptor: Payload,
) -> Outcome {
    let Some(handle) = target.get::<ResourceHandle<R>>() else {
        return Outcome::error(kinds::TYPE_MISMATCH);
    };
    match descriptor.downcast::<R::Descriptor>() {
        Ok(descriptor) => handle.with(|resource| resource.create(context, descriptor)),
        Err(_) => Outcome::error(kinds::TYPE_MISMATCH),
    }
}

fn share_erased<R: Drivable>(target: &Payload) -> Payload {
    target
        .get::<ResourceHandle<R>>()
        .map_or_else(Payload::empty, |handle| Payload::new(handle.clone()))
}

fn drive_erased<R: Drivable>(target: &Payload) -> Outcome {
    match target.get::<ResourceHandle<R>>() {
        Some(handle) => handle.with(|resource| resource.drive()),
        None => Outcome::error(kinds::TYPE_MISMATCH),
    }
}
