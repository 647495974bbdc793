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

//! The resource scheduler.
//!
//! A [`ResourceScheduler`] owns a dynamic, heterogeneous set of [`Drivable`]
//! resources. It creates each one from its descriptor, then drives every
//! successfully created resource once per tick. Failures never unwind: they
//! are posted as [`ResourceFailure`] events on the scheduler's broadcaster.
//!
//! In [`SchedulingMode::Cooperative`] the owning thread does everything:
//! `add_resource` creates inline and `drive_once` runs a tick. In
//! [`SchedulingMode::Worker`] a background thread drains pending creations,
//! then drives the live set in a loop until shutdown.
//!
//! A drive pass snapshots the live set and drives it with the set unlocked, so
//! a resource may call back into its scheduler from [`Drivable::drive`].

mod config;
mod erased;
mod failure;

pub use self::config::{ModeSelection, SchedulerConfig, SchedulingMode};
pub use self::failure::{FailureStage, ResourceFailure};

use self::erased::{PendingCreation, ResourceVTable};
use crate::error::SchedulerError;
use conduit_core::queue::Entry;
use conduit_core::sync::lock;
use conduit_core::{
    Broadcaster, Drivable, EventSource, MailboxQueue, Payload, ResourceContext, ResourceHandle,
};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Creation bookkeeping, guarded by one mutex shared with both condvars.
#[derive(Default)]
struct PendingState {
    queue: VecDeque<PendingCreation>,
    /// Creations taken by the worker and not yet installed.
    in_flight: usize,
    /// Resources installed in the live set.
    resident: usize,
    closing: bool,
}

impl PendingState {
    fn creating(&self) -> bool {
        !self.queue.is_empty() || self.in_flight > 0
    }

    fn idle(&self) -> bool {
        self.queue.is_empty() && self.resident == 0 && !self.closing
    }
}

struct Shared {
    resources: Mutex<MailboxQueue<ResourceVTable>>,
    pending: Mutex<PendingState>,
    work_available: Condvar,
    creation_finished: Condvar,
    events: Broadcaster,
    context: Arc<ResourceContext>,
    tick: Option<Duration>,
}

impl Shared {
    /// Runs one creation. Returns the entry to install only if creation succeeded.
    fn create(&self, creation: PendingCreation) -> Option<Entry<ResourceVTable>> {
        let type_name = creation.type_name();
        log::debug!("Creating resource {type_name}.");

        let (outcome, entry) = creation.run(&self.context);
        if outcome.failed() {
            self.report(ResourceFailure {
                outcome,
                stage: FailureStage::Create,
                type_name,
            });
        }
        outcome.succeeded().then_some(entry)
    }

    fn install(&self, entries: Vec<Entry<ResourceVTable>>) -> usize {
        let installed = entries.len();
        if installed > 0 {
            let mut resources = lock(&self.resources);
            for entry in entries {
                resources.push_entry(entry);
            }
        }
        installed
    }

    /// Drives every live resource once, head to tail.
    ///
    /// The set is locked only to snapshot it. Resources installed during the
    /// pass are driven from the next one.
    fn drive_all(&self) -> usize {
        let snapshot: Vec<(ResourceVTable, Payload)> = lock(&self.resources)
            .iter()
            .map(|entry| {
                let vtable = *entry.meta();
                (vtable, (vtable.share)(entry.payload()))
            })
            .collect();

        for (vtable, target) in &snapshot {
            let outcome = (vtable.drive)(target);
            if outcome.failed() {
                self.report(ResourceFailure {
                    outcome,
                    stage: FailureStage::Drive,
                    type_name: vtable.type_name,
                });
            }
        }
        snapshot.len()
    }

    fn report(&self, failure: ResourceFailure) {
        log::warn!("{failure}");
        self.events.post((), failure);
    }

    fn release_all(&self) -> usize {
        let released = {
            let mut resources = lock(&self.resources);
            let released = resources.len();
            resources.clear();
            released
        };
        lock(&self.pending).resident = 0;
        released
    }

    fn run_worker(&self) {
        let _exit = WorkerExit(self);
        log::info!("Resource scheduler worker started.");

        loop {
            let batch: Vec<PendingCreation> = {
                let pending = lock(&self.pending);
                let mut pending = self
                    .work_available
                    .wait_while(pending, |state| state.idle())
                    .unwrap_or_else(PoisonError::into_inner);
                if pending.closing {
                    break;
                }
                let batch: Vec<_> = pending.queue.drain(..).collect();
                pending.in_flight = batch.len();
                batch
            };

            let started = Instant::now();
            if !batch.is_empty() {
                let created = batch
                    .into_iter()
                    .filter_map(|creation| self.create(creation))
                    .collect();
                let installed = self.install(created);
                {
                    let mut pending = lock(&self.pending);
                    pending.resident += installed;
                    pending.in_flight = 0;
                }
                self.creation_finished.notify_all();
            }

            self.drive_all();
            self.throttle(started);
        }

        let released = self.release_all();
        log::info!("Resource scheduler worker stopped, released {released} resources.");
    }

    /// Sleeps out the rest of the tick. New work or shutdown cut it short.
    fn throttle(&self, started: Instant) {
        let Some(tick) = self.tick else {
            return;
        };
        let remaining = tick.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return;
        }
        let pending = lock(&self.pending);
        let _ = self
            .work_available
            .wait_timeout_while(pending, remaining, |state| {
                state.queue.is_empty() && !state.closing
            });
    }
}

/// Marks the scheduler closing and wakes every waiter when the worker leaves
/// its loop, unwinding included.
struct WorkerExit<'a>(&'a Shared);

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        {
            let mut pending = lock(&self.0.pending);
            pending.closing = true;
            pending.in_flight = 0;
        }
        self.0.creation_finished.notify_all();
    }
}

/// Creates and drives heterogeneous resources, inline or on a worker thread.
pub struct ResourceScheduler {
    shared: Arc<Shared>,
    mode: SchedulingMode,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ResourceScheduler {
    /// Creates a scheduler. In worker mode the background thread starts now.
    pub fn new(
        config: SchedulerConfig,
        context: Arc<ResourceContext>,
    ) -> Result<Self, SchedulerError> {
        let mode = config.mode.resolve();
        let shared = Arc::new(Shared {
            resources: Mutex::new(MailboxQueue::new()),
            pending: Mutex::new(PendingState::default()),
            work_available: Condvar::new(),
            creation_finished: Condvar::new(),
            events: Broadcaster::new(),
            context,
            tick: config.tick_duration(),
        });

        let worker = match mode {
            SchedulingMode::Cooperative => None,
            SchedulingMode::Worker => {
                let worker_shared = Arc::clone(&shared);
                let handle = thread::Builder::new()
                    .name(config.thread_name.clone())
                    .spawn(move || worker_shared.run_worker())
                    .map_err(|source| SchedulerError::Spawn {
                        name: config.thread_name.clone(),
                        source,
                    })?;
                Some(handle)
            }
        };

        log::info!("Resource scheduler running in {mode:?} mode.");
        Ok(Self {
            shared,
            mode,
            worker: Mutex::new(worker),
        })
    }

    /// The mode chosen at construction.
    pub fn mode(&self) -> SchedulingMode {
        self.mode
    }

    /// Adds a resource built from `descriptor` and returns a handle to it.
    ///
    /// Cooperative mode creates the resource before returning. Worker mode
    /// queues the creation and returns at once; the handle points to the
    /// inert value until the worker has run it. A failing creation is posted
    /// as exactly one [`ResourceFailure`] and keeps the resource out of the
    /// drive set, warnings included.
    pub fn add_resource<R: Drivable>(&self, descriptor: R::Descriptor) -> ResourceHandle<R> {
        let handle = ResourceHandle::<R>::default();
        let creation = PendingCreation::new(handle.clone(), descriptor);

        let mut pending = lock(&self.shared.pending);
        if pending.closing {
            log::warn!(
                "Resource {} added after shutdown, it will not be created.",
                creation.type_name()
            );
            return handle;
        }

        match self.mode {
            SchedulingMode::Cooperative => {
                drop(pending);
                let created = self.shared.create(creation);
                let mut pending = lock(&self.shared.pending);
                if pending.closing {
                    log::warn!("Scheduler shut down while creating a resource, it was released.");
                    return handle;
                }
                pending.resident += self.shared.install(created.into_iter().collect());
            }
            SchedulingMode::Worker => {
                pending.queue.push_back(creation);
                drop(pending);
                self.shared.work_available.notify_one();
            }
        }
        handle
    }

    /// Drives every live resource once on the calling thread and returns how
    /// many were driven. Worker mode drives on its own; there this returns `0`.
    pub fn drive_once(&self) -> usize {
        match self.mode {
            SchedulingMode::Cooperative => self.shared.drive_all(),
            SchedulingMode::Worker => 0,
        }
    }

    /// Blocks until every creation queued so far, and any queued while
    /// waiting, has been attempted. Returns at once in cooperative mode or
    /// after shutdown.
    pub fn await_creation(&self) {
        if self.mode == SchedulingMode::Cooperative {
            return;
        }
        let pending = lock(&self.shared.pending);
        let _pending = self
            .shared
            .creation_finished
            .wait_while(pending, |state| state.creating() && !state.closing)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Like [`await_creation`](Self::await_creation) but gives up after
    /// `timeout`. Returns `true` if creation finished.
    pub fn await_creation_timeout(&self, timeout: Duration) -> bool {
        if self.mode == SchedulingMode::Cooperative {
            return true;
        }
        let pending = lock(&self.shared.pending);
        let (pending, _) = self
            .shared
            .creation_finished
            .wait_timeout_while(pending, timeout, |state| {
                state.creating() && !state.closing
            })
            .unwrap_or_else(PoisonError::into_inner);
        !pending.creating()
    }

    /// Returns `true` if no creation is queued or running.
    pub fn finished_creating(&self) -> bool {
        !lock(&self.shared.pending).creating()
    }

    /// The number of creations queued or running.
    pub fn pending_count(&self) -> usize {
        let pending = lock(&self.shared.pending);
        pending.queue.len() + pending.in_flight
    }

    /// The number of resources in the drive set.
    pub fn resource_count(&self) -> usize {
        lock(&self.shared.resources).len()
    }

    /// The context handed to every creation call.
    pub fn context(&self) -> &Arc<ResourceContext> {
        &self.shared.context
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has run.
    pub fn is_closed(&self) -> bool {
        lock(&self.shared.pending).closing
    }

    /// Stops the worker, discards pending creations and releases every
    /// resource. Idempotent; also runs on drop. In-flight creation and drive
    /// calls finish first.
    pub fn shutdown(&self) {
        let mut worker = lock(&self.worker);
        let discarded = {
            let mut pending = lock(&self.shared.pending);
            if pending.closing && worker.is_none() {
                return;
            }
            pending.closing = true;
            std::mem::take(&mut pending.queue)
        };
        self.shared.work_available.notify_all();
        self.shared.creation_finished.notify_all();

        if let Some(worker) = worker.take() {
            if worker.join().is_err() {
                log::error!("Resource scheduler worker panicked.");
            }
        }

        let released = self.shared.release_all();
        log::info!(
            "Resource scheduler shut down: {released} resources released, {} creations discarded.",
            discarded.len()
        );
    }
}

impl EventSource for ResourceScheduler {
    fn events(&self) -> &Broadcaster {
        &self.shared.events
    }
}

impl Drop for ResourceScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ResourceScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceScheduler")
            .field("mode", &self.mode)
            .field("resources", &self.resource_count())
            .field("pending", &self.pending_count())
            .finish()
    }
}
