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

//! Worker-mode scenarios exercised from several caller threads.

use conduit_control::{
    FailureStage, ModeSelection, ResourceFailure, ResourceScheduler, SchedulerConfig,
};
use conduit_core::outcome::kinds;
use conduit_core::{Drivable, EventSource, Outcome, ResourceContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Stand-in for a graphics resource: counts its drive calls.
#[derive(Default)]
struct FakeRenderer {
    created: bool,
    frames: Arc<AtomicUsize>,
}

struct RendererDesc {
    fail: bool,
    frames: Arc<AtomicUsize>,
}

impl Drivable for FakeRenderer {
    type Descriptor = RendererDesc;

    fn create(&mut self, context: &ResourceContext, desc: RendererDesc) -> Outcome {
        if let Some(delay) = context.get::<Duration>() {
            thread::sleep(*delay);
        }
        if desc.fail {
            return Outcome::error(kinds::RESOURCE_CREATION);
        }
        self.created = true;
        self.frames = desc.frames;
        Outcome::SUCCESS
    }

    fn drive(&mut self) -> Outcome {
        assert!(self.created);
        self.frames.fetch_add(1, Ordering::SeqCst);
        Outcome::SUCCESS
    }
}

fn worker_scheduler(context: ResourceContext) -> Arc<ResourceScheduler> {
    let config = SchedulerConfig {
        mode: ModeSelection::Worker,
        thread_name: "scenario-worker".to_string(),
        tick_rate: 500,
    };
    Arc::new(ResourceScheduler::new(config, Arc::new(context)).expect("worker spawn"))
}

fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        if Instant::now() > deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    true
}

#[test]
fn two_callers_add_then_await_and_both_get_driven() {
    let mut context = ResourceContext::new();
    context.insert(Duration::from_millis(20));
    let scheduler = worker_scheduler(context);
    let barrier = Arc::new(Barrier::new(2));

    let callers: Vec<_> = (0..2)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let frames = Arc::new(AtomicUsize::new(0));
                barrier.wait();
                let handle = scheduler.add_resource::<FakeRenderer>(RendererDesc {
                    fail: false,
                    frames: Arc::clone(&frames),
                });
                barrier.wait();
                scheduler.await_creation();
                assert!(handle.lock().created);
                frames
            })
        })
        .collect();

    let counters: Vec<Arc<AtomicUsize>> = callers
        .into_iter()
        .map(|c| c.join().expect("caller panicked"))
        .collect();

    assert_eq!(scheduler.resource_count(), 2);
    for frames in counters {
        assert!(wait_until(|| frames.load(Ordering::SeqCst) > 0));
    }
}

#[test]
fn failing_creation_posts_exactly_one_event() {
    let scheduler = worker_scheduler(ResourceContext::new());
    let listener = scheduler.subscribe();
    let frames = Arc::new(AtomicUsize::new(0));

    let handle = scheduler.add_resource::<FakeRenderer>(RendererDesc {
        fail: true,
        frames: Arc::clone(&frames),
    });
    scheduler.await_creation();

    let events: Vec<_> = listener.drain().collect();
    assert_eq!(events.len(), 1);
    let failure = events[0]
        .get::<ResourceFailure>()
        .expect("ResourceFailure payload");
    assert_eq!(failure.stage, FailureStage::Create);
    assert_eq!(failure.outcome, Outcome::error(kinds::RESOURCE_CREATION));

    thread::sleep(Duration::from_millis(20));
    assert!(listener.receive().is_none());
    assert!(!handle.lock().created);
    assert_eq!(scheduler.resource_count(), 0);
    assert_eq!(frames.load(Ordering::SeqCst), 0);
}

#[test]
fn await_covers_resources_added_while_waiting() {
    let mut context = ResourceContext::new();
    context.insert(Duration::from_millis(5));
    let scheduler = worker_scheduler(context);

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                for _ in 0..10 {
                    scheduler.add_resource::<FakeRenderer>(RendererDesc {
                        fail: false,
                        frames: Arc::new(AtomicUsize::new(0)),
                    });
                }
                scheduler.await_creation();
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer panicked");
    }
    scheduler.await_creation();

    assert!(scheduler.finished_creating());
    assert_eq!(scheduler.resource_count(), 40);
}

#[test]
fn shutdown_wakes_blocked_waiters() {
    let mut context = ResourceContext::new();
    context.insert(Duration::from_millis(50));
    let scheduler = worker_scheduler(context);

    for _ in 0..5 {
        scheduler.add_resource::<FakeRenderer>(RendererDesc {
            fail: false,
            frames: Arc::new(AtomicUsize::new(0)),
        });
    }

    let waiter = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || scheduler.await_creation())
    };

    thread::sleep(Duration::from_millis(10));
    scheduler.shutdown();
    waiter.join().expect("waiter panicked");

    assert!(scheduler.is_closed());
    assert_eq!(scheduler.resource_count(), 0);
    assert_eq!(scheduler.pending_count(), 0);
}
