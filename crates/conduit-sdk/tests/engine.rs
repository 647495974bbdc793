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

//! End-to-end engine lifecycle: configure, create resources, report, shut down.

use conduit_sdk::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Window {
    width: u32,
    frames: Arc<AtomicUsize>,
}

struct WindowDesc {
    width: u32,
    frames: Arc<AtomicUsize>,
}

impl Drivable for Window {
    type Descriptor = WindowDesc;

    fn create(&mut self, context: &ResourceContext, desc: WindowDesc) -> Outcome {
        let Some(registry) = context.get::<Arc<conduit_core::DiagnosticRegistry>>() else {
            return Outcome::error(kinds::RESOURCE_CREATION);
        };
        let outcome = conduit_check!(registry, desc.width > 0, "window width must be positive");
        if outcome.fatal() {
            return Outcome::error(kinds::RESOURCE_CREATION);
        }
        self.width = desc.width;
        self.frames = desc.frames;
        Outcome::SUCCESS
    }

    fn drive(&mut self) -> Outcome {
        self.frames.fetch_add(1, Ordering::SeqCst);
        Outcome::SUCCESS
    }
}

fn worker_engine() -> Engine {
    let config = EngineConfig::from_json(
        r#"{
            "scheduler": { "mode": "Worker", "thread_name": "engine-test", "tick_rate": 500 },
            "mirror_diagnostics_to_log": false
        }"#,
    )
    .expect("config");
    Engine::new(config).expect("engine")
}

#[test]
fn worker_engine_creates_drives_and_reports() {
    let engine = worker_engine();
    assert_eq!(engine.scheduler().mode(), SchedulingMode::Worker);
    let failures = engine.scheduler().subscribe();

    let frames = Arc::new(AtomicUsize::new(0));
    let good = engine.scheduler().add_resource::<Window>(WindowDesc {
        width: 800,
        frames: Arc::clone(&frames),
    });
    let bad = engine.scheduler().add_resource::<Window>(WindowDesc {
        width: 0,
        frames: Arc::new(AtomicUsize::new(0)),
    });
    engine.scheduler().await_creation();

    assert_eq!(good.lock().width, 800);
    assert_eq!(bad.lock().width, 0);
    assert_eq!(engine.scheduler().resource_count(), 1);

    let failure = failures
        .receive()
        .and_then(|event| event.get::<ResourceFailure>().copied())
        .expect("creation failure event");
    assert_eq!(failure.stage, FailureStage::Create);
    assert!(failures.receive().is_none());

    let deadline = Instant::now() + Duration::from_secs(5);
    while frames.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(frames.load(Ordering::SeqCst) > 0);

    // The failed check ran on the scheduler thread, not this one.
    let report = engine.report_diagnostics(SeverityMask::FAILURES);
    assert_eq!(report.len(), 1);
    assert_ne!(report.threads()[0].thread, thread::current().id());
    assert!(report
        .to_string()
        .contains("[Error] Condition Result: window width must be positive"));

    engine.shutdown();
    assert!(engine.scheduler().is_closed());
}

#[test]
fn dropping_the_engine_releases_resources() {
    let frames = Arc::new(AtomicUsize::new(0));
    let handle = {
        let engine = worker_engine();
        let handle = engine.scheduler().add_resource::<Window>(WindowDesc {
            width: 64,
            frames: Arc::clone(&frames),
        });
        engine.scheduler().await_creation();
        handle
    };

    let settled = frames.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(frames.load(Ordering::SeqCst), settled);
    assert_eq!(handle.lock().width, 64);
}
