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

use anyhow::Result;
use conduit_core::DiagnosticRegistry;
use conduit_sdk::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const FRAMES: usize = 60;

/// Pretends to open an OS window.
#[derive(Default)]
struct Window {
    title: String,
    width: u32,
    height: u32,
}

struct WindowDescriptor {
    title: String,
    width: u32,
    height: u32,
}

impl Drivable for Window {
    type Descriptor = WindowDescriptor;

    fn create(&mut self, context: &ResourceContext, desc: WindowDescriptor) -> Outcome {
        let Some(diagnostics) = context.get::<Arc<DiagnosticRegistry>>() else {
            return Outcome::error(kinds::RESOURCE_CREATION);
        };
        let outcome = conduit_check!(
            diagnostics,
            desc.width > 0 && desc.height > 0,
            "window extent must not be empty"
        );
        if outcome.fatal() {
            return Outcome::error(kinds::RESOURCE_CREATION);
        }
        log::info!("Opened window '{}' ({}x{})", desc.title, desc.width, desc.height);
        self.title = desc.title;
        self.width = desc.width;
        self.height = desc.height;
        Outcome::SUCCESS
    }

    fn drive(&mut self) -> Outcome {
        Outcome::SUCCESS
    }
}

/// Pretends to render into a window; warns once every few frames.
#[derive(Default)]
struct Renderer {
    frame: usize,
}

impl Drivable for Renderer {
    type Descriptor = ();

    fn create(&mut self, _: &ResourceContext, _: ()) -> Outcome {
        Outcome::SUCCESS
    }

    fn drive(&mut self) -> Outcome {
        self.frame += 1;
        if self.frame % 25 == 0 {
            return Outcome::warning(kinds::RESOURCE_EXECUTION);
        }
        Outcome::SUCCESS
    }
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config)?;
    engine.install_logger()?;

    let failures = engine.scheduler().subscribe();

    let window = engine.scheduler().add_resource::<Window>(WindowDescriptor {
        title: "Sandbox".to_string(),
        width: 1280,
        height: 720,
    });
    engine.scheduler().add_resource::<Window>(WindowDescriptor {
        title: "Broken".to_string(),
        width: 0,
        height: 0,
    });
    let renderer = engine.scheduler().add_resource::<Renderer>(());
    engine.scheduler().await_creation();

    log::info!(
        "{} resource(s) live, main window is '{}'",
        engine.scheduler().resource_count(),
        window.lock().title
    );

    match engine.scheduler().mode() {
        SchedulingMode::Cooperative => {
            for _ in 0..FRAMES {
                engine.scheduler().drive_once();
            }
        }
        SchedulingMode::Worker => thread::sleep(Duration::from_millis(500)),
    }

    for event in failures.drain() {
        if let Some(failure) = event.get::<ResourceFailure>() {
            log::warn!("{failure}");
        }
    }
    log::info!("Renderer reached frame {}", renderer.lock().frame);

    let report = engine.report_diagnostics(SeverityMask::FAILURES);
    print!("{report}");

    engine.shutdown();
    Ok(())
}
