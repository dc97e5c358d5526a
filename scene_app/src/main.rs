//! Scene demo application
//!
//! Loads the engine settings, a scheduler description and a scene
//! description, binds stand-in Input and Render phases plus the guard AI,
//! and ticks the scheduler for a fixed number of frames.
//!
//! ```text
//! scene_demo [engine.toml] [frames]
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use scene_runtime::prelude::*;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "resources/engine.toml";
const DEFAULT_FRAMES: u64 = 8;

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("\"{0}\" is not set in the engine configuration")]
    MissingPath(&'static str),

    #[error("invalid frame count \"{0}\"")]
    FrameCount(String),
}

struct DemoApp {
    engine: Engine,
    frame: Arc<AtomicU64>,
}

impl DemoApp {
    fn new(config: EngineConfig, base_dir: &Path) -> Result<Self, AppError> {
        let scheduler_path = resolve(base_dir, config.scheduler_path.as_deref(), "scheduler_path")?;
        let scene_path = resolve(base_dir, config.scene_path.as_deref(), "scene_path")?;

        let mut engine = Engine::new(config)?;
        let frame = Arc::new(AtomicU64::new(0));
        bind_phases(&mut engine, &frame);

        engine.load_task_graph(&scheduler_path)?;
        let scene = engine.load_scene_from_path(&scene_path)?;
        log::info!("{scene}");

        bind_guard_ai(scene);
        engine.set_active_camera("main")?;

        Ok(Self { engine, frame })
    }

    fn run(&self, frames: u64) -> Result<(), AppError> {
        log::info!("Running {} frame(s)", frames);
        for _ in 0..frames {
            let executed = self.engine.run_frame()?;
            log::debug!(
                "Frame {} ran {} task(s)",
                self.frame.load(Ordering::Relaxed),
                executed
            );
        }
        Ok(())
    }
}

fn resolve(base_dir: &Path, path: Option<&Path>, field: &'static str) -> Result<PathBuf, AppError> {
    path.map(|path| base_dir.join(path)).ok_or(AppError::MissingPath(field))
}

// Input counts frames; Render reports what a renderer would draw.
fn bind_phases(engine: &mut Engine, frame: &Arc<AtomicU64>) {
    let counter = Arc::clone(frame);
    engine.register_task(
        "Input",
        task(move |_: &Engine| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }),
    );

    let counter = Arc::clone(frame);
    engine.register_task(
        "Render",
        task(move |engine: &Engine| {
            let Some(scene) = engine.scene() else {
                return Ok(());
            };
            let camera = scene
                .active_camera()
                .ok_or_else(|| format!("scene \"{}\" has no active camera", scene.name()))?;
            log::info!(
                "Frame {}: {} entities through camera \"{}\" at {:?}",
                counter.load(Ordering::Relaxed),
                scene.entity_count(),
                camera.name,
                camera.position.as_slice()
            );
            Ok(())
        }),
    );
}

fn bind_guard_ai(scene: &Scene) {
    for entity in scene.ais() {
        entity.map_ai(|ai| {
            ai.add_state_callback(
                "idle",
                callback(|entity| {
                    log::info!("{} looks around", entity.name());
                    entity.set_ai_state("alert");
                    Ok(())
                }),
            );
            ai.add_state_callback(
                "alert",
                callback(|entity| {
                    log::info!("{} stands down", entity.name());
                    entity.set_ai_state("idle");
                    Ok(())
                }),
            );
            ai.set_pre_update_callback(callback(|entity| {
                log::trace!("{} pre-update", entity.name());
                Ok(())
            }));
        });
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string()));
    let frames = match args.next() {
        Some(text) => text.parse().map_err(|_| AppError::FrameCount(text))?,
        None => DEFAULT_FRAMES,
    };

    let config = EngineConfig::load_from_file(&config_path).map_err(AppError::from)?;
    logging::init_with_level(config.log_filter());
    log::info!("Starting scene demo with {}", config_path.display());

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let app = DemoApp::new(config, base_dir)?;
    app.run(frames)?;

    log::info!("Scene demo finished");
    Ok(())
}
