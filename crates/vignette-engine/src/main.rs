//! Engine binary for the Vignette map event engine.
//!
//! Loads a scene file, builds its events into an event supervisor, and
//! drives the supervisor with a paced tick loop against headless
//! collaborators until every event has finished.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `vignette-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load and build the scene (first argument, or `scenes/demo.yaml`)
//! 4. Start the scene's start events
//! 5. Run the tick loop until idle, the tick limit, or Ctrl-C
//! 6. Log the result

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vignette_core::config::VignetteConfig;
use vignette_engine::error::EngineError;
use vignette_engine::runner;
use vignette_engine::scene::SceneDefinition;
use vignette_engine::scripts::builtin_scripts;

/// Scene run when no path is given on the command line.
const DEFAULT_SCENE: &str = "scenes/demo.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration or the scene cannot be loaded, or
/// if none of the scene's start events could be started.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("vignette-engine starting");
    info!(
        tick_interval_ms = config.engine.tick_interval_ms,
        max_ticks = config.engine.max_ticks,
        seed = config.engine.seed,
        realtime = config.engine.realtime,
        "Configuration loaded"
    );

    // 3. Load and build the scene.
    let scene_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_SCENE), PathBuf::from);
    let scene = SceneDefinition::from_file(&scene_path).map_err(EngineError::from)?;
    let scripts = builtin_scripts();
    let (mut supervisor, mut state) = scene.build(&config, &scripts).map_err(EngineError::from)?;
    info!(path = %scene_path.display(), "Scene loaded");

    // 4. Start the scene.
    let started = scene.start_events(&mut supervisor, &mut state);
    if started == 0 && !scene.start.is_empty() {
        return Err(EngineError::NothingStarted {
            scene: state.name.clone(),
        }
        .into());
    }
    info!(started, "Start events launched");

    // 5. Run the tick loop.
    let run = runner::run_scene(&mut supervisor, &mut state, &config.engine);
    let result = tokio::select! {
        result = run => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    // 6. Log results.
    let Some(result) = result else {
        warn!("Interrupted, terminating scheduled events");
        supervisor.terminate_all(&mut state.context(0));
        return Ok(());
    };
    runner::log_run_end(&result, &state);

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "vignette-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration from `vignette-config.yaml`.
///
/// Looks for the config file relative to the current working directory
/// and falls back to defaults when it is missing.
fn load_config() -> Result<VignetteConfig, EngineError> {
    let config_path = Path::new("vignette-config.yaml");
    if config_path.exists() {
        Ok(VignetteConfig::from_file(config_path)?)
    } else {
        Ok(VignetteConfig::default())
    }
}
