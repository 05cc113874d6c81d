//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup. Once the tick loop is running nothing
//! is fatal.

use vignette_core::config::ConfigError;

use crate::scene::SceneError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The scene could not be loaded or built.
    #[error("scene error: {source}")]
    Scene {
        /// The underlying scene error.
        #[from]
        source: SceneError,
    },

    /// No scene event could be started.
    #[error("no start event of scene {scene} could be started")]
    NothingStarted {
        /// Name of the scene.
        scene: String,
    },
}
