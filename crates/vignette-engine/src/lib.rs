//! Headless scene runner for the Vignette map event engine.
//!
//! This crate hosts everything the event core leaves to its collaborators:
//! a walkable tile grid, timer-driven stand-ins for dialogue, audio and
//! screen effects, the scene file format, and the paced tick loop.
//!
//! # Modules
//!
//! - [`error`] -- [`EngineError`], the top-level error of the binary.
//! - [`presentation`] -- Headless dialogue, audio, screen and mode stack.
//! - [`runner`] -- [`run_scene`], the async tick loop.
//! - [`scene`] -- Scene YAML loading and validation into a supervisor.
//! - [`scripts`] -- Built-in script functions scenes may name.
//! - [`world`] -- [`GridWorld`], the tile grid spatial service.
//!
//! [`EngineError`]: error::EngineError
//! [`run_scene`]: runner::run_scene
//! [`GridWorld`]: world::GridWorld

pub mod error;
pub mod presentation;
pub mod runner;
pub mod scene;
pub mod scripts;
pub mod world;
