//! Event supervisor, event state machines, and actor control for the
//! Vignette map event engine.
//!
//! This crate owns the registry of map events and the tick cycle that
//! drives them: delayed launches, pause and resume, termination with or
//! without cascade, and phase-gated dependency links between events.
//!
//! # Modules
//!
//! - [`actor`] -- Actors and the exclusive control token sprite events hold.
//! - [`config`] -- Configuration loading from `vignette-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`EventError`] returned by supervisor operations.
//! - [`events`] -- [`MapEvent`] and the closed set of event variants.
//! - [`script`] -- Script hooks and the [`ScriptResolver`] trait.
//! - [`services`] -- Collaborator traits, [`EventContext`], and stubs.
//! - [`supervisor`] -- [`EventSupervisor`], the per-tick scheduler.
//!
//! [`EventError`]: error::EventError
//! [`MapEvent`]: events::MapEvent
//! [`ScriptResolver`]: script::ScriptResolver
//! [`EventContext`]: services::EventContext
//! [`EventSupervisor`]: supervisor::EventSupervisor

pub mod actor;
pub mod config;
pub mod error;
pub mod events;
pub mod script;
pub mod services;
pub mod supervisor;
