//! Shared type definitions for the Vignette map event engine.
//!
//! This crate holds the plain data types that flow between the event core,
//! its collaborators, and scene files. It has no behavior beyond small
//! geometric helpers.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes for events, actors, dialogues, objects
//! - [`geometry`] -- Map positions, float tolerance helpers, directions
//! - [`links`] -- Phase-gated dependency links between events
//! - [`collision`] -- Collision reports from the spatial service
//! - [`modes`] -- Mode-stack requests (battles, shops, map swaps)

pub mod collision;
pub mod geometry;
pub mod ids;
pub mod links;
pub mod modes;

// Re-export all public types at crate root for convenience.
pub use collision::{Collision, CollisionKind, Obstacle, ObstacleKind};
pub use geometry::{Direction, MapPosition, axis, float_fraction, float_integer, is_float_equal};
pub use ids::{ActorId, DialogueId, EventId, ObjectId};
pub use links::{EventLink, TriggerPhase};
pub use modes::{BattleSetup, MapSwap, ModeRequest, ShopSetup};
