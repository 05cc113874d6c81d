//! Collision reports delivered by the spatial service.

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// What an actor ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// The edge of the map.
    Boundary,
    /// An impassable cell of the static collision grid.
    Grid,
    /// Another map object.
    Object,
}

impl CollisionKind {
    /// Boundary and grid collisions come from static map geometry.
    pub const fn is_geometry(self) -> bool {
        matches!(self, Self::Boundary | Self::Grid)
    }
}

/// Broad class of the object an actor collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// A physical object or treasure that never moves.
    Static,
    /// Another sprite, virtual sprite, or enemy that may move away.
    Mobile,
}

/// The object involved in an object collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    /// Map object id of the obstacle.
    pub object: ObjectId,
    /// Whether the obstacle can move on its own.
    pub kind: ObstacleKind,
}

/// A detected contact between a moving actor and the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    /// What kind of contact occurred.
    pub kind: CollisionKind,
    /// The obstacle, present for [`CollisionKind::Object`] collisions.
    pub obstacle: Option<Obstacle>,
}

impl Collision {
    /// A collision with static map geometry.
    pub const fn geometry(kind: CollisionKind) -> Self {
        Self {
            kind,
            obstacle: None,
        }
    }

    /// A collision with another map object.
    pub const fn object(obstacle: Obstacle) -> Self {
        Self {
            kind: CollisionKind::Object,
            obstacle: Some(obstacle),
        }
    }
}
