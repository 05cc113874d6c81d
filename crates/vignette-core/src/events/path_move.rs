//! Path-following movement.

use tracing::{error, warn};
use vignette_types::{
    ActorId, Collision, CollisionKind, Direction, EventId, MapPosition, ObstacleKind, axis,
};

use super::EventState;
use crate::services::EventContext;

/// Walks an actor along a path computed by the spatial service.
///
/// The destination is configured once and resolved on every start. A
/// relative destination is an offset from wherever the actor stands when
/// the event starts, so the configured value is kept apart from the
/// resolved one and restarting never compounds the offset.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMoveEvent {
    actor: ActorId,
    destination: MapPosition,
    relative: bool,
    run: bool,
    resolved: MapPosition,
    path: Vec<MapPosition>,
    current_node: usize,
    current_target: MapPosition,
}

impl PathMoveEvent {
    /// Walk `actor` to `destination`, running if `run` is set.
    pub const fn new(actor: ActorId, destination: MapPosition, run: bool) -> Self {
        Self {
            actor,
            destination,
            relative: false,
            run,
            resolved: destination,
            path: Vec::new(),
            current_node: 0,
            current_target: destination,
        }
    }

    /// Builder form of [`PathMoveEvent::set_relative_destination`].
    #[must_use]
    pub fn relative(mut self) -> Self {
        self.set_relative_destination(true);
        self
    }

    /// Change the destination. Any previously computed path is discarded.
    pub fn set_destination(&mut self, destination: MapPosition, run: bool) {
        self.destination = destination;
        self.run = run;
        self.path.clear();
    }

    /// Treat the destination as an offset from the actor's start position.
    pub fn set_relative_destination(&mut self, relative: bool) {
        self.relative = relative;
        self.path.clear();
    }

    /// The destination as configured.
    pub const fn destination(&self) -> MapPosition {
        self.destination
    }

    /// The absolute destination of the current activation.
    pub const fn resolved_destination(&self) -> MapPosition {
        self.resolved
    }

    /// Waypoints of the current activation.
    pub fn path(&self) -> &[MapPosition] {
        &self.path
    }
}

/// Direction from `position` toward `target`, ignoring axes already within
/// `tolerance`. Returns `None` once both axes are within tolerance.
pub(crate) fn movement_direction(
    position: MapPosition,
    target: MapPosition,
    tolerance: f64,
) -> Option<Direction> {
    let mut bits = 0_u8;

    let dy = position.y - target.y;
    if dy > tolerance {
        bits |= axis::NORTH;
    } else if dy < -tolerance {
        bits |= axis::SOUTH;
    }

    let dx = position.x - target.x;
    if dx > tolerance {
        bits |= axis::WEST;
    } else if dx < -tolerance {
        bits |= axis::EAST;
    }

    Direction::from_axes(bits)
}

impl EventState for PathMoveEvent {
    fn start(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        self.current_node = 0;
        let Some(actor) = ctx.actors.get_mut(self.actor) else {
            self.path.clear();
            return;
        };
        actor.is_running = self.run;

        self.resolved = if self.relative {
            self.destination.offset_from(&actor.position)
        } else {
            self.destination
        };

        self.path = ctx.spatial.find_path(actor, self.resolved);
        let Some(first) = self.path.first() else {
            error!(
                event_id = %id,
                actor = %self.actor,
                x = self.resolved.x,
                y = self.resolved.y,
                "No path to destination"
            );
            return;
        };
        self.current_target = *first;
        actor.moving = true;
    }

    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        let Some(actor) = ctx.actors.get_mut(self.actor) else {
            return true;
        };

        if self.path.is_empty() {
            actor.moving = false;
            actor.release_control(id);
            return true;
        }

        let tolerance = actor.distance_moved(ctx.elapsed_ms);

        if actor.position.is_within(&self.current_target, tolerance) {
            self.current_node = self.current_node.saturating_add(1);
            if let Some(next) = self.path.get(self.current_node) {
                self.current_target = *next;
            }
        }

        if let Some(direction) = movement_direction(actor.position, self.current_target, tolerance) {
            actor.set_direction(direction);
        }

        if actor.position.is_within(&self.resolved, tolerance) {
            actor.moving = false;
            actor.release_control(id);
            return true;
        }

        false
    }

    fn actor(&self) -> Option<ActorId> {
        Some(self.actor)
    }

    fn terminate(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        ctx.actors.release_if_held(self.actor, id, true);
    }

    fn resolve_collision(&mut self, id: &EventId, collision: &Collision, ctx: &mut EventContext<'_>) {
        let Some(actor) = ctx.actors.get_mut(self.actor) else {
            return;
        };

        let (CollisionKind::Object, Some(obstacle)) = (collision.kind, collision.obstacle) else {
            // Geometry should never block a computed path unless the map
            // changed underneath it.
            if !ctx.spatial.adjust_around_collision(actor, collision) {
                warn!(event_id = %id, kind = ?collision.kind, "Geometry collision on a computed path");
            }
            return;
        };

        let destination_blocked = ctx.spatial.is_position_occupied(self.resolved, &obstacle);
        match (obstacle.kind, destination_blocked) {
            (ObstacleKind::Static, true) => {
                warn!(
                    event_id = %id,
                    obstacle = %obstacle.object,
                    "Path destination blocked by a static object"
                );
                self.path.clear();
            }
            // Wait for the other sprite to move out of the way.
            (ObstacleKind::Mobile, true) => {}
            (_, false) => {
                ctx.spatial.adjust_around_collision(actor, collision);
            }
        }
    }
}
