//! Actors (map sprites) and the control token that guards them.
//!
//! An [`Actor`] is the shared mutable resource sprite-bound events fight
//! over. The control token is a pair of ids: the actor records which event
//! controls it, and each sprite event records which actor it is bound to.
//! Neither side owns the other.
//!
//! Only the event holding the token may move, turn, or animate the actor.
//! The supervisor enforces this by preemption: starting a sprite event
//! terminates the previous controller before handing the token over.

use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use tracing::debug;
use vignette_types::{ActorId, Direction, EventId, MapPosition, float_fraction, float_integer};

/// A sprite on the map that events can take control of.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Identity of this actor.
    id: ActorId,
    /// Current position in tile units.
    pub position: MapPosition,
    /// Current facing.
    pub facing: Direction,
    /// Whether the actor is currently trying to move along its facing.
    pub moving: bool,
    /// Whether movement uses the running speed.
    pub is_running: bool,
    /// Milliseconds needed to walk one tile.
    pub movement_speed_ms: f64,
    /// Whether an event overrides the actor's regular animation.
    pub custom_animation: bool,
    /// Animation frame shown while `custom_animation` is set.
    pub current_animation: u32,
    /// Event currently holding the control token.
    controller: Option<EventId>,
}

impl Actor {
    /// Create an idle actor facing south.
    pub const fn new(id: ActorId, position: MapPosition, movement_speed_ms: f64) -> Self {
        Self {
            id,
            position,
            facing: Direction::South,
            moving: false,
            is_running: false,
            movement_speed_ms,
            custom_animation: false,
            current_animation: 0,
            controller: None,
        }
    }

    /// Return the actor's id.
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Integer (tile) part of the position.
    pub fn tile(&self) -> MapPosition {
        MapPosition::new(float_integer(self.position.x), float_integer(self.position.y))
    }

    /// Fractional (in-tile offset) part of the position.
    pub fn offset(&self) -> MapPosition {
        MapPosition::new(float_fraction(self.position.x), float_fraction(self.position.y))
    }

    /// Face a new direction.
    pub const fn set_direction(&mut self, direction: Direction) {
        self.facing = direction;
    }

    /// Face one of the four cardinal directions at random.
    pub fn set_random_direction(&mut self, rng: &mut dyn RngCore) {
        let index = rng.random_range(0..Direction::CARDINALS.len());
        if let Some(direction) = Direction::CARDINALS.get(index) {
            self.facing = *direction;
        }
    }

    /// Distance in tiles the actor covers during one tick of `elapsed_ms`.
    ///
    /// Running doubles the distance. A non-positive speed means the actor
    /// cannot move at all.
    pub fn distance_moved(&self, elapsed_ms: u32) -> f64 {
        if self.movement_speed_ms <= 0.0 {
            return 0.0;
        }
        let distance = f64::from(elapsed_ms) / self.movement_speed_ms;
        if self.is_running {
            distance * 2.0
        } else {
            distance
        }
    }

    /// Hand the control token to `event`, returning the previous holder.
    pub fn acquire_control(&mut self, event: &EventId) -> Option<EventId> {
        debug!(actor = %self.id, event_id = %event, "Actor control acquired");
        self.controller.replace(event.clone())
    }

    /// Release the control token if `event` holds it.
    ///
    /// Returns true if the token was released. A release by an event that
    /// does not hold the token leaves the current holder untouched.
    pub fn release_control(&mut self, event: &EventId) -> bool {
        if self.controller.as_ref() == Some(event) {
            self.controller = None;
            debug!(actor = %self.id, event_id = %event, "Actor control released");
            true
        } else {
            false
        }
    }

    /// Return the event holding the control token, if any.
    pub const fn controller(&self) -> Option<&EventId> {
        self.controller.as_ref()
    }

    /// Return true if `event` holds the control token.
    pub fn is_controlled_by(&self, event: &str) -> bool {
        self.controller.as_ref().is_some_and(|id| id.as_str() == event)
    }
}

/// All actors on the current map, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
    actors: BTreeMap<ActorId, Actor>,
}

impl ActorRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
        }
    }

    /// Add an actor, returning any actor previously stored under its id.
    pub fn insert(&mut self, actor: Actor) -> Option<Actor> {
        self.actors.insert(actor.id(), actor)
    }

    /// Look up an actor.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor for mutation.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Return true if an actor with this id exists.
    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Iterate over all actors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Iterate mutably over all actors in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Return true if there are no actors.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Release `actor`'s control token if `event` holds it.
    ///
    /// With `stop_moving`, a successful release also clears the moving
    /// flag so a movement event never leaves its actor walking.
    pub(crate) fn release_if_held(
        &mut self,
        actor: ActorId,
        event: &EventId,
        stop_moving: bool,
    ) -> bool {
        let Some(actor) = self.actors.get_mut(&actor) else {
            return false;
        };
        let released = actor.release_control(event);
        if released && stop_moving {
            actor.moving = false;
        }
        released
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn make_actor() -> Actor {
        Actor::new(ActorId(1), MapPosition::new(4.75, 2.5), 200.0)
    }

    #[test]
    fn control_token_is_exclusive() {
        let mut actor = make_actor();
        let first = EventId::from("walk");
        let second = EventId::from("turn");

        assert_eq!(actor.acquire_control(&first), None);
        assert_eq!(actor.acquire_control(&second), Some(first.clone()));
        assert!(actor.is_controlled_by("turn"));

        // A stale holder cannot release someone else's token.
        assert!(!actor.release_control(&first));
        assert!(actor.is_controlled_by("turn"));
        assert!(actor.release_control(&second));
        assert_eq!(actor.controller(), None);
    }

    #[test]
    fn distance_moved_scales_with_elapsed_and_running() {
        let mut actor = make_actor();
        assert!((actor.distance_moved(100) - 0.5).abs() < 1e-9);
        actor.is_running = true;
        assert!((actor.distance_moved(100) - 1.0).abs() < 1e-9);
        actor.movement_speed_ms = 0.0;
        assert!(actor.distance_moved(100).abs() < 1e-9);
    }

    #[test]
    fn position_splits_into_tile_and_offset() {
        let actor = make_actor();
        assert!((actor.tile().x - 4.0).abs() < 1e-9);
        assert!((actor.offset().x - 0.75).abs() < 1e-9);
        assert!((actor.tile().y - 2.0).abs() < 1e-9);
        assert!((actor.offset().y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn random_direction_is_cardinal() {
        let mut actor = make_actor();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..32 {
            actor.set_random_direction(&mut rng);
            assert!(actor.facing.is_cardinal());
        }
    }

    #[test]
    fn release_if_held_stops_movement() {
        let mut registry = ActorRegistry::new();
        let mut actor = make_actor();
        let event = EventId::from("wander");
        actor.acquire_control(&event);
        actor.moving = true;
        registry.insert(actor);

        assert!(registry.release_if_held(ActorId(1), &event, true));
        let actor = registry.get(ActorId(1)).unwrap();
        assert!(!actor.moving);
        assert_eq!(actor.controller(), None);
        assert!(!registry.release_if_held(ActorId(9), &event, true));
    }
}
