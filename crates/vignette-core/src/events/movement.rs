//! Simple sprite events: turning in place and random wandering.

use tracing::warn;
use vignette_types::{ActorId, Collision, Direction, EventId};

use super::EventState;
use crate::services::EventContext;

/// Turns an actor to a fixed facing, then releases it on the next update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDirectionEvent {
    actor: ActorId,
    direction: Direction,
}

impl ChangeDirectionEvent {
    /// Turn `actor` to `direction`.
    ///
    /// Diagonal facings are accepted but logged, since actors normally
    /// only face the four cardinal directions.
    pub fn new(actor: ActorId, direction: Direction) -> Self {
        if !direction.is_cardinal() {
            warn!(actor = %actor, ?direction, "Non-standard direction for change direction event");
        }
        Self { actor, direction }
    }

    /// The facing applied on start.
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

impl EventState for ChangeDirectionEvent {
    fn start(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        if let Some(actor) = ctx.actors.get_mut(self.actor) {
            actor.set_direction(self.direction);
        }
    }

    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        ctx.actors.release_if_held(self.actor, id, false);
        true
    }

    fn actor(&self) -> Option<ActorId> {
        Some(self.actor)
    }

    fn terminate(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        ctx.actors.release_if_held(self.actor, id, false);
    }
}

/// Walks an actor in random directions for a fixed time.
///
/// Two timers run independently. The direction timer re-rolls the facing
/// every `direction_time_ms`, carrying the overshoot into the next period.
/// The movement timer ends the event after `movement_time_ms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomMoveEvent {
    actor: ActorId,
    movement_time_ms: u32,
    direction_time_ms: u32,
    movement_timer: u32,
    direction_timer: u32,
}

impl RandomMoveEvent {
    /// Wander for `movement_time_ms`, changing facing every
    /// `direction_time_ms`.
    pub const fn new(actor: ActorId, movement_time_ms: u32, direction_time_ms: u32) -> Self {
        Self {
            actor,
            movement_time_ms,
            direction_time_ms,
            movement_timer: 0,
            direction_timer: 0,
        }
    }

    /// Time accumulated toward the next facing change.
    pub const fn direction_timer(&self) -> u32 {
        self.direction_timer
    }
}

impl EventState for RandomMoveEvent {
    fn start(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        self.movement_timer = 0;
        self.direction_timer = 0;
        if let Some(actor) = ctx.actors.get_mut(self.actor) {
            actor.set_random_direction(ctx.rng);
            actor.moving = true;
        }
    }

    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        let Some(actor) = ctx.actors.get_mut(self.actor) else {
            return true;
        };

        self.direction_timer = self.direction_timer.saturating_add(ctx.elapsed_ms);
        self.movement_timer = self.movement_timer.saturating_add(ctx.elapsed_ms);

        if self.direction_timer >= self.direction_time_ms {
            self.direction_timer = self.direction_timer.saturating_sub(self.direction_time_ms);
            actor.set_random_direction(ctx.rng);
        }

        if self.movement_timer >= self.movement_time_ms {
            self.movement_timer = 0;
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

    fn resolve_collision(&mut self, _id: &EventId, collision: &Collision, ctx: &mut EventContext<'_>) {
        let Some(actor) = ctx.actors.get_mut(self.actor) else {
            return;
        };
        if !ctx.spatial.adjust_around_collision(actor, collision) {
            actor.set_random_direction(ctx.rng);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vignette_types::{CollisionKind, MapPosition};

    use super::*;
    use crate::actor::Actor;
    use crate::services::StubServices;

    fn stubs_with_actor() -> StubServices {
        let mut stubs = StubServices::new(7);
        stubs
            .actors
            .insert(Actor::new(ActorId(1), MapPosition::new(5.0, 5.0), 100.0));
        stubs
    }

    #[test]
    fn change_direction_turns_then_releases() {
        let mut stubs = stubs_with_actor();
        let id = EventId::from("turn");
        let mut event = ChangeDirectionEvent::new(ActorId(1), Direction::West);
        stubs.actors.get_mut(ActorId(1)).unwrap().acquire_control(&id);

        event.start(&id, &mut stubs.context(16));
        assert_eq!(stubs.actors.get(ActorId(1)).unwrap().facing, Direction::West);
        assert!(stubs.actors.get(ActorId(1)).unwrap().is_controlled_by("turn"));

        assert!(event.update(&id, &mut stubs.context(16)));
        assert_eq!(stubs.actors.get(ActorId(1)).unwrap().controller(), None);
    }

    #[test]
    fn random_move_runs_for_total_duration() {
        let mut stubs = stubs_with_actor();
        let id = EventId::from("wander");
        let mut event = RandomMoveEvent::new(ActorId(1), 1000, 300);
        stubs.actors.get_mut(ActorId(1)).unwrap().acquire_control(&id);

        event.start(&id, &mut stubs.context(0));
        assert!(stubs.actors.get(ActorId(1)).unwrap().moving);

        for _ in 0..4 {
            assert!(!event.update(&id, &mut stubs.context(200)));
        }
        assert!(event.update(&id, &mut stubs.context(200)));

        let actor = stubs.actors.get(ActorId(1)).unwrap();
        assert!(!actor.moving);
        assert_eq!(actor.controller(), None);
    }

    #[test]
    fn direction_timer_wraps_remainder_forward() {
        let mut stubs = stubs_with_actor();
        let id = EventId::from("wander");
        let mut event = RandomMoveEvent::new(ActorId(1), 10_000, 300);
        event.start(&id, &mut stubs.context(0));

        assert!(!event.update(&id, &mut stubs.context(200)));
        assert_eq!(event.direction_timer(), 200);
        // 400 >= 300: re-roll and keep the 100 ms overshoot.
        assert!(!event.update(&id, &mut stubs.context(200)));
        assert_eq!(event.direction_timer(), 100);
    }

    #[test]
    fn failed_adjustment_rerolls_direction_without_panicking() {
        let mut stubs = stubs_with_actor();
        let id = EventId::from("wander");
        let mut event = RandomMoveEvent::new(ActorId(1), 1000, 300);
        event.start(&id, &mut stubs.context(0));

        stubs.spatial.adjust_succeeds = false;
        let collision = Collision::geometry(CollisionKind::Grid);
        event.resolve_collision(&id, &collision, &mut stubs.context(16));
        assert_eq!(stubs.spatial.adjustments, 1);
        assert!(stubs.actors.get(ActorId(1)).unwrap().facing.is_cardinal());
    }
}
