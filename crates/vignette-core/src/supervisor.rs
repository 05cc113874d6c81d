//! The event supervisor: registry, working sets, and the per-tick cycle.
//!
//! The supervisor owns every registered [`MapEvent`] by id. Scheduled events
//! are referenced by id from exactly one of four working sets:
//!
//! - **active** -- started and polled every tick, in start order;
//! - **active delayed** -- waiting to start, with a countdown that runs;
//! - **paused** -- started but suspended;
//! - **paused delayed** -- waiting to start, countdown frozen.
//!
//! Each call to [`EventSupervisor::update`] runs two phases in fixed order:
//!
//! 1. **Delay promotion** -- every active countdown is reduced by the
//!    elapsed time. Expired entries are removed from the delayed set one at
//!    a time and only then started, so they take part in phase 2 of the same
//!    tick.
//!
//! 2. **Active update** -- every event in the active set is polled in
//!    order. A finished event is removed before its `OnFinish` links are
//!    examined, so a synchronously started child never sees its parent as
//!    still active. Children started during this pass join the end of the
//!    active set and are polled in the same pass, at most once per tick.
//!
//! Zero-delay links start their child synchronously and may cascade. Each
//! cascade is bounded by `max_link_depth`, and starting an event that is
//! already scheduled is rejected, which breaks link cycles.
//!
//! Sprite events are exclusive per actor: starting one terminates the
//! actor's current controller without cascade before the control token
//! moves to the new event.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use vignette_types::{ActorId, Collision, EventId, EventLink, TriggerPhase};

use crate::actor::{Actor, ActorRegistry};
use crate::config::EventsConfig;
use crate::error::EventError;
use crate::events::MapEvent;
use crate::services::EventContext;

/// Default bound on nested zero-delay link cascades.
pub const DEFAULT_MAX_LINK_DEPTH: usize = 32;

/// The working set currently holding a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkingSet {
    /// Started and polled every tick.
    Active,
    /// Waiting to start; the countdown runs.
    ActiveDelayed,
    /// Started but suspended.
    Paused,
    /// Waiting to start; the countdown is frozen.
    PausedDelayed,
}

/// A pending launch and its remaining countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DelayedLaunch {
    event: EventId,
    remaining_ms: u32,
}

/// Owns all map events and drives them tick by tick.
#[derive(Debug)]
pub struct EventSupervisor {
    /// Every registered event, by id.
    events: BTreeMap<EventId, MapEvent>,
    /// Started events, in start order.
    active: Vec<EventId>,
    /// Events waiting to start.
    active_delayed: Vec<DelayedLaunch>,
    /// Started events that are suspended.
    paused: Vec<EventId>,
    /// Delayed launches that are suspended.
    paused_delayed: Vec<DelayedLaunch>,
    /// Paused events that stopped their walking actor.
    halted: BTreeSet<EventId>,
    /// Bound on nested zero-delay link cascades.
    max_link_depth: usize,
}

impl Default for EventSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSupervisor {
    /// Create an empty supervisor with the default cascade depth limit.
    pub const fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            active: Vec::new(),
            active_delayed: Vec::new(),
            paused: Vec::new(),
            paused_delayed: Vec::new(),
            halted: BTreeSet::new(),
            max_link_depth: DEFAULT_MAX_LINK_DEPTH,
        }
    }

    /// Create an empty supervisor using the configured cascade depth limit.
    pub const fn with_config(config: &EventsConfig) -> Self {
        let mut supervisor = Self::new();
        supervisor.max_link_depth = config.max_link_depth;
        supervisor
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Take ownership of an event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DuplicateEvent`] if an event with the same id
    /// is already registered. The first registration is kept and the new
    /// event is dropped.
    pub fn register(&mut self, event: MapEvent) -> Result<(), EventError> {
        let id = event.id().clone();
        if self.events.contains_key(&id) {
            warn!(event_id = %id, "Event with this id already registered");
            return Err(EventError::DuplicateEvent(id));
        }
        debug!(event_id = %id, event_type = ?event.event_type(), "Event registered");
        self.events.insert(id, event);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Start an event now (`delay_ms == 0`) or after `delay_ms` of active
    /// tick time.
    ///
    /// An immediate start is synchronous: the event is in the active set,
    /// has been started, and its `OnStart` links have been examined by the
    /// time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if no such event is registered,
    /// or [`EventError::AlreadyScheduled`] if it already sits in a working
    /// set.
    pub fn start_event(
        &mut self,
        id: &str,
        delay_ms: u32,
        ctx: &mut EventContext<'_>,
    ) -> Result<(), EventError> {
        self.schedule(id, delay_ms, ctx, 0).inspect_err(|err| {
            warn!(event_id = id, error = %err, "Failed to start event");
        })
    }

    fn schedule(
        &mut self,
        id: &str,
        delay_ms: u32,
        ctx: &mut EventContext<'_>,
        depth: usize,
    ) -> Result<(), EventError> {
        let Some(id) = self.events.get_key_value(id).map(|(key, _)| key.clone()) else {
            return Err(EventError::UnknownEvent(EventId::from(id)));
        };
        if self.working_set_of(id.as_str()).is_some() {
            return Err(EventError::AlreadyScheduled(id));
        }

        if delay_ms == 0 {
            self.launch(&id, ctx, depth);
        } else {
            debug!(event_id = %id, delay_ms, "Event launch delayed");
            self.active_delayed.push(DelayedLaunch {
                event: id,
                remaining_ms: delay_ms,
            });
        }
        Ok(())
    }

    /// Put an event in the active set, hand it its actor, start it, and
    /// examine its `OnStart` links.
    fn launch(&mut self, id: &EventId, ctx: &mut EventContext<'_>, depth: usize) {
        let Some(event) = self.events.get(id) else {
            return;
        };
        let claimed_actor = if event.claims_control() {
            event.actor()
        } else {
            None
        };

        self.active.push(id.clone());
        if let Some(actor) = claimed_actor {
            self.hand_over_actor(actor, id, ctx);
        }
        if let Some(event) = self.events.get_mut(id) {
            event.start(ctx);
        }
        debug!(event_id = %id, depth, "Event started");

        self.examine_links(id, TriggerPhase::OnStart, ctx, depth);
    }

    /// Terminate the actor's current controller without cascade, then give
    /// the control token to `event`.
    fn hand_over_actor(&mut self, actor: ActorId, event: &EventId, ctx: &mut EventContext<'_>) {
        let previous = ctx
            .actors
            .get(actor)
            .and_then(Actor::controller)
            .filter(|holder| *holder != event)
            .cloned();

        if let Some(previous) = previous {
            info!(
                actor = %actor,
                previous = %previous,
                event_id = %event,
                "Sprite event preempted"
            );
            self.terminate_scheduled(&previous, false, ctx);
        }

        let Some(holder) = ctx.actors.get_mut(actor) else {
            warn!(actor = %actor, event_id = %event, "Sprite event bound to unknown actor");
            return;
        };
        holder.acquire_control(event);
    }

    /// Fire every link of `parent` whose trigger matches `phase`.
    ///
    /// Links are collected before any child starts, so children are free to
    /// mutate the registry and the working sets.
    fn examine_links(
        &mut self,
        parent: &EventId,
        phase: TriggerPhase,
        ctx: &mut EventContext<'_>,
        depth: usize,
    ) {
        let links: Vec<EventLink> = self
            .events
            .get(parent)
            .map(|event| {
                event
                    .links()
                    .iter()
                    .filter(|link| link.trigger == phase)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if links.is_empty() {
            return;
        }

        if depth >= self.max_link_depth {
            warn!(
                event_id = %parent,
                ?phase,
                depth,
                "Link cascade depth limit reached, links not examined"
            );
            return;
        }

        for link in links {
            let child_depth = depth.saturating_add(1);
            if let Err(err) = self.schedule(link.child.as_str(), link.delay_ms, ctx, child_depth) {
                warn!(
                    event_id = %parent,
                    child = %link.child,
                    error = %err,
                    "Can not launch linked event"
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance every scheduled event by one tick of `ctx.elapsed_ms`.
    pub fn update(&mut self, ctx: &mut EventContext<'_>) {
        let elapsed_ms = ctx.elapsed_ms;

        // Phase 1: delay promotion.
        for launch in &mut self.active_delayed {
            launch.remaining_ms = launch.remaining_ms.saturating_sub(elapsed_ms);
        }
        while let Some(index) = self
            .active_delayed
            .iter()
            .position(|launch| launch.remaining_ms == 0)
        {
            let launch = self.active_delayed.remove(index);
            self.launch(&launch.event, ctx, 0);
        }

        // Phase 2: active update. Events started during the pass are
        // appended to `active` and polled before the pass ends; each id is
        // polled at most once per tick.
        let mut polled: BTreeSet<EventId> = BTreeSet::new();
        loop {
            let next = self
                .active
                .iter()
                .find(|active| !polled.contains(*active))
                .cloned();
            let Some(id) = next else {
                break;
            };
            polled.insert(id.clone());
            let finished = self
                .events
                .get_mut(&id)
                .is_none_or(|event| event.update(ctx));
            if finished {
                self.active.retain(|active| *active != id);
                debug!(event_id = %id, "Event finished");
                self.examine_links(&id, TriggerPhase::OnFinish, ctx, 0);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pause / resume
    // -----------------------------------------------------------------------

    /// Suspend an event. Delayed launches keep their remaining countdown.
    ///
    /// A paused sprite event stops the actor it walks until it is resumed.
    /// Pausing an event that is not running or waiting is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if no such event is registered.
    pub fn pause_events(&mut self, id: &str, actors: &mut ActorRegistry) -> Result<(), EventError> {
        self.require_registered(id)?;
        let (started, moved) = Self::move_matching(
            &mut self.active,
            &mut self.paused,
            &mut self.active_delayed,
            &mut self.paused_delayed,
            |event| event.as_str() == id,
        );
        self.halt_actors(&started, actors);
        if moved > 0 {
            debug!(event_id = id, "Event paused");
        }
        Ok(())
    }

    /// Resume a paused event. A delayed launch continues its countdown where
    /// it stopped.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if no such event is registered.
    pub fn resume_events(&mut self, id: &str, actors: &mut ActorRegistry) -> Result<(), EventError> {
        self.require_registered(id)?;
        let (started, moved) = Self::move_matching(
            &mut self.paused,
            &mut self.active,
            &mut self.paused_delayed,
            &mut self.active_delayed,
            |event| event.as_str() == id,
        );
        self.release_halted(&started, actors);
        if moved > 0 {
            debug!(event_id = id, "Event resumed");
        }
        Ok(())
    }

    /// Suspend every sprite event bound to `actor`. Returns how many events
    /// were paused.
    pub fn pause_actor_events(&mut self, actor: ActorId, actors: &mut ActorRegistry) -> usize {
        let events = &self.events;
        let (started, moved) = Self::move_matching(
            &mut self.active,
            &mut self.paused,
            &mut self.active_delayed,
            &mut self.paused_delayed,
            |event| is_bound_to(events, event, actor),
        );
        self.halt_actors(&started, actors);
        debug!(actor = %actor, moved, "Actor events paused");
        moved
    }

    /// Resume every sprite event bound to `actor`. Returns how many events
    /// were resumed.
    pub fn resume_actor_events(&mut self, actor: ActorId, actors: &mut ActorRegistry) -> usize {
        let events = &self.events;
        let (started, moved) = Self::move_matching(
            &mut self.paused,
            &mut self.active,
            &mut self.paused_delayed,
            &mut self.active_delayed,
            |event| is_bound_to(events, event, actor),
        );
        self.release_halted(&started, actors);
        debug!(actor = %actor, moved, "Actor events resumed");
        moved
    }

    /// Move matching entries from one started/delayed pair of sets to the
    /// other, preserving order and countdowns.
    ///
    /// Returns the started events moved and the total number moved.
    fn move_matching(
        started_from: &mut Vec<EventId>,
        started_to: &mut Vec<EventId>,
        delayed_from: &mut Vec<DelayedLaunch>,
        delayed_to: &mut Vec<DelayedLaunch>,
        matches: impl Fn(&EventId) -> bool,
    ) -> (Vec<EventId>, usize) {
        let started = drain_matching(started_from, &matches);
        let delayed = drain_matching(delayed_from, |launch| matches(&launch.event));
        let moved = started.len().saturating_add(delayed.len());
        started_to.extend(started.iter().cloned());
        delayed_to.extend(delayed);
        (started, moved)
    }

    /// Stop every actor walking under the control of a just-paused event.
    fn halt_actors(&mut self, paused: &[EventId], actors: &mut ActorRegistry) {
        for id in paused {
            let Some(actor) = self
                .events
                .get(id)
                .and_then(MapEvent::actor)
                .and_then(|actor| actors.get_mut(actor))
            else {
                continue;
            };
            if actor.moving && actor.is_controlled_by(id.as_str()) {
                actor.moving = false;
                self.halted.insert(id.clone());
            }
        }
    }

    /// Set the actors of just-resumed events walking again.
    fn release_halted(&mut self, resumed: &[EventId], actors: &mut ActorRegistry) {
        for id in resumed {
            if !self.halted.remove(id) {
                continue;
            }
            let Some(actor) = self
                .events
                .get(id)
                .and_then(MapEvent::actor)
                .and_then(|actor| actors.get_mut(actor))
            else {
                continue;
            };
            if actor.is_controlled_by(id.as_str()) {
                actor.moving = true;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Termination
    // -----------------------------------------------------------------------

    /// Remove an event from whichever working set holds it.
    ///
    /// A started event (active or paused) is told to clean up, which
    /// releases any actor it controls. With `cascade`, the event's
    /// `OnFinish` links fire as if it had finished naturally, even when it
    /// was paused or still waiting to start. Terminating an event that is
    /// not scheduled is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if no such event is registered.
    pub fn terminate_events(
        &mut self,
        id: &str,
        cascade: bool,
        ctx: &mut EventContext<'_>,
    ) -> Result<(), EventError> {
        let id = self.require_registered(id)?;
        self.terminate_scheduled(&id, cascade, ctx);
        Ok(())
    }

    fn terminate_scheduled(&mut self, id: &EventId, cascade: bool, ctx: &mut EventContext<'_>) -> bool {
        let was_active = remove_id(&mut self.active, id);
        let was_paused = remove_id(&mut self.paused, id);
        let was_delayed = remove_launch(&mut self.active_delayed, id);
        let was_paused_delayed = remove_launch(&mut self.paused_delayed, id);

        let started = was_active || was_paused;
        if !(started || was_delayed || was_paused_delayed) {
            return false;
        }
        self.halted.remove(id);

        if started {
            self.clean_up(id, ctx);
        }
        info!(event_id = %id, cascade, "Event terminated");

        if cascade {
            self.examine_links(id, TriggerPhase::OnFinish, ctx, 0);
        }
        true
    }

    /// Let a started event release what it holds after a forced stop.
    fn clean_up(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        if let Some(event) = self.events.get_mut(id) {
            event.terminate(ctx);
        }
    }

    /// Terminate every sprite event bound to `actor`, without cascade.
    /// Returns how many events were terminated.
    pub fn terminate_actor_events(&mut self, actor: ActorId, ctx: &mut EventContext<'_>) -> usize {
        let bound: Vec<EventId> = self
            .scheduled_ids()
            .filter(|id| is_bound_to(&self.events, id, actor))
            .cloned()
            .collect();

        let mut terminated = 0_usize;
        for id in &bound {
            if self.terminate_scheduled(id, false, ctx) {
                terminated = terminated.saturating_add(1);
            }
        }
        debug!(actor = %actor, terminated, "Actor events terminated");
        terminated
    }

    /// Terminate every scheduled event, without cascade.
    pub fn terminate_all(&mut self, ctx: &mut EventContext<'_>) {
        let scheduled: Vec<EventId> = self.scheduled_ids().cloned().collect();
        for id in &scheduled {
            self.terminate_scheduled(id, false, ctx);
        }
    }

    // -----------------------------------------------------------------------
    // Collisions
    // -----------------------------------------------------------------------

    /// Route a collision of `actor` to the active event controlling it.
    ///
    /// Returns false if no active event controls the actor.
    pub fn resolve_collision(
        &mut self,
        actor: ActorId,
        collision: &Collision,
        ctx: &mut EventContext<'_>,
    ) -> bool {
        let Some(controller) = ctx.actors.get(actor).and_then(Actor::controller).cloned() else {
            return false;
        };
        if !self.active.contains(&controller) {
            return false;
        }
        let Some(event) = self.events.get_mut(&controller) else {
            return false;
        };
        event.resolve_collision(collision, ctx);
        true
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Return true if the event is in the active set.
    pub fn is_event_active(&self, id: &str) -> bool {
        self.active.iter().any(|active| active.as_str() == id)
    }

    /// The working set holding the event, or `None` if it is not scheduled.
    pub fn working_set_of(&self, id: &str) -> Option<WorkingSet> {
        if self.active.iter().any(|event| event.as_str() == id) {
            Some(WorkingSet::Active)
        } else if self.active_delayed.iter().any(|launch| launch.event.as_str() == id) {
            Some(WorkingSet::ActiveDelayed)
        } else if self.paused.iter().any(|event| event.as_str() == id) {
            Some(WorkingSet::Paused)
        } else if self.paused_delayed.iter().any(|launch| launch.event.as_str() == id) {
            Some(WorkingSet::PausedDelayed)
        } else {
            None
        }
    }

    /// Remaining countdown of a delayed launch, active or paused.
    pub fn remaining_delay(&self, id: &str) -> Option<u32> {
        self.active_delayed
            .iter()
            .chain(&self.paused_delayed)
            .find(|launch| launch.event.as_str() == id)
            .map(|launch| launch.remaining_ms)
    }

    /// Look up a registered event.
    pub fn event(&self, id: &str) -> Option<&MapEvent> {
        self.events.get(id)
    }

    /// Look up a registered event for reconfiguration.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if no such event is registered,
    /// or [`EventError::EventScheduled`] while it sits in a working set.
    pub fn event_mut(&mut self, id: &str) -> Result<&mut MapEvent, EventError> {
        if self.working_set_of(id).is_some() {
            warn!(event_id = id, "Attempted to modify a scheduled event");
            return Err(EventError::EventScheduled(EventId::from(id)));
        }
        self.events
            .get_mut(id)
            .ok_or_else(|| EventError::UnknownEvent(EventId::from(id)))
    }

    /// Ids of active events, in start order.
    pub fn active_ids(&self) -> &[EventId] {
        &self.active
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return true if no events are registered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return true if nothing is running, waiting, or paused.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
            && self.active_delayed.is_empty()
            && self.paused.is_empty()
            && self.paused_delayed.is_empty()
    }

    fn require_registered(&self, id: &str) -> Result<EventId, EventError> {
        self.events
            .get_key_value(id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| {
                warn!(event_id = id, "No event registered with this id");
                EventError::UnknownEvent(EventId::from(id))
            })
    }

    fn scheduled_ids(&self) -> impl Iterator<Item = &EventId> {
        self.active
            .iter()
            .chain(self.active_delayed.iter().map(|launch| &launch.event))
            .chain(self.paused.iter())
            .chain(self.paused_delayed.iter().map(|launch| &launch.event))
    }
}

fn is_bound_to(events: &BTreeMap<EventId, MapEvent>, id: &EventId, actor: ActorId) -> bool {
    events
        .get(id)
        .and_then(MapEvent::actor)
        .is_some_and(|bound| bound == actor)
}

/// Remove and return every item matching `matches`, keeping the order of
/// both the removed and the remaining items.
fn drain_matching<T>(items: &mut Vec<T>, matches: impl FnMut(&T) -> bool) -> Vec<T> {
    let (taken, kept): (Vec<T>, Vec<T>) = std::mem::take(items).into_iter().partition(matches);
    *items = kept;
    taken
}

fn remove_id(set: &mut Vec<EventId>, id: &EventId) -> bool {
    !drain_matching(set, |event| event == id).is_empty()
}

fn remove_launch(set: &mut Vec<DelayedLaunch>, id: &EventId) -> bool {
    !drain_matching(set, |launch| launch.event == *id).is_empty()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use vignette_types::{CollisionKind, DialogueId, Direction, EventLink, MapPosition};

    use super::*;
    use crate::events::{ChangeDirectionEvent, DialogueEvent, RandomMoveEvent, ScriptedEvent};
    use crate::services::StubServices;

    fn talk(id: &str, dialogue: u32) -> MapEvent {
        MapEvent::new(id, DialogueEvent::new(DialogueId(dialogue)))
    }

    fn noop(id: &str) -> MapEvent {
        MapEvent::new(id, ScriptedEvent::from_hooks(None, None))
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut supervisor = EventSupervisor::new();
        assert!(supervisor.register(talk("talk1", 7)).is_ok());
        let result = supervisor.register(talk("talk1", 8));
        assert_eq!(result, Err(EventError::DuplicateEvent(EventId::from("talk1"))));
        assert_eq!(supervisor.len(), 1);

        let Some(crate::events::EventKind::Dialogue(event)) =
            supervisor.event("talk1").map(MapEvent::kind)
        else {
            panic!("expected the dialogue event");
        };
        assert_eq!(event.dialogue(), DialogueId(7));
    }

    #[test]
    fn zero_delay_start_is_synchronous() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor.register(talk("talk1", 7)).unwrap();

        supervisor.start_event("talk1", 0, &mut stubs.context(0)).unwrap();
        assert_eq!(supervisor.working_set_of("talk1"), Some(WorkingSet::Active));
        assert_eq!(stubs.dialogue.begun, vec![DialogueId(7)]);
    }

    #[test]
    fn unknown_and_rescheduled_starts_are_rejected() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor.register(talk("talk1", 7)).unwrap();

        assert_eq!(
            supervisor.start_event("missing", 0, &mut stubs.context(0)),
            Err(EventError::UnknownEvent(EventId::from("missing")))
        );
        supervisor.start_event("talk1", 500, &mut stubs.context(0)).unwrap();
        assert_eq!(
            supervisor.start_event("talk1", 0, &mut stubs.context(0)),
            Err(EventError::AlreadyScheduled(EventId::from("talk1")))
        );
        assert_eq!(supervisor.remaining_delay("talk1"), Some(500));
    }

    #[test]
    fn pause_and_resume_of_unscheduled_event_is_a_no_op() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor.register(noop("idle")).unwrap();

        assert!(supervisor.pause_events("idle", &mut stubs.actors).is_ok());
        assert!(supervisor.resume_events("idle", &mut stubs.actors).is_ok());
        assert!(supervisor.is_idle());
        assert_eq!(
            supervisor.pause_events("ghost", &mut stubs.actors),
            Err(EventError::UnknownEvent(EventId::from("ghost")))
        );
    }

    #[test]
    fn paused_countdown_is_frozen() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor.register(noop("later")).unwrap();
        supervisor.start_event("later", 1000, &mut stubs.context(0)).unwrap();

        supervisor.update(&mut stubs.context(400));
        supervisor.pause_events("later", &mut stubs.actors).unwrap();
        assert_eq!(supervisor.working_set_of("later"), Some(WorkingSet::PausedDelayed));

        for _ in 0..10 {
            supervisor.update(&mut stubs.context(1000));
        }
        assert_eq!(supervisor.remaining_delay("later"), Some(600));

        supervisor.resume_events("later", &mut stubs.actors).unwrap();
        supervisor.update(&mut stubs.context(599));
        assert_eq!(supervisor.remaining_delay("later"), Some(1));
    }

    #[test]
    fn cycle_of_on_start_links_is_cut() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor
            .register(noop("a").with_link(EventLink::on_start("b", 0)))
            .unwrap();
        supervisor
            .register(noop("b").with_link(EventLink::on_start("a", 0)))
            .unwrap();

        supervisor.start_event("a", 0, &mut stubs.context(0)).unwrap();
        assert_eq!(
            supervisor.active_ids(),
            &[EventId::from("a"), EventId::from("b")]
        );
    }

    #[test]
    fn cascade_depth_is_bounded() {
        let mut stubs = StubServices::new(1);
        let config = EventsConfig {
            max_link_depth: 2,
            ..EventsConfig::default()
        };
        let mut supervisor = EventSupervisor::with_config(&config);
        for (id, child) in [("e0", "e1"), ("e1", "e2"), ("e2", "e3")] {
            supervisor
                .register(noop(id).with_link(EventLink::on_start(child, 0)))
                .unwrap();
        }
        supervisor.register(noop("e3")).unwrap();

        supervisor.start_event("e0", 0, &mut stubs.context(0)).unwrap();
        assert!(supervisor.is_event_active("e2"));
        assert!(!supervisor.is_event_active("e3"));
    }

    #[test]
    fn link_to_unknown_child_is_skipped() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor
            .register(
                noop("parent")
                    .with_link(EventLink::on_start("ghost", 0))
                    .with_link(EventLink::on_start("real", 0)),
            )
            .unwrap();
        supervisor.register(noop("real")).unwrap();

        supervisor.start_event("parent", 0, &mut stubs.context(0)).unwrap();
        assert!(supervisor.is_event_active("real"));
    }

    #[test]
    fn terminate_all_empties_every_set() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        for id in ["a", "b", "c"] {
            supervisor.register(noop(id)).unwrap();
        }
        supervisor.start_event("a", 0, &mut stubs.context(0)).unwrap();
        supervisor.start_event("b", 100, &mut stubs.context(0)).unwrap();
        supervisor.start_event("c", 100, &mut stubs.context(0)).unwrap();
        supervisor.pause_events("c", &mut stubs.actors).unwrap();

        supervisor.terminate_all(&mut stubs.context(0));
        assert!(supervisor.is_idle());
    }

    #[test]
    fn actor_events_pause_resume_and_terminate_together() {
        let mut stubs = StubServices::new(1);
        stubs
            .actors
            .insert(Actor::new(ActorId(1), MapPosition::new(3.0, 3.0), 100.0));
        let mut supervisor = EventSupervisor::new();
        supervisor
            .register(MapEvent::new("wander", RandomMoveEvent::new(ActorId(1), 10_000, 500)))
            .unwrap();
        supervisor
            .register(MapEvent::new("turn", ChangeDirectionEvent::new(ActorId(1), Direction::North)))
            .unwrap();
        supervisor.register(talk("talk", 1)).unwrap();

        supervisor.start_event("wander", 0, &mut stubs.context(0)).unwrap();
        supervisor.start_event("turn", 300, &mut stubs.context(0)).unwrap();
        supervisor.start_event("talk", 0, &mut stubs.context(0)).unwrap();

        assert!(stubs.actors.get(ActorId(1)).unwrap().moving);
        assert_eq!(supervisor.pause_actor_events(ActorId(1), &mut stubs.actors), 2);
        assert!(!stubs.actors.get(ActorId(1)).unwrap().moving);
        assert!(supervisor.is_event_active("talk"));
        assert_eq!(supervisor.working_set_of("wander"), Some(WorkingSet::Paused));
        assert_eq!(supervisor.working_set_of("turn"), Some(WorkingSet::PausedDelayed));

        assert_eq!(supervisor.resume_actor_events(ActorId(1), &mut stubs.actors), 2);
        assert!(stubs.actors.get(ActorId(1)).unwrap().moving);
        assert_eq!(supervisor.terminate_actor_events(ActorId(1), &mut stubs.context(0)), 2);
        assert_eq!(supervisor.working_set_of("wander"), None);
        assert_eq!(supervisor.working_set_of("turn"), None);

        let actor = stubs.actors.get(ActorId(1)).unwrap();
        assert_eq!(actor.controller(), None);
        assert!(!actor.moving);
    }

    #[test]
    fn paused_walker_stands_still_until_resumed() {
        let mut stubs = StubServices::new(1);
        stubs
            .actors
            .insert(Actor::new(ActorId(1), MapPosition::new(3.0, 3.0), 100.0));
        let mut supervisor = EventSupervisor::new();
        supervisor
            .register(MapEvent::new("wander", RandomMoveEvent::new(ActorId(1), 10_000, 500)))
            .unwrap();
        supervisor.start_event("wander", 0, &mut stubs.context(0)).unwrap();

        supervisor.pause_events("wander", &mut stubs.actors).unwrap();
        let actor = stubs.actors.get(ActorId(1)).unwrap();
        assert!(!actor.moving);
        assert!(actor.is_controlled_by("wander"));

        // Paused events are not told about collisions.
        let wall = Collision::geometry(CollisionKind::Boundary);
        assert!(!supervisor.resolve_collision(ActorId(1), &wall, &mut stubs.context(16)));

        supervisor.resume_events("wander", &mut stubs.actors).unwrap();
        assert!(stubs.actors.get(ActorId(1)).unwrap().moving);

        // Terminating while paused leaves nothing to restore later.
        supervisor.pause_events("wander", &mut stubs.actors).unwrap();
        supervisor
            .terminate_events("wander", false, &mut stubs.context(0))
            .unwrap();
        supervisor.start_event("wander", 0, &mut stubs.context(0)).unwrap();
        stubs.actors.get_mut(ActorId(1)).unwrap().moving = false;
        supervisor.pause_events("wander", &mut stubs.actors).unwrap();
        supervisor.resume_events("wander", &mut stubs.actors).unwrap();
        assert!(!stubs.actors.get(ActorId(1)).unwrap().moving);
    }

    #[test]
    fn collision_is_routed_to_the_controller() {
        let mut stubs = StubServices::new(1);
        stubs
            .actors
            .insert(Actor::new(ActorId(1), MapPosition::new(3.0, 3.0), 100.0));
        let mut supervisor = EventSupervisor::new();
        supervisor
            .register(MapEvent::new("wander", RandomMoveEvent::new(ActorId(1), 10_000, 500)))
            .unwrap();
        let wall = Collision::geometry(CollisionKind::Boundary);

        assert!(!supervisor.resolve_collision(ActorId(1), &wall, &mut stubs.context(16)));

        supervisor.start_event("wander", 0, &mut stubs.context(0)).unwrap();
        assert!(supervisor.resolve_collision(ActorId(1), &wall, &mut stubs.context(16)));
        assert_eq!(stubs.spatial.adjustments, 1);
    }

    #[test]
    fn scheduled_events_cannot_be_reconfigured() {
        let mut stubs = StubServices::new(1);
        let mut supervisor = EventSupervisor::new();
        supervisor.register(talk("talk1", 7)).unwrap();

        assert!(supervisor.event_mut("talk1").is_ok());
        supervisor.start_event("talk1", 0, &mut stubs.context(0)).unwrap();
        assert_eq!(
            supervisor.event_mut("talk1").err(),
            Some(EventError::EventScheduled(EventId::from("talk1")))
        );
    }
}
