//! Map events: the registry record and its closed set of variants.
//!
//! A [`MapEvent`] pairs an id and its outgoing [`EventLink`]s with an
//! [`EventKind`], the tagged union of every variant the engine supports.
//! Each variant implements [`EventState`], the start/update contract:
//!
//! - `start` fires the variant's side effects once per activation.
//! - `update` is polled once per tick while active and returns true when
//!   the event has finished.
//!
//! Sprite-bound variants additionally report the actor they act on through
//! [`EventState::actor`]. The supervisor uses that to hand out the actor's
//! control token and to pause or terminate by actor; no runtime type
//! inspection is needed.
//!
//! Events are never cloned once built. Variants that hold script hooks or
//! loaded clips are move-only by construction.

mod animate;
mod dialogue;
mod mode;
mod movement;
mod path_move;
mod scripted;
mod sound;
mod transition;

use vignette_types::{ActorId, Collision, EventId, EventLink};

pub use animate::{AnimateEvent, AnimationFrame};
pub use dialogue::DialogueEvent;
pub use mode::{EncounterEvent, ShopEvent};
pub use movement::{ChangeDirectionEvent, RandomMoveEvent};
pub use path_move::PathMoveEvent;
pub use scripted::{ScriptedEvent, ScriptedSpriteEvent};
pub use sound::SoundEvent;
pub use transition::MapTransitionEvent;

use crate::services::EventContext;

/// The start/update contract every event variant implements.
pub trait EventState {
    /// Fire the event's side effects. Called once per activation, after
    /// the supervisor has handed over the actor's control token.
    fn start(&mut self, id: &EventId, ctx: &mut EventContext<'_>);

    /// Advance the event by one tick. Returns true when finished.
    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool;

    /// The actor this event is bound to, for sprite events.
    fn actor(&self) -> Option<ActorId> {
        None
    }

    /// Whether starting this event takes the actor's control token.
    fn claims_control(&self) -> bool {
        self.actor().is_some()
    }

    /// Clean up after a forced termination of a started event.
    fn terminate(&mut self, _id: &EventId, _ctx: &mut EventContext<'_>) {}

    /// React to a collision of the controlled actor.
    fn resolve_collision(
        &mut self,
        _id: &EventId,
        _collision: &Collision,
        _ctx: &mut EventContext<'_>,
    ) {
    }
}

/// Type tag of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Presents a dialogue.
    Dialogue,
    /// Plays a sound clip.
    Sound,
    /// Fades out and swaps to another map.
    MapTransition,
    /// Runs script hooks.
    Scripted,
    /// Runs script hooks against an actor.
    ScriptedSprite,
    /// Turns an actor.
    ChangeDirection,
    /// Walks an actor along a computed path.
    PathMove,
    /// Wanders an actor randomly.
    RandomMove,
    /// Plays a custom animation on an actor.
    Animate,
    /// Pushes a battle.
    Encounter,
    /// Pushes a shop.
    Shop,
}

/// The closed set of event variants.
#[derive(Debug)]
pub enum EventKind {
    /// See [`DialogueEvent`].
    Dialogue(DialogueEvent),
    /// See [`SoundEvent`].
    Sound(SoundEvent),
    /// See [`MapTransitionEvent`].
    MapTransition(MapTransitionEvent),
    /// See [`ScriptedEvent`].
    Scripted(ScriptedEvent),
    /// See [`ScriptedSpriteEvent`].
    ScriptedSprite(ScriptedSpriteEvent),
    /// See [`ChangeDirectionEvent`].
    ChangeDirection(ChangeDirectionEvent),
    /// See [`PathMoveEvent`].
    PathMove(PathMoveEvent),
    /// See [`RandomMoveEvent`].
    RandomMove(RandomMoveEvent),
    /// See [`AnimateEvent`].
    Animate(AnimateEvent),
    /// See [`EncounterEvent`].
    Encounter(EncounterEvent),
    /// See [`ShopEvent`].
    Shop(ShopEvent),
}

impl EventKind {
    /// Return the type tag of this variant.
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Dialogue(_) => EventType::Dialogue,
            Self::Sound(_) => EventType::Sound,
            Self::MapTransition(_) => EventType::MapTransition,
            Self::Scripted(_) => EventType::Scripted,
            Self::ScriptedSprite(_) => EventType::ScriptedSprite,
            Self::ChangeDirection(_) => EventType::ChangeDirection,
            Self::PathMove(_) => EventType::PathMove,
            Self::RandomMove(_) => EventType::RandomMove,
            Self::Animate(_) => EventType::Animate,
            Self::Encounter(_) => EventType::Encounter,
            Self::Shop(_) => EventType::Shop,
        }
    }

    fn state(&self) -> &dyn EventState {
        match self {
            Self::Dialogue(event) => event,
            Self::Sound(event) => event,
            Self::MapTransition(event) => event,
            Self::Scripted(event) => event,
            Self::ScriptedSprite(event) => event,
            Self::ChangeDirection(event) => event,
            Self::PathMove(event) => event,
            Self::RandomMove(event) => event,
            Self::Animate(event) => event,
            Self::Encounter(event) => event,
            Self::Shop(event) => event,
        }
    }

    fn state_mut(&mut self) -> &mut dyn EventState {
        match self {
            Self::Dialogue(event) => event,
            Self::Sound(event) => event,
            Self::MapTransition(event) => event,
            Self::Scripted(event) => event,
            Self::ScriptedSprite(event) => event,
            Self::ChangeDirection(event) => event,
            Self::PathMove(event) => event,
            Self::RandomMove(event) => event,
            Self::Animate(event) => event,
            Self::Encounter(event) => event,
            Self::Shop(event) => event,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for EventKind {
                fn from(event: $ty) -> Self {
                    Self::$variant(event)
                }
            }
        )*
    };
}

impl_from_variant! {
    Dialogue(DialogueEvent),
    Sound(SoundEvent),
    MapTransition(MapTransitionEvent),
    Scripted(ScriptedEvent),
    ScriptedSprite(ScriptedSpriteEvent),
    ChangeDirection(ChangeDirectionEvent),
    PathMove(PathMoveEvent),
    RandomMove(RandomMoveEvent),
    Animate(AnimateEvent),
    Encounter(EncounterEvent),
    Shop(ShopEvent),
}

/// A registered event: identity, outgoing links, and variant state.
#[derive(Debug)]
pub struct MapEvent {
    id: EventId,
    links: Vec<EventLink>,
    kind: EventKind,
}

impl MapEvent {
    /// Create an event with no links.
    pub fn new(id: impl Into<EventId>, kind: impl Into<EventKind>) -> Self {
        Self {
            id: id.into(),
            links: Vec::new(),
            kind: kind.into(),
        }
    }

    /// Builder form of [`MapEvent::add_link`].
    #[must_use]
    pub fn with_link(mut self, link: EventLink) -> Self {
        self.links.push(link);
        self
    }

    /// Append an outgoing link. Links fire in the order they were added.
    pub fn add_link(&mut self, link: EventLink) {
        self.links.push(link);
    }

    /// Return the event id.
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// Return the outgoing links in firing order.
    pub fn links(&self) -> &[EventLink] {
        &self.links
    }

    /// Return the variant.
    pub const fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Return the variant for reconfiguration.
    pub const fn kind_mut(&mut self) -> &mut EventKind {
        &mut self.kind
    }

    /// Return the type tag.
    pub const fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// The actor this event is bound to, if it is a sprite event.
    pub fn actor(&self) -> Option<ActorId> {
        self.kind.state().actor()
    }

    /// Whether starting this event takes its actor's control token.
    pub fn claims_control(&self) -> bool {
        self.kind.state().claims_control()
    }

    pub(crate) fn start(&mut self, ctx: &mut EventContext<'_>) {
        self.kind.state_mut().start(&self.id, ctx);
    }

    pub(crate) fn update(&mut self, ctx: &mut EventContext<'_>) -> bool {
        self.kind.state_mut().update(&self.id, ctx)
    }

    pub(crate) fn terminate(&mut self, ctx: &mut EventContext<'_>) {
        self.kind.state_mut().terminate(&self.id, ctx);
    }

    pub(crate) fn resolve_collision(&mut self, collision: &Collision, ctx: &mut EventContext<'_>) {
        self.kind
            .state_mut()
            .resolve_collision(&self.id, collision, ctx);
    }
}
