//! Scene files: the map, its actors, and its authored events.
//!
//! A scene is a YAML document describing one map and everything the event
//! supervisor needs to run it:
//!
//! ```yaml
//! map:
//!   name: village
//!   width: 20
//!   height: 15
//!   blocked: [[5, 5], [5, 6]]
//! actors:
//!   - { id: 1, x: 2.0, y: 2.0, facing: east }
//! events:
//!   - id: greet
//!     type: dialogue
//!     dialogue: 7
//!     links:
//!       - { child: chime, trigger: on_start }
//!   - { id: chime, type: sound, file: snd/chime.wav }
//! start:
//!   - { event: greet }
//! ```
//!
//! [`SceneDefinition::build`] validates the document and turns it into an
//! [`EventSupervisor`] plus the [`SceneState`] its events act on.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Deserialize;
use tracing::{info, warn};
use vignette_core::actor::{Actor, ActorRegistry};
use vignette_core::config::VignetteConfig;
use vignette_core::events::{
    AnimateEvent, AnimationFrame, ChangeDirectionEvent, DialogueEvent, EncounterEvent, EventKind,
    MapEvent, MapTransitionEvent, PathMoveEvent, RandomMoveEvent, ScriptedEvent,
    ScriptedSpriteEvent, ShopEvent, SoundEvent,
};
use vignette_core::script::ScriptResolver;
use vignette_core::services::EventContext;
use vignette_core::supervisor::EventSupervisor;
use vignette_types::{ActorId, DialogueId, Direction, EventId, EventLink, MapPosition, ObjectId};

use crate::presentation::Presentation;
use crate::world::GridWorld;

/// Errors that can occur while loading or building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Failed to read the scene file from disk.
    #[error("failed to read scene file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the scene YAML.
    #[error("failed to parse scene YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A sprite event names an actor the scene does not define.
    #[error("event {event} refers to unknown actor {actor}")]
    UnknownActor {
        /// The offending event.
        event: EventId,
        /// The missing actor.
        actor: ActorId,
    },

    /// Two actors share an id.
    #[error("actor defined twice: {actor}")]
    DuplicateActor {
        /// The repeated actor id.
        actor: ActorId,
    },

    /// A start entry names an event the scene does not define.
    #[error("start entry refers to unknown event {event}")]
    UnknownStartEvent {
        /// The missing event.
        event: EventId,
    },
}

impl From<serde_yml::Error> for SceneError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A complete scene document.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDefinition {
    /// Map geometry.
    pub map: MapDefinition,
    /// Actors placed on the map.
    #[serde(default)]
    pub actors: Vec<ActorDefinition>,
    /// Authored events.
    #[serde(default)]
    pub events: Vec<EventDefinition>,
    /// Events started when the scene begins.
    #[serde(default)]
    pub start: Vec<StartDefinition>,
}

/// Map geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDefinition {
    /// Map name, used in logs and as the default `coming_from` of
    /// transitions.
    pub name: String,
    /// Width in tiles.
    #[serde(default = "default_map_width")]
    pub width: u32,
    /// Height in tiles.
    #[serde(default = "default_map_height")]
    pub height: u32,
    /// Impassable tiles as `[x, y]` pairs.
    #[serde(default)]
    pub blocked: Vec<[u32; 2]>,
    /// Static objects.
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
}

/// A static object on the map.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ObjectDefinition {
    /// Object id reported in collisions.
    pub id: ObjectId,
    /// Horizontal position in tiles.
    pub x: f64,
    /// Vertical position in tiles.
    pub y: f64,
}

/// An actor placed on the map.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ActorDefinition {
    /// Actor id referenced by sprite events.
    pub id: ActorId,
    /// Horizontal position in tiles.
    pub x: f64,
    /// Vertical position in tiles.
    pub y: f64,
    /// Milliseconds needed to walk one tile.
    #[serde(default = "default_speed_ms")]
    pub speed_ms: f64,
    /// Initial facing. Actors face south by default.
    #[serde(default)]
    pub facing: Option<Direction>,
}

/// One authored event: id, outgoing links, and variant settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDefinition {
    /// Unique event id.
    pub id: EventId,
    /// Outgoing links in firing order.
    #[serde(default)]
    pub links: Vec<EventLink>,
    /// Variant and its settings.
    #[serde(flatten)]
    pub kind: EventSpec,
}

/// Variant settings of an authored event, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSpec {
    /// Present a dialogue.
    Dialogue {
        /// Dialogue to present.
        dialogue: DialogueId,
        /// Halt the camera first.
        #[serde(default)]
        stop_camera: bool,
    },
    /// Play a clip.
    Sound {
        /// Clip file.
        file: String,
    },
    /// Fade out and swap maps.
    MapTransition {
        /// Map file to load.
        map_file: String,
        /// Location recorded as left. Defaults to the scene's map name.
        #[serde(default)]
        coming_from: Option<String>,
        /// Fade length. Defaults to `events.map_fade_out_ms`.
        #[serde(default)]
        fade_out_ms: Option<u32>,
    },
    /// Run script hooks.
    Scripted {
        /// Start function name, empty for none.
        #[serde(default)]
        start: String,
        /// Update function name, empty for none.
        #[serde(default)]
        update: String,
    },
    /// Run script hooks against an actor.
    ScriptedSprite {
        /// Bound actor.
        actor: ActorId,
        /// Start function name, empty for none.
        #[serde(default)]
        start: String,
        /// Update function name, empty for none.
        #[serde(default)]
        update: String,
    },
    /// Turn an actor.
    ChangeDirection {
        /// Bound actor.
        actor: ActorId,
        /// New facing.
        direction: Direction,
    },
    /// Walk an actor to a destination.
    PathMove {
        /// Bound actor.
        actor: ActorId,
        /// Destination x.
        x: f64,
        /// Destination y.
        y: f64,
        /// Treat the destination as an offset from the actor's position.
        #[serde(default)]
        relative: bool,
        /// Use the running speed.
        #[serde(default)]
        run: bool,
    },
    /// Wander an actor.
    RandomMove {
        /// Bound actor.
        actor: ActorId,
        /// Total wandering time.
        movement_ms: u32,
        /// Time between facing changes.
        direction_ms: u32,
    },
    /// Play a custom animation.
    Animate {
        /// Bound actor.
        actor: ActorId,
        /// Frames in display order.
        frames: Vec<AnimationFrame>,
        /// Extra plays of the sequence; negative loops forever.
        #[serde(default)]
        loops: i32,
    },
    /// Push a battle.
    Encounter {
        /// Enemy ids.
        enemies: Vec<ObjectId>,
        /// Battle music. Defaults to `events.battle_music`.
        #[serde(default)]
        music: Option<String>,
        /// Backdrop. Defaults to `events.battle_background`.
        #[serde(default)]
        background: Option<String>,
        /// Battle script files.
        #[serde(default)]
        scripts: Vec<String>,
    },
    /// Open a shop.
    Shop {
        /// Stocked wares.
        wares: Vec<WareDefinition>,
    },
}

/// A stocked shop ware.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WareDefinition {
    /// Ware object id.
    pub ware: ObjectId,
    /// Units in stock.
    pub count: u32,
}

/// An event started when the scene begins.
#[derive(Debug, Clone, Deserialize)]
pub struct StartDefinition {
    /// Event to start.
    pub event: EventId,
    /// Launch delay.
    #[serde(default)]
    pub delay_ms: u32,
}

impl EventSpec {
    /// The actor a sprite event binds to.
    pub const fn actor(&self) -> Option<ActorId> {
        match self {
            Self::ScriptedSprite { actor, .. }
            | Self::ChangeDirection { actor, .. }
            | Self::PathMove { actor, .. }
            | Self::RandomMove { actor, .. }
            | Self::Animate { actor, .. } => Some(*actor),
            Self::Dialogue { .. }
            | Self::Sound { .. }
            | Self::MapTransition { .. }
            | Self::Scripted { .. }
            | Self::Encounter { .. }
            | Self::Shop { .. } => None,
        }
    }
}

/// Everything the scene's events act on.
#[derive(Debug)]
pub struct SceneState {
    /// Map name.
    pub name: String,
    /// Actors on the map.
    pub actors: ActorRegistry,
    /// Walkable grid.
    pub world: GridWorld,
    /// Dialogue, audio, screen and mode stack.
    pub presentation: Presentation,
    /// Seeded random source handed to events.
    pub rng: SmallRng,
}

impl SceneState {
    /// Borrow the scene as an [`EventContext`] for one tick of `elapsed_ms`.
    pub fn context(&mut self, elapsed_ms: u32) -> EventContext<'_> {
        EventContext {
            elapsed_ms,
            actors: &mut self.actors,
            spatial: &mut self.world,
            dialogue: &mut self.presentation.dialogue,
            audio: &mut self.presentation.audio,
            screen: &mut self.presentation.screen,
            modes: &mut self.presentation.modes,
            rng: &mut self.rng,
        }
    }
}

impl SceneDefinition {
    /// Load a scene from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Io`] if the file cannot be read, or
    /// [`SceneError::Yaml`] if the content is not a valid scene.
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scene from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Yaml`] if the string is not a valid scene.
    pub fn parse(yaml: &str) -> Result<Self, SceneError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Build the supervisor and scene state.
    ///
    /// Script function names are resolved through `scripts` and sound
    /// clips are loaded here, once per event.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::DuplicateActor`], [`SceneError::UnknownActor`],
    /// or [`SceneError::UnknownStartEvent`]. A repeated event id is reported
    /// and skipped; the first definition is kept.
    pub fn build(
        &self,
        config: &VignetteConfig,
        scripts: &dyn ScriptResolver,
    ) -> Result<(EventSupervisor, SceneState), SceneError> {
        let world = self.build_world();
        let actors = self.build_actors()?;
        let mut presentation = Presentation::new(&config.engine);
        let mut supervisor = EventSupervisor::with_config(&config.events);

        for definition in &self.events {
            if let Some(actor) = definition.kind.actor().filter(|&actor| !actors.contains(actor)) {
                return Err(SceneError::UnknownActor {
                    event: definition.id.clone(),
                    actor,
                });
            }
            let kind = self.build_kind(definition, config, scripts, &mut presentation);
            let mut event = MapEvent::new(definition.id.clone(), kind);
            for link in &definition.links {
                event.add_link(link.clone());
            }
            if let Err(err) = supervisor.register(event) {
                warn!(event_id = %definition.id, error = %err, "Event definition skipped");
            }
        }

        for definition in &self.events {
            for link in definition
                .links
                .iter()
                .filter(|link| supervisor.event(link.child.as_str()).is_none())
            {
                warn!(event_id = %definition.id, child = %link.child, "Link to undefined event");
            }
        }

        if let Some(entry) = self
            .start
            .iter()
            .find(|entry| supervisor.event(entry.event.as_str()).is_none())
        {
            return Err(SceneError::UnknownStartEvent {
                event: entry.event.clone(),
            });
        }

        info!(
            scene = %self.map.name,
            actors = actors.len(),
            events = supervisor.len(),
            "Scene built"
        );

        let mut state = SceneState {
            name: self.map.name.clone(),
            actors,
            world,
            presentation,
            rng: SmallRng::seed_from_u64(config.engine.seed),
        };
        state.world.sync_actors(&state.actors);
        Ok((supervisor, state))
    }

    /// Start every event listed under `start`, returning how many started.
    pub fn start_events(&self, supervisor: &mut EventSupervisor, state: &mut SceneState) -> usize {
        let mut started = 0_usize;
        for entry in &self.start {
            if supervisor
                .start_event(entry.event.as_str(), entry.delay_ms, &mut state.context(0))
                .is_ok()
            {
                started = started.saturating_add(1);
            }
        }
        started
    }

    fn build_world(&self) -> GridWorld {
        let mut world = GridWorld::new(self.map.width, self.map.height);
        for &[x, y] in &self.map.blocked {
            world.block_tile(x, y);
        }
        for object in &self.map.objects {
            if !world.place_object(object.id, MapPosition::new(object.x, object.y)) {
                warn!(object = %object.id, x = object.x, y = object.y, "Object outside the map");
            }
        }
        world
    }

    fn build_actors(&self) -> Result<ActorRegistry, SceneError> {
        let mut actors = ActorRegistry::new();
        for definition in &self.actors {
            if actors.contains(definition.id) {
                return Err(SceneError::DuplicateActor {
                    actor: definition.id,
                });
            }
            let mut actor = Actor::new(
                definition.id,
                MapPosition::new(definition.x, definition.y),
                definition.speed_ms,
            );
            if let Some(facing) = definition.facing {
                actor.set_direction(facing);
            }
            actors.insert(actor);
        }
        Ok(actors)
    }

    fn build_kind(
        &self,
        definition: &EventDefinition,
        config: &VignetteConfig,
        scripts: &dyn ScriptResolver,
        presentation: &mut Presentation,
    ) -> EventKind {
        let event = definition.id.as_str();
        match &definition.kind {
            EventSpec::Dialogue {
                dialogue,
                stop_camera,
            } => {
                let dialogue = DialogueEvent::new(*dialogue);
                if *stop_camera {
                    dialogue.stopping_camera().into()
                } else {
                    dialogue.into()
                }
            }
            EventSpec::Sound { file } => SoundEvent::new(file.as_str(), &mut presentation.audio).into(),
            EventSpec::MapTransition {
                map_file,
                coming_from,
                fade_out_ms,
            } => MapTransitionEvent::new(
                map_file.as_str(),
                coming_from.as_deref().unwrap_or(self.map.name.as_str()),
                fade_out_ms.unwrap_or(config.events.map_fade_out_ms),
            )
            .into(),
            EventSpec::Scripted { start, update } => {
                ScriptedEvent::resolve(scripts, event, start, update).into()
            }
            EventSpec::ScriptedSprite {
                actor,
                start,
                update,
            } => ScriptedSpriteEvent::resolve(scripts, event, *actor, start, update).into(),
            EventSpec::ChangeDirection { actor, direction } => {
                ChangeDirectionEvent::new(*actor, *direction).into()
            }
            EventSpec::PathMove {
                actor,
                x,
                y,
                relative,
                run,
            } => {
                let path_move = PathMoveEvent::new(*actor, MapPosition::new(*x, *y), *run);
                if *relative {
                    path_move.relative().into()
                } else {
                    path_move.into()
                }
            }
            EventSpec::RandomMove {
                actor,
                movement_ms,
                direction_ms,
            } => RandomMoveEvent::new(*actor, *movement_ms, *direction_ms).into(),
            EventSpec::Animate {
                actor,
                frames,
                loops,
            } => {
                let mut animate = AnimateEvent::new(*actor, u32::try_from(*loops).ok());
                for frame in frames {
                    animate.add_frame(frame.frame, frame.duration_ms);
                }
                animate.into()
            }
            EventSpec::Encounter {
                enemies,
                music,
                background,
                scripts: battle_scripts,
            } => {
                let mut encounter = EncounterEvent::new(
                    enemies.clone(),
                    music.as_deref().unwrap_or(config.events.battle_music.as_str()),
                    background
                        .as_deref()
                        .unwrap_or(config.events.battle_background.as_str()),
                );
                for file in battle_scripts {
                    encounter.add_script(file.as_str());
                }
                encounter.into()
            }
            EventSpec::Shop { wares } => {
                let mut shop = ShopEvent::new();
                for ware in wares {
                    shop.add_ware(ware.ware, ware.count);
                }
                shop.into()
            }
        }
    }
}

const fn default_map_width() -> u32 {
    20
}

const fn default_map_height() -> u32 {
    15
}

const fn default_speed_ms() -> f64 {
    200.0
}
