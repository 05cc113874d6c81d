//! Collaborator traits and their in-memory stub implementations.
//!
//! The event core drives dialogue, audio, screen effects, the mode stack
//! and the spatial service only through the narrow traits defined here.
//! Commands are one-shot ("begin dialogue 7", "play clip", "push mode") and
//! completion is observed through opaque predicates; the core never reaches
//! into a collaborator's internals.
//!
//! Every collaborator is handed to events explicitly through an
//! [`EventContext`] for the duration of one supervisor call. There is no
//! global "current map" lookup.
//!
//! The `Stub*` types record every command they receive and let the caller
//! flip their observable state. The engine binary runs scenes against them
//! and the tests use them to script collaborator behavior.

use std::collections::{BTreeMap, BTreeSet};

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use vignette_types::{
    ActorId, Collision, DialogueId, MapPosition, MapSwap, ModeRequest, ObjectId, Obstacle,
};

use crate::actor::{Actor, ActorRegistry};

/// Errors reported by an [`AudioService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    /// The clip file could not be found or decoded.
    #[error("failed to load audio clip: {file}")]
    ClipNotFound {
        /// The file that was requested.
        file: String,
    },
}

/// Handle to a clip loaded by the audio service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClipHandle(pub u32);

/// Playback state of a loaded clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// The clip is playing.
    Playing,
    /// The clip is paused mid-playback.
    Paused,
    /// The clip is not playing.
    Stopped,
}

/// Path finding and collision handling for moving actors.
pub trait SpatialService {
    /// Find an ordered list of waypoints from the actor's position to
    /// `destination`. An empty list means the destination is unreachable.
    fn find_path(&mut self, actor: &Actor, destination: MapPosition) -> Vec<MapPosition>;

    /// Check whether the actor would collide with anything at `position`.
    fn detect_collision(&self, actor: &Actor, position: MapPosition) -> Option<Collision>;

    /// Try to nudge the actor sideways around a collision. Returns true if
    /// the actor was moved.
    fn adjust_around_collision(&mut self, actor: &mut Actor, collision: &Collision) -> bool;

    /// Return true if `obstacle` occupies `position`.
    fn is_position_occupied(&self, position: MapPosition, obstacle: &Obstacle) -> bool;
}

/// The dialogue box subsystem.
pub trait DialogueService {
    /// Begin presenting a dialogue.
    fn begin_dialogue(&mut self, dialogue: DialogueId);

    /// The dialogue currently being presented, if any.
    fn current_dialogue(&self) -> Option<DialogueId>;
}

/// The audio device.
pub trait AudioService {
    /// Load a clip so it can be played later.
    fn load_clip(&mut self, file: &str) -> Result<ClipHandle, AudioError>;

    /// Start playing a loaded clip.
    fn play(&mut self, clip: ClipHandle);

    /// Stop a clip.
    fn stop(&mut self, clip: ClipHandle);

    /// Current playback state of a clip.
    fn state(&self, clip: ClipHandle) -> PlaybackState;
}

/// Camera and screen effects of the current map.
pub trait ScreenService {
    /// Stop any camera motion in progress.
    fn halt_camera(&mut self);

    /// Begin fading the screen out over `duration_ms`.
    fn start_fade(&mut self, duration_ms: u32);

    /// Return true while a fade is in progress.
    fn is_fading(&self) -> bool;

    /// Put the map into its scene state (player input suspended).
    fn enter_scene_state(&mut self);
}

/// The game-mode stack.
pub trait ModeStack {
    /// Push a new mode on top of the map.
    fn push_mode(&mut self, request: ModeRequest);

    /// Replace the current map with another one.
    fn swap_map(&mut self, swap: MapSwap);
}

/// Everything an event may touch during one supervisor call.
pub struct EventContext<'a> {
    /// Milliseconds elapsed since the previous tick.
    pub elapsed_ms: u32,
    /// Actors on the current map.
    pub actors: &'a mut ActorRegistry,
    /// Path finding and collision handling.
    pub spatial: &'a mut dyn SpatialService,
    /// Dialogue presentation.
    pub dialogue: &'a mut dyn DialogueService,
    /// Audio playback.
    pub audio: &'a mut dyn AudioService,
    /// Camera and fades.
    pub screen: &'a mut dyn ScreenService,
    /// Mode stack.
    pub modes: &'a mut dyn ModeStack,
    /// Random source for randomized events.
    pub rng: &'a mut dyn RngCore,
}

impl core::fmt::Debug for EventContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventContext")
            .field("elapsed_ms", &self.elapsed_ms)
            .field("actors", &self.actors.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

/// A spatial service over an open map.
///
/// Every destination is reachable in a straight line unless a path was set
/// explicitly with [`StubSpatial::set_path`] or the destination was marked
/// unreachable. Collision adjustments succeed or fail as configured.
#[derive(Debug, Clone, Default)]
pub struct StubSpatial {
    /// Explicit paths returned for an actor, consumed on use.
    paths: BTreeMap<ActorId, Vec<MapPosition>>,
    /// Actors for which no path can be found.
    unreachable: BTreeSet<ActorId>,
    /// Obstacles and the tile they occupy.
    occupants: BTreeMap<ObjectId, MapPosition>,
    /// Collision reported by `detect_collision`.
    pub collision: Option<Collision>,
    /// Result returned by `adjust_around_collision`.
    pub adjust_succeeds: bool,
    /// Number of adjustment attempts received.
    pub adjustments: u32,
    /// Every path request received, in order.
    pub requests: Vec<(ActorId, MapPosition)>,
}

impl StubSpatial {
    /// Create a stub where every destination is directly reachable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `waypoints` for the next path request of `actor`.
    pub fn set_path(&mut self, actor: ActorId, waypoints: Vec<MapPosition>) {
        self.paths.insert(actor, waypoints);
    }

    /// Make every destination unreachable for `actor`.
    pub fn set_unreachable(&mut self, actor: ActorId) {
        self.unreachable.insert(actor);
    }

    /// Place an obstacle on a tile.
    pub fn place_obstacle(&mut self, object: ObjectId, position: MapPosition) {
        self.occupants.insert(object, position);
    }
}

impl SpatialService for StubSpatial {
    fn find_path(&mut self, actor: &Actor, destination: MapPosition) -> Vec<MapPosition> {
        self.requests.push((actor.id(), destination));
        if self.unreachable.contains(&actor.id()) {
            return Vec::new();
        }
        self.paths
            .remove(&actor.id())
            .unwrap_or_else(|| vec![destination])
    }

    fn detect_collision(&self, _actor: &Actor, _position: MapPosition) -> Option<Collision> {
        self.collision
    }

    fn adjust_around_collision(&mut self, _actor: &mut Actor, _collision: &Collision) -> bool {
        self.adjustments = self.adjustments.saturating_add(1);
        self.adjust_succeeds
    }

    fn is_position_occupied(&self, position: MapPosition, obstacle: &Obstacle) -> bool {
        self.occupants
            .get(&obstacle.object)
            .is_some_and(|occupied| occupied.is_within(&position, 0.5))
    }
}

/// A dialogue subsystem that keeps a dialogue current until told otherwise.
#[derive(Debug, Clone, Default)]
pub struct StubDialogue {
    /// The dialogue currently shown.
    pub current: Option<DialogueId>,
    /// Every dialogue begun, in order.
    pub begun: Vec<DialogueId>,
}

impl StubDialogue {
    /// Close the current dialogue.
    pub const fn finish_current(&mut self) {
        self.current = None;
    }
}

impl DialogueService for StubDialogue {
    fn begin_dialogue(&mut self, dialogue: DialogueId) {
        self.begun.push(dialogue);
        self.current = Some(dialogue);
    }

    fn current_dialogue(&self) -> Option<DialogueId> {
        self.current
    }
}

/// An audio device that plays clips until told they stopped.
#[derive(Debug, Clone, Default)]
pub struct StubAudio {
    /// Files that fail to load.
    missing: BTreeSet<String>,
    /// Loaded clips by file.
    loaded: BTreeMap<String, ClipHandle>,
    /// Playback state by clip.
    states: BTreeMap<ClipHandle, PlaybackState>,
    /// Next handle to hand out.
    next_handle: u32,
    /// Every clip played, in order.
    pub played: Vec<ClipHandle>,
}

impl StubAudio {
    /// Create an audio stub where every file loads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `file` fail to load.
    pub fn mark_missing(&mut self, file: &str) {
        self.missing.insert(file.to_owned());
    }

    /// Handle of a loaded file.
    pub fn handle(&self, file: &str) -> Option<ClipHandle> {
        self.loaded.get(file).copied()
    }

    /// Mark a clip as finished playing.
    pub fn finish(&mut self, clip: ClipHandle) {
        self.states.insert(clip, PlaybackState::Stopped);
    }

    /// Mark every clip as finished playing.
    pub fn finish_all(&mut self) {
        for state in self.states.values_mut() {
            *state = PlaybackState::Stopped;
        }
    }
}

impl AudioService for StubAudio {
    fn load_clip(&mut self, file: &str) -> Result<ClipHandle, AudioError> {
        if self.missing.contains(file) {
            return Err(AudioError::ClipNotFound {
                file: file.to_owned(),
            });
        }
        let handle = ClipHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.loaded.insert(file.to_owned(), handle);
        self.states.insert(handle, PlaybackState::Stopped);
        Ok(handle)
    }

    fn play(&mut self, clip: ClipHandle) {
        self.played.push(clip);
        self.states.insert(clip, PlaybackState::Playing);
    }

    fn stop(&mut self, clip: ClipHandle) {
        self.states.insert(clip, PlaybackState::Stopped);
    }

    fn state(&self, clip: ClipHandle) -> PlaybackState {
        self.states
            .get(&clip)
            .copied()
            .unwrap_or(PlaybackState::Stopped)
    }
}

/// Screen effects that stay in progress until told otherwise.
#[derive(Debug, Clone, Default)]
pub struct StubScreen {
    /// Set once the camera has been halted.
    pub camera_halted: bool,
    /// Whether a fade is in progress.
    pub fading: bool,
    /// Durations of every fade started, in order.
    pub fades: Vec<u32>,
    /// Number of times the scene state was entered.
    pub scene_entries: u32,
}

impl StubScreen {
    /// Complete the fade in progress.
    pub const fn finish_fade(&mut self) {
        self.fading = false;
    }
}

impl ScreenService for StubScreen {
    fn halt_camera(&mut self) {
        self.camera_halted = true;
    }

    fn start_fade(&mut self, duration_ms: u32) {
        self.fading = true;
        self.fades.push(duration_ms);
    }

    fn is_fading(&self) -> bool {
        self.fading
    }

    fn enter_scene_state(&mut self) {
        self.scene_entries = self.scene_entries.saturating_add(1);
    }
}

/// A mode stack that records what was pushed.
#[derive(Debug, Clone, Default)]
pub struct StubModeStack {
    /// Every mode pushed, in order.
    pub pushed: Vec<ModeRequest>,
    /// Every map swap performed, in order.
    pub swaps: Vec<MapSwap>,
}

impl ModeStack for StubModeStack {
    fn push_mode(&mut self, request: ModeRequest) {
        self.pushed.push(request);
    }

    fn swap_map(&mut self, swap: MapSwap) {
        self.swaps.push(swap);
    }
}

/// A complete set of stub collaborators plus the actor registry.
#[derive(Debug)]
pub struct StubServices {
    /// Actors on the map.
    pub actors: ActorRegistry,
    /// Spatial stub.
    pub spatial: StubSpatial,
    /// Dialogue stub.
    pub dialogue: StubDialogue,
    /// Audio stub.
    pub audio: StubAudio,
    /// Screen stub.
    pub screen: StubScreen,
    /// Mode stack stub.
    pub modes: StubModeStack,
    /// Seeded random source.
    pub rng: SmallRng,
}

impl StubServices {
    /// Create stubs with an empty map and a seeded random source.
    pub fn new(seed: u64) -> Self {
        Self {
            actors: ActorRegistry::new(),
            spatial: StubSpatial::new(),
            dialogue: StubDialogue::default(),
            audio: StubAudio::new(),
            screen: StubScreen::default(),
            modes: StubModeStack::default(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Borrow everything as an [`EventContext`] for one tick of `elapsed_ms`.
    pub fn context(&mut self, elapsed_ms: u32) -> EventContext<'_> {
        EventContext {
            elapsed_ms,
            actors: &mut self.actors,
            spatial: &mut self.spatial,
            dialogue: &mut self.dialogue,
            audio: &mut self.audio,
            screen: &mut self.screen,
            modes: &mut self.modes,
            rng: &mut self.rng,
        }
    }
}
