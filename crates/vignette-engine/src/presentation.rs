//! Headless dialogue, audio, screen and mode-stack collaborators.
//!
//! These stand in for the renderer and the audio device when a scene runs
//! without a window. Each one logs what it is asked to do and completes
//! on a timer advanced once per tick by [`Presentation::advance`]:
//! dialogues close after `dialogue_ms`, clips stop after `clip_ms`, and
//! fades run for the duration they were started with.

use std::collections::BTreeMap;

use tracing::info;
use vignette_core::config::EngineConfig;
use vignette_core::services::{
    AudioError, AudioService, ClipHandle, DialogueService, ModeStack, PlaybackState, ScreenService,
};
use vignette_types::{DialogueId, MapSwap, ModeRequest};

/// A dialogue box that reads itself for a fixed time.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDialogue {
    display_ms: u32,
    current: Option<DialogueId>,
    remaining_ms: u32,
}

impl HeadlessDialogue {
    /// Keep each dialogue open for `display_ms`.
    pub const fn new(display_ms: u32) -> Self {
        Self {
            display_ms,
            current: None,
            remaining_ms: 0,
        }
    }

    fn advance(&mut self, elapsed_ms: u32) {
        let Some(dialogue) = self.current else {
            return;
        };
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            info!(dialogue = %dialogue, "Dialogue closed");
            self.current = None;
        }
    }
}

impl DialogueService for HeadlessDialogue {
    fn begin_dialogue(&mut self, dialogue: DialogueId) {
        info!(dialogue = %dialogue, "Dialogue opened");
        self.current = Some(dialogue);
        self.remaining_ms = self.display_ms;
    }

    fn current_dialogue(&self) -> Option<DialogueId> {
        self.current
    }
}

/// Playback record of one loaded clip.
#[derive(Debug, Clone)]
struct Clip {
    file: String,
    state: PlaybackState,
    remaining_ms: u32,
}

/// An audio device that "plays" each clip for a fixed time.
#[derive(Debug, Clone, Default)]
pub struct HeadlessAudio {
    clip_ms: u32,
    clips: BTreeMap<ClipHandle, Clip>,
    next_handle: u32,
}

impl HeadlessAudio {
    /// Play every clip for `clip_ms`.
    pub const fn new(clip_ms: u32) -> Self {
        Self {
            clip_ms,
            clips: BTreeMap::new(),
            next_handle: 0,
        }
    }

    fn advance(&mut self, elapsed_ms: u32) {
        for clip in self.clips.values_mut() {
            if clip.state != PlaybackState::Playing {
                continue;
            }
            clip.remaining_ms = clip.remaining_ms.saturating_sub(elapsed_ms);
            if clip.remaining_ms == 0 {
                clip.state = PlaybackState::Stopped;
            }
        }
    }
}

impl AudioService for HeadlessAudio {
    fn load_clip(&mut self, file: &str) -> Result<ClipHandle, AudioError> {
        if file.trim().is_empty() {
            return Err(AudioError::ClipNotFound {
                file: file.to_owned(),
            });
        }
        let handle = ClipHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.clips.insert(
            handle,
            Clip {
                file: file.to_owned(),
                state: PlaybackState::Stopped,
                remaining_ms: 0,
            },
        );
        Ok(handle)
    }

    fn play(&mut self, clip: ClipHandle) {
        let clip_ms = self.clip_ms;
        if let Some(loaded) = self.clips.get_mut(&clip) {
            info!(file = %loaded.file, "Clip playing");
            loaded.state = PlaybackState::Playing;
            loaded.remaining_ms = clip_ms;
        }
    }

    fn stop(&mut self, clip: ClipHandle) {
        if let Some(loaded) = self.clips.get_mut(&clip) {
            loaded.state = PlaybackState::Stopped;
            loaded.remaining_ms = 0;
        }
    }

    fn state(&self, clip: ClipHandle) -> PlaybackState {
        self.clips
            .get(&clip)
            .map_or(PlaybackState::Stopped, |loaded| loaded.state)
    }
}

/// Camera and fade state of the headless screen.
#[derive(Debug, Clone, Default)]
pub struct HeadlessScreen {
    fade_remaining_ms: u32,
    in_scene: bool,
}

impl HeadlessScreen {
    /// Whether the map has entered its scene state.
    pub const fn in_scene(&self) -> bool {
        self.in_scene
    }

    fn advance(&mut self, elapsed_ms: u32) {
        if self.fade_remaining_ms == 0 {
            return;
        }
        self.fade_remaining_ms = self.fade_remaining_ms.saturating_sub(elapsed_ms);
        if self.fade_remaining_ms == 0 {
            info!("Fade complete");
        }
    }
}

impl ScreenService for HeadlessScreen {
    fn halt_camera(&mut self) {
        info!("Camera halted");
    }

    fn start_fade(&mut self, duration_ms: u32) {
        info!(duration_ms, "Fade started");
        self.fade_remaining_ms = duration_ms;
    }

    fn is_fading(&self) -> bool {
        self.fade_remaining_ms > 0
    }

    fn enter_scene_state(&mut self) {
        info!("Scene state entered");
        self.in_scene = true;
    }
}

/// A mode stack that records pushes and map swaps.
///
/// Nothing is actually pushed: a headless run stays on the map and the
/// requests are kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct ModeLog {
    /// Every mode pushed, in order.
    pub pushed: Vec<ModeRequest>,
    /// Every map swap requested, in order.
    pub swaps: Vec<MapSwap>,
}

impl ModeStack for ModeLog {
    fn push_mode(&mut self, request: ModeRequest) {
        match &request {
            ModeRequest::Battle(setup) => {
                info!(enemies = setup.enemies.len(), music = %setup.music, "Battle pushed");
            }
            ModeRequest::Shop(setup) => {
                info!(wares = setup.wares.len(), "Shop pushed");
            }
        }
        self.pushed.push(request);
    }

    fn swap_map(&mut self, swap: MapSwap) {
        info!(map_file = %swap.map_file, coming_from = %swap.coming_from, "Map swap requested");
        self.swaps.push(swap);
    }
}

/// Every presentation collaborator of a headless scene.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    /// Dialogue box.
    pub dialogue: HeadlessDialogue,
    /// Audio device.
    pub audio: HeadlessAudio,
    /// Camera and fades.
    pub screen: HeadlessScreen,
    /// Mode stack.
    pub modes: ModeLog,
}

impl Presentation {
    /// Build collaborators timed by the engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            dialogue: HeadlessDialogue::new(config.dialogue_ms),
            audio: HeadlessAudio::new(config.clip_ms),
            screen: HeadlessScreen::default(),
            modes: ModeLog::default(),
        }
    }

    /// Run every timer forward by one tick.
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.dialogue.advance(elapsed_ms);
        self.audio.advance(elapsed_ms);
        self.screen.advance(elapsed_ms);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vignette_types::ShopSetup;

    use super::*;

    #[test]
    fn dialogue_closes_after_display_time() {
        let mut dialogue = HeadlessDialogue::new(300);
        dialogue.begin_dialogue(DialogueId(4));
        dialogue.advance(200);
        assert_eq!(dialogue.current_dialogue(), Some(DialogueId(4)));
        dialogue.advance(100);
        assert_eq!(dialogue.current_dialogue(), None);
    }

    #[test]
    fn clip_plays_for_configured_time() {
        let mut audio = HeadlessAudio::new(250);
        let clip = audio.load_clip("snd/door.wav").unwrap();
        assert_eq!(audio.state(clip), PlaybackState::Stopped);

        audio.play(clip);
        audio.advance(200);
        assert_eq!(audio.state(clip), PlaybackState::Playing);
        audio.advance(50);
        assert_eq!(audio.state(clip), PlaybackState::Stopped);

        audio.play(clip);
        audio.stop(clip);
        assert_eq!(audio.state(clip), PlaybackState::Stopped);
    }

    #[test]
    fn blank_clip_file_fails_to_load() {
        let mut audio = HeadlessAudio::new(250);
        assert!(matches!(
            audio.load_clip("  "),
            Err(AudioError::ClipNotFound { .. })
        ));
        assert_eq!(audio.state(ClipHandle(9)), PlaybackState::Stopped);
    }

    #[test]
    fn fade_runs_for_its_duration() {
        let mut screen = HeadlessScreen::default();
        assert!(!screen.is_fading());
        screen.start_fade(100);
        screen.advance(60);
        assert!(screen.is_fading());
        screen.advance(60);
        assert!(!screen.is_fading());
    }

    #[test]
    fn presentation_advances_all_timers() {
        let config = EngineConfig {
            dialogue_ms: 100,
            clip_ms: 100,
            ..EngineConfig::default()
        };
        let mut presentation = Presentation::new(&config);
        presentation.dialogue.begin_dialogue(DialogueId(1));
        let clip = presentation.audio.load_clip("snd/chime.wav").unwrap();
        presentation.audio.play(clip);
        presentation.screen.start_fade(100);

        presentation.advance(100);
        assert_eq!(presentation.dialogue.current_dialogue(), None);
        assert_eq!(presentation.audio.state(clip), PlaybackState::Stopped);
        assert!(!presentation.screen.is_fading());
    }

    #[test]
    fn mode_log_records_requests() {
        let mut modes = ModeLog::default();
        modes.push_mode(ModeRequest::Shop(ShopSetup::default()));
        modes.swap_map(MapSwap {
            map_file: "maps/cave.yaml".to_owned(),
            coming_from: "village".to_owned(),
        });
        assert_eq!(modes.pushed.len(), 1);
        assert_eq!(modes.swaps.len(), 1);
    }
}
