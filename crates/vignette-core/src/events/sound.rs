//! Sound playback.

use tracing::warn;
use vignette_types::EventId;

use super::EventState;
use crate::services::{AudioService, ClipHandle, EventContext, PlaybackState};

/// Plays a clip and finishes once playback has stopped.
///
/// The clip is loaded at construction. If loading fails the failure is
/// logged and the event becomes inert: starting it plays nothing and its
/// first update reports it finished.
#[derive(Debug, PartialEq, Eq)]
pub struct SoundEvent {
    file: String,
    clip: Option<ClipHandle>,
}

impl SoundEvent {
    /// Load `file` through `audio` and build the event.
    pub fn new(file: impl Into<String>, audio: &mut dyn AudioService) -> Self {
        let file = file.into();
        let clip = match audio.load_clip(&file) {
            Ok(clip) => Some(clip),
            Err(err) => {
                warn!(file = %file, error = %err, "Failed to load sound event clip");
                None
            }
        };
        Self { file, clip }
    }

    /// The clip file this event plays.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Whether the clip loaded.
    pub const fn is_loaded(&self) -> bool {
        self.clip.is_some()
    }
}

impl EventState for SoundEvent {
    fn start(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        if let Some(clip) = self.clip {
            ctx.audio.play(clip);
        }
    }

    fn update(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        self.clip
            .is_none_or(|clip| ctx.audio.state(clip) == PlaybackState::Stopped)
    }

    fn terminate(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        if let Some(clip) = self.clip {
            ctx.audio.stop(clip);
        }
    }
}
