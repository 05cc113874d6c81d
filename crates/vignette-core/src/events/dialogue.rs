//! Dialogue presentation.

use tracing::debug;
use vignette_types::{DialogueId, EventId};

use super::EventState;
use crate::services::EventContext;

/// Presents a dialogue and finishes once it is no longer current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueEvent {
    dialogue: DialogueId,
    stop_camera_movement: bool,
}

impl DialogueEvent {
    /// Create a dialogue event that leaves the camera alone.
    pub const fn new(dialogue: DialogueId) -> Self {
        Self {
            dialogue,
            stop_camera_movement: false,
        }
    }

    /// Halt camera motion before the dialogue begins.
    #[must_use]
    pub const fn stopping_camera(mut self) -> Self {
        self.stop_camera_movement = true;
        self
    }

    /// The dialogue this event presents.
    pub const fn dialogue(&self) -> DialogueId {
        self.dialogue
    }
}

impl EventState for DialogueEvent {
    fn start(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        if self.stop_camera_movement {
            ctx.screen.halt_camera();
        }
        debug!(event_id = %id, dialogue = %self.dialogue, "Dialogue begun");
        ctx.dialogue.begin_dialogue(self.dialogue);
    }

    fn update(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        ctx.dialogue.current_dialogue() != Some(self.dialogue)
    }
}
