//! Map transitions.

use tracing::info;
use vignette_types::{EventId, MapSwap};

use super::EventState;
use crate::services::EventContext;

/// Fades the screen out, then swaps to another map.
///
/// The swap is deferred until the fade completes, and the `done` flag
/// guarantees it happens exactly once per activation even if the event is
/// polled again before the mode stack takes over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTransitionEvent {
    swap: MapSwap,
    fade_out_ms: u32,
    done: bool,
}

impl MapTransitionEvent {
    /// Transition to `map_file`, recording `coming_from` as the location
    /// the player left.
    pub fn new(map_file: impl Into<String>, coming_from: impl Into<String>, fade_out_ms: u32) -> Self {
        Self {
            swap: MapSwap {
                map_file: map_file.into(),
                coming_from: coming_from.into(),
            },
            fade_out_ms,
            done: false,
        }
    }

    /// The swap performed once the fade completes.
    pub const fn swap(&self) -> &MapSwap {
        &self.swap
    }
}

impl EventState for MapTransitionEvent {
    fn start(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        ctx.screen.enter_scene_state();
        ctx.screen.start_fade(self.fade_out_ms);
        self.done = false;
    }

    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        if ctx.screen.is_fading() {
            return false;
        }

        if !self.done {
            info!(
                event_id = %id,
                map_file = %self.swap.map_file,
                coming_from = %self.swap.coming_from,
                "Map transition"
            );
            ctx.modes.swap_map(self.swap.clone());
            self.done = true;
        }
        true
    }
}
