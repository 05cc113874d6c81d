//! Custom sprite animation.

use serde::{Deserialize, Serialize};
use vignette_types::{ActorId, EventId};

use super::EventState;
use crate::services::EventContext;

/// One frame of a custom animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Animation index shown on the actor.
    pub frame: u32,
    /// How long the frame stays up before advancing.
    pub duration_ms: u32,
}

/// Plays a sequence of frames on an actor, overriding its own animation.
///
/// With a loop budget of `n` the sequence plays `n + 1` times in total.
/// Without a budget it loops until terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimateEvent {
    actor: ActorId,
    frames: Vec<AnimationFrame>,
    loops: Option<u32>,
    current_frame: usize,
    display_timer: u32,
    loop_count: u32,
}

impl AnimateEvent {
    /// Animate `actor`, repeating `loops` extra times (`None` loops forever).
    pub const fn new(actor: ActorId, loops: Option<u32>) -> Self {
        Self {
            actor,
            frames: Vec::new(),
            loops,
            current_frame: 0,
            display_timer: 0,
            loop_count: 0,
        }
    }

    /// Append a frame.
    pub fn add_frame(&mut self, frame: u32, duration_ms: u32) {
        self.frames.push(AnimationFrame { frame, duration_ms });
    }

    /// Builder form of [`AnimateEvent::add_frame`].
    #[must_use]
    pub fn with_frame(mut self, frame: u32, duration_ms: u32) -> Self {
        self.add_frame(frame, duration_ms);
        self
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    fn show_current(&self, ctx: &mut EventContext<'_>) {
        let Some(frame) = self.frames.get(self.current_frame) else {
            return;
        };
        if let Some(actor) = ctx.actors.get_mut(self.actor) {
            actor.current_animation = frame.frame;
        }
    }

    fn finish(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        self.loop_count = 0;
        if let Some(actor) = ctx.actors.get_mut(self.actor) {
            actor.custom_animation = false;
            actor.release_control(id);
        }
    }
}

impl EventState for AnimateEvent {
    fn start(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        self.current_frame = 0;
        self.display_timer = 0;
        self.loop_count = 0;
        if let Some(actor) = ctx.actors.get_mut(self.actor) {
            actor.custom_animation = true;
        }
        self.show_current(ctx);
    }

    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        let Some(current) = self.frames.get(self.current_frame) else {
            self.finish(id, ctx);
            return true;
        };

        self.display_timer = self.display_timer.saturating_add(ctx.elapsed_ms);
        if self.display_timer <= current.duration_ms {
            return false;
        }

        self.display_timer = 0;
        self.current_frame = self.current_frame.saturating_add(1);

        if self.current_frame >= self.frames.len() {
            self.current_frame = 0;
            if let Some(budget) = self.loops {
                self.loop_count = self.loop_count.saturating_add(1);
                if self.loop_count > budget {
                    self.finish(id, ctx);
                    return true;
                }
            }
        }

        self.show_current(ctx);
        false
    }

    fn actor(&self) -> Option<ActorId> {
        Some(self.actor)
    }

    fn terminate(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        if let Some(actor) = ctx
            .actors
            .get_mut(self.actor)
            .filter(|actor| actor.is_controlled_by(id.as_str()))
        {
            actor.custom_animation = false;
        }
        ctx.actors.release_if_held(self.actor, id, false);
    }
}
