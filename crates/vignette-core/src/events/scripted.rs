//! Script-driven events.
//!
//! Both variants resolve their hooks once at construction and own them
//! exclusively, so neither can be cloned.

use tracing::warn;
use vignette_types::{ActorId, EventId};

use super::EventState;
use crate::script::{ScriptArgs, ScriptHook, ScriptResolver, resolve_hook};
use crate::services::EventContext;

/// Runs an optional start hook and polls an optional update hook.
pub struct ScriptedEvent {
    start_hook: Option<ScriptHook>,
    update_hook: Option<ScriptHook>,
}

impl ScriptedEvent {
    /// Resolve the named hooks. An empty name means "no hook".
    pub fn resolve(
        resolver: &dyn ScriptResolver,
        event: &str,
        start_function: &str,
        update_function: &str,
    ) -> Self {
        Self {
            start_hook: resolve_hook(resolver, event, start_function),
            update_hook: resolve_hook(resolver, event, update_function),
        }
    }

    /// Build directly from already-resolved hooks.
    pub fn from_hooks(start_hook: Option<ScriptHook>, update_hook: Option<ScriptHook>) -> Self {
        Self {
            start_hook,
            update_hook,
        }
    }
}

impl core::fmt::Debug for ScriptedEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptedEvent")
            .field("start_hook", &self.start_hook.is_some())
            .field("update_hook", &self.update_hook.is_some())
            .finish()
    }
}

impl EventState for ScriptedEvent {
    fn start(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) {
        if let Some(hook) = self.start_hook.as_mut() {
            let mut args = ScriptArgs {
                elapsed_ms: ctx.elapsed_ms,
                actor: None,
            };
            let _ = hook(&mut args);
        }
    }

    fn update(&mut self, _id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        let Some(hook) = self.update_hook.as_mut() else {
            return true;
        };
        let mut args = ScriptArgs {
            elapsed_ms: ctx.elapsed_ms,
            actor: None,
        };
        hook(&mut args)
    }
}

/// Runs script hooks against an actor it takes control of.
///
/// Control is only taken when a start hook exists; an event without one
/// never touches the actor's token.
pub struct ScriptedSpriteEvent {
    actor: ActorId,
    start_hook: Option<ScriptHook>,
    update_hook: Option<ScriptHook>,
}

impl ScriptedSpriteEvent {
    /// Resolve the named hooks for a script bound to `actor`.
    pub fn resolve(
        resolver: &dyn ScriptResolver,
        event: &str,
        actor: ActorId,
        start_function: &str,
        update_function: &str,
    ) -> Self {
        Self {
            actor,
            start_hook: resolve_hook(resolver, event, start_function),
            update_hook: resolve_hook(resolver, event, update_function),
        }
    }

    /// Build directly from already-resolved hooks.
    pub fn from_hooks(
        actor: ActorId,
        start_hook: Option<ScriptHook>,
        update_hook: Option<ScriptHook>,
    ) -> Self {
        Self {
            actor,
            start_hook,
            update_hook,
        }
    }
}

impl core::fmt::Debug for ScriptedSpriteEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptedSpriteEvent")
            .field("actor", &self.actor)
            .field("start_hook", &self.start_hook.is_some())
            .field("update_hook", &self.update_hook.is_some())
            .finish()
    }
}

impl EventState for ScriptedSpriteEvent {
    fn start(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        let Some(hook) = self.start_hook.as_mut() else {
            return;
        };
        let elapsed_ms = ctx.elapsed_ms;
        let Some(actor) = ctx.actors.get_mut(self.actor) else {
            warn!(event_id = %id, actor = %self.actor, "Scripted sprite event has no actor");
            return;
        };
        let mut args = ScriptArgs {
            elapsed_ms,
            actor: Some(actor),
        };
        let _ = hook(&mut args);
    }

    fn update(&mut self, id: &EventId, ctx: &mut EventContext<'_>) -> bool {
        let elapsed_ms = ctx.elapsed_ms;
        let finished = match (self.update_hook.as_mut(), ctx.actors.get_mut(self.actor)) {
            (Some(hook), Some(actor)) => {
                let mut args = ScriptArgs {
                    elapsed_ms,
                    actor: Some(actor),
                };
                hook(&mut args)
            }
            _ => true,
        };

        if finished {
            ctx.actors.release_if_held(self.actor, id, false);
        }
        finished
    }

    fn actor(&self) -> Option<ActorId> {
        Some(self.actor)
    }

    fn claims_control(&self) -> bool {
        self.start_hook.is_some()
    }

    fn terminate(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        ctx.actors.release_if_held(self.actor, id, false);
    }
}
