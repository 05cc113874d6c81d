//! Dependency links between events.

use serde::{Deserialize, Serialize};

use crate::ids::EventId;

/// The transition of a parent event that fires a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPhase {
    /// Fire when the parent starts.
    OnStart,
    /// Fire when the parent finishes or is terminated with cascade.
    OnFinish,
}

/// A directed, phase-gated edge from a parent event to a child event.
///
/// A zero `delay_ms` starts the child synchronously inside the parent's
/// transition; any other value queues the child as a delayed launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLink {
    /// The event to start when the link fires.
    pub child: EventId,
    /// Which parent transition fires the link.
    pub trigger: TriggerPhase,
    /// Launch delay in milliseconds of active tick time.
    #[serde(default)]
    pub delay_ms: u32,
}

impl EventLink {
    /// Link that starts `child` when the parent starts.
    pub fn on_start(child: impl Into<EventId>, delay_ms: u32) -> Self {
        Self {
            child: child.into(),
            trigger: TriggerPhase::OnStart,
            delay_ms,
        }
    }

    /// Link that starts `child` when the parent finishes.
    pub fn on_finish(child: impl Into<EventId>, delay_ms: u32) -> Self {
        Self {
            child: child.into(),
            trigger: TriggerPhase::OnFinish,
            delay_ms,
        }
    }
}
