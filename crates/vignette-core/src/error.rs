//! Error types for the `vignette-core` crate.
//!
//! Nothing in the event core is fatal. Supervisor operations return
//! [`EventError`] to their direct caller and log a warning; the tick itself
//! never fails, and link cascades absorb these errors after logging them.

use vignette_types::EventId;

/// Errors reported by supervisor operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// An event with this id is already registered. The first one is kept.
    #[error("event with this id already registered: {0}")]
    DuplicateEvent(EventId),

    /// No event with this id is registered.
    #[error("no event registered with id: {0}")]
    UnknownEvent(EventId),

    /// The event is already in one of the working sets.
    #[error("event is already scheduled: {0}")]
    AlreadyScheduled(EventId),

    /// The event cannot be reconfigured while it is scheduled.
    #[error("event cannot be modified while scheduled: {0}")]
    EventScheduled(EventId),
}
