//! Type-safe identifier wrappers.
//!
//! Events are keyed by authored string ids (`"talk1"`, `"guard_walk"`),
//! so [`EventId`] wraps a `String` and borrows as `str` for map lookups.
//! Actors, dialogues and map objects are numbered by the map, so their ids
//! are small integer newtypes generated by [`define_numeric_id`].

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Unique identifier for an event registered with the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create an event identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Generates a newtype wrapper around an integer with standard derives.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Return the inner integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }
    };
}

define_numeric_id! {
    /// Unique identifier for an actor (sprite) on the map.
    ActorId(u32)
}

define_numeric_id! {
    /// Identifier of a dialogue owned by the dialogue subsystem.
    DialogueId(u32)
}

define_numeric_id! {
    /// Identifier of a map object, enemy type, or shop ware.
    ObjectId(u32)
}
