//! Script hooks used by scripted events.
//!
//! A scripted event names its start and update functions; the names are
//! resolved once, when the event is constructed, into owned [`ScriptHook`]
//! closures. A name that resolves to nothing is not an error: a missing
//! start hook does nothing and a missing update hook finishes at once.

use std::collections::BTreeMap;

use tracing::warn;

use crate::actor::Actor;

/// Arguments handed to a script hook on each call.
#[derive(Debug)]
pub struct ScriptArgs<'a> {
    /// Milliseconds elapsed since the previous tick.
    pub elapsed_ms: u32,
    /// The actor a sprite-bound script operates on.
    pub actor: Option<&'a mut Actor>,
}

/// An owned, resolved script function.
///
/// The return value is the "finished" flag for update hooks and is ignored
/// for start hooks.
pub type ScriptHook = Box<dyn FnMut(&mut ScriptArgs<'_>) -> bool>;

/// Resolves script function names into hooks.
pub trait ScriptResolver {
    /// Resolve `name`, or return `None` if no such function exists.
    fn resolve(&self, name: &str) -> Option<ScriptHook>;
}

/// Factory producing a fresh hook for each event that resolves a name.
type HookFactory = Box<dyn Fn() -> ScriptHook>;

/// A table of named script functions.
///
/// Each resolution produces a fresh clone of the registered closure, so
/// two events resolving the same name never share closure state.
#[derive(Default)]
pub struct ScriptTable {
    functions: BTreeMap<String, HookFactory>,
}

impl ScriptTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: FnMut(&mut ScriptArgs<'_>) -> bool + Clone + 'static,
    {
        let factory: HookFactory = Box::new(move || -> ScriptHook { Box::new(function.clone()) });
        self.functions.insert(name.into(), factory);
    }

    /// Return true if a function is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl core::fmt::Debug for ScriptTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScriptTable")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScriptResolver for ScriptTable {
    fn resolve(&self, name: &str) -> Option<ScriptHook> {
        self.functions.get(name).map(|factory| factory())
    }
}

/// Resolve an optional hook name for `event`.
///
/// An empty name means the event has no such hook. A non-empty name that
/// does not resolve is logged and treated the same way.
pub(crate) fn resolve_hook(
    resolver: &dyn ScriptResolver,
    event: &str,
    name: &str,
) -> Option<ScriptHook> {
    if name.is_empty() {
        return None;
    }
    let hook = resolver.resolve(name);
    if hook.is_none() {
        warn!(event_id = event, function = name, "Script function not found");
    }
    hook
}
