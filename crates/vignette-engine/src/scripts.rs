//! Script functions available to scenes run by the engine binary.

use tracing::debug;
use vignette_core::script::{ScriptArgs, ScriptTable};
use vignette_types::{Direction, MapPosition};

/// How long `wait_one_second` keeps its event active.
const WAIT_MS: u32 = 1000;

/// Build the table of script functions scenes may name.
///
/// - `step_forward` moves the bound actor one tile along its facing.
/// - `turn_around` reverses the bound actor's facing.
/// - `wait_one_second` finishes once a second of tick time has passed.
/// - `log_tick` logs the elapsed time and finishes at once.
pub fn builtin_scripts() -> ScriptTable {
    let mut table = ScriptTable::new();

    table.register("step_forward", |args: &mut ScriptArgs<'_>| {
        if let Some(actor) = args.actor.as_deref_mut() {
            let (dx, dy) = actor.facing.step();
            actor.position = MapPosition::new(actor.position.x + dx, actor.position.y + dy);
        }
        true
    });

    table.register("turn_around", |args: &mut ScriptArgs<'_>| {
        if let Some(actor) = args.actor.as_deref_mut() {
            actor.facing = opposite(actor.facing);
        }
        true
    });

    let mut waited = 0_u32;
    table.register("wait_one_second", move |args: &mut ScriptArgs<'_>| {
        waited = waited.saturating_add(args.elapsed_ms);
        waited >= WAIT_MS
    });

    table.register("log_tick", |args: &mut ScriptArgs<'_>| {
        debug!(elapsed_ms = args.elapsed_ms, "Script tick");
        true
    });

    table
}

const fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::North => Direction::South,
        Direction::South => Direction::North,
        Direction::East => Direction::West,
        Direction::West => Direction::East,
        Direction::NorthWest => Direction::SouthEast,
        Direction::NorthEast => Direction::SouthWest,
        Direction::SouthWest => Direction::NorthEast,
        Direction::SouthEast => Direction::NorthWest,
    }
}
