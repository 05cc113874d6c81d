//! Scene loop runner.
//!
//! This module provides [`run_scene`], the async loop that drives a built
//! scene one tick at a time until nothing is scheduled any more or the
//! tick limit is reached. Each tick runs in a fixed order:
//!
//! 1. Presentation timers advance (dialogues close, clips stop, fades end).
//! 2. The event supervisor runs its delay promotion and update pass.
//! 3. Moving actors step along their facing; blocked actors have their
//!    collision routed to the event controlling them.
//!
//! Every tick feeds `tick_interval_ms` as the elapsed time. With
//! `realtime` set the loop also sleeps that long between ticks; otherwise
//! ticks run back to back, which keeps headless runs deterministic.

use std::time::Duration;

use tracing::{debug, info, warn};
use vignette_core::config::EngineConfig;
use vignette_core::supervisor::EventSupervisor;

use crate::scene::SceneState;

/// Why a scene run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// No event is running, waiting, or paused.
    Idle,
    /// The configured tick limit was reached first.
    MaxTicksReached,
}

/// Result of a scene run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Run one tick of `elapsed_ms` against the scene.
///
/// Returns the number of collisions that occurred while stepping actors.
pub fn run_tick(supervisor: &mut EventSupervisor, state: &mut SceneState, elapsed_ms: u32) -> usize {
    state.presentation.advance(elapsed_ms);
    supervisor.update(&mut state.context(elapsed_ms));

    let collisions = state.world.step_actors(&mut state.actors, elapsed_ms);
    for (actor, collision) in &collisions {
        if !supervisor.resolve_collision(*actor, collision, &mut state.context(elapsed_ms)) {
            debug!(actor = %actor, kind = ?collision.kind, "Collision with no controlling event");
        }
    }
    collisions.len()
}

/// Run the scene loop until it goes idle or hits `max_ticks`.
pub async fn run_scene(
    supervisor: &mut EventSupervisor,
    state: &mut SceneState,
    config: &EngineConfig,
) -> RunResult {
    let elapsed_ms = config.tick_interval_ms;
    let mut total_ticks: u64 = 0;

    info!(
        scene = %state.name,
        tick_interval_ms = elapsed_ms,
        max_ticks = config.max_ticks,
        realtime = config.realtime,
        "Scene starting"
    );

    loop {
        // --- Check for idle (before tick) ---
        if supervisor.is_idle() {
            info!(tick = total_ticks, "All events finished");
            return RunResult {
                end_reason: RunEndReason::Idle,
                total_ticks,
            };
        }

        // --- Check tick limit (before tick) ---
        if total_ticks >= config.max_ticks {
            info!(
                tick = total_ticks,
                max_ticks = config.max_ticks,
                active = supervisor.active_ids().len(),
                "Tick limit reached"
            );
            return RunResult {
                end_reason: RunEndReason::MaxTicksReached,
                total_ticks,
            };
        }

        // --- Execute tick ---
        let collisions = run_tick(supervisor, state, elapsed_ms);
        total_ticks = total_ticks.saturating_add(1);
        if collisions > 0 {
            debug!(tick = total_ticks, collisions, "Collisions resolved");
        }

        // --- Sleep for tick interval ---
        if config.realtime && elapsed_ms > 0 {
            tokio::time::sleep(Duration::from_millis(u64::from(elapsed_ms))).await;
        }
    }
}

/// Log the end of a scene run.
pub fn log_run_end(result: &RunResult, state: &SceneState) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        battles_and_shops = state.presentation.modes.pushed.len(),
        map_swaps = state.presentation.modes.swaps.len(),
        "Scene ended"
    );

    if result.total_ticks == 0 {
        warn!("Scene ended with no ticks executed");
    }
    for actor in state.actors.iter() {
        debug!(
            actor = %actor.id(),
            x = actor.position.x,
            y = actor.position.y,
            facing = ?actor.facing,
            "Final actor position"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vignette_core::config::VignetteConfig;
    use vignette_types::{ActorId, MapPosition};

    use super::*;
    use crate::scene::SceneDefinition;
    use crate::scripts::builtin_scripts;

    fn headless_config(tick_interval_ms: u32, max_ticks: u64) -> VignetteConfig {
        let mut config = VignetteConfig::default();
        config.engine.tick_interval_ms = tick_interval_ms;
        config.engine.max_ticks = max_ticks;
        config.engine.realtime = false;
        config.engine.dialogue_ms = 100;
        config.engine.clip_ms = 100;
        config
    }

    async fn run(yaml: &str, config: &VignetteConfig) -> (RunResult, EventSupervisor, SceneState) {
        let scene = SceneDefinition::parse(yaml).unwrap();
        let (mut supervisor, mut state) = scene.build(config, &builtin_scripts()).unwrap();
        scene.start_events(&mut supervisor, &mut state);
        let result = run_scene(&mut supervisor, &mut state, &config.engine).await;
        (result, supervisor, state)
    }

    #[tokio::test]
    async fn dialogue_and_chime_finish_together() {
        let yaml = r"
map: { name: square }
events:
  - id: greet
    type: dialogue
    dialogue: 7
    links:
      - { child: chime, trigger: on_start }
  - { id: chime, type: sound, file: snd/chime.wav }
start:
  - { event: greet }
";
        let (result, _, _) = run(yaml, &headless_config(50, 100)).await;
        assert_eq!(
            result,
            RunResult {
                end_reason: RunEndReason::Idle,
                total_ticks: 2,
            }
        );
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let yaml = r"
map: { name: field }
actors:
  - { id: 1, x: 5.0, y: 5.0 }
events:
  - { id: wander, type: random_move, actor: 1, movement_ms: 100000, direction_ms: 200 }
start:
  - { event: wander }
";
        let (result, supervisor, _) = run(yaml, &headless_config(16, 5)).await;
        assert_eq!(result.end_reason, RunEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert!(supervisor.is_event_active("wander"));
    }

    #[tokio::test]
    async fn walker_reaches_destination_and_releases_control() {
        let yaml = r"
map: { name: road, width: 8, height: 4 }
actors:
  - { id: 1, x: 1.0, y: 1.0, speed_ms: 100 }
events:
  - { id: walk, type: path_move, actor: 1, x: 4.0, y: 1.0 }
start:
  - { event: walk }
";
        // 50 ms at 100 ms per tile is half a tile per tick.
        let (result, _, state) = run(yaml, &headless_config(50, 100)).await;
        assert_eq!(result.end_reason, RunEndReason::Idle);
        assert_eq!(result.total_ticks, 6);

        let walker = state.actors.get(ActorId(1)).unwrap();
        assert!(walker.position.is_within(&MapPosition::new(4.0, 1.0), 0.5));
        assert!(!walker.moving);
        assert_eq!(walker.controller(), None);
    }

    #[tokio::test]
    async fn walled_off_destination_finishes_at_once() {
        let yaml = r"
map:
  name: pen
  width: 5
  height: 5
  blocked: [[2, 0], [2, 1], [2, 2], [2, 3], [2, 4]]
actors:
  - { id: 1, x: 0.0, y: 0.0 }
events:
  - { id: walk, type: path_move, actor: 1, x: 4.0, y: 0.0 }
start:
  - { event: walk }
";
        let (result, _, state) = run(yaml, &headless_config(16, 100)).await;
        assert_eq!(result.total_ticks, 1);
        assert_eq!(
            state.actors.get(ActorId(1)).unwrap().position,
            MapPosition::new(0.0, 0.0)
        );
    }

    #[tokio::test]
    async fn delayed_start_waits_for_its_countdown() {
        let yaml = r"
map: { name: dock }
events:
  - { id: horn, type: sound, file: snd/horn.wav }
start:
  - { event: horn, delay_ms: 200 }
";
        // Promotion at tick 4 (4 x 50 = 200), then two ticks of playback:
        // the clip is still playing after the first 50 ms and stops after
        // the second.
        let (result, _, _) = run(yaml, &headless_config(50, 100)).await;
        assert_eq!(result.end_reason, RunEndReason::Idle);
        assert_eq!(result.total_ticks, 6);
    }

    #[tokio::test]
    async fn transition_swaps_map_after_fade() {
        let yaml = r"
map: { name: village }
events:
  - { id: leave, type: map_transition, map_file: maps/forest.yaml, fade_out_ms: 100 }
start:
  - { event: leave }
";
        let (result, _, state) = run(yaml, &headless_config(50, 100)).await;
        assert_eq!(result.end_reason, RunEndReason::Idle);
        let swap = state.presentation.modes.swaps.first().unwrap();
        assert_eq!(swap.map_file, "maps/forest.yaml");
        assert_eq!(swap.coming_from, "village");
    }

    #[tokio::test]
    async fn empty_scene_is_idle_immediately() {
        let (result, _, _) = run("map: { name: void }\n", &headless_config(16, 10)).await;
        assert_eq!(
            result,
            RunResult {
                end_reason: RunEndReason::Idle,
                total_ticks: 0,
            }
        );
    }

    #[tokio::test]
    async fn demo_scene_runs_to_completion() {
        let config = headless_config(16, 10_000);
        let (result, _, state) = run(include_str!("../../../scenes/demo.yaml"), &config).await;
        assert_eq!(result.end_reason, RunEndReason::Idle);
        assert_eq!(state.presentation.modes.pushed.len(), 1);
        assert_eq!(state.presentation.modes.swaps.len(), 1);
    }
}
