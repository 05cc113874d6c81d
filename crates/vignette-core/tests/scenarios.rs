//! End-to-end scheduling scenarios for the event supervisor.
//!
//! Every test drives the public API only, against the in-memory stub
//! collaborators shipped in `vignette_core::services`.

// Panicking on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use vignette_core::actor::Actor;
use vignette_core::events::{
    AnimateEvent, DialogueEvent, MapEvent, PathMoveEvent, RandomMoveEvent, ScriptedEvent,
    ScriptedSpriteEvent, SoundEvent,
};
use vignette_core::script::{ScriptArgs, ScriptTable};
use vignette_core::services::StubServices;
use vignette_core::supervisor::{EventSupervisor, WorkingSet};
use vignette_types::{ActorId, DialogueId, EventId, EventLink, MapPosition};

const GUARD: ActorId = ActorId(1);

fn stubs() -> StubServices {
    let mut stubs = StubServices::new(42);
    stubs
        .actors
        .insert(Actor::new(GUARD, MapPosition::new(2.0, 2.0), 200.0));
    stubs
}

fn noop(id: &str) -> MapEvent {
    MapEvent::new(id, ScriptedEvent::from_hooks(None, None))
}

/// An event that never finishes on its own.
fn forever(id: &str) -> MapEvent {
    let mut table = ScriptTable::new();
    table.register("never", |_args: &mut ScriptArgs<'_>| false);
    MapEvent::new(id, ScriptedEvent::resolve(&table, id, "", "never"))
}

#[test]
fn dialogue_finish_starts_linked_sound_in_same_tick() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    let chime = SoundEvent::new("snd/chime.wav", &mut stubs.audio);
    supervisor
        .register(
            MapEvent::new("talk1", DialogueEvent::new(DialogueId(7)))
                .with_link(EventLink::on_finish("chime", 0)),
        )
        .unwrap();
    supervisor.register(MapEvent::new("chime", chime)).unwrap();

    supervisor.start_event("talk1", 0, &mut stubs.context(0)).unwrap();
    supervisor.update(&mut stubs.context(16));
    assert!(supervisor.is_event_active("talk1"));
    assert!(stubs.audio.played.is_empty());

    stubs.dialogue.finish_current();
    supervisor.update(&mut stubs.context(16));
    assert!(!supervisor.is_event_active("talk1"));
    assert!(supervisor.is_event_active("chime"));
    assert_eq!(stubs.audio.played.len(), 1);
}

#[test]
fn relative_path_move_resolves_from_actor_tile() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(MapEvent::new(
            "walk",
            PathMoveEvent::new(GUARD, MapPosition::new(10.5, 3.25), false).relative(),
        ))
        .unwrap();

    supervisor.start_event("walk", 0, &mut stubs.context(0)).unwrap();
    let requested = stubs.spatial.requests.first().map(|(_, destination)| *destination);
    assert_eq!(requested, Some(MapPosition::new(12.5, 5.25)));
}

#[test]
fn delayed_start_waits_for_cumulative_elapsed_time() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor.register(forever("later")).unwrap();

    supervisor.start_event("later", 500, &mut stubs.context(0)).unwrap();
    assert_eq!(supervisor.working_set_of("later"), Some(WorkingSet::ActiveDelayed));

    supervisor.update(&mut stubs.context(300));
    assert!(!supervisor.is_event_active("later"));
    assert_eq!(supervisor.remaining_delay("later"), Some(200));

    supervisor.update(&mut stubs.context(250));
    assert!(supervisor.is_event_active("later"));
    assert_eq!(supervisor.remaining_delay("later"), None);
}

#[test]
fn promoted_event_is_updated_in_the_tick_it_starts() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor.register(noop("blink")).unwrap();

    supervisor.start_event("blink", 100, &mut stubs.context(0)).unwrap();
    supervisor.update(&mut stubs.context(100));
    // Started by promotion, then finished by the active pass of the same tick.
    assert_eq!(supervisor.working_set_of("blink"), None);
}

#[test]
fn terminating_a_paused_event_with_cascade_fires_finish_links() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(forever("e1").with_link(EventLink::on_finish("after", 0)))
        .unwrap();
    supervisor.register(forever("after")).unwrap();

    supervisor.start_event("e1", 0, &mut stubs.context(0)).unwrap();
    supervisor.pause_events("e1", &mut stubs.actors).unwrap();
    assert_eq!(supervisor.working_set_of("e1"), Some(WorkingSet::Paused));

    supervisor
        .terminate_events("e1", true, &mut stubs.context(0))
        .unwrap();
    assert_eq!(supervisor.working_set_of("e1"), None);
    assert!(supervisor.is_event_active("after"));
}

#[test]
fn terminating_without_cascade_never_starts_finish_children() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(forever("e1").with_link(EventLink::on_finish("after", 0)))
        .unwrap();
    supervisor.register(forever("after")).unwrap();

    supervisor.start_event("e1", 0, &mut stubs.context(0)).unwrap();
    supervisor
        .terminate_events("e1", false, &mut stubs.context(0))
        .unwrap();
    supervisor.update(&mut stubs.context(16));
    assert!(supervisor.is_idle());

    // A second termination is a silent no-op.
    assert!(
        supervisor
            .terminate_events("e1", false, &mut stubs.context(0))
            .is_ok()
    );
}

#[test]
fn pause_resume_carries_remaining_delay() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor.register(forever("later")).unwrap();

    supervisor.start_event("later", 1000, &mut stubs.context(0)).unwrap();
    supervisor.update(&mut stubs.context(400));
    supervisor.pause_events("later", &mut stubs.actors).unwrap();
    for _ in 0..50 {
        supervisor.update(&mut stubs.context(100));
    }
    supervisor.resume_events("later", &mut stubs.actors).unwrap();

    supervisor.update(&mut stubs.context(599));
    assert!(!supervisor.is_event_active("later"));
    supervisor.update(&mut stubs.context(1));
    assert!(supervisor.is_event_active("later"));
}

#[test]
fn new_sprite_event_preempts_previous_controller_without_cascade() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(
            MapEvent::new("wander", RandomMoveEvent::new(GUARD, 60_000, 500))
                .with_link(EventLink::on_finish("after_wander", 0)),
        )
        .unwrap();
    supervisor.register(forever("after_wander")).unwrap();
    supervisor
        .register(MapEvent::new(
            "walk",
            PathMoveEvent::new(GUARD, MapPosition::new(8.0, 2.0), false),
        ))
        .unwrap();

    supervisor.start_event("wander", 0, &mut stubs.context(0)).unwrap();
    assert!(stubs.actors.get(GUARD).unwrap().is_controlled_by("wander"));

    supervisor.start_event("walk", 0, &mut stubs.context(0)).unwrap();
    assert!(!supervisor.is_event_active("wander"));
    assert!(!supervisor.is_event_active("after_wander"));
    assert!(supervisor.is_event_active("walk"));
    assert!(stubs.actors.get(GUARD).unwrap().is_controlled_by("walk"));
}

#[test]
fn unreachable_path_finishes_and_releases_on_first_update() {
    let mut stubs = stubs();
    stubs.spatial.set_unreachable(GUARD);
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(MapEvent::new(
            "walk",
            PathMoveEvent::new(GUARD, MapPosition::new(30.0, 30.0), true),
        ))
        .unwrap();

    supervisor.start_event("walk", 0, &mut stubs.context(0)).unwrap();
    supervisor.update(&mut stubs.context(16));

    assert!(!supervisor.is_event_active("walk"));
    let guard = stubs.actors.get(GUARD).unwrap();
    assert!(!guard.moving);
    assert_eq!(guard.controller(), None);
}

#[test]
fn path_move_walks_to_destination_through_ticks() {
    let mut stubs = stubs();
    stubs.spatial.set_path(
        GUARD,
        vec![MapPosition::new(2.0, 4.0), MapPosition::new(4.0, 4.0)],
    );
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(MapEvent::new(
            "walk",
            PathMoveEvent::new(GUARD, MapPosition::new(4.0, 4.0), false),
        ))
        .unwrap();

    supervisor.start_event("walk", 0, &mut stubs.context(0)).unwrap();

    // Move the actor the way a map would: one step along its facing per tick.
    let mut ticks = 0_u32;
    while supervisor.is_event_active("walk") {
        supervisor.update(&mut stubs.context(100));
        let guard = stubs.actors.get_mut(GUARD).unwrap();
        if guard.moving {
            let distance = guard.distance_moved(100);
            let (dx, dy) = guard.facing.step();
            guard.position = MapPosition::new(
                guard.position.x + dx * distance,
                guard.position.y + dy * distance,
            );
        }
        ticks = ticks.saturating_add(1);
        assert!(ticks < 100, "path never completed");
    }

    let guard = stubs.actors.get(GUARD).unwrap();
    assert!(guard.position.is_within(&MapPosition::new(4.0, 4.0), 0.5));
    assert!(!guard.moving);
    assert_eq!(guard.controller(), None);
}

#[test]
fn animation_finishes_after_budget_plus_one_traversals() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(MapEvent::new(
            "bow",
            AnimateEvent::new(GUARD, Some(1))
                .with_frame(4, 50)
                .with_frame(5, 50)
                .with_frame(6, 50),
        ))
        .unwrap();

    supervisor.start_event("bow", 0, &mut stubs.context(0)).unwrap();
    // Each 100 ms tick advances one frame; two traversals of three frames.
    for _ in 0..5 {
        supervisor.update(&mut stubs.context(100));
        assert!(supervisor.is_event_active("bow"));
    }
    supervisor.update(&mut stubs.context(100));
    assert!(!supervisor.is_event_active("bow"));
    assert!(!stubs.actors.get(GUARD).unwrap().custom_animation);
}

#[test]
fn scripted_sprite_chain_runs_in_link_order() {
    let mut stubs = stubs();
    let mut table = ScriptTable::new();
    table.register("step_east", |args: &mut ScriptArgs<'_>| {
        if let Some(actor) = args.actor.as_deref_mut() {
            actor.position.x += 1.0;
        }
        true
    });

    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(
            MapEvent::new(
                "first",
                ScriptedSpriteEvent::resolve(&table, "first", GUARD, "step_east", ""),
            )
            .with_link(EventLink::on_finish("second", 0)),
        )
        .unwrap();
    supervisor
        .register(MapEvent::new(
            "second",
            ScriptedSpriteEvent::resolve(&table, "second", GUARD, "step_east", ""),
        ))
        .unwrap();

    supervisor.start_event("first", 0, &mut stubs.context(0)).unwrap();
    assert!((stubs.actors.get(GUARD).unwrap().position.x - 3.0).abs() < 1e-9);

    // "first" finishes, "second" starts from its finish link and is polled
    // in the same tick.
    supervisor.update(&mut stubs.context(16));
    assert!((stubs.actors.get(GUARD).unwrap().position.x - 4.0).abs() < 1e-9);
    assert!(supervisor.is_idle());
    assert_eq!(stubs.actors.get(GUARD).unwrap().controller(), None);
}

#[test]
fn instant_finish_chain_drains_in_one_tick() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(noop("a").with_link(EventLink::on_finish("b", 0)))
        .unwrap();
    supervisor
        .register(noop("b").with_link(EventLink::on_finish("c", 0)))
        .unwrap();
    supervisor.register(noop("c")).unwrap();

    supervisor.start_event("a", 0, &mut stubs.context(0)).unwrap();
    supervisor.update(&mut stubs.context(16));
    assert!(supervisor.is_idle());
}

#[test]
fn restarted_event_is_polled_once_per_tick() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(noop("ping").with_link(EventLink::on_finish("pong", 0)))
        .unwrap();
    supervisor
        .register(noop("pong").with_link(EventLink::on_finish("ping", 0)))
        .unwrap();

    supervisor.start_event("ping", 0, &mut stubs.context(0)).unwrap();
    supervisor.update(&mut stubs.context(16));
    // "ping" finished, "pong" ran and finished, "ping" was restarted and
    // waits for the next tick.
    assert_eq!(supervisor.active_ids(), &[EventId::from("ping")]);

    supervisor.update(&mut stubs.context(16));
    assert_eq!(supervisor.active_ids(), &[EventId::from("ping")]);
}

#[test]
fn delayed_link_queues_child() {
    let mut stubs = stubs();
    let mut supervisor = EventSupervisor::new();
    supervisor
        .register(noop("parent").with_link(EventLink::on_start("child", 250)))
        .unwrap();
    supervisor.register(forever("child")).unwrap();

    supervisor.start_event("parent", 0, &mut stubs.context(0)).unwrap();
    assert_eq!(supervisor.remaining_delay("child"), Some(250));

    supervisor.update(&mut stubs.context(200));
    assert!(!supervisor.is_event_active("child"));
    supervisor.update(&mut stubs.context(50));
    assert!(supervisor.is_event_active("child"));
    assert_eq!(
        supervisor.active_ids(),
        &[EventId::from("child")]
    );
}
