//! Events that push a new game mode on top of the map.

use tracing::info;
use vignette_types::{BattleSetup, EventId, ModeRequest, ObjectId, ShopSetup};

use super::EventState;
use crate::config::EventsConfig;
use crate::services::EventContext;

/// Starts a battle against a fixed group of enemies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterEvent {
    setup: BattleSetup,
}

impl EncounterEvent {
    /// Battle `enemies` with explicit music and backdrop.
    pub fn new(enemies: Vec<ObjectId>, music: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            setup: BattleSetup {
                enemies,
                music: music.into(),
                background: background.into(),
                scripts: Vec::new(),
            },
        }
    }

    /// Battle a single enemy using the configured default music and backdrop.
    pub fn with_defaults(enemy: ObjectId, config: &EventsConfig) -> Self {
        Self::new(
            vec![enemy],
            config.battle_music.clone(),
            config.battle_background.clone(),
        )
    }

    /// Add another enemy to the battle.
    pub fn add_enemy(&mut self, enemy: ObjectId) {
        self.setup.enemies.push(enemy);
    }

    /// Add a battle script file.
    pub fn add_script(&mut self, file: impl Into<String>) {
        self.setup.scripts.push(file.into());
    }

    /// The battle configuration pushed on start.
    pub const fn setup(&self) -> &BattleSetup {
        &self.setup
    }
}

impl EventState for EncounterEvent {
    fn start(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        info!(event_id = %id, enemies = self.setup.enemies.len(), "Encounter started");
        ctx.screen.enter_scene_state();
        ctx.modes.push_mode(ModeRequest::Battle(self.setup.clone()));
    }

    fn update(&mut self, _id: &EventId, _ctx: &mut EventContext<'_>) -> bool {
        true
    }
}

/// Opens a shop stocked with a set of wares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopEvent {
    setup: ShopSetup,
}

impl ShopEvent {
    /// An empty shop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock `count` units of `ware`. Adding a ware twice replaces its stock.
    pub fn add_ware(&mut self, ware: ObjectId, count: u32) {
        self.setup.wares.insert(ware, count);
    }

    /// The shop configuration pushed on start.
    pub const fn setup(&self) -> &ShopSetup {
        &self.setup
    }
}

impl EventState for ShopEvent {
    fn start(&mut self, id: &EventId, ctx: &mut EventContext<'_>) {
        info!(event_id = %id, wares = self.setup.wares.len(), "Shop opened");
        ctx.modes.push_mode(ModeRequest::Shop(self.setup.clone()));
    }

    fn update(&mut self, _id: &EventId, _ctx: &mut EventContext<'_>) -> bool {
        true
    }
}
