//! Requests handed to the game-mode stack.
//!
//! The event core never inspects a mode once it has been pushed; these
//! types only carry the configuration the new mode is built from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// Configuration for a battle pushed by an encounter event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSetup {
    /// Enemy type ids to spawn, in order.
    pub enemies: Vec<ObjectId>,
    /// Music file played during the battle.
    pub music: String,
    /// Backdrop image file.
    pub background: String,
    /// Battle script files to load.
    #[serde(default)]
    pub scripts: Vec<String>,
}

/// Configuration for a shop pushed by a shop event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSetup {
    /// Ware object id to stock count.
    pub wares: BTreeMap<ObjectId, u32>,
}

/// A new mode to push on top of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeRequest {
    /// Transition into a battle.
    Battle(BattleSetup),
    /// Open a shop.
    Shop(ShopSetup),
}

/// Replace the current map with another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSwap {
    /// Map file to load.
    pub map_file: String,
    /// Name of the location being left, recorded for the new map.
    pub coming_from: String,
}
