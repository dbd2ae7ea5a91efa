//! Core type definitions shared by the combat, boss and loot modules

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Identifier of an overworld zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

/// Identifier of a dungeon
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DungeonId(pub String);

/// Identifier of an item understood by the inventory collaborator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for DungeonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where a fight takes place, reported back on victory/defeat for progress bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatTarget {
    Zone(ZoneId),
    Dungeon(DungeonId),
}

/// Item rarity, ordered from most to least common
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// Rarities that carry a pity counter, highest first
    pub const PITY_TIERS: [Rarity; 4] = [
        Rarity::Legendary,
        Rarity::Epic,
        Rarity::Rare,
        Rarity::Uncommon,
    ];
}
