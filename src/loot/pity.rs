//! Pity counters
//!
//! One counter per guaranteed rarity. Every kill adds one to all four; a drop
//! of a rarity zeroes its own counter and every counter below it.

use serde::{Deserialize, Serialize};

use crate::core::types::Rarity;

/// Kills since the last drop of each rarity (or better)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityState {
    pub kills_since_uncommon: u32,
    pub kills_since_rare: u32,
    pub kills_since_epic: u32,
    pub kills_since_legendary: u32,
}

impl PityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One kill is one unit of dryness against every threshold
    pub fn record_kill(&mut self) {
        self.kills_since_uncommon = self.kills_since_uncommon.saturating_add(1);
        self.kills_since_rare = self.kills_since_rare.saturating_add(1);
        self.kills_since_epic = self.kills_since_epic.saturating_add(1);
        self.kills_since_legendary = self.kills_since_legendary.saturating_add(1);
    }

    /// Cascade reset for a drop of `rarity`
    pub fn reset_from(&mut self, rarity: Rarity) {
        if rarity >= Rarity::Uncommon {
            self.kills_since_uncommon = 0;
        }
        if rarity >= Rarity::Rare {
            self.kills_since_rare = 0;
        }
        if rarity >= Rarity::Epic {
            self.kills_since_epic = 0;
        }
        if rarity >= Rarity::Legendary {
            self.kills_since_legendary = 0;
        }
    }

    /// Counter tracking `rarity`; `None` for rarities without pity
    pub fn counter(&self, rarity: Rarity) -> Option<u32> {
        match rarity {
            Rarity::Uncommon => Some(self.kills_since_uncommon),
            Rarity::Rare => Some(self.kills_since_rare),
            Rarity::Epic => Some(self.kills_since_epic),
            Rarity::Legendary => Some(self.kills_since_legendary),
            Rarity::Common | Rarity::Mythic => None,
        }
    }
}
