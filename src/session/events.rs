//! What the session reports back to its collaborators
//!
//! [`CombatEvent`]s are returned from every tick; [`RewardSink`] is the
//! seam to the inventory/progression side that applies rewards.

use std::collections::HashSet;

use thiserror::Error;

use crate::combat::resolution::AttackOutcome;
use crate::core::amount::Amount;
use crate::core::types::{CombatTarget, ItemId};
use crate::loot::engine::{ItemDrop, LootResult};
use crate::loot::pity::PityState;

/// The inventory had no room for an item
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Inventory full, could not add {item_id}")]
pub struct InventoryFull {
    pub item_id: ItemId,
}

/// How a fight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightOutcome {
    Victory,
    Defeat,
    Retreat,
}

/// Events generated during a combat tick
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// Player attacked the enemy
    PlayerAttacked { outcome: AttackOutcome },
    /// Enemy attacked the player; `ultimate` for the boss special
    EnemyAttacked { outcome: AttackOutcome, ultimate: bool },
    BossEnraged,
    BossHealed { amount: Amount },
    /// Ultimate fires when the warning window closes
    UltimateWarning,
    /// Enemy HP reached zero; rewards follow on the next tick
    EnemyDefeated,
    /// Player HP reached zero
    PlayerDefeated,
    /// Rewards were rolled and handed to the sink
    Victory {
        target: CombatTarget,
        enemy_id: String,
        loot: LootResult,
        /// Items the inventory refused, dropped for good
        lost_items: Vec<ItemDrop>,
    },
    /// Player HP restored after a defeat
    Defeat {
        target: CombatTarget,
        enemy_id: String,
        restored_hp: Amount,
    },
    /// Session reset to idle
    CombatEnded {
        target: CombatTarget,
        outcome: FightOutcome,
    },
}

/// Inventory and progression collaborator that receives rewards
///
/// Called synchronously from the tick that resolves a victory.
pub trait RewardSink {
    /// Current pity counters (the engine works on a copy)
    fn pity_state(&self) -> PityState;

    /// Store the updated pity counters
    fn save_pity_state(&mut self, pity: PityState);

    /// Whether this enemy has never been defeated before
    fn is_first_kill(&self, enemy_id: &str) -> bool;

    /// Progress bookkeeping for zones and dungeons
    fn record_kill(&mut self, target: &CombatTarget, enemy_id: &str);

    fn add_currency(&mut self, amount: &Amount);

    fn add_item(&mut self, drop: &ItemDrop) -> Result<(), InventoryFull>;
}

/// In-memory sink for headless runs and tests
///
/// Keeps every item in a flat list, refusing new items once `item_slots`
/// distinct stacks exist.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub pity: PityState,
    pub currency: Amount,
    pub items: Vec<ItemDrop>,
    pub item_slots: Option<usize>,
    pub kills: Vec<(CombatTarget, String)>,
    defeated: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: usize) -> Self {
        Self {
            item_slots: Some(slots),
            ..Self::default()
        }
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.items
            .iter()
            .filter(|d| &d.item_id == item_id)
            .map(|d| d.quantity)
            .sum()
    }
}

impl RewardSink for MemorySink {
    fn pity_state(&self) -> PityState {
        self.pity
    }

    fn save_pity_state(&mut self, pity: PityState) {
        self.pity = pity;
    }

    fn is_first_kill(&self, enemy_id: &str) -> bool {
        !self.defeated.contains(enemy_id)
    }

    fn record_kill(&mut self, target: &CombatTarget, enemy_id: &str) {
        self.defeated.insert(enemy_id.to_string());
        self.kills.push((target.clone(), enemy_id.to_string()));
    }

    fn add_currency(&mut self, amount: &Amount) {
        self.currency = &self.currency + amount;
    }

    fn add_item(&mut self, drop: &ItemDrop) -> Result<(), InventoryFull> {
        if let Some(stack) = self.items.iter_mut().find(|d| d.item_id == drop.item_id) {
            stack.quantity = stack.quantity.saturating_add(drop.quantity);
            return Ok(());
        }
        if self.item_slots.is_some_and(|slots| self.items.len() >= slots) {
            return Err(InventoryFull {
                item_id: drop.item_id.clone(),
            });
        }
        self.items.push(drop.clone());
        Ok(())
    }
}
