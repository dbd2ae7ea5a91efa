//! Reward rolling for a defeated enemy
//!
//! Pass 1 rolls the loot tables (plus boss materials); pass 2 updates the
//! pity counters and grants at most one guaranteed item. The caller's
//! [`PityState`] is taken by value and the updated copy is returned in the
//! [`LootResult`]; nothing shared is mutated here.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::constants::ROLL_RANGE;
use crate::combat::stats::LootEntry;
use crate::core::amount::Amount;
use crate::core::config::LootConfig;
use crate::core::types::{ItemId, Rarity};
use crate::loot::pity::PityState;

/// Why an item dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropSource {
    Table,
    BossBracket,
    BossMaterial,
    Pity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub item_id: ItemId,
    pub quantity: u32,
    pub rarity: Rarity,
    pub source: DropSource,
}

/// Boss context for the extra boss rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossKill {
    pub level: u32,
    pub first_kill: bool,
}

/// Everything the roller needs to know about one kill
#[derive(Debug, Clone, Default)]
pub struct LootRequest<'a> {
    pub entries: Vec<&'a LootEntry>,
    pub luck: f64,
    pub currency: Amount,
    pub boss: Option<BossKill>,
}

impl<'a> LootRequest<'a> {
    pub fn new(entries: impl IntoIterator<Item = &'a LootEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_luck(mut self, luck: f64) -> Self {
        self.luck = luck;
        self
    }

    pub fn with_currency(mut self, currency: Amount) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_boss(mut self, level: u32, first_kill: bool) -> Self {
        self.boss = Some(BossKill { level, first_kill });
        self
    }
}

/// Rewards for one kill, consumed by the inventory and progression collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootResult {
    pub items: Vec<ItemDrop>,
    pub currency: Amount,
    /// Rarity granted by pity this kill, if any
    pub pity_rarity: Option<Rarity>,
    /// Updated counters to persist
    pub pity: PityState,
    /// Counters as they stood before the pity grant, to persist instead
    /// when the granted item could not be stored
    pub pity_before_grant: Option<PityState>,
}

impl LootResult {
    pub fn pity_triggered(&self) -> bool {
        self.pity_rarity.is_some()
    }

    /// Highest rarity in the result, pity item included
    pub fn best_rarity(&self) -> Option<Rarity> {
        self.items.iter().map(|d| d.rarity).max()
    }
}

/// Drop chance after luck: `base + min(max_bonus, luck / divisor)`, within 0-100
///
/// NaN anywhere in the inputs counts as zero, so a broken config never
/// turns into a guaranteed drop.
pub fn adjusted_chance(base: f64, luck: f64, config: &LootConfig) -> f64 {
    let cap = config.max_luck_bonus.max(0.0);
    let bonus = (luck / config.luck_divisor).max(0.0).min(cap);
    let chance = base + bonus;
    if chance.is_nan() {
        return 0.0;
    }
    chance.clamp(0.0, ROLL_RANGE)
}

fn roll_entry(entry: &LootEntry, luck: f64, config: &LootConfig, rng: &mut impl Rng) -> Option<ItemDrop> {
    let chance = adjusted_chance(entry.chance, luck, config);
    if rng.gen_range(0.0..ROLL_RANGE) >= chance {
        return None;
    }

    let (low, high) = if entry.min_quantity <= entry.max_quantity {
        (entry.min_quantity, entry.max_quantity)
    } else {
        tracing::warn!(item = %entry.item_id, "loot entry min_quantity above max_quantity");
        (entry.max_quantity, entry.min_quantity)
    };
    let quantity = rng.gen_range(low..=high);
    if quantity == 0 {
        return None;
    }

    Some(ItemDrop {
        item_id: entry.item_id.clone(),
        quantity,
        rarity: entry.rarity,
        source: DropSource::Table,
    })
}

fn roll_boss_rewards(boss: BossKill, config: &LootConfig, rng: &mut impl Rng) -> Vec<ItemDrop> {
    let mut drops = Vec::new();

    if boss.first_kill {
        match config.bracket_for(boss.level) {
            Some(bracket) => drops.push(ItemDrop {
                item_id: bracket.item_id.clone(),
                quantity: 1,
                rarity: bracket.rarity,
                source: DropSource::BossBracket,
            }),
            None => tracing::warn!(level = boss.level, "no boss bracket reward for level"),
        }
    }

    match config.boss_material_pool.choose(rng) {
        Some(item_id) => drops.push(ItemDrop {
            item_id: item_id.clone(),
            quantity: 1,
            rarity: Rarity::Rare,
            source: DropSource::BossMaterial,
        }),
        None => tracing::warn!("boss material pool is empty"),
    }

    drops
}

/// Roll all rewards for one kill
///
/// # Arguments
/// * `request` - loot tables, luck, currency and boss context
/// * `pity` - counters before this kill
///
/// # Returns
/// Dropped items, currency and the counters after this kill
pub fn roll_loot(
    request: &LootRequest<'_>,
    mut pity: PityState,
    config: &LootConfig,
    rng: &mut impl Rng,
) -> LootResult {
    // Pass 1: natural drops
    let mut items: Vec<ItemDrop> = request
        .entries
        .iter()
        .filter_map(|entry| roll_entry(entry, request.luck, config, rng))
        .collect();
    if let Some(boss) = request.boss {
        items.extend(roll_boss_rewards(boss, config, rng));
    }

    // Pass 2: pity
    pity.record_kill();
    if let Some(best) = items.iter().map(|d| d.rarity).max() {
        pity.reset_from(best);
    }

    let mut pity_rarity = None;
    let mut pity_before_grant = None;
    for tier in config.tiers_highest_first() {
        let Some(count) = pity.counter(tier.rarity) else {
            continue;
        };
        if count < tier.threshold {
            continue;
        }
        let Some(item_id) = tier.pool.choose(rng) else {
            tracing::warn!(rarity = %tier.rarity, "pity pool is empty, guarantee skipped");
            continue;
        };

        tracing::info!(rarity = %tier.rarity, item = %item_id, kills = count, "pity guarantee");
        items.push(ItemDrop {
            item_id: item_id.clone(),
            quantity: 1,
            rarity: tier.rarity,
            source: DropSource::Pity,
        });
        pity_before_grant = Some(pity);
        pity.reset_from(tier.rarity);
        pity_rarity = Some(tier.rarity);
        break;
    }

    LootResult {
        items,
        currency: request.currency.clone(),
        pity_rarity,
        pity,
        pity_before_grant,
    }
}
