//! Combat and loot configuration with documented defaults
//!
//! Every tunable number the session, boss controller and loot roller read
//! lives here. Defaults come from `combat::constants`; a TOML file can
//! override any subset of fields.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::combat::constants;
use crate::core::error::{CombatError, Result};
use crate::core::types::{ItemId, Rarity};

/// Configuration for one combat session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === PACING ===
    /// Player attack cooldown (milliseconds)
    ///
    /// Fixed rather than derived from an attack-speed stat so pacing stays
    /// predictable.
    pub player_attack_cooldown_ms: u64,

    /// Enemy attack cooldown (milliseconds)
    pub enemy_attack_cooldown_ms: u64,

    /// Delay between a defeat and the session resetting (milliseconds)
    ///
    /// Keeps the terminal log lines on screen before the fight is cleared.
    pub defeat_delay_ms: u64,

    /// Largest delta a single tick may advance (milliseconds)
    ///
    /// A stalled or backgrounded host delivers one huge frame; clamping it
    /// stops the fight from jumping ahead several attacks at once.
    pub max_tick_delta_ms: u64,

    // === LOG ===
    /// Maximum combat log entries kept; the oldest is evicted first
    pub log_capacity: usize,

    // === RANDOMNESS ===
    /// Seed for the session RNG
    pub seed: u64,

    /// Whether the player auto-attacks when a fight starts
    pub auto_attack: bool,

    /// Loot and pity tuning
    pub loot: LootConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_attack_cooldown_ms: constants::PLAYER_ATTACK_COOLDOWN_MS,
            enemy_attack_cooldown_ms: constants::ENEMY_ATTACK_COOLDOWN_MS,
            defeat_delay_ms: constants::DEFEAT_DELAY_MS,
            max_tick_delta_ms: constants::MAX_TICK_DELTA_MS,
            log_capacity: constants::LOG_CAPACITY,
            seed: 0x1D1E_C0DE,
            auto_attack: true,
            loot: LootConfig::default(),
        }
    }
}

impl CombatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text, falling back to defaults for missing fields
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn player_attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.player_attack_cooldown_ms)
    }

    pub fn enemy_attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.enemy_attack_cooldown_ms)
    }

    pub fn defeat_delay(&self) -> Duration {
        Duration::from_millis(self.defeat_delay_ms)
    }

    pub fn max_tick_delta(&self) -> Duration {
        Duration::from_millis(self.max_tick_delta_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.player_attack_cooldown_ms == 0 || self.enemy_attack_cooldown_ms == 0 {
            return Err(CombatError::InvalidConfig(
                "attack cooldowns must be positive".into(),
            ));
        }
        if self.max_tick_delta_ms == 0 {
            return Err(CombatError::InvalidConfig(
                "max_tick_delta_ms must be positive".into(),
            ));
        }
        if self.log_capacity == 0 {
            return Err(CombatError::InvalidConfig(
                "log_capacity must be at least 1".into(),
            ));
        }
        self.loot.validate()
    }
}

/// One pity guarantee: after `threshold` dry kills, grant an item of `rarity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PityTier {
    pub rarity: Rarity,
    pub threshold: u32,
    /// Items one of which is granted when the guarantee fires
    ///
    /// An empty pool disables this tier without failing the kill.
    pub pool: Vec<ItemId>,
}

/// First-kill boss material for bosses at or above `min_level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketReward {
    pub min_level: u32,
    pub item_id: ItemId,
    pub rarity: Rarity,
}

/// Loot roller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// Largest bonus (percentage points) luck can add to a drop chance
    pub max_luck_bonus: f64,

    /// Luck points per percentage point of drop chance
    pub luck_divisor: f64,

    /// Pity guarantees; checked from highest rarity to lowest
    pub pity_tiers: Vec<PityTier>,

    /// Boss first-kill materials by level bracket
    pub boss_brackets: Vec<BracketReward>,

    /// Crafting materials a boss drops one of on every kill
    pub boss_material_pool: Vec<ItemId>,
}

impl Default for LootConfig {
    fn default() -> Self {
        let pool = |ids: &[&str]| ids.iter().map(|id| ItemId::from(*id)).collect::<Vec<_>>();
        Self {
            max_luck_bonus: constants::MAX_LUCK_BONUS,
            luck_divisor: constants::LUCK_DIVISOR,
            pity_tiers: vec![
                PityTier {
                    rarity: Rarity::Legendary,
                    threshold: constants::PITY_LEGENDARY,
                    pool: pool(&["crown_of_embers", "worldsplitter", "aegis_of_dawn"]),
                },
                PityTier {
                    rarity: Rarity::Epic,
                    threshold: constants::PITY_EPIC,
                    pool: pool(&["stormcaller_bow", "veilweave_robe", "runed_greathelm"]),
                },
                PityTier {
                    rarity: Rarity::Rare,
                    threshold: constants::PITY_RARE,
                    pool: pool(&["silvered_blade", "warden_mail", "band_of_focus"]),
                },
                PityTier {
                    rarity: Rarity::Uncommon,
                    threshold: constants::PITY_UNCOMMON,
                    pool: pool(&["iron_sword", "leather_jerkin", "copper_ring"]),
                },
            ],
            boss_brackets: vec![
                BracketReward {
                    min_level: 1,
                    item_id: ItemId::from("bronze_boss_sigil"),
                    rarity: Rarity::Uncommon,
                },
                BracketReward {
                    min_level: 10,
                    item_id: ItemId::from("silver_boss_sigil"),
                    rarity: Rarity::Rare,
                },
                BracketReward {
                    min_level: 25,
                    item_id: ItemId::from("gold_boss_sigil"),
                    rarity: Rarity::Epic,
                },
                BracketReward {
                    min_level: 50,
                    item_id: ItemId::from("astral_boss_sigil"),
                    rarity: Rarity::Legendary,
                },
            ],
            boss_material_pool: pool(&["arcane_shard", "ember_core", "frost_lattice", "storm_glass"]),
        }
    }
}

impl LootConfig {
    /// Pity tiers sorted highest rarity first, whatever order the config listed them in
    pub fn tiers_highest_first(&self) -> Vec<&PityTier> {
        let mut tiers: Vec<&PityTier> = self.pity_tiers.iter().collect();
        tiers.sort_by(|a, b| b.rarity.cmp(&a.rarity));
        tiers
    }

    /// Bracket reward for a boss level: the highest `min_level` not above `level`
    pub fn bracket_for(&self, level: u32) -> Option<&BracketReward> {
        self.boss_brackets
            .iter()
            .filter(|b| b.min_level <= level)
            .max_by_key(|b| b.min_level)
    }

    pub fn validate(&self) -> Result<()> {
        if self.luck_divisor.is_nan() || self.luck_divisor <= 0.0 {
            return Err(CombatError::InvalidConfig(
                "luck_divisor must be positive".into(),
            ));
        }
        if self.max_luck_bonus.is_nan() || self.max_luck_bonus < 0.0 {
            return Err(CombatError::InvalidConfig(
                "max_luck_bonus must not be negative".into(),
            ));
        }
        for tier in &self.pity_tiers {
            if !Rarity::PITY_TIERS.contains(&tier.rarity) {
                return Err(CombatError::InvalidConfig(format!(
                    "{} has no pity counter",
                    tier.rarity
                )));
            }
            if tier.threshold == 0 {
                return Err(CombatError::InvalidConfig(format!(
                    "{} pity threshold must be positive",
                    tier.rarity
                )));
            }
        }
        Ok(())
    }
}
