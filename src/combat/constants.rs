//! Combat system constants - all tunable values in one place
//!
//! `CombatConfig` and `LootConfig` default to these; the boss controller
//! reads its thresholds directly.

// Time constants
pub const PLAYER_ATTACK_COOLDOWN_MS: u64 = 1000;
pub const ENEMY_ATTACK_COOLDOWN_MS: u64 = 1500;
pub const DEFEAT_DELAY_MS: u64 = 1500;
pub const MAX_TICK_DELTA_MS: u64 = 1000;

// Damage constants
/// Defense soft cap: reduction = defense / (defense + K)
pub const DEFENSE_SOFT_CAP: u64 = 100;
pub const ROLL_RANGE: f64 = 100.0;

// Log
pub const LOG_CAPACITY: usize = 100;

// Boss thresholds (fraction of max HP)
pub const ENRAGE_HP_RATIO: f64 = 0.5;
pub const ENRAGE_MULTIPLIER: f64 = 1.5;
pub const HEAL_HP_RATIO: f64 = 0.25;
/// Emergency heal, percent of max HP
pub const HEAL_PERCENT: u64 = 30;

// Boss ultimate cycle
pub const ULTIMATE_CHARGE_MS: u64 = 30_000;
pub const ULTIMATE_WARNING_MS: u64 = 3_000;
pub const ULTIMATE_MULTIPLIER: f64 = 3.0;

// Loot constants
pub const MAX_LUCK_BONUS: f64 = 50.0;
pub const LUCK_DIVISOR: f64 = 2.0;

// Pity thresholds (kills without a drop of that rarity or better)
pub const PITY_UNCOMMON: u32 = 10;
pub const PITY_RARE: u32 = 50;
pub const PITY_EPIC: u32 = 200;
pub const PITY_LEGENDARY: u32 = 1000;
