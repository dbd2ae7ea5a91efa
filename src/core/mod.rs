pub mod amount;
pub mod config;
pub mod error;
pub mod types;

pub use amount::Amount;
pub use config::{BracketReward, CombatConfig, LootConfig, PityTier};
pub use error::{CombatError, Result};
pub use types::{CombatTarget, DungeonId, ItemId, Rarity, ZoneId};
