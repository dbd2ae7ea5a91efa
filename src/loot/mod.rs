//! Loot tables, boss rewards and the pity guarantee

pub mod engine;
pub mod pity;

pub use engine::{
    adjusted_chance, roll_loot, BossKill, DropSource, ItemDrop, LootRequest, LootResult,
};
pub use pity::PityState;
