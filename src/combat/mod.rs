pub mod constants;
pub mod log;
pub mod resolution;
pub mod stats;

pub use log::{CombatLog, CombatLogEntry, LogKind};
pub use resolution::{damage_reduction, mitigated_damage, resolve_attack, AttackOutcome, HitKind};
pub use stats::{
    BossFlags, CombatantSnapshot, DungeonDescriptor, DungeonMeta, EnemyDefinition, LootEntry,
    PlayerStats,
};
