//! Plain data handed to the engine by its collaborators
//!
//! The progression store produces [`PlayerStats`]; enemy and boss
//! definitions come from zone data or a [`DungeonDescriptor`]. The engine
//! copies what it needs and never writes back into these.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::core::error::{CombatError, Result};
use crate::core::types::{DungeonId, ItemId, Rarity};

fn default_crit_damage() -> Amount {
    Amount::from_u64(150)
}

/// Per-tick view of one side's combat stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub hp: Amount,
    pub max_hp: Amount,
    pub attack: Amount,
    pub defense: Amount,
    /// Chance to crit, 0-100
    pub crit_chance: f64,
    /// Crit damage as a percent of a normal hit (150 = x1.5)
    pub crit_damage_percent: Amount,
    /// Chance to dodge an incoming attack, 0-100
    pub dodge_chance: f64,
}

impl CombatantSnapshot {
    /// Full-HP combatant with no crit or dodge
    pub fn new(max_hp: Amount, attack: Amount, defense: Amount) -> Self {
        Self {
            hp: max_hp.clone(),
            max_hp,
            attack,
            defense,
            crit_chance: 0.0,
            crit_damage_percent: default_crit_damage(),
            dodge_chance: 0.0,
        }
    }

    pub fn with_crit(mut self, chance: f64, damage_percent: u64) -> Self {
        self.crit_chance = chance;
        self.crit_damage_percent = Amount::from_u64(damage_percent);
        self
    }

    pub fn with_dodge(mut self, chance: f64) -> Self {
        self.dodge_chance = chance;
        self
    }

    pub fn with_hp(mut self, hp: Amount) -> Self {
        self.hp = hp;
        self
    }
}

/// Player stat snapshot from the progression collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub combat: CombatantSnapshot,
    /// Raises table drop chances by `luck / 2` points, capped
    #[serde(default)]
    pub luck: f64,
}

impl PlayerStats {
    pub fn new(combat: CombatantSnapshot) -> Self {
        Self { combat, luck: 0.0 }
    }

    pub fn with_luck(mut self, luck: f64) -> Self {
        self.luck = luck;
        self
    }
}

/// Which boss rules apply to a boss fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossFlags {
    pub enrage: bool,
    pub heal: bool,
    pub ultimate: bool,
}

impl Default for BossFlags {
    fn default() -> Self {
        Self {
            enrage: true,
            heal: true,
            ultimate: true,
        }
    }
}

/// One row of an enemy or dungeon loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: ItemId,
    /// Base drop chance in percent
    pub chance: f64,
    #[serde(default = "default_quantity")]
    pub min_quantity: u32,
    #[serde(default = "default_quantity")]
    pub max_quantity: u32,
    pub rarity: Rarity,
}

fn default_quantity() -> u32 {
    1
}

impl LootEntry {
    pub fn new(item_id: impl Into<ItemId>, chance: f64, rarity: Rarity) -> Self {
        Self {
            item_id: item_id.into(),
            chance,
            min_quantity: 1,
            max_quantity: 1,
            rarity,
        }
    }

    pub fn with_quantity(mut self, min: u32, max: u32) -> Self {
        self.min_quantity = min;
        self.max_quantity = max;
        self
    }
}

/// Enemy or boss definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    pub max_hp: Amount,
    pub attack: Amount,
    #[serde(default)]
    pub defense: Amount,
    #[serde(default)]
    pub crit_chance: f64,
    #[serde(default = "default_crit_damage")]
    pub crit_damage_percent: Amount,
    #[serde(default)]
    pub dodge_chance: f64,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default)]
    pub mechanics: BossFlags,
    #[serde(default)]
    pub loot_table: Vec<LootEntry>,
    #[serde(default)]
    pub currency_reward: Amount,
}

fn default_level() -> u32 {
    1
}

impl EnemyDefinition {
    pub fn new(id: &str, name: &str, max_hp: Amount, attack: Amount) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            level: 1,
            max_hp,
            attack,
            defense: Amount::zero(),
            crit_chance: 0.0,
            crit_damage_percent: default_crit_damage(),
            dodge_chance: 0.0,
            is_boss: false,
            mechanics: BossFlags::default(),
            loot_table: Vec::new(),
            currency_reward: Amount::zero(),
        }
    }

    pub fn as_boss(mut self, level: u32) -> Self {
        self.is_boss = true;
        self.level = level;
        self
    }

    /// Snapshot at a given current HP
    pub fn snapshot(&self, hp: &Amount) -> CombatantSnapshot {
        CombatantSnapshot {
            hp: hp.clone(),
            max_hp: self.max_hp.clone(),
            attack: self.attack.clone(),
            defense: self.defense.clone(),
            crit_chance: self.crit_chance,
            crit_damage_percent: self.crit_damage_percent.clone(),
            dodge_chance: self.dodge_chance,
        }
    }

    /// Reject definitions a fight cannot start from
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CombatError::InvalidEnemy("missing id".into()));
        }
        if !self.max_hp.is_positive() {
            return Err(CombatError::InvalidEnemy(format!(
                "{}: max_hp must be positive",
                self.id
            )));
        }
        if self.attack.is_negative() || self.defense.is_negative() {
            return Err(CombatError::InvalidEnemy(format!(
                "{}: attack and defense must not be negative",
                self.id
            )));
        }
        for (label, chance) in [("crit_chance", self.crit_chance), ("dodge_chance", self.dodge_chance)] {
            if !(0.0..=100.0).contains(&chance) {
                return Err(CombatError::InvalidEnemy(format!(
                    "{}: {label} {chance} outside 0-100",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Dungeon-specific extras delivered alongside the boss
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonMeta {
    pub name: String,
    /// Currency paid on top of the boss reward
    pub bonus_currency: Amount,
    /// Rolled together with the boss loot table
    pub reward_table: Vec<LootEntry>,
}

/// Dungeon boss and rewards as stored in external data files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonDescriptor {
    pub id: DungeonId,
    pub boss: EnemyDefinition,
    #[serde(default)]
    pub meta: DungeonMeta,
}

impl DungeonDescriptor {
    /// Parse a descriptor from TOML; the boss is always marked as a boss
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut descriptor: Self = toml::from_str(content)?;
        descriptor.boss.is_boss = true;
        descriptor.boss.validate()?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slime() -> EnemyDefinition {
        EnemyDefinition::new("slime", "Slime", Amount::from_u64(150), Amount::from_u64(5))
    }

    #[test]
    fn test_valid_enemy_passes() {
        assert!(slime().validate().is_ok());
    }

    #[test]
    fn test_zero_hp_enemy_rejected() {
        let mut enemy = slime();
        enemy.max_hp = Amount::zero();
        assert!(matches!(enemy.validate(), Err(CombatError::InvalidEnemy(_))));
    }

    #[test]
    fn test_out_of_range_dodge_rejected() {
        let mut enemy = slime();
        enemy.dodge_chance = 120.0;
        assert!(enemy.validate().is_err());
    }

    #[test]
    fn test_blank_id_rejected() {
        let mut enemy = slime();
        enemy.id = "  ".into();
        assert!(enemy.validate().is_err());
    }

    #[test]
    fn test_snapshot_copies_stats() {
        let enemy = slime();
        let snap = enemy.snapshot(&Amount::from_u64(40));
        assert_eq!(snap.hp, Amount::from_u64(40));
        assert_eq!(snap.max_hp, Amount::from_u64(150));
        assert_eq!(snap.crit_damage_percent, Amount::from_u64(150));
    }

    #[test]
    fn test_dungeon_descriptor_from_toml() {
        let descriptor = DungeonDescriptor::from_toml_str(
            r#"
            id = "sunken_crypt"

            [boss]
            id = "lich"
            name = "Crypt Lich"
            level = 30
            max_hp = "1e60"
            attack = "2500"
            defense = "400"

            [boss.mechanics]
            heal = false

            [meta]
            name = "Sunken Crypt"
            bonus_currency = "5000"

            [[meta.reward_table]]
            item_id = "bone_dust"
            chance = 40.0
            max_quantity = 3
            rarity = "common"
            "#,
        )
        .unwrap();

        assert!(descriptor.boss.is_boss);
        assert_eq!(descriptor.boss.level, 30);
        assert!(descriptor.boss.mechanics.enrage);
        assert!(!descriptor.boss.mechanics.heal);
        assert_eq!(descriptor.boss.max_hp, Amount::parse("1e60").unwrap());
        assert_eq!(descriptor.meta.reward_table[0].min_quantity, 1);
        assert_eq!(descriptor.meta.reward_table[0].max_quantity, 3);
    }

    #[test]
    fn test_dungeon_descriptor_rejects_bad_amount() {
        let result = DungeonDescriptor::from_toml_str(
            r#"
            id = "bad"
            [boss]
            id = "x"
            name = "X"
            max_hp = "lots"
            attack = "1"
            "#,
        );
        assert!(result.is_err());
    }
}
