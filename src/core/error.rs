use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Invalid enemy definition: {0}")]
    InvalidEnemy(String),

    #[error("Invalid player stats: {0}")]
    InvalidPlayer(String),

    #[error("A combat session is already active")]
    AlreadyInCombat,

    #[error("No active combat")]
    NotInCombat,

    #[error("Attack on cooldown for another {remaining:?}")]
    AttackOnCooldown { remaining: Duration },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
