//! Combat session state machine
//!
//! `Idle -> Active -> Resolving -> Idle`, one fight at a time. The session
//! owns the HP copies, cooldown clocks, combat log and (for bosses) the
//! boss mechanics controller. Resolution stays in `combat`, `boss` and
//! `loot`; all mutation happens here.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::boss::mechanics::BossMechanics;
use crate::combat::log::{CombatLog, LogKind};
use crate::combat::resolution::{resolve_attack, AttackOutcome, HitKind};
use crate::combat::stats::{DungeonMeta, EnemyDefinition, LootEntry, PlayerStats};
use crate::core::amount::Amount;
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{CombatTarget, DungeonId, ZoneId};
use crate::loot::engine::{roll_loot, DropSource, LootRequest};
use crate::session::events::{CombatEvent, FightOutcome, RewardSink};

const PLAYER_NAME: &str = "Player";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CombatPhase {
    #[default]
    Idle,
    Active,
    Resolving,
}

/// Data fixed for the duration of one fight
#[derive(Debug, Clone)]
struct Encounter {
    target: CombatTarget,
    enemy: EnemyDefinition,
    dungeon: Option<DungeonMeta>,
    player: PlayerStats,
}

/// Countdown from the end of a fight to the session reset
#[derive(Debug, Clone, Copy)]
struct PendingResolution {
    outcome: FightOutcome,
    remaining: Duration,
    applied: bool,
}

#[derive(Debug)]
pub struct CombatSession {
    config: CombatConfig,
    rng: ChaCha8Rng,
    phase: CombatPhase,
    encounter: Option<Encounter>,
    player_hp: Amount,
    player_max_hp: Amount,
    enemy_hp: Amount,
    enemy_max_hp: Amount,
    /// Combat time since the fight started
    elapsed: Duration,
    last_player_attack_at: Duration,
    last_enemy_attack_at: Duration,
    boss: Option<BossMechanics>,
    log: CombatLog,
    auto_attack: bool,
    pending: Option<PendingResolution>,
}

impl Default for CombatSession {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatSession {
    /// Build an idle session
    ///
    /// A config that fails [`CombatConfig::validate`] is replaced by the
    /// defaults (keeping its seed) so a bad file can never break a tick.
    pub fn new(config: CombatConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(%err, "invalid combat config, using defaults");
                CombatConfig {
                    seed: config.seed,
                    ..CombatConfig::default()
                }
            }
        };
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let log = CombatLog::with_capacity(config.log_capacity);
        let auto_attack = config.auto_attack;
        Self {
            config,
            rng,
            phase: CombatPhase::Idle,
            encounter: None,
            player_hp: Amount::zero(),
            player_max_hp: Amount::zero(),
            enemy_hp: Amount::zero(),
            enemy_max_hp: Amount::zero(),
            elapsed: Duration::ZERO,
            last_player_attack_at: Duration::ZERO,
            last_enemy_attack_at: Duration::ZERO,
            boss: None,
            log,
            auto_attack,
            pending: None,
        }
    }

    /// Replace the random source, e.g. to replay a recorded fight
    pub fn with_rng(mut self, rng: ChaCha8Rng) -> Self {
        self.rng = rng;
        self
    }

    // === TRANSITIONS ===

    /// Start an overworld fight
    pub fn enter_combat(
        &mut self,
        zone_id: ZoneId,
        enemy: EnemyDefinition,
        player: &PlayerStats,
    ) -> Result<()> {
        self.begin(CombatTarget::Zone(zone_id), enemy, None, player)
    }

    /// Start a dungeon boss fight; the boss is always treated as a boss
    pub fn start_dungeon_combat(
        &mut self,
        dungeon_id: DungeonId,
        mut boss: EnemyDefinition,
        meta: DungeonMeta,
        player: &PlayerStats,
    ) -> Result<()> {
        boss.is_boss = true;
        self.begin(CombatTarget::Dungeon(dungeon_id), boss, Some(meta), player)
    }

    fn begin(
        &mut self,
        target: CombatTarget,
        enemy: EnemyDefinition,
        dungeon: Option<DungeonMeta>,
        player: &PlayerStats,
    ) -> Result<()> {
        if self.phase != CombatPhase::Idle {
            return Err(CombatError::AlreadyInCombat);
        }
        enemy.validate()?;
        validate_player(player)?;

        let max_hp = player.combat.max_hp.clone();
        self.player_hp = if player.combat.hp.is_positive() {
            player.combat.hp.clone().min(max_hp.clone())
        } else {
            max_hp.clone()
        };
        self.player_max_hp = max_hp;
        self.enemy_hp = enemy.max_hp.clone();
        self.enemy_max_hp = enemy.max_hp.clone();
        self.elapsed = Duration::ZERO;
        self.last_player_attack_at = Duration::ZERO;
        self.last_enemy_attack_at = Duration::ZERO;
        self.pending = None;
        self.boss = enemy.is_boss.then(|| BossMechanics::new(enemy.mechanics));

        self.log.clear();
        let intro = if enemy.is_boss {
            format!("Boss {} (level {}) appears!", enemy.name, enemy.level)
        } else {
            format!("{} appears!", enemy.name)
        };
        self.log.push(Duration::ZERO, LogKind::System, intro);
        tracing::info!(combat_target = ?target, enemy = %enemy.id, boss = enemy.is_boss, "combat started");

        self.encounter = Some(Encounter {
            target,
            enemy,
            dungeon,
            player: player.clone(),
        });
        self.phase = CombatPhase::Active;
        Ok(())
    }

    /// Leave the fight immediately, from any phase
    ///
    /// Pending rewards are discarded. Returns the end event when a fight was
    /// in progress.
    pub fn exit_combat(&mut self) -> Option<CombatEvent> {
        let target = self.encounter.as_ref().map(|e| e.target.clone());
        if target.is_some() {
            tracing::info!(phase = ?self.phase, "combat exited");
        }
        self.reset();
        target.map(|target| CombatEvent::CombatEnded {
            target,
            outcome: FightOutcome::Retreat,
        })
    }

    fn reset(&mut self) {
        self.phase = CombatPhase::Idle;
        self.encounter = None;
        self.boss = None;
        self.pending = None;
        self.player_hp = Amount::zero();
        self.player_max_hp = Amount::zero();
        self.enemy_hp = Amount::zero();
        self.enemy_max_hp = Amount::zero();
        self.elapsed = Duration::ZERO;
        self.last_player_attack_at = Duration::ZERO;
        self.last_enemy_attack_at = Duration::ZERO;
        self.log.clear();
    }

    // === TICK ===

    /// Advance the fight by `delta`, clamped to the configured maximum
    pub fn tick(&mut self, delta: Duration, rewards: &mut dyn RewardSink) -> Vec<CombatEvent> {
        let delta = delta.min(self.config.max_tick_delta());
        let mut events = Vec::new();
        match self.phase {
            CombatPhase::Idle => {}
            CombatPhase::Active => self.tick_active(delta, &mut events),
            CombatPhase::Resolving => self.tick_resolving(delta, rewards, &mut events),
        }
        events
    }

    fn tick_active(&mut self, delta: Duration, events: &mut Vec<CombatEvent>) {
        if self.encounter.is_none() {
            tracing::error!("active session without an encounter, exiting combat");
            self.reset();
            return;
        }
        self.elapsed += delta;

        self.run_boss_mechanics(delta, events);

        if self.phase == CombatPhase::Active && self.auto_attack && self.player_ready() {
            self.player_strike(events);
        }
        if self.phase == CombatPhase::Active && self.enemy_ready() {
            let multiplier = self.boss.as_ref().map_or(1.0, |b| b.damage_multiplier());
            self.enemy_strike(multiplier, false, events);
        }
    }

    fn run_boss_mechanics(&mut self, delta: Duration, events: &mut Vec<CombatEvent>) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        let directive = boss.update(delta, &self.enemy_hp, &self.enemy_max_hp, self.elapsed);
        if directive.is_empty() {
            return;
        }
        let name = self.enemy_name();

        if directive.enraged {
            self.log
                .push(self.elapsed, LogKind::Boss, format!("{name} becomes enraged!"));
            events.push(CombatEvent::BossEnraged);
        }
        if let Some(amount) = directive.heal {
            self.enemy_hp = (&self.enemy_hp + &amount).min(self.enemy_max_hp.clone());
            self.log.push(
                self.elapsed,
                LogKind::Boss,
                format!("{name} heals for {amount}!"),
            );
            events.push(CombatEvent::BossHealed { amount });
        }
        if directive.warning_started {
            self.log.push(
                self.elapsed,
                LogKind::Warning,
                format!("{name} is charging a devastating attack!"),
            );
            events.push(CombatEvent::UltimateWarning);
        }
        if let Some(multiplier) = directive.ultimate {
            self.enemy_strike(multiplier, true, events);
        }
    }

    fn tick_resolving(
        &mut self,
        delta: Duration,
        rewards: &mut dyn RewardSink,
        events: &mut Vec<CombatEvent>,
    ) {
        let (Some(mut pending), Some(target)) =
            (self.pending, self.encounter.as_ref().map(|e| e.target.clone()))
        else {
            tracing::error!("resolving session without a pending outcome, exiting combat");
            self.reset();
            return;
        };
        self.elapsed += delta;

        if !pending.applied {
            pending.applied = true;
            match pending.outcome {
                FightOutcome::Victory => self.apply_victory(rewards, events),
                FightOutcome::Defeat => self.apply_defeat(events),
                FightOutcome::Retreat => {}
            }
        }

        pending.remaining = pending.remaining.saturating_sub(delta);
        if pending.remaining.is_zero() {
            tracing::info!(outcome = ?pending.outcome, "combat resolved");
            self.reset();
            events.push(CombatEvent::CombatEnded {
                target,
                outcome: pending.outcome,
            });
        } else {
            self.pending = Some(pending);
        }
    }

    // === ATTACKS ===

    /// Manual attack, sharing the auto-attack cooldown
    pub fn player_attack(&mut self) -> Result<Vec<CombatEvent>> {
        if self.phase != CombatPhase::Active || self.encounter.is_none() {
            return Err(CombatError::NotInCombat);
        }
        let remaining = self.player_cooldown_remaining();
        if !remaining.is_zero() {
            return Err(CombatError::AttackOnCooldown { remaining });
        }
        let mut events = Vec::new();
        self.player_strike(&mut events);
        Ok(events)
    }

    fn player_strike(&mut self, events: &mut Vec<CombatEvent>) {
        let Some(encounter) = self.encounter.as_ref() else {
            return;
        };
        let attacker = encounter.player.combat.clone().with_hp(self.player_hp.clone());
        let defender = encounter.enemy.snapshot(&self.enemy_hp);
        let enemy_name = encounter.enemy.name.clone();

        let outcome = resolve_attack(&attacker, &defender, 1.0, &mut self.rng);
        self.last_player_attack_at = self.elapsed;
        self.enemy_hp = outcome.defender_hp_after.clamp_min_zero();

        let kind = match outcome.kind {
            HitKind::Dodged => LogKind::Dodge,
            HitKind::Critical => LogKind::Critical,
            HitKind::Hit => LogKind::PlayerAttack,
        };
        self.log
            .push(self.elapsed, kind, outcome.describe(PLAYER_NAME, &enemy_name));
        tracing::debug!(kind = ?outcome.kind, damage = %outcome.damage, enemy_hp = %self.enemy_hp, "player attack");
        events.push(CombatEvent::PlayerAttacked {
            outcome: outcome.clone(),
        });

        if !self.enemy_hp.is_positive() {
            self.begin_resolution(FightOutcome::Victory, events);
        }
    }

    fn enemy_strike(&mut self, multiplier: f64, ultimate: bool, events: &mut Vec<CombatEvent>) {
        let Some(encounter) = self.encounter.as_ref() else {
            return;
        };
        let attacker = encounter.enemy.snapshot(&self.enemy_hp);
        let defender = encounter.player.combat.clone().with_hp(self.player_hp.clone());
        let enemy_name = encounter.enemy.name.clone();

        let outcome: AttackOutcome = resolve_attack(&attacker, &defender, multiplier, &mut self.rng);
        if !ultimate {
            self.last_enemy_attack_at = self.elapsed;
        }
        self.player_hp = outcome.defender_hp_after.clamp_min_zero();

        let (kind, message) = match (ultimate, outcome.kind) {
            (_, HitKind::Dodged) => (LogKind::Dodge, outcome.describe(&enemy_name, PLAYER_NAME)),
            (true, _) => (
                LogKind::Boss,
                format!(
                    "{enemy_name} unleashes its ultimate! {}",
                    outcome.describe(&enemy_name, PLAYER_NAME)
                ),
            ),
            (false, HitKind::Critical) => {
                (LogKind::Critical, outcome.describe(&enemy_name, PLAYER_NAME))
            }
            (false, HitKind::Hit) => {
                (LogKind::EnemyAttack, outcome.describe(&enemy_name, PLAYER_NAME))
            }
        };
        self.log.push(self.elapsed, kind, message);
        tracing::debug!(kind = ?outcome.kind, ultimate, damage = %outcome.damage, player_hp = %self.player_hp, "enemy attack");
        events.push(CombatEvent::EnemyAttacked {
            outcome: outcome.clone(),
            ultimate,
        });

        if !self.player_hp.is_positive() {
            self.begin_resolution(FightOutcome::Defeat, events);
        }
    }

    // === RESOLUTION ===

    fn begin_resolution(&mut self, outcome: FightOutcome, events: &mut Vec<CombatEvent>) {
        let name = self.enemy_name();
        match outcome {
            FightOutcome::Victory => {
                self.log
                    .push(self.elapsed, LogKind::System, format!("{name} was defeated!"));
                events.push(CombatEvent::EnemyDefeated);
            }
            FightOutcome::Defeat => {
                self.log.push(
                    self.elapsed,
                    LogKind::System,
                    format!("{PLAYER_NAME} was defeated by {name}..."),
                );
                events.push(CombatEvent::PlayerDefeated);
            }
            FightOutcome::Retreat => {}
        }
        tracing::info!(?outcome, elapsed = ?self.elapsed, "fight decided");
        self.phase = CombatPhase::Resolving;
        self.pending = Some(PendingResolution {
            outcome,
            remaining: self.config.defeat_delay(),
            applied: false,
        });
    }

    fn apply_victory(&mut self, rewards: &mut dyn RewardSink, events: &mut Vec<CombatEvent>) {
        let Some(encounter) = self.encounter.as_ref() else {
            return;
        };
        let target = encounter.target.clone();
        let enemy_id = encounter.enemy.id.clone();

        let mut loot = {
            let mut entries: Vec<&LootEntry> = encounter.enemy.loot_table.iter().collect();
            let mut currency = encounter.enemy.currency_reward.clone();
            if let Some(meta) = &encounter.dungeon {
                entries.extend(meta.reward_table.iter());
                currency = &currency + &meta.bonus_currency;
            }
            let mut request = LootRequest::new(entries)
                .with_luck(encounter.player.luck)
                .with_currency(currency);
            if encounter.enemy.is_boss {
                let first_kill = rewards.is_first_kill(&enemy_id);
                request = request.with_boss(encounter.enemy.level, first_kill);
            }
            roll_loot(&request, rewards.pity_state(), &self.config.loot, &mut self.rng)
        };

        rewards.add_currency(&loot.currency);
        rewards.record_kill(&target, &enemy_id);
        if loot.currency.is_positive() {
            self.log.push(
                self.elapsed,
                LogKind::Reward,
                format!("Gained {} gold", loot.currency),
            );
        }

        let mut lost_items = Vec::new();
        for (index, drop) in loot.items.iter().enumerate() {
            if let Err(err) = rewards.add_item(drop) {
                lost_items = loot.items[index..].to_vec();
                tracing::warn!(%err, lost = lost_items.len(), "dropping remaining rewards");
                self.log.push(
                    self.elapsed,
                    LogKind::Warning,
                    format!("Inventory full! {} reward(s) lost", lost_items.len()),
                );
                break;
            }
            let note = if drop.source == DropSource::Pity {
                " (guaranteed)"
            } else {
                ""
            };
            self.log.push(
                self.elapsed,
                LogKind::Reward,
                format!("Found {} x{} [{}]{note}", drop.item_id, drop.quantity, drop.rarity),
            );
        }

        // A refused pity item leaves its guarantee pending for the next kill
        if lost_items.iter().any(|d| d.source == DropSource::Pity) {
            if let Some(before) = loot.pity_before_grant.take() {
                tracing::warn!(rarity = ?loot.pity_rarity, "pity item lost, guarantee kept");
                loot.pity = before;
                loot.pity_rarity = None;
            }
        }
        rewards.save_pity_state(loot.pity);

        tracing::info!(
            enemy = %enemy_id,
            items = loot.items.len(),
            lost = lost_items.len(),
            pity = ?loot.pity_rarity,
            "rewards applied"
        );
        events.push(CombatEvent::Victory {
            target,
            enemy_id,
            loot,
            lost_items,
        });
    }

    fn apply_defeat(&mut self, events: &mut Vec<CombatEvent>) {
        let Some(encounter) = self.encounter.as_ref() else {
            return;
        };
        let target = encounter.target.clone();
        let enemy_id = encounter.enemy.id.clone();

        self.player_hp = self.player_max_hp.clone();
        self.log.push(
            self.elapsed,
            LogKind::System,
            format!("{PLAYER_NAME} retreats and recovers to full health"),
        );
        events.push(CombatEvent::Defeat {
            target,
            enemy_id,
            restored_hp: self.player_hp.clone(),
        });
    }

    // === SETTINGS & STATS ===

    pub fn set_auto_attack(&mut self, enabled: bool) {
        self.auto_attack = enabled;
    }

    /// Pick up recalculated player stats mid-fight
    ///
    /// Max HP follows the new snapshot; current HP is clamped to it.
    pub fn refresh_player_stats(&mut self, player: &PlayerStats) -> Result<()> {
        validate_player(player)?;
        let Some(encounter) = self.encounter.as_mut() else {
            return Ok(());
        };
        encounter.player = player.clone();
        self.player_max_hp = player.combat.max_hp.clone();
        self.player_hp = self.player_hp.clone().min(self.player_max_hp.clone());
        Ok(())
    }

    fn player_cooldown_remaining(&self) -> Duration {
        let since = self.elapsed.saturating_sub(self.last_player_attack_at);
        self.config.player_attack_cooldown().saturating_sub(since)
    }

    fn player_ready(&self) -> bool {
        self.player_cooldown_remaining().is_zero()
    }

    fn enemy_ready(&self) -> bool {
        self.elapsed.saturating_sub(self.last_enemy_attack_at) >= self.config.enemy_attack_cooldown()
    }

    fn enemy_name(&self) -> String {
        self.encounter
            .as_ref()
            .map(|e| e.enemy.name.clone())
            .unwrap_or_default()
    }

    // === ACCESSORS ===

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != CombatPhase::Idle
    }

    pub fn player_hp(&self) -> &Amount {
        &self.player_hp
    }

    pub fn player_max_hp(&self) -> &Amount {
        &self.player_max_hp
    }

    pub fn enemy_hp(&self) -> &Amount {
        &self.enemy_hp
    }

    pub fn enemy_max_hp(&self) -> &Amount {
        &self.enemy_max_hp
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn boss(&self) -> Option<&BossMechanics> {
        self.boss.as_ref()
    }

    pub fn is_boss_fight(&self) -> bool {
        self.boss.is_some()
    }

    pub fn target(&self) -> Option<&CombatTarget> {
        self.encounter.as_ref().map(|e| &e.target)
    }

    pub fn enemy(&self) -> Option<&EnemyDefinition> {
        self.encounter.as_ref().map(|e| &e.enemy)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn auto_attack(&self) -> bool {
        self.auto_attack
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }
}

fn validate_player(player: &PlayerStats) -> Result<()> {
    let combat = &player.combat;
    if !combat.max_hp.is_positive() {
        return Err(CombatError::InvalidPlayer("max_hp must be positive".into()));
    }
    if combat.attack.is_negative() || combat.defense.is_negative() {
        return Err(CombatError::InvalidPlayer(
            "attack and defense must not be negative".into(),
        ));
    }
    Ok(())
}
