//! Boss mechanics controller
//!
//! Tracks the one-shot HP-threshold rules (enrage, emergency heal) and the
//! repeating ultimate charge/warning/fire cycle for a single boss fight.
//! The controller only reports what should happen; the session mutates HP
//! and writes the log.

use std::time::Duration;

use crate::combat::constants::{
    ENRAGE_HP_RATIO, ENRAGE_MULTIPLIER, HEAL_HP_RATIO, HEAL_PERCENT, ULTIMATE_CHARGE_MS,
    ULTIMATE_MULTIPLIER, ULTIMATE_WARNING_MS,
};
use crate::combat::stats::BossFlags;
use crate::core::amount::Amount;

/// One-shot trigger, never re-armed within a fight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdTrigger {
    pub triggered: bool,
}

/// Ultimate charge -> warning -> fire cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UltimateCycle {
    /// Set on the update that fired; cleared at the start of the next one
    pub triggered: bool,
    pub warning: bool,
    pub cooldown_elapsed: Duration,
    pub warning_elapsed: Duration,
    pub times_fired: u32,
}

/// What the session should do this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BossDirective {
    /// Enrage fired on this update
    pub enraged: bool,
    /// HP to restore, already clamped so HP stays at or below max
    pub heal: Option<Amount>,
    /// Warning window opened on this update
    pub warning_started: bool,
    /// Ultimate fires with this damage multiplier (enrage included)
    pub ultimate: Option<f64>,
}

impl BossDirective {
    pub fn is_empty(&self) -> bool {
        !self.enraged && self.heal.is_none() && !self.warning_started && self.ultimate.is_none()
    }
}

/// Per-fight boss state, owned by the combat session
#[derive(Debug, Clone, PartialEq)]
pub struct BossMechanics {
    flags: BossFlags,
    enrage: ThresholdTrigger,
    heal: ThresholdTrigger,
    ultimate: UltimateCycle,
}

impl Default for BossMechanics {
    fn default() -> Self {
        Self::new(BossFlags::default())
    }
}

impl BossMechanics {
    pub fn new(flags: BossFlags) -> Self {
        Self {
            flags,
            enrage: ThresholdTrigger::default(),
            heal: ThresholdTrigger::default(),
            ultimate: UltimateCycle::default(),
        }
    }

    /// Advance one tick
    ///
    /// Rules run in order: enrage, heal, ultimate. A first tick already
    /// below 25% HP fires both enrage and heal.
    pub fn update(
        &mut self,
        delta: Duration,
        current_hp: &Amount,
        max_hp: &Amount,
        elapsed: Duration,
    ) -> BossDirective {
        let mut directive = BossDirective::default();
        let hp_ratio = current_hp.ratio(max_hp);
        self.ultimate.triggered = false;

        if self.flags.enrage && !self.enrage.triggered && hp_ratio <= ENRAGE_HP_RATIO {
            self.enrage.triggered = true;
            directive.enraged = true;
            tracing::debug!(?elapsed, hp_ratio, "boss enraged");
        }

        if self.flags.heal && !self.heal.triggered && hp_ratio <= HEAL_HP_RATIO {
            self.heal.triggered = true;
            let missing = (max_hp - current_hp).clamp_min_zero();
            let heal = (max_hp * &Amount::from_u64(HEAL_PERCENT))
                .checked_div(&Amount::from_u64(100))
                .unwrap_or_else(Amount::zero)
                .trunc()
                .min(missing);
            tracing::debug!(?elapsed, hp_ratio, %heal, "boss emergency heal");
            directive.heal = Some(heal);
        }

        if self.flags.ultimate {
            self.advance_ultimate(delta, elapsed, &mut directive);
        }

        directive
    }

    fn advance_ultimate(&mut self, delta: Duration, elapsed: Duration, directive: &mut BossDirective) {
        let charge = Duration::from_millis(ULTIMATE_CHARGE_MS);
        let warning = Duration::from_millis(ULTIMATE_WARNING_MS);
        let multiplier = ULTIMATE_MULTIPLIER * self.damage_multiplier();
        let cycle = &mut self.ultimate;

        if cycle.warning {
            cycle.warning_elapsed += delta;
            if cycle.warning_elapsed >= warning {
                cycle.warning = false;
                cycle.triggered = true;
                cycle.times_fired += 1;
                cycle.cooldown_elapsed = Duration::ZERO;
                cycle.warning_elapsed = Duration::ZERO;
                directive.ultimate = Some(multiplier);
                tracing::debug!(?elapsed, fired = cycle.times_fired, multiplier, "boss ultimate");
            }
        } else {
            cycle.cooldown_elapsed += delta;
            if cycle.cooldown_elapsed >= charge {
                cycle.warning = true;
                cycle.warning_elapsed = cycle.cooldown_elapsed - charge;
                directive.warning_started = true;
                tracing::debug!(?elapsed, "boss ultimate warning");
            }
        }
    }

    /// Multiplier on every enemy attack: 1.5 once enraged
    pub fn damage_multiplier(&self) -> f64 {
        if self.enrage.triggered {
            ENRAGE_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn is_enraged(&self) -> bool {
        self.enrage.triggered
    }

    pub fn has_healed(&self) -> bool {
        self.heal.triggered
    }

    pub fn ultimate_warning(&self) -> bool {
        self.ultimate.warning
    }

    pub fn ultimate_triggered(&self) -> bool {
        self.ultimate.triggered
    }

    pub fn ultimates_fired(&self) -> u32 {
        self.ultimate.times_fired
    }

    /// Time left before the current warning window ends
    pub fn warning_remaining(&self) -> Option<Duration> {
        self.ultimate.warning.then(|| {
            Duration::from_millis(ULTIMATE_WARNING_MS).saturating_sub(self.ultimate.warning_elapsed)
        })
    }

    pub fn flags(&self) -> BossFlags {
        self.flags
    }
}
