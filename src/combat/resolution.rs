//! Single-attack resolution
//!
//! Dodge roll, soft-capped defense, crit roll, then the caller's multiplier
//! (enrage, ultimate). Pure apart from the RNG; the session applies the
//! result and writes the log line.

use rand::Rng;

use crate::combat::constants::{DEFENSE_SOFT_CAP, ROLL_RANGE};
use crate::combat::stats::CombatantSnapshot;
use crate::core::amount::Amount;

/// How an attack landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Dodged,
    Hit,
    Critical,
}

/// Result of one attack
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub kind: HitKind,
    pub damage: Amount,
    /// Defender HP minus damage; may be negative, the session clamps
    pub defender_hp_after: Amount,
}

impl AttackOutcome {
    pub fn is_dodged(&self) -> bool {
        self.kind == HitKind::Dodged
    }

    pub fn is_critical(&self) -> bool {
        self.kind == HitKind::Critical
    }

    /// The single log line describing this attack
    pub fn describe(&self, attacker: &str, defender: &str) -> String {
        match self.kind {
            HitKind::Dodged => format!("{defender} dodged {attacker}'s attack"),
            HitKind::Hit => format!("{attacker} hit {defender} for {}", self.damage),
            HitKind::Critical => {
                format!("{attacker} critically hit {defender} for {}!", self.damage)
            }
        }
    }
}

/// Fraction of damage removed by `defense`: `defense / (defense + K)`
///
/// Always in [0, 1); negative defense counts as zero.
pub fn damage_reduction(defense: &Amount) -> f64 {
    let defense = defense.clamp_min_zero();
    let denominator = &defense + &Amount::from_u64(DEFENSE_SOFT_CAP);
    defense.ratio(&denominator)
}

/// Damage after defense, before crit: `attack * K / (defense + K)`
///
/// Same as `attack * (1 - defense / (defense + K))` without the float.
pub fn mitigated_damage(attack: &Amount, defense: &Amount) -> Amount {
    let k = Amount::from_u64(DEFENSE_SOFT_CAP);
    let denominator = &defense.clamp_min_zero() + &k;
    (&attack.clamp_min_zero() * &k)
        .checked_div(&denominator)
        .unwrap_or_else(Amount::zero)
}

/// Resolve one attack from `attacker` against `defender`
///
/// # Arguments
/// * `multiplier` - extra damage factor, 1.0 for a plain attack
///
/// # Returns
/// Outcome with truncated damage and the defender's unclamped HP after it
pub fn resolve_attack(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    multiplier: f64,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let dodge_roll: f64 = rng.gen_range(0.0..ROLL_RANGE);
    if dodge_roll < defender.dodge_chance {
        return AttackOutcome {
            kind: HitKind::Dodged,
            damage: Amount::zero(),
            defender_hp_after: defender.hp.clone(),
        };
    }

    let mut damage = mitigated_damage(&attacker.attack, &defender.defense);

    let crit_roll: f64 = rng.gen_range(0.0..ROLL_RANGE);
    let kind = if crit_roll < attacker.crit_chance {
        let crit_factor = attacker
            .crit_damage_percent
            .checked_div(&Amount::from_u64(100))
            .unwrap_or_else(Amount::zero);
        damage = &damage * &crit_factor;
        HitKind::Critical
    } else {
        HitKind::Hit
    };

    if multiplier != 1.0 {
        damage = damage.scale(multiplier);
    }
    let damage = damage.trunc();
    let defender_hp_after = &defender.hp - &damage;

    AttackOutcome {
        kind,
        damage,
        defender_hp_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn snapshot(hp: u64, attack: u64, defense: u64) -> CombatantSnapshot {
        CombatantSnapshot::new(
            Amount::from_u64(hp),
            Amount::from_u64(attack),
            Amount::from_u64(defense),
        )
    }

    #[test]
    fn test_zero_defense_takes_full_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let attacker = snapshot(100, 100, 0);
        let defender = snapshot(150, 0, 0);

        let outcome = resolve_attack(&attacker, &defender, 1.0, &mut rng);

        assert_eq!(outcome.kind, HitKind::Hit);
        assert_eq!(outcome.damage, Amount::from_u64(100));
        assert_eq!(outcome.defender_hp_after, Amount::from_u64(50));
    }

    #[test]
    fn test_defense_equal_to_soft_cap_halves_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = resolve_attack(&snapshot(1, 200, 0), &snapshot(1000, 0, 100), 1.0, &mut rng);
        assert_eq!(outcome.damage, Amount::from_u64(100));
    }

    #[test]
    fn test_damage_truncated() {
        // 100 * 100 / 150 = 66.66..
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = resolve_attack(&snapshot(1, 100, 0), &snapshot(500, 0, 50), 1.0, &mut rng);
        assert_eq!(outcome.damage, Amount::from_u64(66));
    }

    #[test]
    fn test_hp_not_clamped_by_resolver() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = resolve_attack(&snapshot(1, 100, 0), &snapshot(30, 0, 0), 1.0, &mut rng);
        assert!(outcome.defender_hp_after.is_negative());
    }

    #[test]
    fn test_certain_dodge() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let defender = snapshot(100, 0, 0).with_dodge(100.0);
        for _ in 0..50 {
            let outcome = resolve_attack(&snapshot(1, 100, 0), &defender, 1.0, &mut rng);
            assert!(outcome.is_dodged());
            assert!(outcome.damage.is_zero());
            assert_eq!(outcome.defender_hp_after, Amount::from_u64(100));
        }
    }

    #[test]
    fn test_certain_crit_applies_crit_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let attacker = snapshot(1, 100, 0).with_crit(100.0, 250);
        let outcome = resolve_attack(&attacker, &snapshot(1000, 0, 0), 1.0, &mut rng);
        assert!(outcome.is_critical());
        assert_eq!(outcome.damage, Amount::from_u64(250));
    }

    #[test]
    fn test_multiplier_stacks_with_crit() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let attacker = snapshot(1, 100, 0).with_crit(100.0, 200);
        let outcome = resolve_attack(&attacker, &snapshot(5000, 0, 0), 4.5, &mut rng);
        assert_eq!(outcome.damage, Amount::from_u64(900));
    }

    #[test]
    fn test_damage_reduction_bounds() {
        assert_eq!(damage_reduction(&Amount::zero()), 0.0);
        assert_eq!(damage_reduction(&Amount::from_u64(100)), 0.5);
        assert!(damage_reduction(&Amount::parse("1e300").unwrap()) <= 1.0);
        assert_eq!(damage_reduction(&Amount::parse("-50").unwrap()), 0.0);
    }

    #[test]
    fn test_describe_lines() {
        let outcome = AttackOutcome {
            kind: HitKind::Critical,
            damage: Amount::from_u64(12),
            defender_hp_after: Amount::zero(),
        };
        assert_eq!(outcome.describe("You", "Slime"), "You critically hit Slime for 12!");
    }
}
