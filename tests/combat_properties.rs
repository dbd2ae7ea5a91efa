//! Property tests for the resolver, log and pity counters

use std::time::Duration;

use idle_combat::combat::{
    damage_reduction, mitigated_damage, resolve_attack, CombatLog, CombatantSnapshot, LogKind,
    LootEntry,
};
use idle_combat::core::{Amount, LootConfig, Rarity};
use idle_combat::loot::{roll_loot, LootRequest, PityState};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rarity() -> impl Strategy<Value = Rarity> {
    prop_oneof![
        Just(Rarity::Common),
        Just(Rarity::Uncommon),
        Just(Rarity::Rare),
        Just(Rarity::Epic),
        Just(Rarity::Legendary),
        Just(Rarity::Mythic),
    ]
}

fn pity_state() -> impl Strategy<Value = PityState> {
    (0u32..2000, 0u32..2000, 0u32..2000, 0u32..2000).prop_map(|(u, r, e, l)| PityState {
        kills_since_uncommon: u,
        kills_since_rare: r,
        kills_since_epic: e,
        kills_since_legendary: l,
    })
}

proptest! {
    #[test]
    fn prop_reduction_in_unit_range_and_increasing(defense in 0u64..1_000_000) {
        let low = damage_reduction(&Amount::from_u64(defense));
        let high = damage_reduction(&Amount::from_u64(defense + 1));
        prop_assert!((0.0..1.0).contains(&low));
        prop_assert!(high > low);
    }

    #[test]
    fn prop_defense_alone_never_zeroes_damage(attack in 1u64..1_000_000, defense in 0u64..1_000_000_000) {
        let damage = mitigated_damage(&Amount::from_u64(attack), &Amount::from_u64(defense));
        prop_assert!(damage.is_positive());
        prop_assert!(damage <= Amount::from_u64(attack));
    }

    #[test]
    fn prop_dodge_means_zero_damage(seed in any::<u64>(), dodge in 0.0f64..=100.0) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let attacker = CombatantSnapshot::new(Amount::from_u64(1), Amount::from_u64(500), Amount::zero());
        let defender = CombatantSnapshot::new(Amount::from_u64(900), Amount::zero(), Amount::zero())
            .with_dodge(dodge);
        let outcome = resolve_attack(&attacker, &defender, 1.0, &mut rng);
        if outcome.is_dodged() {
            prop_assert!(outcome.damage.is_zero());
            prop_assert_eq!(outcome.defender_hp_after, Amount::from_u64(900));
        } else {
            prop_assert_eq!(outcome.damage, Amount::from_u64(500));
        }
    }

    #[test]
    fn prop_log_bounded(pushes in 0usize..400) {
        let mut log = CombatLog::default();
        for i in 0..pushes {
            log.push(Duration::from_millis(i as u64), LogKind::System, format!("{i}"));
        }
        prop_assert_eq!(log.len(), pushes.min(100));
        if pushes > 100 {
            let expected = format!("{}", pushes - 100);
            prop_assert_eq!(&log.iter().next().unwrap().message, &expected);
        }
    }

    #[test]
    fn prop_pity_counters_grow_by_at_most_one(seed in any::<u64>(), before in pity_state(), drop in rarity()) {
        let config = LootConfig::default();
        let entry = LootEntry::new("prop_item", 100.0, drop);
        let request = LootRequest::new([&entry]);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let result = roll_loot(&request, before, &config, &mut rng);
        let after = result.pity;

        prop_assert!(after.kills_since_uncommon <= before.kills_since_uncommon + 1);
        prop_assert!(after.kills_since_rare <= before.kills_since_rare + 1);
        prop_assert!(after.kills_since_epic <= before.kills_since_epic + 1);
        prop_assert!(after.kills_since_legendary <= before.kills_since_legendary + 1);
        prop_assert!(result.items.iter().filter(|d| d.source == idle_combat::loot::DropSource::Pity).count() <= 1);
        if drop >= Rarity::Legendary {
            prop_assert_eq!(after, PityState::default());
        }
    }
}

#[test]
fn test_zero_dodge_never_dodges() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let attacker = CombatantSnapshot::new(Amount::from_u64(1), Amount::from_u64(10), Amount::zero());
    let defender = CombatantSnapshot::new(Amount::from_u64(1), Amount::zero(), Amount::zero());
    let dodges = (0..10_000)
        .filter(|_| resolve_attack(&attacker, &defender, 1.0, &mut rng).is_dodged())
        .count();
    assert_eq!(dodges, 0);
}

#[test]
fn test_half_dodge_roughly_half() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let attacker = CombatantSnapshot::new(Amount::from_u64(1), Amount::from_u64(10), Amount::zero());
    let defender = CombatantSnapshot::new(Amount::from_u64(1), Amount::zero(), Amount::zero()).with_dodge(50.0);
    let dodges = (0..10_000)
        .filter(|_| resolve_attack(&attacker, &defender, 1.0, &mut rng).is_dodged())
        .count();
    assert!((4_500..5_500).contains(&dodges), "dodges = {dodges}");
}
