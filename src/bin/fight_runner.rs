//! Headless Fight Runner
//!
//! Runs deterministic fights against a zone enemy or a dungeon boss and
//! prints the outcome as JSON or text, for balance checks.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use idle_combat::combat::{CombatantSnapshot, DungeonDescriptor, EnemyDefinition, PlayerStats};
use idle_combat::core::{Amount, CombatConfig, Rarity, Result, ZoneId};
use idle_combat::session::{CombatEvent, CombatSession, FightOutcome, FrameClock, MemorySink};
use serde::Serialize;

/// Headless Fight Runner - simulate fights and report rewards
#[derive(Parser, Debug)]
#[command(name = "fight_runner")]
#[command(about = "Simulate idle combat fights and report outcomes and loot")]
struct Args {
    /// Combat config TOML (defaults used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dungeon descriptor TOML; fights its boss instead of a zone enemy
    #[arg(long)]
    dungeon: Option<PathBuf>,

    /// Number of fights to run back to back
    #[arg(long, default_value_t = 1)]
    fights: u32,

    /// Player max HP
    #[arg(long, default_value = "1000")]
    player_hp: String,

    /// Player attack
    #[arg(long, default_value = "100")]
    player_attack: String,

    /// Player defense
    #[arg(long, default_value = "20")]
    player_defense: String,

    /// Player crit chance (0-100)
    #[arg(long, default_value_t = 10.0)]
    crit: f64,

    /// Player luck
    #[arg(long, default_value_t = 0.0)]
    luck: f64,

    /// Zone enemy max HP (ignored with --dungeon)
    #[arg(long, default_value = "500")]
    enemy_hp: String,

    /// Zone enemy attack (ignored with --dungeon)
    #[arg(long, default_value = "30")]
    enemy_attack: String,

    /// Random seed, overrides the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation step in milliseconds
    #[arg(long, default_value_t = 50)]
    step_ms: u64,

    /// Give up on a fight after this many simulated seconds
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    seed: u64,
    fights: u32,
    victories: u32,
    defeats: u32,
    timeouts: u32,
    currency: Amount,
    items: Vec<(String, u32)>,
    pity_triggers: u32,
    best_drop: Option<Rarity>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("idle_combat=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "fight runner failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => CombatConfig::load(path)?,
        None => CombatConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let dungeon = match &args.dungeon {
        Some(path) => Some(DungeonDescriptor::from_toml_str(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    let player = PlayerStats::new(
        CombatantSnapshot::new(
            Amount::parse(&args.player_hp)?,
            Amount::parse(&args.player_attack)?,
            Amount::parse(&args.player_defense)?,
        )
        .with_crit(args.crit, 150),
    )
    .with_luck(args.luck);

    let mut clock = FrameClock::new(config.max_tick_delta());
    let mut session = CombatSession::new(config);
    let mut sink = MemorySink::new();
    let step_ms = args.step_ms.max(1);
    let max_steps = args.max_seconds * 1000 / step_ms;
    // Simulated host time in milliseconds
    let mut now_ms = 0.0;

    let mut report = RunReport {
        seed,
        fights: args.fights,
        victories: 0,
        defeats: 0,
        timeouts: 0,
        currency: Amount::zero(),
        items: Vec::new(),
        pity_triggers: 0,
        best_drop: None,
    };

    for fight in 0..args.fights {
        match &dungeon {
            Some(d) => session.start_dungeon_combat(
                d.id.clone(),
                d.boss.clone(),
                d.meta.clone(),
                &player,
            )?,
            None => {
                let enemy = EnemyDefinition::new(
                    "training_dummy",
                    "Training Dummy",
                    Amount::parse(&args.enemy_hp)?,
                    Amount::parse(&args.enemy_attack)?,
                );
                session.enter_combat(ZoneId::from("training_grounds"), enemy, &player)?
            }
        }

        clock.reset();
        clock.advance(now_ms);
        let mut ended = false;
        for _ in 0..max_steps {
            now_ms += step_ms as f64;
            let delta = clock.advance(now_ms);
            for event in session.tick(delta, &mut sink) {
                match event {
                    CombatEvent::Victory { loot, .. } => {
                        if loot.pity_triggered() {
                            report.pity_triggers += 1;
                        }
                        report.best_drop = report.best_drop.max(loot.best_rarity());
                    }
                    CombatEvent::CombatEnded { outcome, .. } => {
                        ended = true;
                        match outcome {
                            FightOutcome::Victory => report.victories += 1,
                            FightOutcome::Defeat => report.defeats += 1,
                            FightOutcome::Retreat => {}
                        }
                    }
                    _ => {}
                }
            }
            if ended {
                break;
            }
        }

        if session.is_active() {
            tracing::warn!(fight, "fight timed out, retreating");
            report.timeouts += 1;
            session.exit_combat();
        }
        if args.format == "text" && !ended {
            println!("fight {fight}: timeout");
        }
    }

    report.currency = sink.currency.clone();
    report.items = sink
        .items
        .iter()
        .map(|d| (d.item_id.to_string(), d.quantity))
        .collect();

    if args.format == "text" {
        println!("seed:        {}", report.seed);
        println!("fights:      {}", report.fights);
        println!("victories:   {}", report.victories);
        println!("defeats:     {}", report.defeats);
        println!("timeouts:    {}", report.timeouts);
        println!("currency:    {}", report.currency);
        println!("pity grants: {}", report.pity_triggers);
        if let Some(rarity) = report.best_drop {
            println!("best drop:   {rarity}");
        }
        for (item, quantity) in &report.items {
            println!("  {item} x{quantity}");
        }
    } else {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!(%err, "failed to encode report"),
        }
    }
    Ok(())
}
