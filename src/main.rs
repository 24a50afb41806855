//! Tactician - command line runner
//!
//! Loads a scenario, lets the bot decide a move for each of its units in
//! turn and prints the chosen paths and firing plans.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tactician::core::types::UnitId;
use tactician::firing::FiringPlan;
use tactician::ranking::{load_behavior, BehaviorProfile, RankedPath};
use tactician::scenario::load_scenario;
use tactician::{BotConfig, Result, TacticalBot};

/// Run the tactical bot on a scenario file
#[derive(Parser, Debug)]
#[command(name = "tactician")]
#[command(about = "Decide moves and firing plans for the bot's units in a scenario")]
struct Args {
    /// Scenario file (TOML)
    #[arg(long)]
    scenario: PathBuf,

    /// Behavior profile (TOML); the balanced profile when omitted
    #[arg(long)]
    behavior: Option<PathBuf>,

    /// Bot configuration (TOML); defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only decide for this unit id
    #[arg(long)]
    unit: Option<u32>,

    /// Print the score breakdown of the chosen path
    #[arg(long)]
    explain: bool,

    /// Also print the best N candidates
    #[arg(long, default_value_t = 0)]
    top: usize,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct UnitDecision {
    unit: UnitId,
    name: String,
    chosen: RankedPath,
    firing: FiringPlan,
    alternatives: Vec<RankedPath>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tactician=info")),
        )
        .init();

    let args = Args::parse();

    let scenario = load_scenario(&args.scenario)?;
    let behavior = match &args.behavior {
        Some(path) => load_behavior(path)?,
        None => BehaviorProfile::default(),
    };
    let config = match &args.config {
        Some(path) => BotConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => BotConfig::default(),
    };

    tracing::info!(
        scenario = %scenario.name,
        behavior = %behavior.name,
        "deciding moves"
    );

    let mut bot = TacticalBot::new(config, behavior)?;
    let mut battlefield = scenario.battlefield.clone();
    let units: Vec<UnitId> = match args.unit {
        Some(id) => vec![UnitId(id)],
        None => scenario.bot_units().map(|u| u.id).collect(),
    };

    let mut decisions = Vec::new();
    for id in units {
        let alternatives = if args.top > 0 {
            bot.top_moves(&battlefield, id, args.top)?
        } else {
            Vec::new()
        };
        let chosen = bot.rank_moves(&battlefield, id)?;

        let end = chosen.path.final_state();
        battlefield.move_unit(id, end.position, end.facing, end.hexes_moved);
        if let Some(unit) = battlefield.unit_mut(id) {
            unit.movement_this_turn = end.movement;
            unit.velocity = end.velocity;
        }

        let targets: Vec<UnitId> = battlefield
            .units()
            .iter()
            .filter(|u| u.owner != scenario.bot_owner && u.is_active())
            .map(|u| u.id)
            .collect();
        let firing = bot.decide_firing_plan(&battlefield, id, &targets)?;

        let name = battlefield
            .unit(id)
            .map(|u| u.name.clone())
            .unwrap_or_default();
        decisions.push(UnitDecision {
            unit: id,
            name,
            chosen,
            firing,
            alternatives,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
        return Ok(());
    }

    println!("=== {} ===", scenario.name);
    for decision in &decisions {
        println!();
        println!("{} {}", decision.unit, decision.name);
        println!("  move: {}", decision.chosen.path);
        println!("  utility: {:.2}", decision.chosen.utility);
        print!("  fire: {}", decision.firing);
        if decision.firing.is_empty() {
            println!();
        }
        if args.explain {
            print!("{}", bot.explain(&decision.chosen));
        }
        for (rank, alternative) in decision.alternatives.iter().enumerate() {
            println!("  #{} {:.2} {}", rank + 1, alternative.utility, alternative.path);
        }
    }

    let divergence = bot.planner().estimator().divergence().stats();
    println!();
    println!(
        "estimate divergence: {} samples, mean {:.3}, max {:.3}",
        divergence.samples,
        divergence.mean(),
        divergence.max
    );
    Ok(())
}
