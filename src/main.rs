//! Creature Anatomy - Strike Simulator
//!
//! Loads body plans and runs seeded strikes against a creature, printing what
//! each one hit. With `--volley` the same attack is resolved in parallel
//! against a crowd of fresh creatures instead.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use creature_anatomy::anatomy::{Creature, LimbStatus};
use creature_anatomy::armor::{DamageTriple, DamageType};
use creature_anatomy::combat::{
    resolve_volley, AttackDescriptor, HitResolver, StrikeOutcome,
};
use creature_anatomy::content::BodyRegistry;
use creature_anatomy::core::error::{ContentError, Result};
use creature_anatomy::core::types::PenetrationDegree;
use creature_anatomy::core::ResolverConfig;
use creature_anatomy::formula::Bindings;

/// Strike simulator for body plan files
#[derive(Parser, Debug)]
#[command(name = "creature-anatomy")]
#[command(about = "Resolve seeded attacks against a body plan and report the results")]
struct Args {
    /// Body plan file, or a directory of them
    #[arg(long, default_value = "data/bodies")]
    body: PathBuf,

    /// Plan to strike (defaults to the first one loaded)
    #[arg(long)]
    plan: Option<String>,

    /// Resolver config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of strikes against the same creature
    #[arg(long, default_value_t = 10)]
    strikes: u32,

    /// Damage type (snake_case)
    #[arg(long, default_value = "slashing")]
    damage_type: DamageType,

    /// Damage, pain and stun carried by each strike
    #[arg(long, default_value_t = 20.0)]
    amount: f32,

    /// Penetration degree 0-5
    #[arg(long, default_value_t = 2)]
    penetration: u8,

    /// Use one of the plan's natural attacks instead of a plain strike
    #[arg(long)]
    natural: Option<String>,

    /// Attacker strength (trait 1), for natural attack formulas
    #[arg(long, default_value_t = 50.0)]
    strength: f32,

    /// Resolve one strike each against this many creatures in parallel
    #[arg(long)]
    volley: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct StrikeSummary {
    strike: usize,
    outcome: String,
    part: Option<String>,
    internal: Option<String>,
    suffered: Option<DamageTriple>,
    severed: bool,
    fatal: bool,
}

#[derive(Serialize)]
struct RunSummary {
    plan: String,
    seed: u64,
    strikes: Vec<StrikeSummary>,
    limbs: Vec<(String, LimbStatus)>,
    dead: bool,
}

const STRENGTH_TRAIT: u64 = 1;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("creature_anatomy=info")),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(ContentError::from)?;
            ResolverConfig::from_toml_str(&content)?
        }
        None => ResolverConfig::default(),
    };
    let resolver = HitResolver::new(config);

    let mut registry = BodyRegistry::new();
    if args.body.is_dir() {
        registry.load_directory(&args.body)?;
    } else {
        registry.load_file(&args.body)?;
    }
    let plan_name = match &args.plan {
        Some(name) => name.clone(),
        None => registry
            .names()
            .first()
            .cloned()
            .ok_or_else(|| ContentError::UnknownPlan(args.body.display().to_string()))?,
    };
    let plan = registry
        .get(&plan_name)
        .ok_or_else(|| ContentError::UnknownPlan(plan_name.clone()))?;

    let attack = build_attack(&args, &Creature::new("attacker", plan.clone()))?;
    tracing::info!(plan = %plan_name, seed, damage_type = ?attack.damage_type, "starting run");

    let summary = match args.volley {
        Some(count) => {
            let mut crowd: Vec<Creature> = (0..count)
                .map(|i| Creature::new(format!("target-{i}"), plan.clone()))
                .collect();
            let attacks = vec![attack; count];
            let results = resolve_volley(&resolver, &mut crowd, &attacks, seed);
            let strikes = results
                .into_iter()
                .enumerate()
                .map(|(i, result)| summarize(i, &crowd[i], result))
                .collect();
            RunSummary {
                plan: plan_name,
                seed,
                strikes,
                limbs: Vec::new(),
                dead: crowd.iter().all(Creature::is_dead),
            }
        }
        None => {
            let mut target = Creature::new("target", plan.clone());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut strikes = Vec::new();
            for i in 0..args.strikes as usize {
                let result = resolver.resolve(&mut target, &attack, &mut rng);
                strikes.push(summarize(i, &target, result));
            }
            let limbs = target
                .plan()
                .limb_ids()
                .map(|limb| (target.plan().limb(limb).name.clone(), target.limb_status(limb)))
                .collect();
            RunSummary {
                plan: plan_name,
                seed,
                strikes,
                limbs,
                dead: target.is_dead(),
            }
        }
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }
    Ok(())
}

fn build_attack(args: &Args, attacker: &Creature) -> Result<AttackDescriptor> {
    let penetration = match args.penetration {
        0 => PenetrationDegree::None,
        1 => PenetrationDegree::Marginal,
        2 => PenetrationDegree::Minor,
        3 => PenetrationDegree::Moderate,
        4 => PenetrationDegree::Major,
        _ => PenetrationDegree::Total,
    };

    match &args.natural {
        Some(name) => {
            let natural = attacker
                .available_attacks()
                .find(|a| &a.name == name)
                .ok_or_else(|| ContentError::UnknownAttack(name.clone()))?;
            let bindings = Bindings::new().with_trait(STRENGTH_TRAIT, args.strength);
            Ok(natural.to_descriptor(&bindings)?)
        }
        None => Ok(
            AttackDescriptor::new(args.damage_type, DamageTriple::uniform(args.amount))
                .with_penetration(penetration),
        ),
    }
}

fn summarize(
    strike: usize,
    target: &Creature,
    result: std::result::Result<StrikeOutcome, creature_anatomy::core::ResolutionError>,
) -> StrikeSummary {
    let plan = target.plan();
    match result {
        Ok(StrikeOutcome::Hit(hit)) => StrikeSummary {
            strike,
            outcome: "hit".to_string(),
            part: Some(plan.part(hit.part).name.clone()),
            internal: hit.internal.map(|s| plan.internal(s).name.clone()),
            suffered: Some(hit.final_triple),
            severed: hit.severed,
            fatal: hit.fatal,
        },
        Ok(StrikeOutcome::Ineffective(reason)) => StrikeSummary {
            strike,
            outcome: format!("ineffective: {:?}", reason),
            part: None,
            internal: None,
            suffered: None,
            severed: false,
            fatal: false,
        },
        Err(e) => StrikeSummary {
            strike,
            outcome: format!("unresolved: {}", e),
            part: None,
            internal: None,
            suffered: None,
            severed: false,
            fatal: false,
        },
    }
}

fn print_text(summary: &RunSummary) {
    println!("\n=== {} (seed {}) ===", summary.plan, summary.seed);
    for strike in &summary.strikes {
        let location = match (&strike.part, &strike.internal) {
            (Some(part), Some(internal)) => format!("{} -> {}", part, internal),
            (Some(part), None) => part.clone(),
            _ => "-".to_string(),
        };
        let mut flags = String::new();
        if strike.severed {
            flags.push_str(" SEVERED");
        }
        if strike.fatal {
            flags.push_str(" FATAL");
        }
        match strike.suffered {
            Some(t) => println!(
                "{:>3}  {:<8} {:<32} dmg {:>6.1} pain {:>6.1} stun {:>6.1}{}",
                strike.strike, strike.outcome, location, t.damage, t.pain, t.stun, flags
            ),
            None => println!("{:>3}  {}", strike.strike, strike.outcome),
        }
    }
    if !summary.limbs.is_empty() {
        println!("\nLimbs:");
        for (name, status) in &summary.limbs {
            println!("  {:<12} {:?}", name, status);
        }
    }
    println!("\nDead: {}", summary.dead);
}
