//! Noah's Ark Headless Simulation Harness
//!
//! Runs the turn engine in-process with one of the registered players, or
//! sweeps the engine with the built-in validation checks.
//!
//! Usage:
//!   cargo run -p ark-simtest -- run --player greedy --num-helpers 10 --animals 2 2 3 --ark 500 500
//!   cargo run -p ark-simtest -- run --player random --map maps/pair.json --speed 5 --sight 10
//!   cargo run -p ark-simtest -- check --verbose

use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ark_logic::config::PlacedAnimal;
use ark_logic::{
    AgentId, CaptureState, ConfigError, Gender, RunConfig, RunSummary, Scenario, Simulation,
    SpeciesId, SpeciesSpec, Termination,
};
use ark_players::StrategyRegistry;
use clap::{Parser, Subcommand};

// ── Bundled maps (same JSON the `run --map` flag reads) ─────────────────
const PAIR_MAP: &str = include_str!("../../../maps/pair.json");
const FAR_ARK_MAP: &str = include_str!("../../../maps/far_ark.json");
const DEFAULT_MAP: &str = include_str!("../../../maps/default.json");
const CORNER_MAP: &str = include_str!("../../../maps/corner.json");

#[derive(Parser)]
#[command(name = "ark-simtest")]
#[command(version)]
#[command(about = "Run Noah's helpers headlessly, or validate the turn engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and print the results
    Run {
        /// Player for every agent (see `ark-simtest players`)
        #[arg(short, long, default_value = "random")]
        player: String,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Number of helpers, Noah included
        #[arg(long, conflicts_with = "map", required_unless_present = "map")]
        num_helpers: Option<u32>,

        /// Population of each species
        #[arg(long, num_args = 1.., conflicts_with = "map", required_unless_present = "map")]
        animals: Vec<u32>,

        /// Ark position X Y
        #[arg(long, num_args = 2, value_names = ["X", "Y"], conflicts_with = "map", required_unless_present = "map")]
        ark: Vec<i64>,

        /// Scenario file with num_helpers, animals and ark
        #[arg(long)]
        map: Option<PathBuf>,

        /// Turn budget
        #[arg(short = 'T', long = "turns")]
        turns: Option<u32>,

        /// Turn the rain starts (default T - 1008)
        #[arg(long)]
        rain_turn: Option<u32>,

        /// Distance a helper may cover per turn
        #[arg(long)]
        speed: Option<f64>,

        /// Sight radius
        #[arg(long)]
        sight: Option<f64>,

        /// Collect decisions on the rayon pool
        #[arg(long)]
        parallel: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered players
    Players,

    /// Run the validation harness
    Check {
        /// Show passing checks too
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            player,
            seed,
            num_helpers,
            animals,
            ark,
            map,
            turns,
            rain_turn,
            speed,
            sight,
            parallel,
            json,
        } => {
            let mut config = match map {
                Some(path) => Scenario::from_file(&path)?.apply(RunConfig::default())?,
                None => RunConfig {
                    num_helpers: num_helpers.unwrap_or_default(),
                    ark: match ark.as_slice() {
                        [x, y] => (*x, *y),
                        _ => return Err("--ark takes exactly two coordinates".into()),
                    },
                    ..RunConfig::default()
                }
                .with_populations(&animals),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(turns) = turns {
                config.turns = turns;
            }
            if rain_turn.is_some() {
                config.rain_turn = rain_turn;
            }
            if let Some(speed) = speed {
                config.speed = speed;
            }
            if let Some(sight) = sight {
                config.sight = sight;
            }
            config.parallel = parallel;
            run_simulation(&player, config, json)
        }

        Commands::Players => {
            for name in StrategyRegistry::default().names() {
                println!("{}", name);
            }
            Ok(())
        }

        Commands::Check { verbose } => {
            run_checks(verbose);
            Ok(())
        }
    }
}

// ── Run ─────────────────────────────────────────────────────────────────

fn run_simulation(player: &str, config: RunConfig, json: bool) -> Result<(), Box<dyn Error>> {
    let registry = StrategyRegistry::default();
    let factory = registry.factory(player)?;
    let mut sim = Simulation::new(config, factory)?;

    log::info!("Running '{}' for up to {} turns", player, sim.config().turns);

    let mut times: Vec<Duration> = Vec::new();
    loop {
        let start = Instant::now();
        if sim.step().is_none() {
            break;
        }
        times.push(start.elapsed());
    }
    let summary = sim.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    let total: f64 = times.iter().map(Duration::as_secs_f64).sum();
    println!("RESULTS");
    println!("{}", "#".repeat(20));
    println!("SCORE={}", summary.score);
    if times.is_empty() || total <= 0.0 {
        println!("TOTAL_TURN_TIME=-1");
        println!("TURNS_PER_SECOND=-1");
    } else {
        println!("TOTAL_TURN_TIME={:.4}s", total);
        println!("TURNS_PER_SECOND={:.0}", times.len() as f64 / total);
    }
    println!("{}", "#".repeat(20));
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Turns: {} ({:?})",
        summary.turns_elapsed,
        summary.termination.unwrap_or(Termination::Flood)
    );
    for s in &summary.species {
        let mark = if s.complete { "✓" } else { "✗" };
        println!("  {} {}: {}M {}F", mark, s.species, s.males, s.females);
    }
    for lost in &summary.lost_agents {
        println!(
            "  {} lost in the flood with {} animals",
            lost.id,
            lost.forfeited.len()
        );
    }
    println!(
        "Complete: {}/{}, delivered: {}, scoring: {}\n",
        summary.complete_species,
        summary.species.len(),
        summary.total_delivered,
        summary.scoring
    );
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn run_checks(verbose: bool) {
    println!("=== Noah's Ark Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration and map validation
    results.extend(validate_configs(verbose));

    // 2. Bundled maps
    results.extend(validate_maps(verbose));

    // 3. Physical invariants under every player
    results.extend(validate_invariants(verbose));

    // 4. Determinism
    results.extend(validate_determinism(verbose));

    // 5. Flood
    results.extend(validate_flood(verbose));

    // 6. Reference scenarios
    results.extend(validate_scenarios(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn pair_config(ark: (i64, i64), turns: u32, rain_turn: u32) -> RunConfig {
    RunConfig {
        num_helpers: 2,
        ark,
        turns,
        rain_turn: Some(rain_turn),
        seed: 1234,
        speed: 5.0,
        sight: 10.0,
        species: vec![SpeciesSpec::placed(vec![
            PlacedAnimal {
                gender: Gender::Male,
                x: 25.0,
                y: 85.0,
            },
            PlacedAnimal {
                gender: Gender::Female,
                x: 15.0,
                y: 75.0,
            },
        ])],
        ..RunConfig::default()
    }
}

fn small_world(seed: u64) -> RunConfig {
    RunConfig {
        world_side: 100.0,
        num_helpers: 12,
        ark: (50, 50),
        turns: 800,
        rain_turn: Some(700),
        seed,
        sight: 10.0,
        ..RunConfig::default()
    }
    .with_populations(&[2, 2, 3, 4, 5, 2, 2, 6])
}

fn simulate(player: &str, config: RunConfig) -> Result<(Simulation, RunSummary), String> {
    let registry = StrategyRegistry::default();
    let factory = registry.factory(player).map_err(|e| e.to_string())?;
    let mut sim = Simulation::new(config, factory).map_err(|e| e.to_string())?;
    let summary = sim.run();
    Ok((sim, summary))
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_configs(verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    results.push(check(
        "default config valid",
        RunConfig::default().validate().is_ok(),
        format!("{} species, T={}", RunConfig::default().species.len(), RunConfig::default().turns),
    ));

    let rejected: [(&str, RunConfig, fn(&ConfigError) -> bool); 4] = [
        (
            "rejects one helper",
            RunConfig {
                num_helpers: 1,
                ..RunConfig::default()
            },
            |e| matches!(e, ConfigError::TooFewHelpers { .. }),
        ),
        (
            "rejects population of one",
            RunConfig::default().with_populations(&[2, 1]),
            |e| matches!(e, ConfigError::PopulationTooSmall { .. }),
        ),
        (
            "rejects ark off the map",
            RunConfig {
                ark: (1000, 0),
                ..RunConfig::default()
            },
            |e| matches!(e, ConfigError::ArkOutOfBounds { .. }),
        ),
        (
            "rejects rain after deadline",
            RunConfig {
                turns: 10,
                rain_turn: Some(20),
                ..RunConfig::default()
            },
            |e| matches!(e, ConfigError::RainAfterDeadline { .. }),
        ),
    ];
    for (name, config, expected) in rejected {
        let outcome = config.validate();
        let passed = outcome.as_ref().err().is_some_and(expected);
        let detail = match outcome {
            Ok(()) => "accepted".to_string(),
            Err(e) => e.to_string(),
        };
        if verbose {
            println!("  {}: {}", name, detail);
        }
        results.push(check(name, passed, detail));
    }

    results
}

// ── 2. Maps ─────────────────────────────────────────────────────────────

fn validate_maps(verbose: bool) -> Vec<TestResult> {
    println!("--- Bundled Maps ---");
    let mut results = Vec::new();

    for (name, text) in [
        ("pair.json", PAIR_MAP),
        ("far_ark.json", FAR_ARK_MAP),
        ("default.json", DEFAULT_MAP),
        ("corner.json", CORNER_MAP),
    ] {
        let loaded = Scenario::from_json(text).and_then(|s| s.apply(RunConfig::default()));
        match loaded {
            Ok(config) => {
                if verbose {
                    println!(
                        "  {}: {} helpers, {} animals, ark {:?}, T={}",
                        name,
                        config.num_helpers,
                        config.total_animals(),
                        config.ark,
                        config.turns
                    );
                }
                results.push(check(
                    &format!("map {}", name),
                    true,
                    format!("{} species", config.species.len()),
                ));
            }
            Err(e) => results.push(check(&format!("map {}", name), false, e.to_string())),
        }
    }

    results
}

// ── 3. Invariants ───────────────────────────────────────────────────────

fn validate_invariants(verbose: bool) -> Vec<TestResult> {
    println!("--- Physical Invariants ---");
    let mut results = Vec::new();
    let registry = StrategyRegistry::default();

    for player in registry.names() {
        let mut violations = Vec::new();
        let mut turns = 0;
        for seed in 0..5 {
            let Ok(factory) = registry.factory(player) else {
                continue;
            };
            let mut sim = match Simulation::new(small_world(seed), factory) {
                Ok(sim) => sim,
                Err(e) => {
                    violations.push(format!("seed {}: {}", seed, e));
                    continue;
                }
            };
            let speed = sim.config().speed;
            let mut before: Vec<_> = sim.world().agents().iter().map(|a| a.position).collect();
            while sim.step().is_some() {
                turns += 1;
                let world = sim.world();
                if let Err(e) = world.check_invariants() {
                    violations.push(format!("seed {} turn {}: {}", seed, world.turn(), e));
                    break;
                }
                for (agent, prev) in world.agents().iter().zip(&before) {
                    if agent.position.distance(prev) > speed + 1e-9 {
                        violations.push(format!("seed {}: {} outran its speed", seed, agent.id));
                    }
                }
                before = world.agents().iter().map(|a| a.position).collect();
            }
        }
        if verbose {
            println!("  {}: {} turns checked", player, turns);
        }
        results.push(check(
            &format!("invariants hold for '{}'", player),
            violations.is_empty(),
            if violations.is_empty() {
                format!("{} turns", turns)
            } else {
                violations.join("; ")
            },
        ));
    }

    results
}

// ── 4. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(_verbose: bool) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    for player in ["random", "greedy"] {
        let first = simulate(player, small_world(77));
        let second = simulate(player, small_world(77));
        let passed = match (&first, &second) {
            (Ok((a, sa)), Ok((b, sb))) => sa == sb && a.snapshot() == b.snapshot(),
            _ => false,
        };
        results.push(check(
            &format!("'{}' reproducible", player),
            passed,
            "same seed, same final snapshot",
        ));
    }

    let mut parallel = small_world(77);
    parallel.parallel = true;
    let passed = match (simulate("greedy", small_world(77)), simulate("greedy", parallel)) {
        (Ok((_, a)), Ok((_, b))) => a == b,
        _ => false,
    };
    results.push(check(
        "parallel decisions match sequential",
        passed,
        "greedy, seed 77",
    ));

    results
}

// ── 5. Flood ────────────────────────────────────────────────────────────

fn validate_flood(verbose: bool) -> Vec<TestResult> {
    println!("--- Flood ---");
    let mut results = Vec::new();

    let mut config = small_world(3);
    config.turns = 120;
    config.rain_turn = Some(60);
    config.early_termination = false;

    match simulate("random", config) {
        Ok((sim, summary)) => {
            let world = sim.world();
            let wrong_fate: Vec<AgentId> = world
                .agents()
                .iter()
                .filter(|a| a.lost == world.is_at_ark(a.id))
                .map(|a| a.id)
                .collect();
            results.push(check(
                "stranded helpers are lost, home helpers are not",
                wrong_fate.is_empty(),
                format!("{} lost", summary.lost_agents.len()),
            ));

            let leaked = summary
                .lost_agents
                .iter()
                .flat_map(|l| l.forfeited.iter().map(move |a| (l.id, a.id)))
                .filter(|&(agent, animal)| {
                    world.animal(animal).map(|a| a.state) != Some(CaptureState::Forfeited(agent))
                        || world.ledger().contains(animal)
                })
                .count();
            if verbose {
                for lost in &summary.lost_agents {
                    println!("  {} forfeited {} animals", lost.id, lost.forfeited.len());
                }
            }
            results.push(check(
                "forfeited animals never delivered",
                leaked == 0,
                format!("{} leaked", leaked),
            ));
        }
        Err(e) => results.push(check("flood run", false, e)),
    }

    results
}

// ── 6. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Reference Scenarios ---");
    let mut results = Vec::new();

    match simulate("greedy", pair_config((20, 80), 50, 40)) {
        Ok((_, summary)) => {
            if verbose {
                print_summary(&summary);
            }
            results.push(check(
                "nearby pair saved before the rain",
                summary.species_complete(SpeciesId(0)) && summary.turns_elapsed < 40,
                format!(
                    "score {}, {} turns",
                    summary.score, summary.turns_elapsed
                ),
            ));
        }
        Err(e) => results.push(check("nearby pair", false, e)),
    }

    match simulate("greedy", pair_config((999, 999), 5, 4)) {
        Ok((_, summary)) => {
            if verbose {
                print_summary(&summary);
            }
            results.push(check(
                "far ark with T=5 saves nothing",
                !summary.species_complete(SpeciesId(0)) && summary.score == 0,
                format!("{} agents lost", summary.lost_agents.len()),
            ));
        }
        Err(e) => results.push(check("far ark", false, e)),
    }

    results
}
