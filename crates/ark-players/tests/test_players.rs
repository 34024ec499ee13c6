//! Full runs with the registered players.

use ark_logic::config::PlacedAnimal;
use ark_logic::{
    AgentId, Gender, RunConfig, RunSummary, Simulation, SpeciesId, SpeciesSpec, Termination,
};
use ark_players::StrategyRegistry;

// ── Helpers ────────────────────────────────────────────────────────────

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

fn run(player: &str, config: RunConfig) -> (Simulation, RunSummary) {
    let registry = StrategyRegistry::default();
    let factory = registry.factory(player).expect("registered player");
    let mut sim = Simulation::new(config, factory).expect("valid config");
    let summary = sim.run();
    (sim, summary)
}

fn crowded(seed: u64) -> RunConfig {
    RunConfig {
        world_side: 80.0,
        num_helpers: 8,
        ark: (40, 40),
        turns: 600,
        rain_turn: Some(500),
        seed,
        speed: 1.0,
        sight: 10.0,
        ..RunConfig::default()
    }
    .with_populations(&[2, 2, 3, 4, 2, 5])
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn greedy_saves_the_nearby_pair() {
    let (_, summary) = run("greedy", pair_config((20, 80), 50, 40));
    assert!(summary.species_complete(SpeciesId(0)));
    assert_eq!(summary.score, 2);
    assert!(summary.lost_agents.is_empty());
    assert_eq!(summary.termination, Some(Termination::AllHome));
    assert!(summary.turns_elapsed < 40, "took {} turns", summary.turns_elapsed);
}

#[test]
fn greedy_gets_home_when_the_ark_is_far() {
    let (_, summary) = run("greedy", pair_config((999, 999), 5, 4));
    assert!(!summary.species_complete(SpeciesId(0)));
    assert_eq!(summary.score, 0);
    assert!(summary.lost_agents.is_empty(), "returned in time");
    assert_eq!(summary.termination, Some(Termination::Flood));
}

#[test]
fn random_player_cannot_save_a_distant_pair() {
    let (_, summary) = run("random", pair_config((999, 999), 5, 4));
    assert!(!summary.species_complete(SpeciesId(0)));
    assert_eq!(summary.total_delivered, 0);
    assert_eq!(summary.turns_elapsed, 5);
}

#[test]
fn stay_player_delivers_nothing() {
    let (_, summary) = run("stay", crowded(3));
    assert_eq!(summary.total_delivered, 0);
    assert!(summary.lost_agents.is_empty());
}

// ── Crowded worlds ─────────────────────────────────────────────────────

#[test]
fn greedy_never_loses_a_helper_to_the_flood() {
    for seed in 0..4 {
        let (sim, summary) = run("greedy", crowded(seed));
        assert!(summary.lost_agents.is_empty(), "seed {seed}: {:?}", summary.lost_agents);
        assert!(summary.complete_species > 0, "seed {seed}");
        assert_eq!(sim.world().check_invariants(), Ok(()));
    }
}

#[test]
fn random_player_delivers_something() {
    let (sim, summary) = run("random", crowded(9).with_populations(&[6; 10]));
    assert!(summary.total_delivered > 0);
    assert_eq!(sim.world().check_invariants(), Ok(()));
}

#[test]
fn players_are_reproducible() {
    for player in ["random", "greedy"] {
        let (a, first) = run(player, crowded(21));
        let (b, second) = run(player, crowded(21));
        assert_eq!(first, second, "{player}");
        assert_eq!(a.snapshot(), b.snapshot(), "{player}");
    }
}

#[test]
fn parallel_runs_match_sequential() {
    let mut parallel = crowded(4);
    parallel.parallel = true;
    let (_, seq) = run("greedy", crowded(4));
    let (_, par) = run("greedy", parallel);
    assert_eq!(seq, par);
}

#[test]
fn noah_stays_on_the_ark() {
    let (sim, _) = run("greedy", crowded(1));
    let noah = sim.world().agent(AgentId(0)).expect("noah");
    assert!(sim.world().is_at_ark(noah.id));
    assert!(!noah.lost);
}
