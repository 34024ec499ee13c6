//! Turn scheduler — owns the world, the strategies, and the random stream.
//!
//! Phase order for every turn:
//!
//! | # | Phase | Module |
//! |---|-------|--------|
//! | 1 | Build one observation per live agent | [`visibility`](crate::visibility) |
//! | 2 | Collect actions (optionally on the rayon pool) | [`strategy`](crate::strategy) |
//! | 3 | Move, release, capture, deliver | [`resolver`](crate::resolver) |
//! | 4 | Free animals wander | [`behavior`](crate::behavior) |
//! | 5 | Ledger bookkeeping and turn report | [`ledger`](crate::ledger) |
//! | 6 | Advance the clock, check rain / flood / termination | here |
//!
//! State machine: `Running → FloodActive` when the clock reaches `R`,
//! `FloodActive → Terminated` when it reaches `T` (or earlier once nothing is
//! left to do). `Terminated` is absorbing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::behavior::AnimalBehavior;
use crate::config::{ConfigError, RunConfig};
use crate::entities::{AgentId, AgentRole};
use crate::geometry::Position;
use crate::resolver;
use crate::scoring::{PairScoring, ScoringPolicy};
use crate::snapshot::{RunState, RunSummary, Termination, TurnReport, WorldSnapshot};
use crate::strategy::{agent_seed, Action, AgentSeat, Strategy};
use crate::visibility::{Observation, Visibility};
use crate::world::World;

pub struct Simulation {
    config: RunConfig,
    world: World,
    strategies: Vec<Box<dyn Strategy>>,
    rng: ChaCha8Rng,
    visibility: Visibility,
    behavior: AnimalBehavior,
    scoring: Box<dyn ScoringPolicy>,
    state: RunState,
    termination: Option<Termination>,
}

impl Simulation {
    /// Validate `config`, generate the world, and build one strategy per agent.
    pub fn new<F>(config: RunConfig, mut make_strategy: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&AgentSeat) -> Box<dyn Strategy>,
    {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let world = World::generate(&config, &mut rng);
        let rain_turn = config.rain_turn();
        let populations: Vec<u32> = config.species.iter().map(|s| s.population).collect();

        let strategies = world
            .agents()
            .iter()
            .map(|agent| {
                make_strategy(&AgentSeat {
                    id: agent.id,
                    role: agent.role,
                    seed: agent_seed(config.seed, agent.id),
                    world_side: config.world_side,
                    ark: world.ark(),
                    num_helpers: config.num_helpers,
                    populations: populations.clone(),
                    total_turns: config.turns,
                    rain_turn,
                })
            })
            .collect::<Vec<_>>();

        log::info!(
            "Run ready: {} agents, {} species, {} animals, ark at ({}, {}), T={} R={} seed={}",
            world.agents().len(),
            config.species.len(),
            world.animals().len(),
            config.ark.0,
            config.ark.1,
            config.turns,
            rain_turn,
            config.seed
        );

        let state = if rain_turn == 0 {
            RunState::FloodActive
        } else {
            RunState::Running
        };

        Ok(Self {
            visibility: Visibility {
                identify_distance: config.identify_distance,
                total_turns: config.turns,
                rain_turn,
            },
            behavior: AnimalBehavior {
                move_probability: config.animal_move_probability,
                move_radius: config.animal_move_radius,
            },
            scoring: Box::new(PairScoring::default()),
            config,
            world,
            strategies,
            rng,
            state,
            termination: None,
        })
    }

    /// Replace the scoring policy used by [`Simulation::summary`].
    pub fn with_scoring(mut self, scoring: Box<dyn ScoringPolicy>) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn is_terminated(&self) -> bool {
        self.state == RunState::Terminated
    }

    /// Strategy kind per agent id.
    pub fn strategy_kinds(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, self.state)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::build(
            &self.world,
            self.scoring.score(self.world.ledger()),
            self.scoring.name(),
            self.termination,
        )
    }

    /// Stop the run now. Nothing further is processed.
    pub fn cancel(&mut self) {
        if self.state != RunState::Terminated {
            log::info!("Run cancelled at turn {}", self.world.turn());
            self.state = RunState::Terminated;
            self.termination = Some(Termination::Cancelled);
        }
    }

    /// Process one turn. `None` once the run has terminated.
    pub fn step(&mut self) -> Option<TurnReport> {
        if self.state == RunState::Terminated {
            return None;
        }
        let turn = self.world.turn();

        // 1. Observations, all from the same start-of-turn state
        let observations = self.visibility.observe_all(&self.world);

        // 2. Decisions
        let actions = self.collect_actions(&observations);
        let origins: Vec<Position> = self.world.agents().iter().map(|a| a.position).collect();
        let mut sent = vec![None; origins.len()];
        for (id, action) in &actions {
            if let Some(slot) = sent.get_mut(id.index()) {
                *slot = action.broadcast;
            }
        }

        // 3. Resolution
        let resolution = resolver::resolve(&mut self.world, &actions);
        self.world.exchange_messages(&origins, &sent);

        // 4. Animal wandering
        let animals_moved = self.behavior.step(&mut self.world, &mut self.rng);

        // 5. Ledger bookkeeping
        if !resolution.deliveries.is_empty() {
            log::debug!(
                "Turn {}: {} animals delivered, {} species complete",
                turn,
                resolution.deliveries.len(),
                self.world.ledger().complete_count()
            );
        }
        let mut report = TurnReport {
            turn,
            captures: resolution.captures,
            releases: resolution.releases,
            deliveries: resolution.deliveries,
            ignored_requests: resolution.ignored,
            animals_moved,
            lost_agents: Vec::new(),
        };

        // 6. Clock
        self.world.advance_clock();
        let now = self.world.turn();

        if self.state == RunState::Running && now >= self.visibility.rain_turn {
            log::info!("Rain begins at turn {}", now);
            self.state = RunState::FloodActive;
        }

        if now >= self.config.turns {
            report.lost_agents = self.flood();
            self.finish(Termination::Flood);
        } else if self.config.early_termination && self.nothing_left_to_do() {
            self.finish(Termination::AllHome);
        }

        debug_assert!(
            self.world.check_invariants().is_ok(),
            "invariant violated after turn {}: {:?}",
            turn,
            self.world.check_invariants()
        );

        Some(report)
    }

    /// Step until termination.
    pub fn run(&mut self) -> RunSummary {
        while self.step().is_some() {}
        self.summary()
    }

    /// Step until termination, handing every turn to `observer`.
    pub fn run_with<F>(&mut self, mut observer: F) -> RunSummary
    where
        F: FnMut(&TurnReport, &WorldSnapshot),
    {
        while let Some(report) = self.step() {
            observer(&report, &self.snapshot());
        }
        self.summary()
    }

    fn collect_actions(&mut self, observations: &[Observation]) -> Vec<(AgentId, Action)> {
        let mut by_agent: Vec<Option<&Observation>> = vec![None; self.strategies.len()];
        for obs in observations {
            if let Some(slot) = by_agent.get_mut(obs.me.id.index()) {
                *slot = Some(obs);
            }
        }

        if self.config.parallel {
            self.strategies
                .par_iter_mut()
                .zip(by_agent.par_iter())
                .filter_map(|(strategy, obs)| decide_one(strategy.as_mut(), *obs))
                .collect()
        } else {
            self.strategies
                .iter_mut()
                .zip(by_agent.iter())
                .filter_map(|(strategy, obs)| decide_one(strategy.as_mut(), *obs))
                .collect()
        }
    }

    /// The flood arrives: everyone away from the ark is lost with their flock.
    fn flood(&mut self) -> Vec<AgentId> {
        let stranded: Vec<AgentId> = self
            .world
            .agents()
            .iter()
            .filter(|a| a.is_live() && !self.world.is_at_ark(a.id))
            .map(|a| a.id)
            .collect();

        for &id in &stranded {
            let forfeited = self.world.mark_agent_lost(id);
            log::warn!(
                "{} caught by the flood, {} animals forfeited",
                id,
                forfeited.len()
            );
        }
        stranded
    }

    fn nothing_left_to_do(&self) -> bool {
        self.world.free_animals().next().is_none()
            && self.world.agents().iter().all(|a| {
                a.lost
                    || a.role == AgentRole::Noah
                    || (a.flock.is_empty() && self.world.is_at_ark(a.id))
            })
    }

    fn finish(&mut self, reason: Termination) {
        self.state = RunState::Terminated;
        self.termination = Some(reason);
        log::info!(
            "Run terminated at turn {} ({:?}): {}/{} species complete, {} animals delivered",
            self.world.turn(),
            reason,
            self.world.ledger().complete_count(),
            self.world.ledger().species_count(),
            self.world.ledger().total_delivered()
        );
    }
}

fn decide_one(strategy: &mut dyn Strategy, observation: Option<&Observation>) -> Option<(AgentId, Action)> {
    observation.map(|obs| (obs.me.id, strategy.decide(obs)))
}
