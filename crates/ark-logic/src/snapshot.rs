//! Read-only views handed to collaborators: per-turn snapshots, turn
//! reports, and the final run summary.

use serde::{Deserialize, Serialize};

use crate::entities::*;
use crate::geometry::Position;
use crate::ledger::SpeciesCount;
use crate::world::World;

/// Scheduler state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    /// Clock has reached the rain turn `R`.
    FloodActive,
    Terminated,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The clock reached `T` and the flood arrived.
    Flood,
    /// No free animals left and everyone is home with an empty flock.
    AllHome,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub role: AgentRole,
    pub position: Position,
    pub flock: Vec<AnimalId>,
    pub lost: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub id: AnimalId,
    pub species: SpeciesId,
    pub gender: Gender,
    pub position: Position,
    pub state: CaptureState,
}

/// Full world state after a turn, enough to draw or log it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub turn: u32,
    pub state: RunState,
    pub ark: Position,
    pub agents: Vec<AgentSnapshot>,
    pub animals: Vec<AnimalSnapshot>,
    pub ledger: Vec<SpeciesCount>,
    pub noah_board: Option<u8>,
}

impl WorldSnapshot {
    pub fn capture(world: &World, state: RunState) -> Self {
        Self {
            turn: world.turn(),
            state,
            ark: world.ark(),
            agents: world
                .agents()
                .iter()
                .map(|a| AgentSnapshot {
                    id: a.id,
                    role: a.role,
                    position: a.position,
                    flock: a.flock.clone(),
                    lost: a.lost,
                })
                .collect(),
            animals: world
                .animals()
                .iter()
                .map(|a| AnimalSnapshot {
                    id: a.id,
                    species: a.species,
                    gender: a.gender,
                    position: a.position,
                    state: a.state,
                })
                .collect(),
            ledger: world.ledger().counts().to_vec(),
            noah_board: world.comms().noah_board(),
        }
    }
}

/// What happened during one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Turn index that was just processed.
    pub turn: u32,
    pub captures: Vec<(AgentId, AnimalId)>,
    pub releases: Vec<(AgentId, AnimalId)>,
    pub deliveries: Vec<(AgentId, AnimalId)>,
    pub ignored_requests: usize,
    pub animals_moved: usize,
    pub lost_agents: Vec<AgentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesSummary {
    pub species: SpeciesId,
    pub males: u32,
    pub females: u32,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForfeitedAnimal {
    pub id: AnimalId,
    pub species: SpeciesId,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostAgent {
    pub id: AgentId,
    pub forfeited: Vec<ForfeitedAnimal>,
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub species: Vec<SpeciesSummary>,
    pub complete_species: usize,
    pub total_delivered: usize,
    pub lost_agents: Vec<LostAgent>,
    pub score: i64,
    pub scoring: String,
    pub turns_elapsed: u32,
    pub termination: Option<Termination>,
}

impl RunSummary {
    pub fn build(
        world: &World,
        score: i64,
        scoring: &str,
        termination: Option<Termination>,
    ) -> Self {
        let ledger = world.ledger();
        let species = ledger
            .counts()
            .iter()
            .enumerate()
            .map(|(i, c)| SpeciesSummary {
                species: SpeciesId(i as u16),
                males: c.males,
                females: c.females,
                complete: c.is_complete(),
            })
            .collect();

        let lost_agents = world
            .agents()
            .iter()
            .filter(|a| a.lost)
            .map(|a| LostAgent {
                id: a.id,
                forfeited: world
                    .animals()
                    .iter()
                    .filter(|animal| animal.state == CaptureState::Forfeited(a.id))
                    .map(|animal| ForfeitedAnimal {
                        id: animal.id,
                        species: animal.species,
                        gender: animal.gender,
                    })
                    .collect(),
            })
            .collect();

        Self {
            species,
            complete_species: ledger.complete_count(),
            total_delivered: ledger.total_delivered(),
            lost_agents,
            score,
            scoring: scoring.to_string(),
            turns_elapsed: world.turn(),
            termination,
        }
    }

    pub fn species_complete(&self, species: SpeciesId) -> bool {
        self.species
            .get(species.index())
            .map(|s| s.complete)
            .unwrap_or(false)
    }
}
