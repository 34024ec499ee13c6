//! Strategy interface — the single extension point of the engine.
//!
//! A strategy sees one [`Observation`] per turn and answers with an
//! [`Action`]. Whatever it remembers between turns is its own business; the
//! engine only enforces what the action may physically do.

use serde::{Deserialize, Serialize};

use crate::entities::{AgentId, AgentRole, AnimalId};
use crate::geometry::{Displacement, Position};
use crate::visibility::Observation;

/// An agent's intent for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Requested movement; `None` stays put.
    pub movement: Option<Displacement>,
    /// Animals to pick up after moving, tried in order.
    pub capture: Vec<AnimalId>,
    /// Flock animals to set free.
    pub release: Vec<AnimalId>,
    pub broadcast: Option<u8>,
}

impl Action {
    pub fn stay() -> Self {
        Self::default()
    }

    pub fn move_by(dx: f64, dy: f64) -> Self {
        Self {
            movement: Some(Displacement::new(dx, dy)),
            ..Self::default()
        }
    }

    /// Head straight for `target`, at most `speed` this turn.
    pub fn move_towards(from: Position, target: Position, speed: f64) -> Self {
        Self {
            movement: Some(from.towards(&target).clamp_length(speed)),
            ..Self::default()
        }
    }

    pub fn with_capture(mut self, animal: AnimalId) -> Self {
        self.capture.push(animal);
        self
    }

    pub fn with_release(mut self, animal: AnimalId) -> Self {
        self.release.push(animal);
        self
    }

    pub fn with_broadcast(mut self, byte: u8) -> Self {
        self.broadcast = Some(byte);
        self
    }
}

/// What a strategy factory knows about the agent it is building for.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSeat {
    pub id: AgentId,
    pub role: AgentRole,
    /// Private seed for the strategy's own randomness.
    pub seed: u64,
    pub world_side: f64,
    pub ark: Position,
    pub num_helpers: u32,
    /// Population of each species, by species id.
    pub populations: Vec<u32>,
    pub total_turns: u32,
    pub rain_turn: u32,
}

/// Derive an agent's private seed from the run seed.
pub fn agent_seed(run_seed: u64, agent: AgentId) -> u64 {
    let mut h = run_seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(agent.0 as u64 + 1);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h
}

/// Shared interface implemented by every decision strategy.
pub trait Strategy: Send {
    /// Stable identifier (useful for logs and summaries).
    fn kind(&self) -> &'static str;

    /// Choose this turn's action from the observation.
    fn decide(&mut self, observation: &Observation) -> Action;
}

/// Does nothing, every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stay;

impl Strategy for Stay {
    fn kind(&self) -> &'static str {
        "stay"
    }

    fn decide(&mut self, _observation: &Observation) -> Action {
        Action::stay()
    }
}
