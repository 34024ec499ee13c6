//! Agents, animals, and their identifiers.
//!
//! These are plain data. Every mutation goes through [`World`](crate::world::World)
//! so that capture state and flock contents never drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Agent identifier. `0` is always Noah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

/// Animal identifier, unique across all species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(pub u32);

/// Species identifier (index into the run's species list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl AnimalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl SpeciesId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Single-letter label (`a`, `b`, ...) used in logs.
    pub fn letter(self) -> char {
        char::from_u32('a' as u32 + (self.0 as u32 % 26)).unwrap_or('?')
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Animal gender. `Unknown` only ever appears in observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

/// What an agent is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    /// Stays on the ark; can only broadcast to the Noah board.
    Noah,
    /// Moves, captures, releases, delivers.
    Helper,
}

impl AgentRole {
    pub fn for_id(id: AgentId) -> Self {
        if id.0 == crate::constants::NOAH_ID {
            Self::Noah
        } else {
            Self::Helper
        }
    }

    pub fn can_move(self) -> bool {
        matches!(self, Self::Helper)
    }
}

/// Where an animal currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureState {
    Free,
    InFlock(AgentId),
    Delivered,
    /// Lost in the flood together with this agent.
    Forfeited(AgentId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub species: SpeciesId,
    pub gender: Gender,
    pub position: Position,
    pub state: CaptureState,
}

impl Animal {
    pub fn is_free(&self) -> bool {
        self.state == CaptureState::Free
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub role: AgentRole,
    pub position: Position,
    pub speed: f64,
    pub sight: f64,
    pub capacity: usize,
    /// Captured animals in capture order.
    pub flock: Vec<AnimalId>,
    pub lost: bool,
}

impl Agent {
    pub fn is_live(&self) -> bool {
        !self.lost
    }

    pub fn flock_full(&self) -> bool {
        self.flock.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noah_is_agent_zero() {
        assert_eq!(AgentRole::for_id(AgentId(0)), AgentRole::Noah);
        assert_eq!(AgentRole::for_id(AgentId(3)), AgentRole::Helper);
        assert!(!AgentRole::Noah.can_move());
    }

    #[test]
    fn species_letters() {
        assert_eq!(SpeciesId(0).letter(), 'a');
        assert_eq!(SpeciesId(2).to_string(), "c");
        assert_eq!(AgentId(4).to_string(), "H4");
    }
}
