//! Strategies for the Noah's Ark simulation.
//!
//! | Player | Noah | Helpers |
//! |--------|------|---------|
//! | `random` | [`RandomPlayer`] (chatters only) | [`RandomPlayer`] |
//! | `greedy` | [`NoahCoordinator`] | [`GreedyHelper`] |
//! | `stay` | [`Stay`] | [`Stay`] |
//!
//! A player is looked up by name in a [`StrategyRegistry`], which turns an
//! [`AgentSeat`] into one boxed [`Strategy`] per agent.

use std::collections::BTreeMap;
use std::fmt;

use ark_logic::strategy::Stay;
use ark_logic::{AgentRole, AgentSeat, Strategy};

pub mod greedy;
pub mod nav;
pub mod noah;
pub mod random;

pub use greedy::GreedyHelper;
pub use noah::NoahCoordinator;
pub use random::RandomPlayer;

type StrategyFactory = Box<dyn Fn(&AgentSeat) -> Box<dyn Strategy> + Send + Sync + 'static>;

/// Player name → strategy factory.
pub struct StrategyRegistry {
    entries: BTreeMap<String, StrategyFactory>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("players", &self.names())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("random", |seat| Box::new(RandomPlayer::new(seat)));
        registry.register("greedy", |seat: &AgentSeat| -> Box<dyn Strategy> {
            match seat.role {
                AgentRole::Noah => Box::new(NoahCoordinator::new(seat)),
                AgentRole::Helper => Box::new(GreedyHelper::new(seat)),
            }
        });
        registry.register("stay", |_| Box::new(Stay));
        registry
    }
}

impl StrategyRegistry {
    /// A registry with no players at all.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register (or replace) a player.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&AgentSeat) -> Box<dyn Strategy> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered player names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Build the strategy `name` assigns to `seat`.
    pub fn build(&self, name: &str, seat: &AgentSeat) -> Result<Box<dyn Strategy>, UnknownPlayer> {
        let factory = self.factory(name)?;
        Ok(factory(seat))
    }

    /// Seat-to-strategy closure for `name`, ready for `Simulation::new`.
    pub fn factory(
        &self,
        name: &str,
    ) -> Result<impl Fn(&AgentSeat) -> Box<dyn Strategy> + '_, UnknownPlayer> {
        let factory = self.entries.get(name).ok_or_else(|| UnknownPlayer {
            name: name.to_string(),
            known: self.entries.keys().cloned().collect(),
        })?;
        Ok(move |seat: &AgentSeat| factory(seat))
    }
}

/// Requested player name is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlayer {
    pub name: String,
    pub known: Vec<String>,
}

impl fmt::Display for UnknownPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown player '{}' (available: {})",
            self.name,
            self.known.join(", ")
        )
    }
}

impl std::error::Error for UnknownPlayer {}
