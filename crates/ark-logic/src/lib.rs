//! Turn-resolution engine for the Noah's Ark simulation.
//!
//! Helpers roam a square world, capture animals into bounded flocks and bring
//! them back to the ark before the flood. This crate holds the authoritative
//! world state and resolves every turn deterministically; the decision logic
//! of each agent is supplied from outside through the [`Strategy`] trait.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`behavior`] | Random wandering of free animals |
//! | [`comms`] | One-byte broadcasts and the Noah board |
//! | [`config`] | Run configuration, defaults, validation |
//! | [`constants`] | World size, speed, sight, flock size, rain lead time |
//! | [`entities`] | Agents, animals, ids, genders, capture states |
//! | [`geometry`] | Positions, displacements, cells, world bounds |
//! | [`ledger`] | Per-species delivered counts on the ark |
//! | [`resolver`] | Movement, release, capture and delivery resolution |
//! | [`scenario`] | JSON map files |
//! | [`scheduler`] | Turn loop, rain / flood state machine, termination |
//! | [`scoring`] | Pluggable scoring policies |
//! | [`snapshot`] | Turn reports, world snapshots, run summary |
//! | [`strategy`] | Action type and the strategy interface |
//! | [`visibility`] | Per-agent observations |
//! | [`world`] | World state and its atomic operations |

pub mod behavior;
pub mod comms;
pub mod config;
pub mod constants;
pub mod entities;
pub mod geometry;
pub mod ledger;
pub mod resolver;
pub mod scenario;
pub mod scheduler;
pub mod scoring;
pub mod snapshot;
pub mod strategy;
pub mod visibility;
pub mod world;

pub use config::{ConfigError, RunConfig, SpeciesSpec};
pub use entities::{AgentId, AgentRole, AnimalId, CaptureState, Gender, SpeciesId};
pub use geometry::{Displacement, Position};
pub use scenario::{Scenario, ScenarioError};
pub use scheduler::Simulation;
pub use snapshot::{RunState, RunSummary, Termination, TurnReport, WorldSnapshot};
pub use strategy::{Action, AgentSeat, Strategy};
pub use visibility::Observation;
