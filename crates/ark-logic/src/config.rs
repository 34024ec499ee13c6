//! Run configuration and its validation.
//!
//! A [`RunConfig`] holds fully resolved values. Collaborators (CLI flags,
//! scenario files) build one, and [`RunConfig::validate`] rejects anything the
//! engine cannot run. No turn ever executes on an invalid configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::entities::Gender;
use crate::geometry::{Bounds, Position};

/// An animal with a fixed starting gender and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedAnimal {
    pub gender: Gender,
    pub x: f64,
    pub y: f64,
}

/// One species: how many individuals, and optionally where some of them start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub population: u32,
    /// Explicit placements; the rest of the population is scattered randomly.
    #[serde(default)]
    pub placements: Vec<PlacedAnimal>,
}

impl SpeciesSpec {
    pub fn scattered(population: u32) -> Self {
        Self {
            population,
            placements: Vec::new(),
        }
    }

    pub fn placed(placements: Vec<PlacedAnimal>) -> Self {
        Self {
            population: placements.len() as u32,
            placements,
        }
    }
}

/// Everything the engine needs to start a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub world_side: f64,
    /// Total agents, Noah included.
    pub num_helpers: u32,
    pub species: Vec<SpeciesSpec>,
    /// Integer ark coordinates, must lie in `[0, world_side)`.
    pub ark: (i64, i64),
    /// Total turn budget `T`.
    pub turns: u32,
    /// Rain turn `R`; `None` means `T - RAIN_LEAD_TURNS` (saturating).
    pub rain_turn: Option<u32>,
    pub seed: u64,
    pub speed: f64,
    pub sight: f64,
    pub capacity: usize,
    pub identify_distance: f64,
    pub animal_move_probability: f64,
    pub animal_move_radius: f64,
    /// Stop once nothing is left to do instead of idling until `T`.
    pub early_termination: bool,
    /// Collect strategy decisions on the rayon pool.
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            world_side: WORLD_SIDE,
            num_helpers: 10,
            species: vec![SpeciesSpec::scattered(MIN_POPULATION); 10],
            ark: (500, 500),
            turns: DEFAULT_TURNS,
            rain_turn: None,
            seed: 0,
            speed: MAX_SPEED,
            sight: MAX_SIGHT,
            capacity: MAX_FLOCK_SIZE,
            identify_distance: IDENTIFY_DISTANCE,
            animal_move_probability: ANIMAL_MOVE_PROBABILITY,
            animal_move_radius: ANIMAL_MOVE_RADIUS,
            early_termination: true,
            parallel: false,
        }
    }
}

impl RunConfig {
    /// Replace the species list with randomly scattered populations.
    pub fn with_populations(mut self, populations: &[u32]) -> Self {
        self.species = populations.iter().copied().map(SpeciesSpec::scattered).collect();
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.world_side)
    }

    pub fn ark_position(&self) -> Position {
        Position::new(self.ark.0 as f64, self.ark.1 as f64)
    }

    /// Resolved rain turn `R`.
    pub fn rain_turn(&self) -> u32 {
        self.rain_turn
            .unwrap_or_else(|| self.turns.saturating_sub(RAIN_LEAD_TURNS))
    }

    pub fn total_animals(&self) -> u32 {
        self.species.iter().map(|s| s.population).sum()
    }

    /// Check every constraint the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_side.is_finite() && self.world_side >= 1.0) {
            return Err(ConfigError::InvalidWorldSide(self.world_side));
        }
        if self.num_helpers < MIN_HELPERS {
            return Err(ConfigError::TooFewHelpers {
                found: self.num_helpers,
            });
        }
        if self.species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        if self.species.len() > u16::MAX as usize {
            return Err(ConfigError::TooManySpecies(self.species.len()));
        }

        let (ax, ay) = self.ark;
        let side = self.world_side;
        if !((ax as f64) >= 0.0 && (ax as f64) < side && (ay as f64) >= 0.0 && (ay as f64) < side)
        {
            return Err(ConfigError::ArkOutOfBounds { x: ax, y: ay, side });
        }

        let bounds = self.bounds();
        for (index, spec) in self.species.iter().enumerate() {
            if spec.population < MIN_POPULATION {
                return Err(ConfigError::PopulationTooSmall {
                    species: index,
                    population: spec.population,
                });
            }
            if spec.placements.len() > spec.population as usize {
                return Err(ConfigError::TooManyPlacements {
                    species: index,
                    placed: spec.placements.len(),
                    population: spec.population,
                });
            }
            for p in &spec.placements {
                if p.gender == Gender::Unknown {
                    return Err(ConfigError::UnknownPlacementGender { species: index });
                }
                if !bounds.contains(&Position::new(p.x, p.y)) {
                    return Err(ConfigError::PlacementOutOfBounds {
                        species: index,
                        x: p.x,
                        y: p.y,
                    });
                }
            }
            // A fully placed species must still be completable.
            if spec.placements.len() == spec.population as usize {
                let has = |g: Gender| spec.placements.iter().any(|p| p.gender == g);
                if !has(Gender::Male) || !has(Gender::Female) {
                    return Err(ConfigError::MissingGender { species: index });
                }
            }
        }

        if self.turns == 0 {
            return Err(ConfigError::ZeroTurns);
        }
        if self.rain_turn() > self.turns {
            return Err(ConfigError::RainAfterDeadline {
                rain_turn: self.rain_turn(),
                turns: self.turns,
            });
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(self.speed));
        }
        if !(self.sight.is_finite() && self.sight >= 0.0) {
            return Err(ConfigError::InvalidSight(self.sight));
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(self.identify_distance.is_finite() && self.identify_distance >= 0.0) {
            return Err(ConfigError::InvalidIdentifyDistance(self.identify_distance));
        }
        if !(0.0..=1.0).contains(&self.animal_move_probability) {
            return Err(ConfigError::InvalidProbability(self.animal_move_probability));
        }
        if !(self.animal_move_radius.is_finite() && self.animal_move_radius >= 0.0) {
            return Err(ConfigError::InvalidMoveRadius(self.animal_move_radius));
        }
        Ok(())
    }
}

/// Reasons a configuration is rejected before the first turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidWorldSide(f64),
    TooFewHelpers { found: u32 },
    NoSpecies,
    TooManySpecies(usize),
    PopulationTooSmall { species: usize, population: u32 },
    TooManyPlacements { species: usize, placed: usize, population: u32 },
    UnknownPlacementGender { species: usize },
    PlacementOutOfBounds { species: usize, x: f64, y: f64 },
    MissingGender { species: usize },
    ArkOutOfBounds { x: i64, y: i64, side: f64 },
    ZeroTurns,
    RainAfterDeadline { rain_turn: u32, turns: u32 },
    InvalidSpeed(f64),
    InvalidSight(f64),
    ZeroCapacity,
    InvalidIdentifyDistance(f64),
    InvalidProbability(f64),
    InvalidMoveRadius(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWorldSide(s) => write!(f, "world side must be >= 1, got {}", s),
            ConfigError::TooFewHelpers { found } => {
                write!(f, "num_helpers must be >= {}, got {}", MIN_HELPERS, found)
            }
            ConfigError::NoSpecies => write!(f, "at least one species is required"),
            ConfigError::TooManySpecies(n) => write!(f, "too many species: {}", n),
            ConfigError::PopulationTooSmall {
                species,
                population,
            } => write!(
                f,
                "species {} has population {}, each population must be >= {}",
                species, population, MIN_POPULATION
            ),
            ConfigError::TooManyPlacements {
                species,
                placed,
                population,
            } => write!(
                f,
                "species {} places {} animals but its population is {}",
                species, placed, population
            ),
            ConfigError::UnknownPlacementGender { species } => {
                write!(f, "species {} places an animal with unknown gender", species)
            }
            ConfigError::PlacementOutOfBounds { species, x, y } => write!(
                f,
                "species {} places an animal outside the world at ({}, {})",
                species, x, y
            ),
            ConfigError::MissingGender { species } => write!(
                f,
                "species {} is fully placed but lacks a male or a female",
                species
            ),
            ConfigError::ArkOutOfBounds { x, y, side } => write!(
                f,
                "ark position ({}, {}) must have coordinates between 0 and {}",
                x, y, side
            ),
            ConfigError::ZeroTurns => write!(f, "turn budget T must be >= 1"),
            ConfigError::RainAfterDeadline { rain_turn, turns } => write!(
                f,
                "rain turn {} is after the turn budget {}",
                rain_turn, turns
            ),
            ConfigError::InvalidSpeed(v) => write!(f, "speed must be positive, got {}", v),
            ConfigError::InvalidSight(v) => write!(f, "sight must be >= 0, got {}", v),
            ConfigError::ZeroCapacity => write!(f, "flock capacity must be >= 1"),
            ConfigError::InvalidIdentifyDistance(v) => {
                write!(f, "identify distance must be >= 0, got {}", v)
            }
            ConfigError::InvalidProbability(p) => {
                write!(f, "animal move probability must be in [0, 1], got {}", p)
            }
            ConfigError::InvalidMoveRadius(r) => {
                write!(f, "animal move radius must be >= 0, got {}", r)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
