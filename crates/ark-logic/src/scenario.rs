//! Scenario ("map") files.
//!
//! ```json
//! { "num_helpers": 4, "animals": [2, 3, 5], "ark": [500, 500],
//!   "turns": 2000, "seed": 7,
//!   "placements": [[{ "gender": "Male", "x": 10.5, "y": 4.0 }]] }
//! ```
//!
//! `placements[i]` pins individuals of species `i`; species without an entry
//! are scattered randomly. Everything not in the file keeps the base config's
//! value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PlacedAnimal, RunConfig, SpeciesSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub num_helpers: u32,
    /// Population per species.
    pub animals: Vec<u32>,
    pub ark: [i64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_turn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placements: Vec<Vec<PlacedAnimal>>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Overlay this scenario on `base` and validate the result.
    pub fn apply(&self, base: RunConfig) -> Result<RunConfig, ScenarioError> {
        if self.placements.len() > self.animals.len() {
            return Err(ScenarioError::PlacementsWithoutSpecies {
                species: self.animals.len(),
                lists: self.placements.len(),
            });
        }

        let species = self
            .animals
            .iter()
            .enumerate()
            .map(|(i, &population)| SpeciesSpec {
                population,
                placements: self.placements.get(i).cloned().unwrap_or_default(),
            })
            .collect();

        let config = RunConfig {
            num_helpers: self.num_helpers,
            species,
            ark: (self.ark[0], self.ark[1]),
            turns: self.turns.unwrap_or(base.turns),
            rain_turn: self.rain_turn.or(base.rain_turn),
            seed: self.seed.unwrap_or(base.seed),
            ..base
        };
        config.validate()?;
        Ok(config)
    }

    /// Capture a config back into scenario form.
    pub fn from_config(config: &RunConfig) -> Self {
        let placements: Vec<Vec<PlacedAnimal>> =
            config.species.iter().map(|s| s.placements.clone()).collect();
        Self {
            num_helpers: config.num_helpers,
            animals: config.species.iter().map(|s| s.population).collect(),
            ark: [config.ark.0, config.ark.1],
            turns: Some(config.turns),
            rain_turn: config.rain_turn,
            seed: Some(config.seed),
            placements: if placements.iter().all(Vec::is_empty) {
                Vec::new()
            } else {
                placements
            },
        }
    }
}

/// Errors that can occur while loading a scenario
#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(ConfigError),
    /// More placement lists than there are species in `animals`.
    PlacementsWithoutSpecies { species: usize, lists: usize },
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        ScenarioError::Json(e)
    }
}

impl From<ConfigError> for ScenarioError {
    fn from(e: ConfigError) -> Self {
        ScenarioError::Invalid(e)
    }
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io(e) => write!(f, "IO error: {}", e),
            ScenarioError::Json(e) => write!(f, "Malformed scenario: {}", e),
            ScenarioError::Invalid(e) => write!(f, "Invalid scenario: {}", e),
            ScenarioError::PlacementsWithoutSpecies { species, lists } => write!(
                f,
                "Invalid scenario: {} placement lists for {} species",
                lists, species
            ),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Io(e) => Some(e),
            ScenarioError::Json(e) => Some(e),
            ScenarioError::Invalid(e) => Some(e),
            ScenarioError::PlacementsWithoutSpecies { .. } => None,
        }
    }
}
