//! Simulation constants — world size, budgets, probabilities.
//!
//! These are the defaults used by [`RunConfig::default`](crate::config::RunConfig).
//! Every one of them can be overridden per run.

/// Side length of the square world, in distance units (km).
pub const WORLD_SIDE: f64 = 1000.0;

/// Distance a helper may travel in one turn.
pub const MAX_SPEED: f64 = 1.0;

/// Radius within which a helper sees animals and other helpers.
pub const MAX_SIGHT: f64 = 5.0;

/// Maximum number of animals a helper can carry at once.
pub const MAX_FLOCK_SIZE: usize = 4;

/// Turns between the start of the rain and the flood (`R = T - RAIN_LEAD_TURNS`).
pub const RAIN_LEAD_TURNS: u32 = 1008;

/// Default total turn budget `T`.
pub const DEFAULT_TURNS: u32 = 4000;

/// Chance that a free animal wanders on a given turn.
pub const ANIMAL_MOVE_PROBABILITY: f64 = 0.5;

/// How far a wandering animal may travel in one turn.
pub const ANIMAL_MOVE_RADIUS: f64 = 1.0;

/// Distance at which a helper can tell an animal's gender. `0.0` means same cell only.
pub const IDENTIFY_DISTANCE: f64 = 0.0;

/// Minimum helpers in a run (Noah plus at least one helper).
pub const MIN_HELPERS: u32 = 2;

/// Minimum individuals per species (at least one of each gender).
pub const MIN_POPULATION: u32 = 2;

/// Id of the coordinating agent that stays on the ark.
pub const NOAH_ID: u32 = 0;

/// Points for a species with both genders delivered.
pub const SCORE_BOTH_GENDERS: i64 = 2;

/// Points for a species with only one gender delivered.
pub const SCORE_EITHER_GENDER: i64 = 1;

/// Largest coordinate strictly below the world side is `side - BOUND_EPSILON`.
pub const BOUND_EPSILON: f64 = 1e-9;
