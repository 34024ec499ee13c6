//! Baseline player: bring back anything, grab whatever is underfoot, walk
//! to the closest animal in sight, otherwise shuffle about.

use ark_logic::{Action, AgentRole, AgentSeat, Observation, Strategy};
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::nav;

pub struct RandomPlayer {
    id: u32,
    world_side: f64,
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    pub fn new(seat: &AgentSeat) -> Self {
        Self {
            id: seat.id.0,
            world_side: seat.world_side,
            rng: ChaCha8Rng::seed_from_u64(seat.seed),
        }
    }
}

impl Strategy for RandomPlayer {
    fn kind(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        let chatter = (obs.turn.wrapping_add(self.id) & 0xFF) as u8;

        if obs.me.role == AgentRole::Noah {
            return Action::stay().with_broadcast(chatter);
        }

        let action = if !obs.me.flock.is_empty() {
            nav::go_home(obs)
        } else if let Some(animal) = obs.animals_in_my_cell().choose(&mut self.rng) {
            Action::stay().with_capture(animal.id)
        } else if let Some(animal) = nav::closest_animal(obs, |_| true) {
            Action::move_towards(obs.me.position, animal.position, obs.me.speed)
        } else {
            nav::jitter(&mut self.rng, obs.me.position, self.world_side)
        };
        action.with_broadcast(chatter)
    }
}
