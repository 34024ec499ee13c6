//! Navigation helpers shared by the strategies.

use ark_logic::visibility::ObservedAnimal;
use ark_logic::{Action, Observation, Position};
use rand::Rng;

/// Turns kept in reserve on top of the straight-line trip home.
pub const RETURN_MARGIN: u32 = 2;

/// Whole turns needed to walk from `from` to the ark cell.
pub fn turns_to_reach(from: Position, target: Position, speed: f64) -> u32 {
    if speed <= 0.0 {
        return u32::MAX;
    }
    let turns = (from.distance(&target) / speed).ceil();
    if turns >= u32::MAX as f64 {
        u32::MAX
    } else {
        turns as u32
    }
}

/// Whether it is time to head back so as to be on the ark at `T`.
pub fn must_head_home(obs: &Observation) -> bool {
    let needed = turns_to_reach(obs.me.position, obs.ark_cell_centre(), obs.me.speed)
        .saturating_add(RETURN_MARGIN);
    needed >= obs.turns_remaining()
}

pub fn go_home(obs: &Observation) -> Action {
    if obs.at_ark() {
        Action::stay()
    } else {
        Action::move_towards(obs.me.position, obs.ark_cell_centre(), obs.me.speed)
    }
}

/// Closest visible animal accepted by `keep`; ties go to the lower id.
pub fn closest_animal<'a, F>(obs: &'a Observation, mut keep: F) -> Option<&'a ObservedAnimal>
where
    F: FnMut(&ObservedAnimal) -> bool,
{
    obs.animals
        .iter()
        .filter(|a| keep(a))
        .min_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)))
}

/// Small random step, each axis in `[-0.5, 0.5)`, kept inside the world.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, here: Position, world_side: f64) -> Action {
    for _ in 0..8 {
        let dx = rng.gen::<f64>() - 0.5;
        let dy = rng.gen::<f64>() - 0.5;
        let x = here.x + dx;
        let y = here.y + dy;
        if x >= 0.0 && x < world_side && y >= 0.0 && y < world_side {
            return Action::move_by(dx, dy);
        }
    }
    Action::stay()
}
