//! Animal behavior — memoryless wandering of free animals.
//!
//! Each free animal, in ascending id order, draws once: with probability `p`
//! it jumps to a uniform point in the disc of radius `r` around itself
//! (clamped to the world), otherwise it stays. Captured, delivered and
//! forfeited animals are skipped. The fixed draw order keeps trajectories
//! reproducible for a given seed.

use std::f64::consts::TAU;

use rand::Rng;

use crate::entities::AnimalId;
use crate::geometry::Position;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimalBehavior {
    pub move_probability: f64,
    pub move_radius: f64,
}

impl AnimalBehavior {
    /// Run one wandering step. Returns how many animals moved.
    pub fn step<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) -> usize {
        let free: Vec<(AnimalId, Position)> =
            world.free_animals().map(|a| (a.id, a.position)).collect();

        let mut moved = 0;
        for (id, pos) in free {
            if rng.gen::<f64>() >= self.move_probability {
                continue;
            }
            let angle = rng.gen_range(0.0..TAU);
            // sqrt keeps the point uniform over the disc area
            let dist = self.move_radius * rng.gen::<f64>().sqrt();
            let dest = Position::new(pos.x + dist * angle.cos(), pos.y + dist * angle.sin());
            if world.move_animal(id, dest) {
                moved += 1;
            }
        }
        moved
    }
}
