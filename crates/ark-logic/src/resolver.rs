//! Movement & conflict resolver — applies one turn of simultaneous actions.
//!
//! Algorithm:
//! 1. Move every live helper: clamp the displacement to its speed budget,
//!    then clamp each axis into the world so moves slide along walls
//! 2. Releases, ascending agent id
//! 3. Captures, ascending agent id: the lowest id wins a contested animal
//!    and nothing is captured twice
//! 4. Deliveries for every live agent standing on the ark
//!
//! Interactions start only after every agent has moved. Illegal per-animal
//! requests are skipped without touching state.

use std::collections::BTreeSet;

use crate::entities::{Agent, AgentId, AnimalId};
use crate::geometry::{Bounds, Displacement, Position};
use crate::strategy::Action;
use crate::world::World;

/// What actually happened during resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub releases: Vec<(AgentId, AnimalId)>,
    pub captures: Vec<(AgentId, AnimalId)>,
    pub deliveries: Vec<(AgentId, AnimalId)>,
    /// Per-animal requests that were not legal and were skipped.
    pub ignored: usize,
}

/// Where `agent` ends up if it asks for displacement `d`.
pub fn plan_move(agent: &Agent, bounds: &Bounds, d: Displacement) -> Position {
    if !d.is_finite() {
        return agent.position;
    }
    bounds.slide(agent.position, d.clamp_length(agent.speed))
}

/// Apply all actions to the world. `actions` may be in any order; an agent
/// listed twice only has its first action used.
pub fn resolve(world: &mut World, actions: &[(AgentId, Action)]) -> Resolution {
    let mut ordered: Vec<&(AgentId, Action)> = actions.iter().collect();
    ordered.sort_by_key(|entry| entry.0);
    ordered.dedup_by_key(|entry| entry.0);

    let mut res = Resolution::default();
    let bounds = world.bounds();

    // 1. Movement
    for (id, action) in &ordered {
        let Some(agent) = world.agent(*id) else { continue };
        if !agent.is_live() || !agent.role.can_move() {
            continue;
        }
        let Some(d) = action.movement else { continue };
        let dest = plan_move(agent, &bounds, d);
        world.move_agent(*id, dest);
    }

    // 2. Releases
    let mut released: BTreeSet<AnimalId> = BTreeSet::new();
    for (id, action) in &ordered {
        if !can_interact(world, *id) {
            res.ignored += action.release.len();
            continue;
        }
        for &animal in &action.release {
            if world.release_animal(*id, animal) {
                released.insert(animal);
                res.releases.push((*id, animal));
            } else {
                log::trace!("{} cannot release {}", id, animal);
                res.ignored += 1;
            }
        }
    }

    // 3. Captures
    for (id, action) in &ordered {
        if !can_interact(world, *id) {
            res.ignored += action.capture.len();
            continue;
        }
        for &animal in &action.capture {
            if try_capture(world, *id, animal, &released) {
                res.captures.push((*id, animal));
            } else {
                log::trace!("{} cannot capture {}", id, animal);
                res.ignored += 1;
            }
        }
    }

    // 4. Deliveries
    let carriers: Vec<AgentId> = world
        .agents()
        .iter()
        .filter(|a| a.is_live() && !a.flock.is_empty())
        .map(|a| a.id)
        .collect();
    for id in carriers {
        for animal in world.deliver_flock(id) {
            res.deliveries.push((id, animal));
        }
    }

    res
}

fn can_interact(world: &World, id: AgentId) -> bool {
    world
        .agent(id)
        .map(|a| a.is_live() && a.role.can_move())
        .unwrap_or(false)
}

fn try_capture(
    world: &mut World,
    agent_id: AgentId,
    animal_id: AnimalId,
    released: &BTreeSet<AnimalId>,
) -> bool {
    if released.contains(&animal_id) {
        return false;
    }
    let (Some(agent), Some(animal)) = (world.agent(agent_id), world.animal(animal_id)) else {
        return false;
    };
    if !animal.is_free() || agent.flock_full() || !agent.position.same_cell(&animal.position) {
        return false;
    }
    world.transfer_animal_to_flock(agent_id, animal_id)
}
