//! World state model — agents, animals, ledger, clock, and comms.
//!
//! The world is a plain value holder. Its atomic operations either apply fully
//! or leave the state untouched and report `false`/empty, so callers can hand
//! them arbitrary strategy requests without corrupting anything:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`World::move_agent`] | Relocate a live agent (and its flock) inside bounds |
//! | [`World::move_animal`] | Relocate a free animal inside bounds |
//! | [`World::transfer_animal_to_flock`] | Free animal → agent's flock |
//! | [`World::release_animal`] | Flock animal → free at the agent's position |
//! | [`World::deliver_flock`] | Whole flock → ledger, when at the ark |
//! | [`World::mark_agent_lost`] | Agent inert, flock forfeited |

use std::fmt;

use rand::Rng;

use crate::comms::Comms;
use crate::config::RunConfig;
use crate::entities::*;
use crate::geometry::{Bounds, Position};
use crate::ledger::ArkLedger;

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    bounds: Bounds,
    ark: Position,
    agents: Vec<Agent>,
    animals: Vec<Animal>,
    ledger: ArkLedger,
    comms: Comms,
    turn: u32,
}

impl World {
    /// Assemble a world from explicit parts. Ids must equal vector indices;
    /// [`World::check_invariants`] reports any that do not.
    pub fn new(
        bounds: Bounds,
        ark: Position,
        agents: Vec<Agent>,
        animals: Vec<Animal>,
        species_count: usize,
    ) -> Self {
        let comms = Comms::new(agents.len());
        Self {
            bounds,
            ark: bounds.clamp(ark),
            agents,
            animals,
            ledger: ArkLedger::new(species_count),
            comms,
            turn: 0,
        }
    }

    /// Build the starting world for a validated config.
    ///
    /// Helpers all start on the ark. Placed animals come first within each
    /// species; the rest are scattered uniformly, with genders forced until
    /// the species has at least one male and one female.
    pub fn generate<R: Rng + ?Sized>(config: &RunConfig, rng: &mut R) -> Self {
        let bounds = config.bounds();
        let ark = config.ark_position();

        let agents = (0..config.num_helpers)
            .map(|i| {
                let id = AgentId(i);
                Agent {
                    id,
                    role: AgentRole::for_id(id),
                    position: ark,
                    speed: config.speed,
                    sight: config.sight,
                    capacity: config.capacity,
                    flock: Vec::new(),
                    lost: false,
                }
            })
            .collect();

        let mut animals = Vec::with_capacity(config.total_animals() as usize);
        for (index, spec) in config.species.iter().enumerate() {
            let species = SpeciesId(index as u16);
            let mut has_male = false;
            let mut has_female = false;

            for placed in &spec.placements {
                has_male |= placed.gender == Gender::Male;
                has_female |= placed.gender == Gender::Female;
                animals.push(Animal {
                    id: AnimalId(animals.len() as u32),
                    species,
                    gender: placed.gender,
                    position: bounds.clamp(Position::new(placed.x, placed.y)),
                    state: CaptureState::Free,
                });
            }

            let scattered = spec.population as usize - spec.placements.len().min(spec.population as usize);
            for _ in 0..scattered {
                let gender = if !has_male {
                    Gender::Male
                } else if !has_female {
                    Gender::Female
                } else if rng.gen_bool(0.5) {
                    Gender::Male
                } else {
                    Gender::Female
                };
                has_male |= gender == Gender::Male;
                has_female |= gender == Gender::Female;

                let position = bounds.clamp(Position::new(
                    rng.gen_range(0.0..config.world_side),
                    rng.gen_range(0.0..config.world_side),
                ));
                animals.push(Animal {
                    id: AnimalId(animals.len() as u32),
                    species,
                    gender,
                    position,
                    state: CaptureState::Free,
                });
            }
        }

        Self::new(bounds, ark, agents, animals, config.species.len())
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn ark(&self) -> Position {
        self.ark
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.get(id.index())
    }

    pub fn ledger(&self) -> &ArkLedger {
        &self.ledger
    }

    pub fn comms(&self) -> &Comms {
        &self.comms
    }

    /// Queue this turn's broadcasts for next turn's observations.
    pub(crate) fn exchange_messages(&mut self, origins: &[Position], sent: &[Option<u8>]) {
        self.comms.exchange(&self.agents, origins, sent);
    }

    pub fn free_animals(&self) -> impl Iterator<Item = &Animal> {
        self.animals.iter().filter(|a| a.is_free())
    }

    pub fn is_at_ark(&self, id: AgentId) -> bool {
        self.agent(id)
            .map(|a| a.position.same_cell(&self.ark))
            .unwrap_or(false)
    }

    pub(crate) fn advance_clock(&mut self) {
        self.turn += 1;
    }

    // ── Atomic updates ───────────────────────────────────────────────────

    /// Move a live agent to `dest` (clamped to bounds). Its flock follows.
    pub fn move_agent(&mut self, id: AgentId, dest: Position) -> bool {
        let dest = self.bounds.clamp(dest);
        let Some(agent) = self.agents.get_mut(id.index()) else {
            return false;
        };
        if agent.lost {
            return false;
        }
        agent.position = dest;
        for animal_id in &agent.flock {
            if let Some(animal) = self.animals.get_mut(animal_id.index()) {
                animal.position = dest;
            }
        }
        true
    }

    /// Move a free animal to `dest` (clamped to bounds).
    pub fn move_animal(&mut self, id: AnimalId, dest: Position) -> bool {
        let dest = self.bounds.clamp(dest);
        match self.animals.get_mut(id.index()) {
            Some(animal) if animal.is_free() => {
                animal.position = dest;
                true
            }
            _ => false,
        }
    }

    /// Put a free animal into a live helper's flock if there is room.
    pub fn transfer_animal_to_flock(&mut self, agent_id: AgentId, animal_id: AnimalId) -> bool {
        let Some(agent) = self.agents.get_mut(agent_id.index()) else {
            return false;
        };
        if agent.lost || agent.role != AgentRole::Helper || agent.flock_full() {
            return false;
        }
        let Some(animal) = self.animals.get_mut(animal_id.index()) else {
            return false;
        };
        if !animal.is_free() {
            return false;
        }
        animal.state = CaptureState::InFlock(agent_id);
        animal.position = agent.position;
        agent.flock.push(animal_id);
        true
    }

    /// Drop an animal from the agent's flock, free at the agent's position.
    pub fn release_animal(&mut self, agent_id: AgentId, animal_id: AnimalId) -> bool {
        let Some(agent) = self.agents.get_mut(agent_id.index()) else {
            return false;
        };
        let Some(slot) = agent.flock.iter().position(|&a| a == animal_id) else {
            return false;
        };
        agent.flock.remove(slot);
        if let Some(animal) = self.animals.get_mut(animal_id.index()) {
            animal.state = CaptureState::Free;
            animal.position = agent.position;
        }
        true
    }

    /// Unload the agent's whole flock onto the ark. Empty unless the agent
    /// is live and standing in the ark cell.
    pub fn deliver_flock(&mut self, agent_id: AgentId) -> Vec<AnimalId> {
        if !self.is_at_ark(agent_id) {
            return Vec::new();
        }
        let Some(agent) = self.agents.get_mut(agent_id.index()) else {
            return Vec::new();
        };
        if agent.lost {
            return Vec::new();
        }

        let flock = std::mem::take(&mut agent.flock);
        for &animal_id in &flock {
            if let Some(animal) = self.animals.get_mut(animal_id.index()) {
                animal.state = CaptureState::Delivered;
                self.ledger
                    .record_delivery(animal.id, animal.species, animal.gender);
            }
        }
        flock
    }

    /// Mark an agent lost; its flock is forfeited and never delivered.
    pub fn mark_agent_lost(&mut self, agent_id: AgentId) -> Vec<AnimalId> {
        let Some(agent) = self.agents.get_mut(agent_id.index()) else {
            return Vec::new();
        };
        if agent.lost {
            return Vec::new();
        }
        agent.lost = true;
        let flock = std::mem::take(&mut agent.flock);
        for &animal_id in &flock {
            if let Some(animal) = self.animals.get_mut(animal_id.index()) {
                animal.state = CaptureState::Forfeited(agent_id);
            }
        }
        flock
    }

    // ── Consistency ──────────────────────────────────────────────────────

    /// Verify every structural invariant. A violation is an engine bug.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some((index, agent)) = self
            .agents
            .iter()
            .enumerate()
            .find(|(i, a)| a.id.index() != *i)
        {
            return Err(InvariantViolation::MisnumberedAgent { index, id: agent.id });
        }
        if let Some((index, animal)) = self
            .animals
            .iter()
            .enumerate()
            .find(|(i, a)| a.id.index() != *i)
        {
            return Err(InvariantViolation::MisnumberedAnimal { index, id: animal.id });
        }

        let mut owner: Vec<Option<AgentId>> = vec![None; self.animals.len()];

        for agent in &self.agents {
            if !self.bounds.contains(&agent.position) {
                return Err(InvariantViolation::AgentOutOfBounds(agent.id));
            }
            if agent.flock.len() > agent.capacity {
                return Err(InvariantViolation::OverCapacity(agent.id));
            }
            if !agent.flock.is_empty() && (agent.lost || agent.role == AgentRole::Noah) {
                return Err(InvariantViolation::IneligibleCarrier(agent.id));
            }
            for &animal_id in &agent.flock {
                let Some(slot) = owner.get_mut(animal_id.index()) else {
                    return Err(InvariantViolation::UnknownAnimal(animal_id));
                };
                if slot.is_some() {
                    return Err(InvariantViolation::MultipleOwners(animal_id));
                }
                *slot = Some(agent.id);
            }
        }

        for animal in &self.animals {
            if !self.bounds.contains(&animal.position) {
                return Err(InvariantViolation::AnimalOutOfBounds(animal.id));
            }
            let Some(&carried_by) = owner.get(animal.id.index()) else {
                return Err(InvariantViolation::UnknownAnimal(animal.id));
            };
            match animal.state {
                CaptureState::InFlock(agent_id) => {
                    if carried_by != Some(agent_id) {
                        return Err(InvariantViolation::FlockMismatch(animal.id));
                    }
                }
                _ if carried_by.is_some() => {
                    return Err(InvariantViolation::FlockMismatch(animal.id));
                }
                CaptureState::Delivered => {
                    if !self.ledger.contains(animal.id) {
                        return Err(InvariantViolation::DeliveredNotRecorded(animal.id));
                    }
                }
                CaptureState::Free | CaptureState::Forfeited(_) => {
                    if self.ledger.contains(animal.id) {
                        return Err(InvariantViolation::RecordedNotDelivered(animal.id));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A broken structural invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    MisnumberedAgent { index: usize, id: AgentId },
    MisnumberedAnimal { index: usize, id: AnimalId },
    AgentOutOfBounds(AgentId),
    AnimalOutOfBounds(AnimalId),
    OverCapacity(AgentId),
    IneligibleCarrier(AgentId),
    UnknownAnimal(AnimalId),
    MultipleOwners(AnimalId),
    FlockMismatch(AnimalId),
    DeliveredNotRecorded(AnimalId),
    RecordedNotDelivered(AnimalId),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MisnumberedAgent { index, id } => {
                write!(f, "agent {} is stored at index {}", id, index)
            }
            Self::MisnumberedAnimal { index, id } => {
                write!(f, "animal {} is stored at index {}", id, index)
            }
            Self::AgentOutOfBounds(id) => write!(f, "agent {} is outside the world", id),
            Self::AnimalOutOfBounds(id) => write!(f, "animal {} is outside the world", id),
            Self::OverCapacity(id) => write!(f, "agent {} carries more than its capacity", id),
            Self::IneligibleCarrier(id) => write!(f, "agent {} cannot carry animals", id),
            Self::UnknownAnimal(id) => write!(f, "flock references unknown animal {}", id),
            Self::MultipleOwners(id) => write!(f, "animal {} is in more than one flock", id),
            Self::FlockMismatch(id) => {
                write!(f, "animal {} capture state disagrees with flocks", id)
            }
            Self::DeliveredNotRecorded(id) => {
                write!(f, "animal {} is delivered but not on the ledger", id)
            }
            Self::RecordedNotDelivered(id) => {
                write!(f, "animal {} is on the ledger but not delivered", id)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlacedAnimal, SpeciesSpec};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_world() -> World {
        let mut config = RunConfig::default();
        config.num_helpers = 3;
        config.ark = (20, 80);
        config.species = vec![SpeciesSpec::placed(vec![
            PlacedAnimal {
                gender: Gender::Male,
                x: 20.5,
                y: 80.5,
            },
            PlacedAnimal {
                gender: Gender::Female,
                x: 30.0,
                y: 30.0,
            },
        ])];
        World::generate(&config, &mut ChaCha8Rng::seed_from_u64(1))
    }

    #[test]
    fn generation_places_agents_on_ark() {
        let world = small_world();
        assert_eq!(world.agents().len(), 3);
        assert_eq!(world.agents()[0].role, AgentRole::Noah);
        for agent in world.agents() {
            assert!(world.is_at_ark(agent.id));
        }
        assert_eq!(world.animals().len(), 2);
        assert_eq!(world.check_invariants(), Ok(()));
    }

    #[test]
    fn generated_species_have_both_genders() {
        let config = RunConfig::default().with_populations(&[2, 2, 5, 9]);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let world = World::generate(&config, &mut rng);
        assert_eq!(world.animals().len(), 18);
        for s in 0..4u16 {
            let of = |g| {
                world
                    .animals()
                    .iter()
                    .any(|a| a.species == SpeciesId(s) && a.gender == g)
            };
            assert!(of(Gender::Male) && of(Gender::Female), "species {s}");
        }
        for (i, a) in world.animals().iter().enumerate() {
            assert_eq!(a.id.index(), i);
            assert!(world.bounds().contains(&a.position));
        }
    }

    #[test]
    fn capture_release_deliver_cycle() {
        let mut world = small_world();
        let helper = AgentId(1);

        assert!(world.transfer_animal_to_flock(helper, AnimalId(0)));
        assert!(!world.transfer_animal_to_flock(AgentId(2), AnimalId(0)), "already taken");
        assert_eq!(world.animal(AnimalId(0)).map(|a| a.state), Some(CaptureState::InFlock(helper)));

        assert!(world.move_agent(helper, Position::new(40.0, 40.0)));
        assert_eq!(world.animal(AnimalId(0)).map(|a| a.position), Some(Position::new(40.0, 40.0)));
        assert!(world.deliver_flock(helper).is_empty(), "not at ark");

        assert!(world.release_animal(helper, AnimalId(0)));
        assert!(!world.release_animal(helper, AnimalId(0)));
        assert!(world.animal(AnimalId(0)).is_some_and(|a| a.is_free()));

        assert!(world.transfer_animal_to_flock(helper, AnimalId(0)));
        assert!(world.move_agent(helper, Position::new(20.2, 80.7)));
        assert_eq!(world.deliver_flock(helper), vec![AnimalId(0)]);
        assert_eq!(world.ledger().count(SpeciesId(0)).males, 1);
        assert_eq!(world.check_invariants(), Ok(()));
    }

    #[test]
    fn noah_cannot_carry() {
        let mut world = small_world();
        assert!(!world.transfer_animal_to_flock(AgentId(0), AnimalId(0)));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut world = small_world();
        if let Some(agent) = world.agents.get_mut(1) {
            agent.capacity = 1;
        }
        assert!(world.transfer_animal_to_flock(AgentId(1), AnimalId(0)));
        assert!(!world.transfer_animal_to_flock(AgentId(1), AnimalId(1)));
    }

    #[test]
    fn lost_agent_forfeits_flock() {
        let mut world = small_world();
        assert!(world.transfer_animal_to_flock(AgentId(1), AnimalId(1)));
        assert_eq!(world.mark_agent_lost(AgentId(1)), vec![AnimalId(1)]);
        assert_eq!(
            world.animal(AnimalId(1)).map(|a| a.state),
            Some(CaptureState::Forfeited(AgentId(1)))
        );
        assert!(!world.move_agent(AgentId(1), Position::new(1.0, 1.0)));
        assert!(world.mark_agent_lost(AgentId(1)).is_empty());
        assert_eq!(world.check_invariants(), Ok(()));
    }

    #[test]
    fn delivered_animals_stay_put() {
        let mut world = small_world();
        assert!(world.transfer_animal_to_flock(AgentId(1), AnimalId(0)));
        world.deliver_flock(AgentId(1));
        assert!(!world.move_animal(AnimalId(0), Position::new(3.0, 3.0)));
        assert!(!world.transfer_animal_to_flock(AgentId(2), AnimalId(0)));
    }

    #[test]
    fn invariant_check_catches_double_flock() {
        let mut world = small_world();
        assert!(world.transfer_animal_to_flock(AgentId(1), AnimalId(0)));
        if let Some(agent) = world.agents.get_mut(2) {
            agent.flock.push(AnimalId(0));
        }
        assert_eq!(
            world.check_invariants(),
            Err(InvariantViolation::MultipleOwners(AnimalId(0)))
        );
    }

    #[test]
    fn invariant_check_reports_misnumbered_ids() {
        let world = small_world();
        let mut animals = world.animals().to_vec();
        animals[0].id = AnimalId(7);
        let bad = World::new(world.bounds(), world.ark(), world.agents().to_vec(), animals, 1);
        assert_eq!(
            bad.check_invariants(),
            Err(InvariantViolation::MisnumberedAnimal { index: 0, id: AnimalId(7) })
        );
        assert!(bad.animal(AnimalId(7)).is_none());

        let mut agents = world.agents().to_vec();
        agents.swap(1, 2);
        let bad = World::new(world.bounds(), world.ark(), agents, world.animals().to_vec(), 1);
        assert_eq!(
            bad.check_invariants(),
            Err(InvariantViolation::MisnumberedAgent { index: 1, id: AgentId(2) })
        );
    }
}
