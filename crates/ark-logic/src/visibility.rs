//! Visibility engine — what each agent can observe at the start of a turn.
//!
//! Read-only. All observations for a turn are built before any action is
//! collected, so every agent decides on the same snapshot.
//!
//! Rules:
//! - Free animals and other live agents within the sight radius (Euclidean,
//!   inclusive) are visible.
//! - An observed animal's gender is reported only when it is identifiable:
//!   same cell as the observer, or within `identify_distance` when that is
//!   positive. Otherwise it reads [`Gender::Unknown`].
//! - Other agents expose their flock size, never its contents.
//! - The ledger is shown only to agents standing on the ark.

use serde::{Deserialize, Serialize};

use crate::comms::Message;
use crate::entities::*;
use crate::geometry::Position;
use crate::ledger::SpeciesCount;
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedAnimal {
    pub id: AnimalId,
    pub species: SpeciesId,
    pub gender: Gender,
    pub position: Position,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedAgent {
    pub id: AgentId,
    pub role: AgentRole,
    pub position: Position,
    pub flock_size: usize,
}

/// An animal in the observer's own flock (always fully known).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlockAnimal {
    pub id: AnimalId,
    pub species: SpeciesId,
    pub gender: Gender,
}

/// The observer's own state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfView {
    pub id: AgentId,
    pub role: AgentRole,
    pub position: Position,
    /// Distance budget for this turn.
    pub speed: f64,
    pub sight: f64,
    pub capacity: usize,
    pub flock: Vec<FlockAnimal>,
}

/// Everything a strategy is allowed to know for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub turn: u32,
    pub total_turns: u32,
    pub rain_turn: u32,
    pub is_raining: bool,
    pub me: SelfView,
    pub ark: Position,
    /// Ledger counts by species, present only while standing on the ark.
    pub ark_view: Option<Vec<SpeciesCount>>,
    /// Sorted by animal id.
    pub animals: Vec<ObservedAnimal>,
    /// Sorted by agent id, observer excluded.
    pub agents: Vec<ObservedAgent>,
    pub messages: Vec<Message>,
    pub noah_board: Option<u8>,
}

impl Observation {
    /// Turns left before the flood (`T - turn`).
    pub fn turns_remaining(&self) -> u32 {
        self.total_turns.saturating_sub(self.turn)
    }

    pub fn at_ark(&self) -> bool {
        self.me.position.same_cell(&self.ark)
    }

    /// Middle of the ark's cell, the safest point to aim for when heading home.
    pub fn ark_cell_centre(&self) -> Position {
        Position::new(self.ark.x.floor() + 0.5, self.ark.y.floor() + 0.5)
    }

    pub fn flock_full(&self) -> bool {
        self.me.flock.len() >= self.me.capacity
    }

    /// Visible animals sharing the observer's cell.
    pub fn animals_in_my_cell(&self) -> impl Iterator<Item = &ObservedAnimal> {
        let me = self.me.position;
        self.animals.iter().filter(move |a| a.position.same_cell(&me))
    }
}

/// Per-run visibility parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    pub identify_distance: f64,
    pub total_turns: u32,
    pub rain_turn: u32,
}

impl Visibility {
    pub fn identifies(&self, observer: &Position, target: &Position) -> bool {
        observer.same_cell(target)
            || (self.identify_distance > 0.0 && observer.distance(target) <= self.identify_distance)
    }

    /// Observation for one live agent; `None` for lost or unknown agents.
    pub fn observe(&self, world: &World, id: AgentId) -> Option<Observation> {
        let agent = world.agent(id)?;
        if agent.lost {
            return None;
        }
        let here = agent.position;

        let animals = world
            .free_animals()
            .filter_map(|animal| {
                let distance = here.distance(&animal.position);
                if distance > agent.sight {
                    return None;
                }
                let gender = if self.identifies(&here, &animal.position) {
                    animal.gender
                } else {
                    Gender::Unknown
                };
                Some(ObservedAnimal {
                    id: animal.id,
                    species: animal.species,
                    gender,
                    position: animal.position,
                    distance,
                })
            })
            .collect();

        let agents = world
            .agents()
            .iter()
            .filter(|other| other.id != id && other.is_live())
            .filter(|other| here.distance(&other.position) <= agent.sight)
            .map(|other| ObservedAgent {
                id: other.id,
                role: other.role,
                position: other.position,
                flock_size: other.flock.len(),
            })
            .collect();

        let flock = agent
            .flock
            .iter()
            .filter_map(|&animal_id| world.animal(animal_id))
            .map(|a| FlockAnimal {
                id: a.id,
                species: a.species,
                gender: a.gender,
            })
            .collect();

        let turn = world.turn();
        let ark_view = world
            .is_at_ark(id)
            .then(|| world.ledger().counts().to_vec());

        Some(Observation {
            turn,
            total_turns: self.total_turns,
            rain_turn: self.rain_turn,
            is_raining: turn >= self.rain_turn,
            me: SelfView {
                id,
                role: agent.role,
                position: here,
                speed: agent.speed,
                sight: agent.sight,
                capacity: agent.capacity,
                flock,
            },
            ark: world.ark(),
            ark_view,
            animals,
            agents,
            messages: world.comms().inbox(id).to_vec(),
            noah_board: world.comms().noah_board(),
        })
    }

    /// Observations for every live agent, in agent id order.
    pub fn observe_all(&self, world: &World) -> Vec<Observation> {
        world
            .agents()
            .iter()
            .filter_map(|a| self.observe(world, a.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;

    fn helper(id: u32, x: f64, y: f64) -> Agent {
        Agent {
            id: AgentId(id),
            role: AgentRole::for_id(AgentId(id)),
            position: Position::new(x, y),
            speed: 1.0,
            sight: 5.0,
            capacity: 4,
            flock: Vec::new(),
            lost: false,
        }
    }

    fn animal(id: u32, gender: Gender, x: f64, y: f64) -> Animal {
        Animal {
            id: AnimalId(id),
            species: SpeciesId(0),
            gender,
            position: Position::new(x, y),
            state: CaptureState::Free,
        }
    }

    fn world() -> World {
        World::new(
            Bounds::new(100.0),
            Position::new(50.0, 50.0),
            vec![helper(0, 50.0, 50.0), helper(1, 10.2, 10.2), helper(2, 13.0, 14.0)],
            vec![
                animal(0, Gender::Male, 10.9, 10.1),
                animal(1, Gender::Female, 13.0, 14.2),
                animal(2, Gender::Male, 15.2, 10.2),
                animal(3, Gender::Female, 40.0, 40.0),
            ],
            1,
        )
    }

    fn rules() -> Visibility {
        Visibility {
            identify_distance: 0.0,
            total_turns: 100,
            rain_turn: 50,
        }
    }

    #[test]
    fn sight_radius_is_inclusive() {
        let obs = rules().observe(&world(), AgentId(1)).expect("live agent");
        let ids: Vec<u32> = obs.animals.iter().map(|a| a.id.0).collect();
        // Animal 2 is exactly 5.0 away.
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(obs.agents.len(), 1);
        assert_eq!(obs.agents[0].id, AgentId(2));
    }

    #[test]
    fn gender_only_known_in_same_cell() {
        let obs = rules().observe(&world(), AgentId(1)).expect("live agent");
        assert_eq!(obs.animals[0].gender, Gender::Male);
        assert_eq!(obs.animals[1].gender, Gender::Unknown);
        assert_eq!(obs.animals[2].gender, Gender::Unknown);
    }

    #[test]
    fn identify_distance_widens_identification() {
        let wide = Visibility {
            identify_distance: 5.0,
            ..rules()
        };
        let obs = wide.observe(&world(), AgentId(1)).expect("live agent");
        assert!(obs.animals.iter().all(|a| a.gender != Gender::Unknown));
    }

    #[test]
    fn ledger_only_visible_on_ark() {
        let w = world();
        let noah = rules().observe(&w, AgentId(0)).expect("noah");
        assert!(noah.ark_view.is_some());
        assert!(noah.animals.is_empty());
        let far = rules().observe(&w, AgentId(1)).expect("helper");
        assert!(far.ark_view.is_none());
    }

    #[test]
    fn lost_agents_observe_nothing_and_are_unseen() {
        let mut w = world();
        w.mark_agent_lost(AgentId(2));
        assert!(rules().observe(&w, AgentId(2)).is_none());
        let obs = rules().observe(&w, AgentId(1)).expect("live");
        assert!(obs.agents.is_empty());
        assert_eq!(rules().observe_all(&w).len(), 2);
    }

    #[test]
    fn captured_animals_are_not_listed() {
        let mut w = world();
        assert!(w.transfer_animal_to_flock(AgentId(2), AnimalId(1)));
        let obs = rules().observe(&w, AgentId(1)).expect("live");
        assert!(obs.animals.iter().all(|a| a.id != AnimalId(1)));
        assert_eq!(obs.agents[0].flock_size, 1);

        let own = rules().observe(&w, AgentId(2)).expect("live");
        assert_eq!(own.me.flock[0].gender, Gender::Female);
    }

    #[test]
    fn rain_flag_follows_rain_turn() {
        let obs = rules().observe(&world(), AgentId(1)).expect("live");
        assert!(!obs.is_raining);
        assert_eq!(obs.turns_remaining(), 100);
    }
}
