//! Greedy helper.
//!
//! Keeps a picture of the ark from its last visit and only goes after animals
//! that would add something to it: a gender of a species that is neither on
//! the ark nor already in its own flock. Duplicates picked up along the way
//! are released on the spot to make room. Animals that drop out of sight are
//! remembered where they were last seen. Heads home early enough to beat the
//! flood, and stays home once Noah reports every species saved.

use std::collections::BTreeMap;

use ark_logic::ledger::SpeciesCount;
use ark_logic::visibility::FlockAnimal;
use ark_logic::{Action, AgentSeat, AnimalId, Gender, Observation, Position, SpeciesId, Strategy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::nav;

#[derive(Debug, Clone, Copy)]
struct Sighting {
    species: SpeciesId,
    gender: Gender,
    position: Position,
}

pub struct GreedyHelper {
    world_side: f64,
    /// Ark contents as of the last visit.
    known: Vec<SpeciesCount>,
    /// Last sighting of every free animal seen so far.
    sightings: BTreeMap<AnimalId, Sighting>,
    waypoint: Option<Position>,
    rng: ChaCha8Rng,
}

impl GreedyHelper {
    pub fn new(seat: &AgentSeat) -> Self {
        Self {
            world_side: seat.world_side,
            known: vec![SpeciesCount::default(); seat.populations.len()],
            sightings: BTreeMap::new(),
            waypoint: None,
            rng: ChaCha8Rng::seed_from_u64(seat.seed),
        }
    }

    fn on_ark(&self, species: SpeciesId, gender: Gender) -> bool {
        self.known
            .get(species.index())
            .is_some_and(|count| count.has(gender))
    }

    /// Would bringing this animal back add anything?
    fn wanted(&self, species: SpeciesId, gender: Gender, carrying: &[(SpeciesId, Gender)]) -> bool {
        let have = |g: Gender| self.on_ark(species, g) || carrying.contains(&(species, g));
        match gender {
            Gender::Male | Gender::Female => !have(gender),
            Gender::Unknown => !have(Gender::Male) || !have(Gender::Female),
        }
    }

    /// Split the flock into what is worth keeping and what to let go.
    fn sort_flock(&self, flock: &[FlockAnimal]) -> (Vec<(SpeciesId, Gender)>, Vec<AnimalId>) {
        let mut keep = Vec::new();
        let mut shed = Vec::new();
        for animal in flock {
            if self.wanted(animal.species, animal.gender, &keep) {
                keep.push((animal.species, animal.gender));
            } else {
                shed.push(animal.id);
            }
        }
        (keep, shed)
    }

    fn remember(&mut self, obs: &Observation) {
        let here = obs.me.position;
        let sight = obs.me.sight;
        // Gone from where it was seen, or no longer free.
        self.sightings.retain(|id, s| {
            here.distance(&s.position) > sight && !obs.me.flock.iter().any(|f| f.id == *id)
        });
        for animal in &obs.animals {
            let gender = match self.sightings.get(&animal.id) {
                Some(old) if animal.gender == Gender::Unknown => old.gender,
                _ => animal.gender,
            };
            self.sightings.insert(
                animal.id,
                Sighting {
                    species: animal.species,
                    gender,
                    position: animal.position,
                },
            );
        }
    }

    /// Nearest remembered animal still worth fetching.
    fn recall(&self, here: Position, carrying: &[(SpeciesId, Gender)]) -> Option<(AnimalId, Position)> {
        self.sightings
            .iter()
            .filter(|(_, s)| self.wanted(s.species, s.gender, carrying))
            .min_by(|a, b| {
                here.distance(&a.1.position)
                    .total_cmp(&here.distance(&b.1.position))
                    .then(a.0.cmp(b.0))
            })
            .map(|(id, s)| (*id, s.position))
    }

    fn explore(&mut self, here: Position, speed: f64) -> Action {
        let arrived = self
            .waypoint
            .map_or(true, |w| here.distance(&w) <= speed);
        if arrived {
            let side = self.world_side;
            self.waypoint = Some(Position::new(
                self.rng.gen_range(0.0..side),
                self.rng.gen_range(0.0..side),
            ));
        }
        match self.waypoint {
            Some(w) => Action::move_towards(here, w, speed),
            None => Action::stay(),
        }
    }

    fn choose(&mut self, obs: &Observation, keep: &mut Vec<(SpeciesId, Gender)>) -> Action {
        let everything_saved = obs.noah_board == Some(0);
        let space = obs.me.capacity.saturating_sub(keep.len());

        if everything_saved || nav::must_head_home(obs) || space == 0 {
            return nav::go_home(obs);
        }

        // Underfoot animals are identified, take the useful ones.
        let mut grab = Action::stay();
        let mut taken = 0;
        for animal in obs.animals_in_my_cell() {
            if taken < space && self.wanted(animal.species, animal.gender, keep.as_slice()) {
                keep.push((animal.species, animal.gender));
                grab = grab.with_capture(animal.id);
                taken += 1;
            }
        }
        if taken > 0 {
            return grab;
        }

        let target = nav::closest_animal(obs, |a| self.wanted(a.species, a.gender, keep.as_slice()))
            .map(|a| (a.id, a.position))
            .or_else(|| self.recall(obs.me.position, keep.as_slice()));
        if let Some((id, position)) = target {
            return Action::move_towards(obs.me.position, position, obs.me.speed).with_capture(id);
        }

        if !keep.is_empty() {
            return nav::go_home(obs);
        }
        self.explore(obs.me.position, obs.me.speed)
    }
}

impl Strategy for GreedyHelper {
    fn kind(&self) -> &'static str {
        "greedy"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        if let Some(view) = &obs.ark_view {
            self.known = view.clone();
        }
        self.remember(obs);

        // Whatever is carried onto the ark gets delivered anyway.
        let (mut keep, shed) = if obs.at_ark() {
            let all: Vec<_> = obs.me.flock.iter().map(|a| (a.species, a.gender)).collect();
            (all, Vec::new())
        } else {
            self.sort_flock(&obs.me.flock)
        };
        if !shed.is_empty() {
            log::trace!("{} sheds {} duplicates", obs.me.id, shed.len());
        }

        let mut action = self.choose(obs, &mut keep);
        for id in shed {
            action = action.with_release(id);
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_logic::visibility::{ObservedAnimal, SelfView};
    use ark_logic::{AgentId, AgentRole};

    fn seat() -> AgentSeat {
        AgentSeat {
            id: AgentId(1),
            role: AgentRole::Helper,
            seed: 1,
            world_side: 100.0,
            ark: Position::new(50.0, 50.0),
            num_helpers: 2,
            populations: vec![2, 2],
            total_turns: 100,
            rain_turn: 80,
        }
    }

    fn obs(at: Position) -> Observation {
        Observation {
            turn: 10,
            total_turns: 100,
            rain_turn: 80,
            is_raining: false,
            me: SelfView {
                id: AgentId(1),
                role: AgentRole::Helper,
                position: at,
                speed: 1.0,
                sight: 5.0,
                capacity: 4,
                flock: Vec::new(),
            },
            ark: Position::new(50.0, 50.0),
            ark_view: None,
            animals: Vec::new(),
            agents: Vec::new(),
            messages: Vec::new(),
            noah_board: None,
        }
    }

    fn seen(id: u32, species: u16, gender: Gender, position: Position, here: Position) -> ObservedAnimal {
        ObservedAnimal {
            id: AnimalId(id),
            species: SpeciesId(species),
            gender,
            position,
            distance: here.distance(&position),
        }
    }

    #[test]
    fn captures_useful_animal_underfoot() {
        let mut g = GreedyHelper::new(&seat());
        let here = Position::new(10.5, 10.5);
        let mut o = obs(here);
        o.animals.push(seen(3, 0, Gender::Male, Position::new(10.2, 10.9), here));
        let action = g.decide(&o);
        assert_eq!(action.capture, vec![AnimalId(3)]);
        assert!(action.movement.is_none());
    }

    #[test]
    fn skips_genders_already_on_the_ark() {
        let mut g = GreedyHelper::new(&seat());
        g.known[0] = SpeciesCount { males: 1, females: 0 };
        let here = Position::new(10.5, 10.5);
        let mut o = obs(here);
        o.animals.push(seen(3, 0, Gender::Male, Position::new(10.2, 10.9), here));
        o.animals.push(seen(4, 1, Gender::Unknown, Position::new(13.0, 10.0), here));
        let action = g.decide(&o);
        assert!(action.capture.iter().all(|&id| id != AnimalId(3)));
        assert_eq!(action.capture, vec![AnimalId(4)], "heads for the other species");
        assert!(action.movement.is_some());
    }

    #[test]
    fn sheds_duplicates_away_from_the_ark() {
        let mut g = GreedyHelper::new(&seat());
        let mut o = obs(Position::new(10.5, 10.5));
        o.me.flock = vec![
            FlockAnimal {
                id: AnimalId(0),
                species: SpeciesId(0),
                gender: Gender::Female,
            },
            FlockAnimal {
                id: AnimalId(1),
                species: SpeciesId(0),
                gender: Gender::Female,
            },
        ];
        let action = g.decide(&o);
        assert_eq!(action.release, vec![AnimalId(1)]);
    }

    #[test]
    fn heads_home_when_the_flood_is_near() {
        let mut g = GreedyHelper::new(&seat());
        let here = Position::new(10.5, 50.0);
        let mut o = obs(here);
        o.turn = 60;
        o.animals.push(seen(3, 0, Gender::Male, Position::new(8.0, 50.0), here));
        let action = g.decide(&o);
        let d = action.movement.expect("moving");
        assert!(d.dx > 0.0, "towards the ark, got {d:?}");
        assert!(action.capture.is_empty());
    }

    #[test]
    fn stays_home_once_everything_is_saved() {
        let mut g = GreedyHelper::new(&seat());
        let mut o = obs(Position::new(50.2, 50.2));
        o.noah_board = Some(0);
        assert_eq!(g.decide(&o), Action::stay());
    }

    #[test]
    fn returns_to_animals_seen_earlier() {
        let mut g = GreedyHelper::new(&seat());
        let here = Position::new(20.5, 20.5);
        let mut o = obs(here);
        o.animals.push(seen(7, 1, Gender::Unknown, Position::new(24.0, 20.5), here));
        g.decide(&o);

        // Walked off; the animal is now out of sight.
        let mut later = obs(Position::new(10.5, 20.5));
        later.turn = 11;
        let action = g.decide(&later);
        assert_eq!(action.capture, vec![AnimalId(7)]);
        assert!(action.movement.is_some_and(|d| d.dx > 0.0));

        // Back at the spot and it is gone: forgotten.
        let mut there = obs(Position::new(24.0, 20.5));
        there.turn = 12;
        g.decide(&there);
        assert!(g.sightings.is_empty());
    }

    #[test]
    fn ark_view_updates_memory() {
        let mut g = GreedyHelper::new(&seat());
        let mut o = obs(Position::new(50.2, 50.2));
        o.ark_view = Some(vec![
            SpeciesCount { males: 1, females: 1 },
            SpeciesCount::default(),
        ]);
        g.decide(&o);
        assert!(g.on_ark(SpeciesId(0), Gender::Female));
        assert!(!g.on_ark(SpeciesId(1), Gender::Male));
    }
}
