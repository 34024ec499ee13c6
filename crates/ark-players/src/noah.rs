//! Noah coordinator: reads the ark ledger every turn and posts the number of
//! species still missing a male or a female to the Noah board. `0` tells the
//! helpers to come home and stay there.

use ark_logic::{Action, AgentSeat, Observation, Strategy};

pub struct NoahCoordinator {
    species: usize,
}

impl NoahCoordinator {
    pub fn new(seat: &AgentSeat) -> Self {
        Self {
            species: seat.populations.len(),
        }
    }
}

impl Strategy for NoahCoordinator {
    fn kind(&self) -> &'static str {
        "noah"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        let Some(ledger) = &obs.ark_view else {
            return Action::stay();
        };
        let complete = ledger.iter().filter(|c| c.is_complete()).count();
        let missing = self.species.saturating_sub(complete);
        Action::stay().with_broadcast(missing.min(u8::MAX as usize) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_logic::ledger::SpeciesCount;
    use ark_logic::visibility::SelfView;
    use ark_logic::{AgentId, AgentRole, Position};

    fn observation(ark_view: Option<Vec<SpeciesCount>>) -> Observation {
        Observation {
            turn: 3,
            total_turns: 10,
            rain_turn: 5,
            is_raining: false,
            me: SelfView {
                id: AgentId(0),
                role: AgentRole::Noah,
                position: Position::new(5.0, 5.0),
                speed: 1.0,
                sight: 5.0,
                capacity: 4,
                flock: Vec::new(),
            },
            ark: Position::new(5.0, 5.0),
            ark_view,
            animals: Vec::new(),
            agents: Vec::new(),
            messages: Vec::new(),
            noah_board: None,
        }
    }

    fn noah(species: usize) -> NoahCoordinator {
        NoahCoordinator { species }
    }

    #[test]
    fn broadcasts_missing_species() {
        let view = vec![
            SpeciesCount { males: 1, females: 2 },
            SpeciesCount { males: 1, females: 0 },
            SpeciesCount::default(),
        ];
        let action = noah(3).decide(&observation(Some(view)));
        assert_eq!(action.broadcast, Some(2));
        assert!(action.movement.is_none());
    }

    #[test]
    fn silent_without_a_ledger_view() {
        assert_eq!(noah(3).decide(&observation(None)), Action::stay());
    }

    #[test]
    fn large_counts_saturate() {
        let view = vec![SpeciesCount::default(); 400];
        assert_eq!(noah(400).decide(&observation(Some(view))).broadcast, Some(255));
    }
}
