//! One-byte broadcasts between agents.
//!
//! Two channels:
//! - **Local**: a helper's byte reaches every live agent within the sender's
//!   sight radius, measured between start-of-turn positions.
//! - **Noah board**: the coordinator's byte is posted to a shared board that
//!   every agent reads. The board keeps its last value until overwritten.
//!
//! Everything sent during turn `t` becomes visible in the observations of turn
//! `t + 1`, so nobody reacts to a same-turn message.

use serde::{Deserialize, Serialize};

use crate::entities::{Agent, AgentId, AgentRole};
use crate::geometry::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: AgentId,
    pub content: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comms {
    inboxes: Vec<Vec<Message>>,
    noah_board: Option<u8>,
}

impl Comms {
    pub fn new(agent_count: usize) -> Self {
        Self {
            inboxes: vec![Vec::new(); agent_count],
            noah_board: None,
        }
    }

    /// Messages received at the start of this turn.
    pub fn inbox(&self, agent: AgentId) -> &[Message] {
        self.inboxes
            .get(agent.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn noah_board(&self) -> Option<u8> {
        self.noah_board
    }

    /// Replace the inboxes with this turn's broadcasts.
    ///
    /// `origins[i]` is agent `i`'s start-of-turn position and `sent[i]` its
    /// broadcast, if any. Lost agents neither send nor receive.
    pub fn exchange(&mut self, agents: &[Agent], origins: &[Position], sent: &[Option<u8>]) {
        let mut next = vec![Vec::new(); agents.len()];

        for (sender, byte) in agents.iter().zip(sent) {
            let Some(content) = *byte else { continue };
            if sender.lost {
                continue;
            }
            if sender.role == AgentRole::Noah {
                self.noah_board = Some(content);
                continue;
            }
            let Some(from_pos) = origins.get(sender.id.index()) else {
                continue;
            };
            for receiver in agents {
                if receiver.id == sender.id || receiver.lost {
                    continue;
                }
                let Some(to_pos) = origins.get(receiver.id.index()) else {
                    continue;
                };
                if from_pos.distance(to_pos) <= sender.sight {
                    next[receiver.id.index()].push(Message {
                        from: sender.id,
                        content,
                    });
                }
            }
        }

        self.inboxes = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: u32, x: f64, y: f64) -> Agent {
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

    #[test]
    fn local_broadcast_reaches_only_agents_in_sight() {
        let agents = vec![agent(0, 0.0, 0.0), agent(1, 10.0, 10.0), agent(2, 13.0, 14.0), agent(3, 50.0, 50.0)];
        let origins: Vec<Position> = agents.iter().map(|a| a.position).collect();
        let mut comms = Comms::new(agents.len());
        comms.exchange(&agents, &origins, &[None, Some(7), None, None]);

        assert_eq!(comms.inbox(AgentId(2)), &[Message { from: AgentId(1), content: 7 }]);
        assert!(comms.inbox(AgentId(3)).is_empty());
        assert!(comms.inbox(AgentId(1)).is_empty(), "no echo to sender");
        assert_eq!(comms.noah_board(), None);
    }

    #[test]
    fn noah_writes_board_which_persists() {
        let agents = vec![agent(0, 0.0, 0.0), agent(1, 900.0, 900.0)];
        let origins: Vec<Position> = agents.iter().map(|a| a.position).collect();
        let mut comms = Comms::new(agents.len());
        comms.exchange(&agents, &origins, &[Some(3), None]);
        assert_eq!(comms.noah_board(), Some(3));
        assert!(comms.inbox(AgentId(1)).is_empty());

        comms.exchange(&agents, &origins, &[None, None]);
        assert_eq!(comms.noah_board(), Some(3));
    }

    #[test]
    fn inboxes_are_replaced_each_turn() {
        let agents = vec![agent(0, 0.0, 0.0), agent(1, 1.0, 1.0), agent(2, 2.0, 2.0)];
        let origins: Vec<Position> = agents.iter().map(|a| a.position).collect();
        let mut comms = Comms::new(agents.len());
        comms.exchange(&agents, &origins, &[None, Some(1), None]);
        assert_eq!(comms.inbox(AgentId(2)).len(), 1);
        comms.exchange(&agents, &origins, &[None, None, None]);
        assert!(comms.inbox(AgentId(2)).is_empty());
    }
}
