//! Scoring policies computed from ledger counts alone.

use crate::constants::{SCORE_BOTH_GENDERS, SCORE_EITHER_GENDER};
use crate::ledger::ArkLedger;

/// Turns final ledger state into a score.
pub trait ScoringPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, ledger: &ArkLedger) -> i64;
}

/// Full credit for a complete species, partial credit for a single gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairScoring {
    pub both: i64,
    pub either: i64,
}

impl Default for PairScoring {
    fn default() -> Self {
        Self {
            both: SCORE_BOTH_GENDERS,
            either: SCORE_EITHER_GENDER,
        }
    }
}

impl ScoringPolicy for PairScoring {
    fn name(&self) -> &'static str {
        "pair"
    }

    fn score(&self, ledger: &ArkLedger) -> i64 {
        ledger
            .counts()
            .iter()
            .map(|c| match (c.males > 0, c.females > 0) {
                (true, true) => self.both,
                (true, false) | (false, true) => self.either,
                (false, false) => 0,
            })
            .sum()
    }
}

/// One point per complete species, nothing for partial deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompleteSpeciesScoring;

impl ScoringPolicy for CompleteSpeciesScoring {
    fn name(&self) -> &'static str {
        "complete-species"
    }

    fn score(&self, ledger: &ArkLedger) -> i64 {
        ledger.complete_count() as i64
    }
}
