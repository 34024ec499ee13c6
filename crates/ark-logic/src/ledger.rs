//! Ark ledger — per-species delivered counts.
//!
//! Pure bookkeeping. The ledger remembers which animal ids it has recorded so a
//! single physical animal is never counted twice, and counts only ever grow.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::{AnimalId, Gender, SpeciesId};

/// Delivered males and females of one species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeciesCount {
    pub males: u32,
    pub females: u32,
}

impl SpeciesCount {
    pub fn is_complete(&self) -> bool {
        self.males >= 1 && self.females >= 1
    }

    pub fn total(&self) -> u32 {
        self.males + self.females
    }

    pub fn has(&self, gender: Gender) -> bool {
        match gender {
            Gender::Male => self.males > 0,
            Gender::Female => self.females > 0,
            Gender::Unknown => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArkLedger {
    counts: Vec<SpeciesCount>,
    delivered: BTreeSet<AnimalId>,
}

impl ArkLedger {
    pub fn new(species_count: usize) -> Self {
        Self {
            counts: vec![SpeciesCount::default(); species_count],
            delivered: BTreeSet::new(),
        }
    }

    /// Record one delivered animal. Returns `false` (and changes nothing) for an
    /// animal already on the ledger, an unknown species, or an unknown gender.
    pub fn record_delivery(&mut self, id: AnimalId, species: SpeciesId, gender: Gender) -> bool {
        let Some(count) = self.counts.get_mut(species.index()) else {
            return false;
        };
        if self.delivered.contains(&id) {
            return false;
        }
        match gender {
            Gender::Male => count.males += 1,
            Gender::Female => count.females += 1,
            Gender::Unknown => return false,
        }
        self.delivered.insert(id);
        true
    }

    pub fn contains(&self, id: AnimalId) -> bool {
        self.delivered.contains(&id)
    }

    pub fn count(&self, species: SpeciesId) -> SpeciesCount {
        self.counts.get(species.index()).copied().unwrap_or_default()
    }

    pub fn is_complete(&self, species: SpeciesId) -> bool {
        self.count(species).is_complete()
    }

    /// Number of species with both genders delivered.
    pub fn complete_count(&self) -> usize {
        self.counts.iter().filter(|c| c.is_complete()).count()
    }

    pub fn total_delivered(&self) -> usize {
        self.delivered.len()
    }

    pub fn species_count(&self) -> usize {
        self.counts.len()
    }

    /// Raw counts indexed by species id.
    pub fn counts(&self) -> &[SpeciesCount] {
        &self.counts
    }
}
