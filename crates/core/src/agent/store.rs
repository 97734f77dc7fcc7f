//! Per-spore destination commitments that persist across ticks.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AssignmentState, Pos, SporeId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DestinationStore {
    commitments: BTreeMap<SporeId, Pos>,
}

impl DestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, spore: &SporeId) -> AssignmentState {
        match self.commitments.get(spore) {
            Some(target) => AssignmentState::Committed(*target),
            None => AssignmentState::Unassigned,
        }
    }

    pub fn target(&self, spore: &SporeId) -> Option<Pos> {
        self.commitments.get(spore).copied()
    }

    /// Commits `spore` to `target`, returning the commitment it replaces.
    pub fn commit(&mut self, spore: SporeId, target: Pos) -> Option<Pos> {
        self.commitments.insert(spore, target)
    }

    pub fn retire(&mut self, spore: &SporeId) -> Option<Pos> {
        self.commitments.remove(spore)
    }

    /// Drops commitments of spores that are no longer on the roster and returns their ids.
    pub fn retain_present(&mut self, present: &BTreeSet<&SporeId>) -> Vec<SporeId> {
        let gone: Vec<SporeId> =
            self.commitments.keys().filter(|id| !present.contains(id)).cloned().collect();
        for id in &gone {
            self.commitments.remove(id);
        }
        gone
    }

    pub fn len(&self) -> usize {
        self.commitments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commitments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SporeId, Pos)> + '_ {
        self.commitments.iter().map(|(id, target)| (id, *target))
    }
}
