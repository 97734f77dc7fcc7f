//! The periodic scatter window that replaces target-following for a few ticks.
//! Spores wander a random bounded offset and spawners produce on a fixed threshold.
//! It does not read or change destination commitments.

use std::collections::BTreeSet;

use tracing::debug;

use super::Agent;
use crate::config::ScatterPhaseConfig;
use crate::random::pick_index;
use crate::state::{Spore, TickSnapshot};
use crate::types::*;

impl Agent {
    /// Action batch for a tick inside the scatter window: production first, then wandering.
    pub(super) fn scatter_actions(
        &mut self,
        snapshot: &TickSnapshot,
        phase: &ScatterPhaseConfig,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut remaining = snapshot.team_nutrients;
        for spawner in snapshot.own_spawners() {
            if remaining <= phase.min_nutrients {
                break;
            }
            actions.push(Action::ProduceSpore {
                spawner_id: spawner.id.clone(),
                biomass: phase.spore_biomass,
            });
            remaining = remaining.saturating_sub(phase.spore_biomass);
        }

        let claimable = snapshot.claimable();
        let mut seen = BTreeSet::new();
        for spore in &snapshot.spores {
            if !seen.insert(&spore.id)
                || snapshot.blocked.contains(&spore.id)
                || spore.biomass < self.config.min_action_biomass
                || !claimable.in_bounds(spore.pos)
            {
                continue;
            }
            let Some(to) = self.wander_target(spore, phase.max_offset) else {
                continue;
            };
            if !claimable.in_bounds(to) || to == spore.pos {
                continue;
            }
            self.log.push(DecisionEvent::Scattered { spore: spore.id.clone(), to });
            actions.push(Action::MoveSpore { spore_id: spore.id.clone(), target: to });
        }

        debug!(tick = snapshot.tick, actions = actions.len(), "Scatter batch ready");
        actions
    }

    /// Uniform offset in `-max_offset..=max_offset` along each axis, x drawn first.
    fn wander_target(&mut self, spore: &Spore, max_offset: u32) -> Option<Pos> {
        let span = 2 * max_offset as usize + 1;
        let mut offset = || pick_index(&mut self.rng, span) as i64 - i64::from(max_offset);
        let dx = offset();
        let dy = offset();
        let x = i32::try_from(i64::from(spore.pos.x) + dx).ok()?;
        let y = i32::try_from(i64::from(spore.pos.y) + dy).ok()?;
        Some(Pos::new(x, y))
    }
}
