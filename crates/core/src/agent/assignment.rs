//! Per-spore commitment transitions for one decision pass.
//! This module exists to keep the hysteresis rules apart from scoring and routing.
//! It does not rank candidates or price terrain itself.

use std::collections::BTreeSet;
use std::iter;

use tracing::{debug, trace};

use super::evaluation::candidate_targets;
use super::pathfinding::{manhattan, neighbors, weighted_route};
use super::{Agent, TickContext};
use crate::random::{pick_index, shuffle};
use crate::state::Spore;
use crate::types::*;

impl Agent {
    pub(super) fn assign_spore(
        &mut self,
        ctx: &TickContext<'_>,
        spore: &Spore,
        blocked: &BTreeSet<SporeId>,
    ) -> Option<MoveOrder> {
        if blocked.contains(&spore.id) {
            return self.idle(spore, IdleReason::Blocked);
        }
        if spore.biomass < self.config.min_action_biomass {
            return self.idle(spore, IdleReason::LowBiomass);
        }

        match self.store.state(&spore.id) {
            AssignmentState::Committed(target) if target != spore.pos => {
                if let Some((next, path_len)) = self.step_toward(ctx, spore.pos, target) {
                    trace!(spore = %spore.id.0, ?target, ?next, path_len, "Commitment continued");
                    self.log.push(DecisionEvent::Continued {
                        spore: spore.id.clone(),
                        target,
                        path_len,
                    });
                    return Some(MoveOrder { spore_id: spore.id.clone(), target: next });
                }
                self.store.retire(&spore.id);
                self.log.push(DecisionEvent::Abandoned { spore: spore.id.clone(), target });
            }
            AssignmentState::Committed(target) => {
                self.store.retire(&spore.id);
                self.log.push(DecisionEvent::Arrived { spore: spore.id.clone(), target });
            }
            AssignmentState::Unassigned => {}
        }

        self.commit_fresh_target(ctx, spore)
    }

    fn commit_fresh_target(&mut self, ctx: &TickContext<'_>, spore: &Spore) -> Option<MoveOrder> {
        let origin = ctx.anchor_for(spore.pos);
        let candidates = candidate_targets(&ctx.claimable, origin, spore.pos, &self.config);
        self.log.push(DecisionEvent::CandidatesRanked {
            spore: spore.id.clone(),
            origin,
            count: candidates.len(),
        });
        if candidates.is_empty() {
            return self.idle(spore, IdleReason::NoCandidate);
        }

        let spread = candidates.len().min(self.config.commit_spread);
        let first = if spread > 1 { pick_index(&mut self.rng, spread) } else { 0 };
        let attempts = iter::once(first).chain((0..candidates.len()).filter(|idx| *idx != first));
        for idx in attempts {
            let target = candidates[idx].pos;
            if let Some((next, path_len)) = self.step_toward(ctx, spore.pos, target) {
                debug!(
                    spore = %spore.id.0,
                    ?origin,
                    ?target,
                    score = candidates[idx].score,
                    path_len,
                    "Destination committed"
                );
                self.store.commit(spore.id.clone(), target);
                self.log.push(DecisionEvent::Committed {
                    spore: spore.id.clone(),
                    target,
                    path_len,
                });
                return Some(MoveOrder { spore_id: spore.id.clone(), target: next });
            }
        }

        self.nudge(ctx, spore)
    }

    /// Order target and remaining path length from `from` toward `target`.
    fn step_toward(&self, ctx: &TickContext<'_>, from: Pos, target: Pos) -> Option<(Pos, u16)> {
        match self.config.movement_mode {
            MovementMode::Direct => {
                Some((target, saturating_len(manhattan(from, target) as usize)))
            }
            MovementMode::Routed => {
                let route = weighted_route(
                    &ctx.claimable,
                    from,
                    target,
                    self.config.terrain_cost_mode,
                    self.config.max_route_expansions,
                );
                let next = *route.get(1)?;
                Some((next, saturating_len(route.len() - 1)))
            }
        }
    }

    /// Last resort once every candidate proved unroutable: one random in-bounds step.
    fn nudge(&mut self, ctx: &TickContext<'_>, spore: &Spore) -> Option<MoveOrder> {
        self.store.retire(&spore.id);
        let mut directions = neighbors(spore.pos);
        shuffle(&mut self.rng, &mut directions);
        let Some(to) = directions.into_iter().find(|pos| ctx.claimable.in_bounds(*pos)) else {
            return self.idle(spore, IdleReason::Pinned);
        };
        debug!(spore = %spore.id.0, ?to, "No routable candidate, nudging");
        self.log.push(DecisionEvent::Nudged { spore: spore.id.clone(), to });
        Some(MoveOrder { spore_id: spore.id.clone(), target: to })
    }

    fn idle(&mut self, spore: &Spore, reason: IdleReason) -> Option<MoveOrder> {
        if let Some(target) = self.store.retire(&spore.id) {
            trace!(spore = %spore.id.0, ?target, ?reason, "Commitment dropped");
        }
        self.log.push(DecisionEvent::Idle { spore: spore.id.clone(), reason });
        None
    }
}

fn saturating_len(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}
