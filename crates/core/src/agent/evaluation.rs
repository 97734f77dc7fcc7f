//! Destination scoring and candidate ranking.
//! This module exists to rank many destinations cheaply with a route-shaped estimate.
//! It does not run the weighted solver or touch destination commitments.

use std::cmp::Reverse;
use std::iter;

use super::pathfinding::manhattan;
use crate::config::AgentConfig;
use crate::state::ClaimableGrid;
use crate::types::Pos;

/// Score of a destination whose route never leaves owned territory.
pub const REJECTED_PATH_SCORE: i64 = i64::MIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub pos: Pos,
    pub score: i64,
    /// Manhattan distance from the search origin.
    pub distance: u32,
}

/// Net gain of walking from `start` to `target` horizontally first, then vertically.
///
/// Each step onto a cell the team does not own earns its nutrient times `gain_weight` and
/// pays one biomass. Steps onto owned cells are free and earn nothing.
pub fn path_score(claimable: &ClaimableGrid, start: Pos, target: Pos, gain_weight: u32) -> i64 {
    if !claimable.in_bounds(start) || !claimable.in_bounds(target) {
        return REJECTED_PATH_SCORE;
    }
    let gain_weight = i64::from(gain_weight);
    let mut crossed_unowned = false;
    let mut net = 0i64;
    let mut score_step = |pos: Pos| {
        if !claimable.is_owned(pos) {
            crossed_unowned = true;
            net += i64::from(claimable.nutrient_at(pos)) * gain_weight - 1;
        }
    };

    let mut cursor = start;
    let step_x = (target.x - start.x).signum();
    while cursor.x != target.x {
        cursor.x += step_x;
        score_step(cursor);
    }
    let step_y = (target.y - start.y).signum();
    while cursor.y != target.y {
        cursor.y += step_y;
        score_step(cursor);
    }

    if crossed_unowned { net } else { REJECTED_PATH_SCORE }
}

/// Positive-score destinations around `origin`, best first, at most `top_k` of them.
///
/// `exclude` (the spore's own cell) is dropped before anything is scored.
pub fn rank_candidates(
    claimable: &ClaimableGrid,
    origin: Pos,
    exclude: Pos,
    config: &AgentConfig,
) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = cells_within(claimable, origin, config.search_radius)
        .filter(|pos| *pos != exclude)
        .filter(|pos| !claimable.is_owned(*pos) && claimable.nutrient_at(*pos) > 0)
        .map(|pos| Candidate {
            pos,
            score: path_score(claimable, origin, pos, config.gain_weight),
            distance: manhattan(origin, pos),
        })
        .filter(|candidate| candidate.score > 0)
        .collect();
    ranked.sort_by_key(|c| (Reverse(c.score), c.distance, c.pos));
    ranked.truncate(config.top_k);
    ranked
}

/// Nearest cell around `origin` the team does not own, regardless of its score.
pub fn fallback_candidate(
    claimable: &ClaimableGrid,
    origin: Pos,
    exclude: Pos,
    radius: u32,
    gain_weight: u32,
) -> Option<Candidate> {
    (0..=reachable_radius(claimable, origin, radius)).find_map(|ring| {
        ring_cells(claimable, origin, ring)
            .filter(|pos| *pos != exclude && !claimable.is_owned(*pos))
            .min()
            .map(|pos| Candidate {
                pos,
                score: path_score(claimable, origin, pos, gain_weight),
                distance: ring,
            })
    })
}

/// Ranked destinations, or the single fallback cell when nothing scores positive.
///
/// An empty result means there is no actionable destination this tick.
pub fn candidate_targets(
    claimable: &ClaimableGrid,
    origin: Pos,
    exclude: Pos,
    config: &AgentConfig,
) -> Vec<Candidate> {
    let ranked = rank_candidates(claimable, origin, exclude, config);
    if !ranked.is_empty() {
        return ranked;
    }
    fallback_candidate(claimable, origin, exclude, config.fallback_radius, config.gain_weight)
        .into_iter()
        .collect()
}

fn cells_within(
    claimable: &ClaimableGrid,
    origin: Pos,
    radius: u32,
) -> impl Iterator<Item = Pos> + '_ {
    (0..=reachable_radius(claimable, origin, radius))
        .flat_map(move |ring| ring_cells(claimable, origin, ring))
}

/// `radius` clipped to the distance of the farthest map corner from `origin`.
///
/// Rings past that corner hold no in-bounds cell, so scanning them is wasted work.
fn reachable_radius(claimable: &ClaimableGrid, origin: Pos, radius: u32) -> u32 {
    let (Ok(width), Ok(height)) =
        (i32::try_from(claimable.width()), i32::try_from(claimable.height()))
    else {
        return radius;
    };
    if width == 0 || height == 0 {
        return 0;
    }
    let (right, bottom) = (width - 1, height - 1);
    let corners =
        [Pos::new(0, 0), Pos::new(right, 0), Pos::new(0, bottom), Pos::new(right, bottom)];
    let farthest = corners.into_iter().map(|corner| manhattan(origin, corner)).max().unwrap_or(0);
    radius.min(farthest)
}

/// In-bounds cells at exactly Manhattan distance `ring` from `origin`, row by row.
///
/// Rows above or below the map are skipped without visiting their cells.
fn ring_cells(
    claimable: &ClaimableGrid,
    origin: Pos,
    ring: u32,
) -> impl Iterator<Item = Pos> + '_ {
    let r = i64::from(ring);
    let top = (i64::from(origin.y) - r).max(0);
    let bottom = (i64::from(origin.y) + r).min(claimable.height() as i64 - 1);
    (top..=bottom).flat_map(move |y| {
        let dy = y - i64::from(origin.y);
        let span = r - dy.abs();
        let left = i64::from(origin.x) - span;
        let right = (span > 0).then_some(i64::from(origin.x) + span);
        iter::once(left).chain(right).filter_map(move |x| {
            let pos = Pos::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?);
            claimable.in_bounds(pos).then_some(pos)
        })
    })
}
