//! Terrain-weighted shortest-path routing over the four-connected grid.
//! This module exists so routing cost rules live in one place, separate from ranking heuristics.
//! It does not choose destinations or remember commitments.

use std::collections::BTreeSet;

use crate::state::ClaimableGrid;
use crate::types::{Pos, TerrainCostMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    g: u32,
    seq: u64,
    idx: usize,
}

/// Cost of stepping onto `pos`.
///
/// In resource-weighted mode any cell the team does not own pays its biomass, whoever holds it.
pub fn step_cost(claimable: &ClaimableGrid, pos: Pos, mode: TerrainCostMode) -> u32 {
    if claimable.is_owned(pos) {
        return 0;
    }
    match mode {
        TerrainCostMode::Flat => 1,
        TerrainCostMode::ResourceWeighted => match claimable.defense_at(pos) {
            0 => 1,
            defense => defense,
        },
    }
}

/// Summed step cost of a route, excluding its first cell.
pub fn route_cost(claimable: &ClaimableGrid, route: &[Pos], mode: TerrainCostMode) -> u32 {
    route.iter().skip(1).map(|pos| step_cost(claimable, *pos, mode)).sum()
}

/// Minimum-cost route from `start` to `goal`, both inclusive.
///
/// Returns an empty route when either end is off the map, when the goal cannot be reached,
/// or when more than `max_expansions` cells would have to be settled first.
pub fn weighted_route(
    claimable: &ClaimableGrid,
    start: Pos,
    goal: Pos,
    mode: TerrainCostMode,
    max_expansions: Option<usize>,
) -> Vec<Pos> {
    let (Some(start_idx), Some(goal_idx)) = (claimable.index(start), claimable.index(goal)) else {
        return Vec::new();
    };
    if start_idx == goal_idx {
        return vec![start];
    }

    let budget = max_expansions.unwrap_or(usize::MAX);
    let mut dist = vec![u32::MAX; claimable.cell_count()];
    let mut came_from: Vec<Option<usize>> = vec![None; claimable.cell_count()];
    let mut open_set = BTreeSet::new();
    let mut seq = 0u64;
    let mut settled = 0usize;

    dist[start_idx] = 0;
    open_set.insert(OpenNode { g: 0, seq, idx: start_idx });

    while let Some(curr) = open_set.pop_first() {
        if curr.g > dist[curr.idx] {
            continue;
        }
        if curr.idx == goal_idx {
            return reconstruct_route(claimable, &came_from, start_idx, goal_idx);
        }
        settled += 1;
        if settled > budget {
            return Vec::new();
        }
        let p = claimable.pos_of(curr.idx);
        for n in neighbors(p) {
            let Some(n_idx) = claimable.index(n) else {
                continue;
            };
            let tg = curr.g.saturating_add(step_cost(claimable, n, mode));
            if tg < dist[n_idx] {
                dist[n_idx] = tg;
                came_from[n_idx] = Some(curr.idx);
                seq += 1;
                open_set.insert(OpenNode { g: tg, seq, idx: n_idx });
            }
        }
    }
    Vec::new()
}

fn reconstruct_route(
    claimable: &ClaimableGrid,
    came_from: &[Option<usize>],
    start_idx: usize,
    goal_idx: usize,
) -> Vec<Pos> {
    let mut idx = goal_idx;
    let mut result = vec![claimable.pos_of(idx)];
    while idx != start_idx {
        let Some(prev) = came_from[idx] else {
            return Vec::new();
        };
        idx = prev;
        result.push(claimable.pos_of(idx));
    }
    result.reverse();
    result
}

pub fn neighbors(p: Pos) -> [Pos; 4] {
    [
        Pos { y: p.y - 1, x: p.x },
        Pos { y: p.y, x: p.x + 1 },
        Pos { y: p.y + 1, x: p.x },
        Pos { y: p.y, x: p.x - 1 },
    ]
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::*;
    use crate::state::WorldGrid;

    fn assert_cardinal_steps(route: &[Pos]) {
        for pair in route.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1, "non-cardinal step {pair:?}");
        }
    }

    #[test]
    fn open_map_route_has_uniform_unit_cost() {
        let (snapshot, _) = lone_nutrient_fixture();
        let claimable = snapshot.claimable();
        let start = Pos::new(0, 0);
        let goal = Pos::new(4, 4);

        let route = weighted_route(&claimable, start, goal, TerrainCostMode::Flat, None);
        assert_eq!(route.len(), 9);
        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&goal));
        assert_cardinal_steps(&route);
        assert_eq!(route_cost(&claimable, &route, TerrainCostMode::Flat), 8);
    }

    #[test]
    fn route_to_self_is_the_start_cell() {
        let claimable = WorldGrid::new(3, 3).claimable_for(US);
        let at = Pos::new(1, 1);
        assert_eq!(weighted_route(&claimable, at, at, TerrainCostMode::Flat, None), vec![at]);
    }

    #[test]
    fn off_map_goal_yields_empty_route() {
        let claimable = WorldGrid::new(3, 3).claimable_for(US);
        let route =
            weighted_route(&claimable, Pos::new(0, 0), Pos::new(3, 0), TerrainCostMode::Flat, None);
        assert!(route.is_empty());
    }

    #[test]
    fn owned_corridor_is_preferred_over_a_shorter_unowned_line() {
        // Owned U-shaped corridor around an unowned straight line.
        let mut grid = WorldGrid::new(5, 3);
        for x in 0..5 {
            grid.set_owner(Pos::new(x, 2), Some(US));
        }
        grid.set_owner(Pos::new(0, 1), Some(US));
        grid.set_owner(Pos::new(4, 1), Some(US));
        let claimable = grid.claimable_for(US);

        let route =
            weighted_route(&claimable, Pos::new(0, 1), Pos::new(4, 1), TerrainCostMode::Flat, None);
        assert_cardinal_steps(&route);
        assert_eq!(route_cost(&claimable, &route, TerrainCostMode::Flat), 0);
        assert!(route.contains(&Pos::new(2, 2)));
    }

    #[test]
    fn resource_weighted_mode_routes_around_defended_cells() {
        let mut grid = WorldGrid::new(3, 3);
        grid.set_biomass(Pos::new(1, 1), 9);
        let claimable = grid.claimable_for(US);
        let start = Pos::new(1, 0);
        let goal = Pos::new(1, 2);

        let flat = weighted_route(&claimable, start, goal, TerrainCostMode::Flat, None);
        assert_eq!(flat, vec![start, Pos::new(1, 1), goal]);

        let weighted =
            weighted_route(&claimable, start, goal, TerrainCostMode::ResourceWeighted, None);
        assert!(!weighted.contains(&Pos::new(1, 1)));
        assert_eq!(weighted.len(), 5);
        assert_eq!(route_cost(&claimable, &weighted, TerrainCostMode::ResourceWeighted), 4);
    }

    #[test]
    fn owned_defended_cell_is_free_in_both_modes() {
        let mut grid = WorldGrid::new(2, 1);
        let pos = Pos::new(1, 0);
        grid.set_biomass(pos, 50);
        grid.set_owner(pos, Some(US));
        let claimable = grid.claimable_for(US);
        assert_eq!(step_cost(&claimable, pos, TerrainCostMode::Flat), 0);
        assert_eq!(step_cost(&claimable, pos, TerrainCostMode::ResourceWeighted), 0);
    }

    #[test]
    fn enemy_biomass_is_charged_like_neutral_biomass() {
        let mut grid = WorldGrid::new(3, 1);
        let neutral = Pos::new(1, 0);
        let enemy = Pos::new(2, 0);
        grid.set_biomass(neutral, 6);
        grid.set_biomass(enemy, 6);
        grid.set_owner(enemy, Some(THEM));
        let claimable = grid.claimable_for(US);

        let mode = TerrainCostMode::ResourceWeighted;
        assert_eq!(step_cost(&claimable, neutral, mode), 6);
        assert_eq!(step_cost(&claimable, enemy, mode), 6);
        assert_eq!(step_cost(&claimable, Pos::new(0, 0), mode), 1);
    }

    #[test]
    fn exhausted_expansion_budget_reports_unreachable() {
        let claimable = WorldGrid::new(10, 10).claimable_for(US);
        let start = Pos::new(0, 0);
        let goal = Pos::new(9, 9);
        assert!(weighted_route(&claimable, start, goal, TerrainCostMode::Flat, Some(5)).is_empty());
        assert_eq!(weighted_route(&claimable, start, goal, TerrainCostMode::Flat, None).len(), 19);
    }
}
