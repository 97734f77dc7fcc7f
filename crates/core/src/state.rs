//! Per-tick world snapshot and the grid views derived from it.
//! This module exists so every decision component queries the same read-only substrate.
//! It does not own target selection, routing, or any state that outlives a tick.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Read-only ownership, nutrient, and biomass values for every cell of the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRows", into = "GridRows")]
pub struct WorldGrid {
    width: usize,
    height: usize,
    owners: Vec<Option<TeamId>>,
    nutrients: Vec<u32>,
    biomass: Vec<u32>,
}

/// Row-major wire layout of a [`WorldGrid`], indexed `[y][x]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridRows {
    pub width: usize,
    pub height: usize,
    pub ownership: Vec<Vec<Option<TeamId>>>,
    pub nutrients: Vec<Vec<u32>>,
    pub biomass: Vec<Vec<u32>>,
}

impl WorldGrid {
    /// All-neutral grid with zero nutrient and biomass.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            owners: vec![None; cells],
            nutrients: vec![0; cells],
            biomass: vec![0; cells],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        in_bounds(self.width, self.height, pos)
    }

    pub fn owner_at(&self, pos: Pos) -> Option<TeamId> {
        self.index(pos).and_then(|idx| self.owners[idx])
    }

    pub fn nutrient_at(&self, pos: Pos) -> u32 {
        self.index(pos).map_or(0, |idx| self.nutrients[idx])
    }

    pub fn biomass_at(&self, pos: Pos) -> u32 {
        self.index(pos).map_or(0, |idx| self.biomass[idx])
    }

    pub fn is_owned_by(&self, pos: Pos, team: TeamId) -> bool {
        self.owner_at(pos) == Some(team)
    }

    pub fn set_owner(&mut self, pos: Pos, owner: Option<TeamId>) {
        if let Some(idx) = self.index(pos) {
            self.owners[idx] = owner;
        }
    }

    pub fn set_nutrient(&mut self, pos: Pos, nutrient: u32) {
        if let Some(idx) = self.index(pos) {
            self.nutrients[idx] = nutrient;
        }
    }

    pub fn set_biomass(&mut self, pos: Pos, biomass: u32) {
        if let Some(idx) = self.index(pos) {
            self.biomass[idx] = biomass;
        }
    }

    /// Iterates every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    /// Nutrient and biomass with every cell owned by `team` zeroed out.
    pub fn claimable_for(&self, team: TeamId) -> ClaimableGrid {
        let owned: Vec<bool> = self.owners.iter().map(|owner| *owner == Some(team)).collect();
        let mask = |values: &[u32]| -> Vec<u32> {
            values
                .iter()
                .zip(&owned)
                .map(|(value, owned)| if *owned { 0 } else { *value })
                .collect()
        };
        ClaimableGrid {
            width: self.width,
            height: self.height,
            nutrient: mask(&self.nutrients),
            defense: mask(&self.biomass),
            owned,
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }
}

impl TryFrom<GridRows> for WorldGrid {
    type Error = SnapshotError;

    fn try_from(rows: GridRows) -> Result<Self, Self::Error> {
        let GridRows { width, height, ownership, nutrients, biomass } = rows;
        let owners = flatten_rows("ownership", width, height, ownership)?;
        let nutrients = flatten_rows("nutrients", width, height, nutrients)?;
        let biomass = flatten_rows("biomass", width, height, biomass)?;
        Ok(Self { width, height, owners, nutrients, biomass })
    }
}

impl From<WorldGrid> for GridRows {
    fn from(grid: WorldGrid) -> Self {
        let width = grid.width.max(1);
        GridRows {
            width: grid.width,
            height: grid.height,
            ownership: grid.owners.chunks(width).map(<[_]>::to_vec).collect(),
            nutrients: grid.nutrients.chunks(width).map(<[_]>::to_vec).collect(),
            biomass: grid.biomass.chunks(width).map(<[_]>::to_vec).collect(),
        }
    }
}

fn flatten_rows<T: Copy>(
    layer: &'static str,
    width: usize,
    height: usize,
    rows: Vec<Vec<T>>,
) -> Result<Vec<T>, SnapshotError> {
    if rows.len() != height {
        let found = rows.len();
        return Err(SnapshotError::GridShape { layer, expected: height, found, row: None });
    }
    let mut cells = Vec::with_capacity(width * height);
    for (y, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(SnapshotError::GridShape {
                layer,
                expected: width,
                found: row.len(),
                row: Some(y),
            });
        }
        cells.extend(row);
    }
    Ok(cells)
}

pub(crate) fn in_bounds(width: usize, height: usize, pos: Pos) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height
}

/// Per-tick derived view for one team: what claiming each cell would still yield.
///
/// Built once per tick and shared by reference between the evaluator and the solver.
#[derive(Clone, Debug)]
pub struct ClaimableGrid {
    width: usize,
    height: usize,
    nutrient: Vec<u32>,
    defense: Vec<u32>,
    owned: Vec<bool>,
}

impl ClaimableGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        in_bounds(self.width, self.height, pos)
    }

    pub fn is_owned(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.owned[idx])
    }

    pub fn nutrient_at(&self, pos: Pos) -> u32 {
        self.index(pos).map_or(0, |idx| self.nutrient[idx])
    }

    /// Biomass defending a cell the team does not own yet.
    pub fn defense_at(&self, pos: Pos) -> u32 {
        self.index(pos).map_or(0, |idx| self.defense[idx])
    }

    pub(crate) fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub(crate) fn pos_of(&self, idx: usize) -> Pos {
        Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spore {
    pub id: SporeId,
    pub pos: Pos,
    pub biomass: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawner {
    pub id: SpawnerId,
    pub pos: Pos,
    pub team: TeamId,
}

/// Everything the agent sees for one tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub team: TeamId,
    #[serde(default)]
    pub team_nutrients: u32,
    #[serde(default)]
    pub next_spawner_cost: u32,
    pub grid: WorldGrid,
    /// The team's own spores.
    pub spores: Vec<Spore>,
    /// Spawners of every team; only the team's own are used as anchors.
    #[serde(default)]
    pub spawners: Vec<Spawner>,
    /// Spores that must not receive a move order this tick.
    #[serde(default)]
    pub blocked: BTreeSet<SporeId>,
}

impl TickSnapshot {
    pub fn new(tick: u64, team: TeamId, grid: WorldGrid) -> Self {
        Self {
            tick,
            team,
            team_nutrients: 0,
            next_spawner_cost: 0,
            grid,
            spores: Vec::new(),
            spawners: Vec::new(),
            blocked: BTreeSet::new(),
        }
    }

    pub fn own_spawners(&self) -> impl Iterator<Item = &Spawner> + '_ {
        self.spawners.iter().filter(move |spawner| spawner.team == self.team)
    }

    pub fn claimable(&self) -> ClaimableGrid {
        self.grid.claimable_for(self.team)
    }

    /// Rejects snapshots that place a spore or spawner outside the map.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for spore in &self.spores {
            if !self.grid.in_bounds(spore.pos) {
                let id = spore.id.clone();
                return Err(SnapshotError::SporeOutOfBounds { id, pos: spore.pos });
            }
        }
        for spawner in &self.spawners {
            if !self.grid.in_bounds(spawner.pos) {
                return Err(SnapshotError::SpawnerOutOfBounds {
                    id: spawner.id.clone(),
                    pos: spawner.pos,
                });
            }
        }
        Ok(())
    }
}

/// Describes why a snapshot cannot be used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A grid layer has the wrong number of rows (`row: None`) or cells in a row.
    GridShape { layer: &'static str, expected: usize, found: usize, row: Option<usize> },
    SporeOutOfBounds { id: SporeId, pos: Pos },
    SpawnerOutOfBounds { id: SpawnerId, pos: Pos },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridShape { layer, expected, found, row: None } => {
                write!(f, "{layer} grid has {found} rows, expected {expected}")
            }
            Self::GridShape { layer, expected, found, row: Some(row) } => {
                write!(f, "{layer} grid row {row} has {found} cells, expected {expected}")
            }
            Self::SporeOutOfBounds { id, pos } => {
                write!(f, "spore {} at ({}, {}) is outside the map", id.0, pos.x, pos.y)
            }
            Self::SpawnerOutOfBounds { id, pos } => {
                write!(f, "spawner {} at ({}, {}) is outside the map", id.0, pos.x, pos.y)
            }
        }
    }
}

impl Error for SnapshotError {}
