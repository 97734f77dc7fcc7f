//! Shared test fixtures for the `agent` submodule test suites.
//! This module exists to avoid repeating snapshot setup across many tests.
//! It does not own production decision logic.

use crate::state::{Spawner, Spore, TickSnapshot, WorldGrid};
use crate::types::*;

pub(crate) const US: TeamId = TeamId(1);
pub(crate) const THEM: TeamId = TeamId(2);

pub(crate) fn spore(id: &str, x: i32, y: i32, biomass: u32) -> Spore {
    Spore { id: SporeId::from(id), pos: Pos::new(x, y), biomass }
}

pub(crate) fn spawner(id: &str, x: i32, y: i32, team: TeamId) -> Spawner {
    Spawner { id: SpawnerId::from(id), pos: Pos::new(x, y), team }
}

pub(crate) fn open_field(width: usize, height: usize) -> TickSnapshot {
    TickSnapshot::new(0, US, WorldGrid::new(width, height))
}

/// 5x5 neutral map with a single nutrient cell at (4, 4) and one spore at (0, 0).
pub(crate) fn lone_nutrient_fixture() -> (TickSnapshot, Spore) {
    let mut snapshot = open_field(5, 5);
    snapshot.grid.set_nutrient(Pos::new(4, 4), 10);
    let unit = spore("s1", 0, 0, 5);
    snapshot.spores.push(unit.clone());
    (snapshot, unit)
}

/// Same map as [`lone_nutrient_fixture`] with every cell owned by the team.
pub(crate) fn fully_owned_fixture() -> (TickSnapshot, Spore) {
    let (mut snapshot, unit) = lone_nutrient_fixture();
    let cells: Vec<Pos> = snapshot.grid.positions().collect();
    for pos in cells {
        snapshot.grid.set_owner(pos, Some(US));
    }
    (snapshot, unit)
}

pub(crate) fn own_all(snapshot: &mut TickSnapshot, cells: impl IntoIterator<Item = Pos>) {
    for pos in cells {
        snapshot.grid.set_owner(pos, Some(US));
    }
}
