use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SporeId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpawnerId(pub String);

impl From<&str> for SporeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for SpawnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How the weighted solver prices a step onto a cell the team does not own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainCostMode {
    /// Every non-owned cell costs 1.
    #[default]
    Flat,
    /// Contested cells cost their claimable biomass; other non-owned cells cost 1.
    ResourceWeighted,
}

/// What a move order points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Next cell of the weighted route toward the committed destination.
    #[default]
    Routed,
    /// The committed destination itself; the game engine walks the unit there.
    Direct,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOrder {
    pub spore_id: SporeId,
    pub target: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveSpore { spore_id: SporeId, target: Pos },
    CreateSpawner { spore_id: SporeId },
    ProduceSpore { spawner_id: SpawnerId, biomass: u32 },
}

impl From<MoveOrder> for Action {
    fn from(order: MoveOrder) -> Self {
        Action::MoveSpore { spore_id: order.spore_id, target: order.target }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentState {
    Unassigned,
    Committed(Pos),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleReason {
    Blocked,
    LowBiomass,
    NoCandidate,
    Pinned,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionEvent {
    CandidatesRanked { spore: SporeId, origin: Pos, count: usize },
    Committed { spore: SporeId, target: Pos, path_len: u16 },
    Continued { spore: SporeId, target: Pos, path_len: u16 },
    Arrived { spore: SporeId, target: Pos },
    Abandoned { spore: SporeId, target: Pos },
    Nudged { spore: SporeId, to: Pos },
    Scattered { spore: SporeId, to: Pos },
    Idle { spore: SporeId, reason: IdleReason },
    Forgotten { spore: SporeId },
}
