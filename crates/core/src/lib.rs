pub mod agent;
pub mod config;
pub mod policy;
mod random;
pub mod recording;
pub mod replay;
pub mod state;
pub mod types;

pub use agent::{Agent, DestinationStore};
pub use config::{
    AgentConfig, ConfigError, ProductionPolicyConfig, ScatterPhaseConfig, SpawnerPolicyConfig,
};
pub use policy::{BudgetProductionPolicy, ProductionPolicy, SpacedSpawnerPolicy, SpawnerPolicy};
pub use recording::MatchRecording;
pub use replay::*;
pub use state::{ClaimableGrid, GridRows, SnapshotError, Spawner, Spore, TickSnapshot, WorldGrid};
pub use types::*;
