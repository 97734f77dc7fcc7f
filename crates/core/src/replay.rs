use std::error::Error;
use std::fmt;

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::recording::MatchRecording;
use crate::state::SnapshotError;
use crate::types::Action;

#[derive(Debug, PartialEq)]
pub enum ReplayError {
    EmptyRecording,
    TickOutOfOrder { index: usize, previous: u64, found: u64 },
    InvalidSnapshot { tick: u64, error: SnapshotError },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRecording => write!(f, "recording has no ticks"),
            Self::TickOutOfOrder { index, previous, found } => {
                write!(f, "snapshot {index} has tick {found}, not after tick {previous}")
            }
            Self::InvalidSnapshot { tick, error } => write!(f, "tick {tick}: {error}"),
        }
    }
}

impl Error for ReplayError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_tick: u64,
    pub total_orders: usize,
    /// Number of actions emitted for each recorded tick, in recording order.
    pub actions_per_tick: Vec<usize>,
    pub final_store_hash: u64,
}

/// Feeds every recorded snapshot to a fresh agent seeded from the recording.
///
/// `config.seed` is replaced by the recording's seed so a file alone fixes the outcome.
pub fn replay_recording(
    config: &AgentConfig,
    recording: &MatchRecording,
) -> Result<ReplayResult, ReplayError> {
    replay_with(config, recording, |_, _| {})
}

/// Same as [`replay_recording`], calling `observe` with each tick's action batch.
pub fn replay_with(
    config: &AgentConfig,
    recording: &MatchRecording,
    mut observe: impl FnMut(u64, &[Action]),
) -> Result<ReplayResult, ReplayError> {
    if recording.ticks.is_empty() {
        return Err(ReplayError::EmptyRecording);
    }

    let mut agent = Agent::new(AgentConfig { seed: recording.seed, ..config.clone() });
    let mut previous: Option<u64> = None;
    let mut total_orders = 0;
    let mut actions_per_tick = Vec::with_capacity(recording.ticks.len());

    for (index, snapshot) in recording.ticks.iter().enumerate() {
        if let Some(previous) = previous
            && snapshot.tick <= previous
        {
            return Err(ReplayError::TickOutOfOrder { index, previous, found: snapshot.tick });
        }
        snapshot
            .validate()
            .map_err(|error| ReplayError::InvalidSnapshot { tick: snapshot.tick, error })?;

        let actions = agent.next_actions(snapshot);
        total_orders += actions.len();
        actions_per_tick.push(actions.len());
        observe(snapshot.tick, &actions);
        previous = Some(snapshot.tick);
    }

    Ok(ReplayResult {
        final_tick: agent.current_tick(),
        total_orders,
        actions_per_tick,
        final_store_hash: agent.snapshot_hash(),
    })
}
