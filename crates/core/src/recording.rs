//! Persisted match recordings: the ordered snapshots one team observed during a match.
//! This module exists so replays and determinism checks can run from a file.
//! It does not drive the agent; see `replay` for that.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::state::TickSnapshot;

pub const RECORDING_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecording {
    pub format_version: u16,
    pub seed: u64,
    pub ticks: Vec<TickSnapshot>,
}

impl MatchRecording {
    pub fn new(seed: u64) -> Self {
        Self { format_version: RECORDING_FORMAT_VERSION, seed, ticks: Vec::new() }
    }

    pub fn push(&mut self, snapshot: TickSnapshot) {
        self.ticks.push(snapshot);
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Reads a recording and rejects unknown versions and malformed snapshots.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let recording: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if recording.format_version != RECORDING_FORMAT_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported recording format version {}", recording.format_version),
            ));
        }
        for snapshot in &recording.ticks {
            snapshot.validate().map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("tick {}: {e}", snapshot.tick))
            })?;
        }
        Ok(recording)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::agent::test_support::*;
    use crate::types::Pos;

    fn two_tick_recording() -> MatchRecording {
        let (first, _) = lone_nutrient_fixture();
        let mut second = first.clone();
        second.tick = 1;
        second.spores[0].pos = Pos::new(1, 0);

        let mut recording = MatchRecording::new(42);
        recording.push(first);
        recording.push(second);
        recording
    }

    #[test]
    fn recording_atomic_write_and_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("match.json");
        let recording = two_tick_recording();

        recording.write_atomic(&path).expect("write");
        let loaded = MatchRecording::load(&path).expect("load");
        assert_eq!(recording, loaded);

        let tmp_path = path.with_extension("json.tmp");
        assert!(!tmp_path.exists());
    }

    #[test]
    fn unknown_format_version_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("match.json");
        let mut recording = two_tick_recording();
        recording.format_version = 9;
        recording.write_atomic(&path).expect("write");

        let err = MatchRecording::load(&path).expect_err("version 9 must not load");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn out_of_bounds_spore_fails_the_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("match.json");
        let mut recording = two_tick_recording();
        recording.ticks[1].spores[0].pos = Pos::new(7, 7);
        recording.write_atomic(&path).expect("write");

        let err = MatchRecording::load(&path).expect_err("bad spore must not load");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("tick 1:"));
    }

    #[test]
    fn garbage_is_invalid_data() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("match.json");
        fs::write(&path, "{ not json").expect("write");

        let err = MatchRecording::load(&path).expect_err("garbage must not load");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
