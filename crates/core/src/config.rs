//! Tunable constants for target selection, routing, and the reference policies.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{MovementMode, TerrainCostMode};

/// Largest accepted search radius; grid offsets are signed 32-bit.
pub const MAX_RADIUS: u32 = i32::MAX as u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Multiplier applied to nutrient gained on each newly claimed cell of a route.
    pub gain_weight: u32,
    /// Manhattan radius around the search origin scanned for candidates.
    pub search_radius: u32,
    /// Manhattan radius of the nearest-unowned-cell fallback search.
    pub fallback_radius: u32,
    /// Maximum length of a ranked candidate list.
    pub top_k: usize,
    /// Spores with less biomass than this are left idle.
    pub min_action_biomass: u32,
    pub terrain_cost_mode: TerrainCostMode,
    pub movement_mode: MovementMode,
    /// Number of leading candidates a fresh commitment is drawn from; 1 always takes the best.
    pub commit_spread: usize,
    /// Upper bound on cells settled per route query. `None` allows the whole grid.
    pub max_route_expansions: Option<usize>,
    pub seed: u64,
    pub spawner: SpawnerPolicyConfig,
    pub production: ProductionPolicyConfig,
    /// Periodic window in which spores wander randomly instead of following targets.
    /// `scatter = false` in TOML turns it off.
    #[serde(serialize_with = "serialize_scatter", deserialize_with = "deserialize_scatter")]
    pub scatter: Option<ScatterPhaseConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            gain_weight: 2,
            search_radius: 12,
            fallback_radius: 4,
            top_k: 20,
            min_action_biomass: 2,
            terrain_cost_mode: TerrainCostMode::Flat,
            movement_mode: MovementMode::Routed,
            commit_spread: 1,
            max_route_expansions: None,
            seed: 0,
            spawner: SpawnerPolicyConfig::default(),
            production: ProductionPolicyConfig::default(),
            scatter: Some(ScatterPhaseConfig::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerPolicyConfig {
    /// No new spawner is founded once the team has more than this many.
    pub max_spawners: usize,
    /// Minimum Euclidean distance between a new spawner and every existing one.
    pub min_spacing: u32,
}

impl Default for SpawnerPolicyConfig {
    fn default() -> Self {
        Self { max_spawners: 8, min_spacing: 5 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionPolicyConfig {
    pub spore_biomass: u32,
}

impl Default for ProductionPolicyConfig {
    fn default() -> Self {
        Self { spore_biomass: 10 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterPhaseConfig {
    /// Length of one phase cycle in ticks.
    pub period: u64,
    /// Offset within the cycle at which the scatter window opens; it stays open to the end.
    pub start: u64,
    /// Largest random step along each axis.
    pub max_offset: u32,
    pub spore_biomass: u32,
    /// Spawners produce only while the remaining nutrients exceed this.
    pub min_nutrients: u32,
}

impl Default for ScatterPhaseConfig {
    fn default() -> Self {
        Self { period: 125, start: 100, max_offset: 3, spore_biomass: 10, min_nutrients: 15 }
    }
}

impl ScatterPhaseConfig {
    pub fn is_active(&self, tick: u64) -> bool {
        self.period > 0 && tick % self.period >= self.start
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScatterSetting {
    Toggle(bool),
    Phase(ScatterPhaseConfig),
}

fn deserialize_scatter<'de, D>(deserializer: D) -> Result<Option<ScatterPhaseConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ScatterSetting::deserialize(deserializer)? {
        ScatterSetting::Toggle(false) => None,
        ScatterSetting::Toggle(true) => Some(ScatterPhaseConfig::default()),
        ScatterSetting::Phase(phase) => Some(phase),
    })
}

fn serialize_scatter<S>(
    scatter: &Option<ScatterPhaseConfig>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match scatter {
        Some(phase) => phase.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

impl AgentConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gain_weight == 0 {
            return Err(ConfigError::Invalid("gain_weight must be positive"));
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be positive"));
        }
        if self.commit_spread == 0 {
            return Err(ConfigError::Invalid("commit_spread must be positive"));
        }
        if self.search_radius > MAX_RADIUS {
            return Err(ConfigError::Invalid("search_radius must fit in a signed 32-bit offset"));
        }
        if self.fallback_radius > self.search_radius {
            return Err(ConfigError::Invalid("fallback_radius must not exceed search_radius"));
        }
        if self.production.spore_biomass == 0 {
            return Err(ConfigError::Invalid("production.spore_biomass must be positive"));
        }
        if let Some(scatter) = &self.scatter {
            if scatter.period == 0 {
                return Err(ConfigError::Invalid("scatter.period must be positive"));
            }
            if scatter.start >= scatter.period {
                return Err(ConfigError::Invalid("scatter.start must fall inside the period"));
            }
            if scatter.max_offset == 0 || scatter.max_offset > MAX_RADIUS {
                return Err(ConfigError::Invalid("scatter.max_offset out of range"));
            }
            if scatter.spore_biomass == 0 {
                return Err(ConfigError::Invalid("scatter.spore_biomass must be positive"));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(String),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(message) => write!(f, "invalid config TOML: {message}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ConfigError {}
