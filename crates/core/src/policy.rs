//! Spawner founding and spore production decisions layered on top of movement.
//! This module exists so the agent can emit a complete action batch per tick.
//! It does not decide where spores go; founders are blocked from movement by the caller.

use std::cmp::Reverse;

use rand_chacha::ChaCha8Rng;

use crate::config::{ProductionPolicyConfig, SpawnerPolicyConfig};
use crate::random::shuffle;
use crate::state::TickSnapshot;
use crate::types::Action;

/// Decides which spores are spent founding new spawners this tick.
pub trait SpawnerPolicy {
    fn plan(&self, snapshot: &TickSnapshot) -> Vec<Action>;
}

/// Decides what the team's spawners produce this tick.
pub trait ProductionPolicy {
    fn plan(&self, snapshot: &TickSnapshot, rng: &mut ChaCha8Rng) -> Vec<Action>;
}

/// Founds one spawner per tick with the heaviest affordable spore that keeps its distance
/// from every existing own spawner.
#[derive(Clone, Debug)]
pub struct SpacedSpawnerPolicy {
    config: SpawnerPolicyConfig,
}

impl SpacedSpawnerPolicy {
    pub fn new(config: SpawnerPolicyConfig) -> Self {
        Self { config }
    }
}

impl SpawnerPolicy for SpacedSpawnerPolicy {
    fn plan(&self, snapshot: &TickSnapshot) -> Vec<Action> {
        let own: Vec<_> = snapshot.own_spawners().collect();
        if own.len() > self.config.max_spawners {
            return Vec::new();
        }
        let min_spacing_sq = i64::from(self.config.min_spacing).pow(2);
        let founder = snapshot
            .spores
            .iter()
            .filter(|spore| !snapshot.blocked.contains(&spore.id))
            .filter(|spore| spore.biomass >= snapshot.next_spawner_cost)
            .filter(|spore| {
                own.iter().all(|spawner| {
                    let dx = i64::from(spore.pos.x - spawner.pos.x);
                    let dy = i64::from(spore.pos.y - spawner.pos.y);
                    dx * dx + dy * dy >= min_spacing_sq
                })
            })
            .min_by_key(|spore| Reverse(spore.biomass));

        founder
            .map(|spore| Action::CreateSpawner { spore_id: spore.id.clone() })
            .into_iter()
            .collect()
    }
}

/// Spends at most half of the team's nutrients on fixed-size spores, visiting spawners
/// in a shuffled order so no spawner is always served last.
#[derive(Clone, Debug)]
pub struct BudgetProductionPolicy {
    config: ProductionPolicyConfig,
}

impl BudgetProductionPolicy {
    pub fn new(config: ProductionPolicyConfig) -> Self {
        Self { config }
    }
}

impl ProductionPolicy for BudgetProductionPolicy {
    fn plan(&self, snapshot: &TickSnapshot, rng: &mut ChaCha8Rng) -> Vec<Action> {
        let biomass = self.config.spore_biomass;
        let mut spawners: Vec<_> = snapshot.own_spawners().collect();
        shuffle(rng, &mut spawners);

        let mut remaining = snapshot.team_nutrients;
        let mut actions = Vec::new();
        for spawner in spawners {
            if remaining < biomass.saturating_mul(2) {
                break;
            }
            actions.push(Action::ProduceSpore { spawner_id: spawner.id.clone(), biomass });
            remaining -= biomass;
        }
        actions
    }
}
