use std::collections::BTreeSet;
use std::mem;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing::debug;

use crate::config::AgentConfig;
use crate::policy::{BudgetProductionPolicy, ProductionPolicy, SpacedSpawnerPolicy, SpawnerPolicy};
use crate::state::{ClaimableGrid, Spawner, TickSnapshot};
use crate::types::*;

mod assignment;
pub mod evaluation;
mod hash;
pub mod pathfinding;
mod scatter;
mod store;
#[cfg(test)]
pub(crate) mod test_support;

pub use store::DestinationStore;

use self::pathfinding::manhattan;

/// Per-tick views shared by every spore decision of one pass.
struct TickContext<'a> {
    claimable: ClaimableGrid,
    anchors: Vec<&'a Spawner>,
}

impl<'a> TickContext<'a> {
    fn new(snapshot: &'a TickSnapshot) -> Self {
        Self { claimable: snapshot.claimable(), anchors: snapshot.own_spawners().collect() }
    }

    /// Position of the nearest own spawner, or `pos` itself when the team has none.
    fn anchor_for(&self, pos: Pos) -> Pos {
        self.anchors
            .iter()
            .min_by_key(|spawner| (manhattan(spawner.pos, pos), &spawner.id))
            .map_or(pos, |spawner| spawner.pos)
    }
}

pub struct Agent {
    config: AgentConfig,
    rng: ChaCha8Rng,
    store: DestinationStore,
    log: Vec<DecisionEvent>,
    tick: u64,
    spawner_policy: Box<dyn SpawnerPolicy>,
    production_policy: Box<dyn ProductionPolicy>,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: AgentConfig, rng: ChaCha8Rng) -> Self {
        let spawner_policy = Box::new(SpacedSpawnerPolicy::new(config.spawner.clone()));
        let production_policy = Box::new(BudgetProductionPolicy::new(config.production.clone()));
        Self {
            config,
            rng,
            store: DestinationStore::new(),
            log: Vec::new(),
            tick: 0,
            spawner_policy,
            production_policy,
        }
    }

    pub fn with_policies(
        mut self,
        spawner_policy: Box<dyn SpawnerPolicy>,
        production_policy: Box<dyn ProductionPolicy>,
    ) -> Self {
        self.spawner_policy = spawner_policy;
        self.production_policy = production_policy;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &DestinationStore {
        &self.store
    }

    pub fn log(&self) -> &[DecisionEvent] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<DecisionEvent> {
        mem::take(&mut self.log)
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Move orders for one tick, honouring the snapshot's blocked set.
    pub fn decide_moves(&mut self, snapshot: &TickSnapshot) -> Vec<MoveOrder> {
        self.decide_moves_with_blocked(snapshot, &snapshot.blocked)
    }

    /// Full action batch: spawner founding, then production, then movement.
    ///
    /// Spores spent on a new spawner are added to the blocked set before moves are decided.
    /// Inside the scatter window the batch is the scatter phase's alone.
    pub fn next_actions(&mut self, snapshot: &TickSnapshot) -> Vec<Action> {
        if let Some(phase) = self.config.scatter.clone()
            && phase.is_active(snapshot.tick)
        {
            self.tick = snapshot.tick;
            self.forget_absent(snapshot);
            return self.scatter_actions(snapshot, &phase);
        }

        let mut actions = self.spawner_policy.plan(snapshot);
        let mut blocked = snapshot.blocked.clone();
        blocked.extend(actions.iter().filter_map(|action| match action {
            Action::CreateSpawner { spore_id } => Some(spore_id.clone()),
            _ => None,
        }));
        actions.extend(self.production_policy.plan(snapshot, &mut self.rng));
        let moves = self.decide_moves_with_blocked(snapshot, &blocked);
        actions.extend(moves.into_iter().map(Action::from));
        actions
    }

    fn decide_moves_with_blocked(
        &mut self,
        snapshot: &TickSnapshot,
        blocked: &BTreeSet<SporeId>,
    ) -> Vec<MoveOrder> {
        self.tick = snapshot.tick;
        self.forget_absent(snapshot);

        let ctx = TickContext::new(snapshot);
        let mut seen = BTreeSet::new();
        let mut orders = Vec::new();
        for spore in &snapshot.spores {
            if !seen.insert(&spore.id) {
                continue;
            }
            if !ctx.claimable.in_bounds(spore.pos) {
                if let Some(target) = self.store.retire(&spore.id) {
                    self.log.push(DecisionEvent::Abandoned { spore: spore.id.clone(), target });
                }
                continue;
            }
            if let Some(order) = self.assign_spore(&ctx, spore, blocked) {
                orders.push(order);
            }
        }

        debug!(
            tick = snapshot.tick,
            spores = snapshot.spores.len(),
            orders = orders.len(),
            committed = self.store.len(),
            "Move decisions ready"
        );
        orders
    }

    fn forget_absent(&mut self, snapshot: &TickSnapshot) {
        let present: BTreeSet<&SporeId> = snapshot.spores.iter().map(|spore| &spore.id).collect();
        for spore in self.store.retain_present(&present) {
            self.log.push(DecisionEvent::Forgotten { spore });
        }
    }
}
