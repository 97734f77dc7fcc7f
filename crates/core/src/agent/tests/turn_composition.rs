//! Tests for the full per-tick action batch.

use rand_chacha::ChaCha8Rng;

use super::support::*;
use crate::policy::{ProductionPolicy, SpawnerPolicy};

struct Never;

impl SpawnerPolicy for Never {
    fn plan(&self, _: &TickSnapshot) -> Vec<Action> {
        Vec::new()
    }
}

impl ProductionPolicy for Never {
    fn plan(&self, _: &TickSnapshot, _: &mut ChaCha8Rng) -> Vec<Action> {
        Vec::new()
    }
}

fn expanding_team() -> TickSnapshot {
    let mut snapshot = open_field(20, 20);
    snapshot.team_nutrients = 40;
    snapshot.next_spawner_cost = 10;
    snapshot.spawners.push(spawner("home", 0, 0, US));
    snapshot.grid.set_nutrient(Pos::new(3, 3), 8);
    snapshot.spores.push(spore("founder", 10, 10, 30));
    snapshot.spores.push(spore("walker", 1, 1, 5));
    snapshot
}

fn kind(action: &Action) -> u8 {
    match action {
        Action::CreateSpawner { .. } => 0,
        Action::ProduceSpore { .. } => 1,
        Action::MoveSpore { .. } => 2,
    }
}

#[test]
fn founder_is_spent_on_a_spawner_instead_of_moving() {
    let snapshot = expanding_team();
    let mut agent = agent();

    let actions = agent.next_actions(&snapshot);

    let founder = SporeId::from("founder");
    assert!(actions.contains(&Action::CreateSpawner { spore_id: founder.clone() }));
    assert!(!actions.iter().any(
        |action| matches!(action, Action::MoveSpore { spore_id, .. } if *spore_id == founder)
    ));
    let idle = DecisionEvent::Idle { spore: founder, reason: IdleReason::Blocked };
    assert!(agent.log().contains(&idle));
}

#[test]
fn batch_lists_founding_then_production_then_moves() {
    let snapshot = expanding_team();
    let actions = agent().next_actions(&snapshot);

    let kinds: Vec<u8> = actions.iter().map(kind).collect();
    assert_eq!(kinds, vec![0, 1, 2]);
    assert_eq!(
        actions[1],
        Action::ProduceSpore { spawner_id: SpawnerId::from("home"), biomass: 10 }
    );
    assert!(matches!(
        &actions[2],
        Action::MoveSpore { spore_id, .. } if spore_id.0 == "walker"
    ));
}

#[test]
fn founding_does_not_block_the_snapshot_itself() {
    let snapshot = expanding_team();
    let mut agent = agent();
    agent.next_actions(&snapshot);

    assert!(snapshot.blocked.is_empty());
    let orders = agent.decide_moves(&snapshot);
    assert_eq!(orders.len(), 2);
}

#[test]
fn replaced_policies_leave_only_movement() {
    let snapshot = expanding_team();
    let mut agent = agent().with_policies(Box::new(Never), Box::new(Never));

    let actions = agent.next_actions(&snapshot);

    assert_eq!(actions.len(), 2);
    assert!(actions.iter().all(|action| kind(action) == 2));
}

#[test]
fn batches_replay_identically_for_a_fixed_seed() {
    let mut snapshot = expanding_team();
    for i in 1..5 {
        snapshot.spawners.push(spawner(&format!("sp{i}"), i * 4, 19, US));
    }
    snapshot.team_nutrients = 200;

    let run = || {
        let mut agent = Agent::new(AgentConfig { seed: 9, ..AgentConfig::default() });
        (0..3).map(|_| agent.next_actions(&snapshot)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

fn scattering(actions: &[Action]) -> bool {
    !actions.iter().any(|action| kind(action) == 0)
}

#[test]
fn scatter_window_opens_at_its_start_tick() {
    let mut snapshot = expanding_team();

    snapshot.tick = 99;
    assert!(!scattering(&agent().next_actions(&snapshot)));
    snapshot.tick = 100;
    assert!(scattering(&agent().next_actions(&snapshot)));
}

#[test]
fn scatter_window_closes_at_the_end_of_its_period() {
    let mut snapshot = expanding_team();

    snapshot.tick = 124;
    assert!(scattering(&agent().next_actions(&snapshot)));
    snapshot.tick = 125;
    assert!(!scattering(&agent().next_actions(&snapshot)));
}

#[test]
fn scatter_moves_stay_within_the_offset_square() {
    let mut snapshot = expanding_team();
    snapshot.tick = 110;

    for seed in 0..16 {
        let mut agent = Agent::new(AgentConfig { seed, ..AgentConfig::default() });
        let actions = agent.next_actions(&snapshot);
        let mut moved = 0;
        for action in &actions {
            let Action::MoveSpore { spore_id, target } = action else { continue };
            let from = snapshot.spores.iter().find(|s| &s.id == spore_id).expect("known spore");
            assert!(snapshot.grid.in_bounds(*target));
            assert_ne!(from.pos, *target);
            assert!(from.pos.x.abs_diff(target.x) <= 3 && from.pos.y.abs_diff(target.y) <= 3);
            moved += 1;
        }
        let scattered = agent
            .log()
            .iter()
            .filter(|event| matches!(event, DecisionEvent::Scattered { .. }))
            .count();
        assert_eq!(scattered, moved);
        assert_eq!(ranked_count(&agent), 0);
    }
}

#[test]
fn scatter_drops_targets_that_leave_the_map() {
    let mut snapshot = open_field(1, 1);
    snapshot.tick = 100;
    snapshot.spores.push(spore("pinned", 0, 0, 5));

    for seed in 0..16 {
        let mut agent = Agent::new(AgentConfig { seed, ..AgentConfig::default() });
        assert!(agent.next_actions(&snapshot).is_empty());
    }
}

#[test]
fn scatter_production_stops_at_the_nutrient_floor() {
    let mut snapshot = expanding_team();
    snapshot.tick = 100;
    snapshot.spawners.push(spawner("second", 19, 0, US));
    snapshot.spawners.push(spawner("third", 0, 19, US));
    snapshot.team_nutrients = 30;

    let actions = Agent::new(AgentConfig::default()).next_actions(&snapshot);
    let produced: Vec<&Action> = actions.iter().filter(|action| kind(action) == 1).collect();
    assert_eq!(
        produced,
        vec![
            &Action::ProduceSpore { spawner_id: SpawnerId::from("home"), biomass: 10 },
            &Action::ProduceSpore { spawner_id: SpawnerId::from("second"), biomass: 10 },
        ]
    );

    snapshot.team_nutrients = 15;
    let actions = Agent::new(AgentConfig::default()).next_actions(&snapshot);
    assert!(!actions.iter().any(|action| kind(action) == 1));
}

#[test]
fn scatter_keeps_commitments_for_after_the_window() {
    let mut snapshot = expanding_team();
    snapshot.tick = 99;
    let mut agent = agent();
    agent.next_actions(&snapshot);
    let walker = SporeId::from("walker");
    let target = agent.store().target(&walker).expect("walker committed");

    snapshot.tick = 100;
    agent.next_actions(&snapshot);
    assert_eq!(agent.store().target(&walker), Some(target));
}

#[test]
fn scatter_batches_replay_identically_for_a_fixed_seed() {
    let mut snapshot = expanding_team();
    snapshot.tick = 100;

    let run = || {
        let mut agent = Agent::new(AgentConfig { seed: 31, ..AgentConfig::default() });
        (0..3).map(|_| agent.next_actions(&snapshot)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn disabled_scatter_keeps_normal_turns_all_period() {
    let mut snapshot = expanding_team();
    snapshot.tick = 110;
    let config = AgentConfig { scatter: None, ..AgentConfig::default() };

    let actions = Agent::new(config).next_actions(&snapshot);
    assert!(!scattering(&actions));
}
