use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use spore_core::agent::pathfinding::manhattan;
use spore_core::{
    Action, Agent, AgentConfig, MatchRecording, MovementMode, Pos, Spawner, SpawnerId, Spore,
    SporeId, TeamId, TickSnapshot, WorldGrid,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const US: TeamId = TeamId(1);
const THEM: TeamId = TeamId(2);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    ticks: u64,
    /// Number of independent random maps to run
    #[arg(short, long, default_value_t = 20)]
    maps: u64,
    /// Write the recording of the first map here
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn below(rng: &mut ChaCha8Rng, bound: u64) -> u64 {
    rng.next_u64() % bound
}

fn random_pos(rng: &mut ChaCha8Rng, grid: &WorldGrid) -> Pos {
    let x = below(rng, grid.width() as u64) as i32;
    let y = below(rng, grid.height() as u64) as i32;
    Pos::new(x, y)
}

fn random_world(rng: &mut ChaCha8Rng) -> TickSnapshot {
    let width = 6 + below(rng, 19) as usize;
    let height = 6 + below(rng, 19) as usize;
    let mut grid = WorldGrid::new(width, height);
    let cells: Vec<Pos> = grid.positions().collect();
    for pos in cells {
        match below(rng, 10) {
            0..=2 => grid.set_nutrient(pos, 1 + below(rng, 6) as u32),
            3 => {
                grid.set_owner(pos, Some(THEM));
                grid.set_biomass(pos, 1 + below(rng, 8) as u32);
            }
            _ => {}
        }
    }

    let mut snapshot = TickSnapshot::new(0, US, grid);
    snapshot.next_spawner_cost = 15;
    snapshot.team_nutrients = 30;
    let home = random_pos(rng, &snapshot.grid);
    snapshot.spawners.push(Spawner { id: SpawnerId::from("home"), pos: home, team: US });
    snapshot.grid.set_owner(home, Some(US));
    for i in 0..1 + below(rng, 6) {
        let pos = random_pos(rng, &snapshot.grid);
        let biomass = below(rng, 12) as u32;
        snapshot.spores.push(Spore { id: SporeId(format!("s{i}")), pos, biomass });
    }
    snapshot
}

fn check_batch(snapshot: &TickSnapshot, actions: &[Action], config: &AgentConfig) -> Result<()> {
    let scattering = config.scatter.as_ref().is_some_and(|phase| phase.is_active(snapshot.tick));
    let mut moved = BTreeSet::new();
    let mut founders = BTreeSet::new();
    for action in actions {
        match action {
            Action::CreateSpawner { spore_id } => {
                ensure!(!scattering, "{} founded a spawner while scattering", spore_id.0);
                founders.insert(spore_id);
            }
            Action::MoveSpore { spore_id, target } => {
                ensure!(snapshot.grid.in_bounds(*target), "order off the map: {target:?}");
                ensure!(moved.insert(spore_id), "two orders for {}", spore_id.0);
                ensure!(!founders.contains(spore_id), "founder {} also moved", spore_id.0);
                ensure!(!snapshot.blocked.contains(spore_id), "blocked {} moved", spore_id.0);
                let spore = snapshot
                    .spores
                    .iter()
                    .find(|spore| &spore.id == spore_id)
                    .context("order for an unknown spore")?;
                ensure!(spore.pos != *target, "{} ordered onto its own cell", spore_id.0);
                if scattering {
                    ensure!(manhattan(spore.pos, *target) <= 6, "scatter step is too long");
                } else if config.movement_mode == MovementMode::Routed {
                    ensure!(manhattan(spore.pos, *target) == 1, "routed step is not adjacent");
                }
            }
            Action::ProduceSpore { .. } => {}
        }
    }
    Ok(())
}

/// Advances the toy world by one tick: spores walk and claim, spawners found and produce.
fn apply(snapshot: &mut TickSnapshot, actions: &[Action], next_id: &mut u64) {
    for action in actions {
        match action {
            Action::MoveSpore { spore_id, target } => {
                if let Some(spore) = snapshot.spores.iter_mut().find(|s| &s.id == spore_id) {
                    spore.pos = *target;
                    let gained = snapshot.grid.nutrient_at(*target);
                    snapshot.team_nutrients = snapshot.team_nutrients.saturating_add(gained);
                    snapshot.grid.set_owner(*target, Some(US));
                    snapshot.grid.set_biomass(*target, 1);
                }
            }
            Action::CreateSpawner { spore_id } => {
                if let Some(index) = snapshot.spores.iter().position(|s| &s.id == spore_id) {
                    let founder = snapshot.spores.remove(index);
                    snapshot.spawners.push(Spawner {
                        id: SpawnerId(format!("from-{}", founder.id.0)),
                        pos: founder.pos,
                        team: US,
                    });
                    snapshot.next_spawner_cost += 5;
                }
            }
            Action::ProduceSpore { spawner_id, biomass } => {
                let Some(pos) = snapshot
                    .spawners
                    .iter()
                    .find(|spawner| &spawner.id == spawner_id)
                    .map(|spawner| spawner.pos)
                else {
                    continue;
                };
                snapshot.team_nutrients = snapshot.team_nutrients.saturating_sub(*biomass);
                let id = SporeId(format!("p{next_id}"));
                snapshot.spores.push(Spore { id, pos, biomass: *biomass });
                *next_id += 1;
            }
        }
    }
    snapshot.tick += 1;
}

fn run_map(map_seed: u64, ticks: u64, recording: Option<&mut MatchRecording>) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(map_seed);
    let mut snapshot = random_world(&mut rng);
    let movement_mode =
        if below(&mut rng, 4) == 0 { MovementMode::Direct } else { MovementMode::Routed };
    let config = AgentConfig {
        seed: map_seed,
        movement_mode,
        commit_spread: 1 + below(&mut rng, 3) as usize,
        ..AgentConfig::default()
    };
    let mut agent = Agent::new(config.clone());
    let mut next_id = 0;
    let mut recording = recording;

    for _ in 0..ticks {
        snapshot.blocked.clear();
        for spore in &snapshot.spores {
            if below(&mut rng, 10) == 0 {
                snapshot.blocked.insert(spore.id.clone());
            }
        }
        if let Some(recording) = recording.as_deref_mut() {
            recording.push(snapshot.clone());
        }

        let actions = agent.next_actions(&snapshot);
        check_batch(&snapshot, &actions, &config)
            .with_context(|| format!("map_seed {map_seed} tick {}", snapshot.tick))?;
        for (spore, target) in agent.store().iter() {
            ensure!(snapshot.grid.in_bounds(target), "{} committed off the map", spore.0);
        }
        apply(&mut snapshot, &actions, &mut next_id);
    }

    debug!(
        map_seed,
        spores = snapshot.spores.len(),
        spawners = snapshot.spawners.len(),
        hash = agent.snapshot_hash(),
        "Map finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    println!(
        "Starting Fuzz harness on seed {} for {} maps of {} ticks...",
        args.seed, args.maps, args.ticks
    );
    let mut seeds = ChaCha8Rng::seed_from_u64(args.seed);
    for map in 0..args.maps {
        let map_seed = seeds.next_u64();
        if map == 0
            && let Some(out) = &args.out
        {
            let mut recording = MatchRecording::new(map_seed);
            run_map(map_seed, args.ticks, Some(&mut recording))?;
            recording
                .write_atomic(out)
                .with_context(|| format!("Failed to write recording: {}", out.display()))?;
        } else {
            run_map(map_seed, args.ticks, None)?;
        }
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
