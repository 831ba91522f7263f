/// Simulation driver systems.
///
/// This module contains systems for:
/// - Startup (config conversion, spawning the outbreak)
/// - Input processing
/// - Advancing the outbreak one step per fixed update
/// - Reporting and stopping

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::time::Instant;
use outbreak_macros::profile;

use crate::game::config::InitialConfig;
use crate::game::grid::{Cell, GridError};
use crate::game::scenario::{self, ScenarioData};

use super::events::*;
use super::outbreak::Outbreak;
use super::resources::*;

// ============================================================================
// Startup
// ============================================================================

/// Convert the loaded [`InitialConfig`] into the runtime [`SimConfig`].
pub fn init_sim_config_from_initial(
    mut sim_config: ResMut<SimConfig>,
    mut fixed_time: ResMut<Time<Fixed>>,
    initial: Option<Res<InitialConfig>>,
) {
    let Some(initial) = initial else {
        warn!("InitialConfig not loaded, keeping default SimConfig");
        return;
    };

    sim_config.tick_rate = initial.tick_rate;
    sim_config.max_ticks = initial.max_ticks;
    sim_config.report_interval = initial.report_interval;
    sim_config.stop_when_settled = initial.stop_when_settled;
    sim_config.snapshot_path = initial.snapshot_path.as_ref().map(PathBuf::from);

    if initial.tick_rate > 0.0 {
        fixed_time.set_timestep_hz(initial.tick_rate);
    } else {
        warn!("Ignoring non-positive tick rate {}", initial.tick_rate);
    }
    info!(
        "SimConfig: {} Hz, max ticks {:?}, report every {} ticks",
        sim_config.tick_rate, sim_config.max_ticks, sim_config.report_interval
    );
}

/// Build the [`Outbreak`] resource unless one was inserted already.
///
/// Source order: command-line [`ScenarioPath`], then
/// `InitialConfig::scenario_path`, then a random scenario.
pub fn spawn_outbreak(
    mut commands: Commands,
    existing: Option<Res<Outbreak>>,
    initial: Option<Res<InitialConfig>>,
    cli_path: Option<Res<ScenarioPath>>,
    mut exit: MessageWriter<AppExit>,
) {
    if existing.is_some() {
        info!("Outbreak provided by the caller, skipping scenario setup");
        return;
    }

    let initial = initial.as_deref().cloned().unwrap_or_default();
    let path = cli_path
        .map(|p| p.0.clone())
        .or_else(|| initial.scenario_path.as_ref().map(PathBuf::from));

    let scenario = match path {
        Some(path) => match scenario::load_any(&path) {
            Ok(scenario) => {
                info!("Loaded scenario {}", path.display());
                Ok(scenario)
            }
            Err(e) => {
                error!("Failed to load scenario {}: {}", path.display(), e);
                random_scenario(&initial)
            }
        },
        None => random_scenario(&initial),
    };

    let built = scenario.and_then(|scenario| Ok((scenario.obstacles.len(), scenario.build()?)));
    match built {
        Ok((obstacles, outbreak)) => {
            info!(
                "Outbreak spawned: {}x{} grid, {} obstacles, {} humans, {} zombies",
                outbreak.grid().height(),
                outbreak.grid().width(),
                obstacles,
                outbreak.num_humans(),
                outbreak.num_zombies()
            );
            debug!("Initial state:\n{}", outbreak);
            commands.insert_resource(outbreak);
        }
        Err(e) => {
            error!("Scenario is invalid, nothing to simulate: {}", e);
            exit.write(AppExit::error());
        }
    }
}

fn random_scenario(initial: &InitialConfig) -> Result<ScenarioData, GridError> {
    let params = &initial.random_scenario;
    info!(
        "Generating random {}x{} scenario (density {}, seed {:?})",
        params.height, params.width, params.obstacle_density, params.seed
    );
    match params.seed {
        Some(seed) => scenario::generate_random(params, &mut StdRng::seed_from_u64(seed)),
        None => scenario::generate_random(params, &mut rand::rng()),
    }
}

// ============================================================================
// Tick Management
// ============================================================================

/// Increment the global simulation tick counter.
///
/// Runs first in the FixedUpdate schedule so every other system sees the
/// number of the step being simulated.
pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

// ============================================================================
// Input Processing
// ============================================================================

/// Apply queued commands in a fixed order: clear, obstacles, zombies, humans.
///
/// Out-of-bounds commands are logged and dropped.
pub fn process_input(
    mut outbreak: ResMut<Outbreak>,
    mut clear_events: MessageReader<ClearOutbreakCommand>,
    mut obstacle_events: MessageReader<PlaceObstacleCommand>,
    mut zombie_events: MessageReader<SpawnZombieCommand>,
    mut human_events: MessageReader<SpawnHumanCommand>,
) {
    if clear_events.read().count() > 0 {
        outbreak.clear();
        info!("Outbreak cleared");
    }

    for event in obstacle_events.read() {
        if let Err(e) = outbreak.set_obstacle(event.row, event.col) {
            warn!("Dropping obstacle command: {}", e);
        }
    }
    for event in zombie_events.read() {
        if let Err(e) = outbreak.add_zombie(event.row, event.col) {
            warn!("Dropping zombie spawn: {}", e);
        }
    }
    for event in human_events.read() {
        if let Err(e) = outbreak.add_human(event.row, event.col) {
            warn!("Dropping human spawn: {}", e);
        }
    }
}

// ============================================================================
// Outbreak Step
// ============================================================================

/// Move both populations once.
#[profile(2000)]
pub fn advance_outbreak(
    mut outbreak: ResMut<Outbreak>,
    tick: Res<SimTick>,
    sim_config: Res<SimConfig>,
    mut perf: ResMut<SimPerformance>,
    mut completed: MessageWriter<TickCompleted>,
) {
    if sim_config.paused {
        return;
    }

    let start = Instant::now();
    let summary = outbreak.tick();
    perf.last_tick_duration = start.elapsed();
    perf.ticks_advanced += 1;

    completed.write(TickCompleted {
        tick: tick.0,
        summary,
        humans: outbreak.num_humans(),
        zombies: outbreak.num_zombies(),
    });
}

// ============================================================================
// Reporting
// ============================================================================

/// Population snapshot for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Census {
    pub humans: usize,
    pub zombies: usize,
    /// Humans standing on a cell that also holds a zombie.
    pub humans_in_contact: usize,
}

pub fn census(outbreak: &Outbreak) -> Census {
    let zombie_cells: FxHashSet<Cell> = outbreak.zombies().collect();
    Census {
        humans: outbreak.num_humans(),
        zombies: outbreak.num_zombies(),
        humans_in_contact: outbreak.humans().filter(|h| zombie_cells.contains(h)).count(),
    }
}

/// Log a census every `report_interval` completed steps.
pub fn report_tick(
    outbreak: Res<Outbreak>,
    sim_config: Res<SimConfig>,
    #[allow(unused_variables)] perf: Res<SimPerformance>,
    #[allow(unused_variables)] tick: Res<SimTick>,
    mut completed: MessageReader<TickCompleted>,
) {
    use crate::profile_log;

    for event in completed.read() {
        if sim_config.log_fields {
            let (human_field, zombie_field) = outbreak.last_fields();
            debug!("Tick {} human field:\n{}", event.tick, human_field);
            debug!("Tick {} zombie field:\n{}", event.tick, zombie_field);
        }

        if sim_config.report_interval == 0 || event.tick % sim_config.report_interval != 0 {
            continue;
        }
        let census = census(&outbreak);
        info!(
            "[TICK {}] humans: {} | zombies: {} | in contact: {} | moved: {}H/{}Z",
            event.tick,
            census.humans,
            census.zombies,
            census.humans_in_contact,
            event.summary.humans_moved,
            event.summary.zombies_moved
        );
    }

    profile_log!(tick, "[SIM STATUS] Tick: {} | Last step: {:?} | Steps run: {}",
        tick.0, perf.last_tick_duration, perf.ticks_advanced);
}

/// Exit after `max_ticks` or, if enabled, once nobody moves. Writes the
/// final snapshot when a snapshot path is configured.
pub fn stop_when_done(
    outbreak: Res<Outbreak>,
    sim_config: Res<SimConfig>,
    mut completed: MessageReader<TickCompleted>,
    mut exit: MessageWriter<AppExit>,
) {
    let mut reason = None;
    for event in completed.read() {
        if sim_config.max_ticks.is_some_and(|max| event.tick >= max) {
            reason = Some(format!("reached max ticks ({})", event.tick));
        } else if sim_config.stop_when_settled && event.summary.is_settled() {
            reason = Some(format!("settled at tick {}", event.tick));
        }
    }
    let Some(reason) = reason else { return };

    info!("Stopping simulation: {}", reason);
    info!("Final state:\n{}", *outbreak);

    if let Some(path) = &sim_config.snapshot_path {
        match scenario::save_scenario(path, &ScenarioData::capture(&outbreak)) {
            Ok(()) => info!("Saved final snapshot to {}", path.display()),
            Err(e) => error!("Failed to save snapshot {}: {}", path.display(), e),
        }
    }
    exit.write(AppExit::Success);
}
