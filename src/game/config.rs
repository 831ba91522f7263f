use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

use crate::game::scenario::RandomScenarioParams;
use crate::game::simulation::SimConfig;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup: how the world is seeded and
/// how long the run lasts. Changing these mid-run would make the run
/// irreproducible, so they are not hot-reloaded.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    pub tick_rate: f64,
    pub max_ticks: Option<u64>,
    pub report_interval: u64,
    pub stop_when_settled: bool,
    /// RON scenario or binary snapshot to start from. Falls back to a random
    /// scenario when unset or unreadable.
    pub scenario_path: Option<String>,
    pub random_scenario: RandomScenarioParams,
    /// Final state is written here when the run stops.
    pub snapshot_path: Option<String>,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 4.0,
            max_ticks: Some(200),
            report_interval: 10,
            stop_when_settled: true,
            scenario_path: None,
            random_scenario: RandomScenarioParams::default(),
            snapshot_path: None,
        }
    }
}

impl InitialConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(contents)
    }
}

/// Runtime configuration that can be hot-reloaded while the simulation runs.
/// None of these affect where entities go, only pacing and diagnostics.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct GameConfig {
    pub tick_rate: f64,
    pub paused: bool,
    pub report_interval: u64,
    pub log_fields: bool,
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
            .add_systems(Startup, (load_initial_config, setup_runtime_config).chain())
            .add_systems(Update, apply_runtime_config);
    }
}

/// Load static initial configuration synchronously at startup.
/// This must complete before the outbreak is spawned.
pub fn load_initial_config(mut commands: Commands) {
    commands.insert_resource(read_initial_config(INITIAL_CONFIG_PATH));
}

/// Read and parse the initial config, logging and falling back to defaults
/// on any failure.
pub fn read_initial_config(path: &str) -> InitialConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match InitialConfig::from_ron_str(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to parse initial config {}: {}", path, e);
                error!("Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", path, e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

/// Copy runtime config into [`SimConfig`] whenever the asset loads or changes.
fn apply_runtime_config(
    mut sim_config: ResMut<SimConfig>,
    mut fixed_time: ResMut<Time<Fixed>>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
) {
    let Some(config_handle) = config_handle else { return };
    for event in events.read() {
        if !(event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id())) {
            continue;
        }
        let Some(config) = game_configs.get(&config_handle.0) else { continue };

        if config.tick_rate > 0.0 && config.tick_rate != sim_config.tick_rate {
            fixed_time.set_timestep_hz(config.tick_rate);
            sim_config.tick_rate = config.tick_rate;
            info!("Updated tick rate to {} Hz", config.tick_rate);
        }
        if config.paused != sim_config.paused {
            info!("Simulation {}", if config.paused { "paused" } else { "resumed" });
        }
        sim_config.paused = config.paused;
        sim_config.report_interval = config.report_interval;
        sim_config.log_fields = config.log_fields;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_config_fills_missing_fields_with_defaults() {
        let config = InitialConfig::from_ron_str("(max_ticks: Some(5), random_scenario: (height: 8, width: 9, obstacle_density: 0.0, humans: 1, zombies: 1, seed: Some(3)))").unwrap();
        assert_eq!(config.max_ticks, Some(5));
        assert_eq!(config.tick_rate, InitialConfig::default().tick_rate);
        assert_eq!(config.random_scenario.height, 8);
        assert_eq!(config.random_scenario.seed, Some(3));
    }

    #[test]
    fn test_missing_initial_config_file_falls_back_to_default() {
        let config = read_initial_config("definitely/not/here/initial_config.ron");
        assert_eq!(config, InitialConfig::default());
    }
}
