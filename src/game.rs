use bevy::prelude::*;

pub mod config;
pub mod distance_field;
pub mod grid;
pub mod movement;
pub mod scenario;
pub mod simulation;

use config::GameConfigPlugin;
use simulation::SimulationPlugin;

/// Headless driver: configuration plus the fixed-step outbreak simulation.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GameConfigPlugin, SimulationPlugin));
    }
}
