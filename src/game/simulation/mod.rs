/// Simulation layer: the outbreak core plus the Bevy driver around it.
///
/// This module is organized into:
/// - **outbreak**: The grid, both populations and the tick itself (no Bevy systems)
/// - **resources**: Tick counter, performance stats, runtime config
/// - **events**: Commands into and notifications out of the simulation
/// - **systems**: Startup, input, stepping, reporting

use bevy::prelude::*;

use crate::game::config::load_initial_config;

// Module declarations
pub mod events;
pub mod outbreak;
pub mod resources;
pub mod systems;

// Re-export commonly used items
pub use events::*;
pub use outbreak::{Outbreak, PopulationKind, TickSummary};
pub use resources::*;

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Input,   // Applying spawn/obstacle/clear commands
    Advance, // One outbreak step
    Report,  // Logging, stop conditions
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Configure FixedUpdate timestep (overridden by InitialConfig at startup)
        app.insert_resource(Time::<Fixed>::from_hz(SimConfig::default().tick_rate));

        app.init_resource::<SimConfig>();
        app.init_resource::<SimPerformance>();
        app.init_resource::<SimTick>();

        // Register messages
        app.add_message::<SpawnHumanCommand>();
        app.add_message::<SpawnZombieCommand>();
        app.add_message::<PlaceObstacleCommand>();
        app.add_message::<ClearOutbreakCommand>();
        app.add_message::<TickCompleted>();

        // Configure System Sets; nothing runs until an outbreak exists
        app.configure_sets(FixedUpdate, (
            SimSet::Input,
            SimSet::Advance,
            SimSet::Report,
        ).chain().run_if(resource_exists::<Outbreak>));

        // Startup systems. Ordering against the config loader only applies
        // when GameConfigPlugin is present.
        app.add_systems(Startup, (
            systems::init_sim_config_from_initial,
            systems::spawn_outbreak,
        ).chain().after(load_initial_config));

        // Fixed update systems (one outbreak step per fixed tick)
        app.add_systems(FixedUpdate, (
            systems::increment_sim_tick.before(SimSet::Input),
            systems::process_input.in_set(SimSet::Input),
            systems::advance_outbreak.in_set(SimSet::Advance),
            (systems::report_tick, systems::stop_when_done).chain().in_set(SimSet::Report),
        ));
    }
}
