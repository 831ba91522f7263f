/// Resource definitions for the simulation driver.
///
/// The outbreak itself is a resource too (see [`Outbreak`](super::Outbreak));
/// these are the bookkeeping resources around it.

use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Tick Tracking
// ============================================================================

/// Number of fixed steps the simulation has run.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

/// Timing of the most recent outbreak step.
#[derive(Resource, Default, Debug)]
pub struct SimPerformance {
    pub last_tick_duration: Duration,
    pub ticks_advanced: u64,
}

/// Scenario file chosen on the command line. Takes precedence over
/// `InitialConfig::scenario_path`.
#[derive(Resource, Debug, Clone)]
pub struct ScenarioPath(pub PathBuf);

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Values the simulation systems read every step.
///
/// Seeded from [`InitialConfig`](crate::game::config::InitialConfig) at
/// startup and refreshed from the hot-reloadable
/// [`GameConfig`](crate::game::config::GameConfig) asset.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    pub tick_rate: f64,
    /// Stop the app after this many ticks. `None` runs forever.
    pub max_ticks: Option<u64>,
    /// Log a census every this many ticks. 0 disables the census.
    pub report_interval: u64,
    /// Skip outbreak steps while set. The tick counter keeps running.
    pub paused: bool,
    /// Dump both distance fields at debug level after each step.
    pub log_fields: bool,
    /// Stop early once nobody moves.
    pub stop_when_settled: bool,
    /// Where to write the final state when the run stops.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 4.0,
            max_ticks: Some(200),
            report_interval: 10,
            paused: false,
            log_fields: false,
            stop_when_settled: true,
            snapshot_path: None,
        }
    }
}
