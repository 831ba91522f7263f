/// Commands into and notifications out of the simulation.
///
/// Commands are applied in [`SimSet::Input`](super::SimSet::Input) before the
/// step that reads them, so a spawn written this frame moves on this tick.

use bevy::prelude::*;

use super::outbreak::TickSummary;

// ============================================================================
// Commands
// ============================================================================

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct SpawnHumanCommand {
    pub row: usize,
    pub col: usize,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct SpawnZombieCommand {
    pub row: usize,
    pub col: usize,
}

#[derive(Event, Message, Debug, Clone, Copy)]
pub struct PlaceObstacleCommand {
    pub row: usize,
    pub col: usize,
}

/// Empty the map and both populations.
#[derive(Event, Message, Debug, Clone, Copy, Default)]
pub struct ClearOutbreakCommand;

// ============================================================================
// Notifications
// ============================================================================

/// Written after every outbreak step.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct TickCompleted {
    pub tick: u64,
    pub summary: TickSummary,
    pub humans: usize,
    pub zombies: usize,
}
