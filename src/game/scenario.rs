use bevy::prelude::*;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::game::grid::{self, Cell, GridError};
use crate::game::simulation::Outbreak;

pub const SCENARIO_VERSION: u32 = 1;

/// Starting layout for an outbreak: map size, obstacles and both populations.
///
/// Hand-written scenarios are RON; snapshots of a running world are
/// zlib-compressed bincode (see [`save_scenario`]).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ScenarioData {
    #[serde(default = "current_version")]
    pub version: u32,
    pub height: usize,
    pub width: usize,
    #[serde(default)]
    pub obstacles: Vec<Cell>,
    #[serde(default)]
    pub zombies: Vec<Cell>,
    #[serde(default)]
    pub humans: Vec<Cell>,
}

fn current_version() -> u32 {
    SCENARIO_VERSION
}

impl ScenarioData {
    /// Record the current state of `outbreak`.
    pub fn capture(outbreak: &Outbreak) -> Self {
        let grid = outbreak.grid();
        Self {
            version: SCENARIO_VERSION,
            height: grid.height(),
            width: grid.width(),
            obstacles: grid.obstacles().collect(),
            zombies: outbreak.zombies().collect(),
            humans: outbreak.humans().collect(),
        }
    }

    pub fn build(&self) -> Result<Outbreak, GridError> {
        Outbreak::with_entities(self.height, self.width, &self.obstacles, &self.zombies, &self.humans)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let scenario: Self = ron::from_str(contents)?;
        if scenario.version != SCENARIO_VERSION {
            return Err(format!(
                "unsupported scenario version {} (expected {})",
                scenario.version, SCENARIO_VERSION
            )
            .into());
        }
        Ok(scenario)
    }

    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }
}

/// Write a compressed binary snapshot.
pub fn save_scenario(path: impl AsRef<Path>, scenario: &ScenarioData) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, scenario)?;
    encoder.finish()?;
    Ok(())
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioData, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let scenario: ScenarioData = bincode::deserialize_from(&mut decoder)?;
    if scenario.version != SCENARIO_VERSION {
        return Err(format!("unsupported snapshot version {}", scenario.version).into());
    }
    Ok(scenario)
}

/// Load by extension: `.ron` as text, anything else as a binary snapshot.
pub fn load_any(path: impl AsRef<Path>) -> Result<ScenarioData, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => ScenarioData::load_ron(path),
        _ => load_scenario(path),
    }
}

// ============================================================================
// Random Scenarios
// ============================================================================

/// Parameters for [`generate_random`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct RandomScenarioParams {
    pub height: usize,
    pub width: usize,
    /// Fraction of cells turned into obstacles, clamped to `[0, 1]`.
    pub obstacle_density: f32,
    pub humans: usize,
    pub zombies: usize,
    /// Fixed seed for reproducible maps. `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for RandomScenarioParams {
    fn default() -> Self {
        Self {
            height: 30,
            width: 40,
            obstacle_density: 0.15,
            humans: 6,
            zombies: 3,
            seed: None,
        }
    }
}

/// Scatter obstacles, then place entities on distinct empty cells.
///
/// Entity counts are capped by the number of empty cells left after the
/// obstacles; humans are placed before zombies. Zero dimensions are raised to
/// 1; dimensions too large for a grid are rejected before anything is
/// allocated.
pub fn generate_random<R: Rng + ?Sized>(
    params: &RandomScenarioParams,
    rng: &mut R,
) -> Result<ScenarioData, GridError> {
    let height = params.height.max(1);
    let width = params.width.max(1);
    let area = grid::checked_area(height, width)?;

    let mut cells: Vec<Cell> = (0..area).map(|idx| Cell::new(idx / width, idx % width)).collect();
    cells.shuffle(rng);

    let density = params.obstacle_density.clamp(0.0, 1.0);
    let num_obstacles = ((area as f32) * density).round() as usize;
    let num_obstacles = num_obstacles.min(area);

    let (obstacles, open) = cells.split_at(num_obstacles);
    let num_humans = params.humans.min(open.len());
    let num_zombies = params.zombies.min(open.len() - num_humans);
    if num_humans < params.humans || num_zombies < params.zombies {
        warn!(
            "Random scenario {}x{} only fits {} humans and {} zombies (asked for {} and {})",
            height, width, num_humans, num_zombies, params.humans, params.zombies
        );
    }

    let mut obstacles = obstacles.to_vec();
    obstacles.sort();

    Ok(ScenarioData {
        version: SCENARIO_VERSION,
        height,
        width,
        obstacles,
        humans: open[..num_humans].to_vec(),
        zombies: open[num_humans..num_humans + num_zombies].to_vec(),
    })
}
