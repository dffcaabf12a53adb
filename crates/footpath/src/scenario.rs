//! Built-in scenarios
//!
//! Each scenario is a small map of foothold geometry plus the mobs that live
//! on it. Geometry is built in code; there is no map file format.

use anyhow::{Context, Result};
use footpath_geometry::{FootholdError, FootholdGraph, FootholdGraphBuilder};
use footpath_mob::{
    MapBounds, MobCapabilities, MobManager, MobSpawn, MoveDirection, MovementConfig,
};
use glam::IVec2;

/// Geometry and population of one run
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name as accepted by [`Scenario::by_name`]
    pub name: &'static str,
    /// One-line description for `--list-scenarios`
    pub description: &'static str,
    pub graph: FootholdGraph,
    pub spawns: Vec<MobSpawn>,
    pub map_bounds: MapBounds,
}

const SCENARIOS: &[(&str, &str)] = &[
    ("flat", "A single floor with walkers patrolling their roam ranges"),
    ("slopes", "Rolling hills joined anchor to anchor"),
    ("walls", "Walkers and jumpers boxed in by walls"),
    ("ledges", "Stacked ledges over a floor, edges everywhere"),
    ("towers", "Mixed walkers, jumpers and flyers around floating platforms"),
];

fn p(x: i32, y: i32) -> IVec2 {
    IVec2::new(x, y)
}

impl Scenario {
    /// Names of all built-in scenarios
    pub fn names() -> impl Iterator<Item = &'static str> {
        SCENARIOS.iter().map(|(name, _)| *name)
    }

    /// Names and descriptions of all built-in scenarios
    pub fn catalog() -> &'static [(&'static str, &'static str)] {
        SCENARIOS
    }

    /// Look up and build a scenario
    pub fn by_name(name: &str) -> Result<Self> {
        let built = match name.to_lowercase().as_str() {
            "flat" => Self::flat(),
            "slopes" => Self::slopes(),
            "walls" => Self::walls(),
            "ledges" => Self::ledges(),
            "towers" => Self::towers(),
            other => anyhow::bail!(
                "Unknown scenario '{}'. Available: {}",
                other,
                Self::names().collect::<Vec<_>>().join(", ")
            ),
        };
        built.with_context(|| format!("Failed to build scenario '{}'", name))
    }

    /// Create a manager holding this scenario's mobs
    ///
    /// Every spawn seed is mixed with `seed`, so one base seed reproduces a
    /// whole run.
    pub fn populate(&self, config: &MovementConfig, seed: u64) -> MobManager {
        let mut manager = MobManager::with_config(config.clone());
        manager.set_map_bounds_all(self.map_bounds);
        for (index, spawn) in self.spawns.iter().enumerate() {
            let spawn = spawn.clone().with_seed(mix_seed(seed, index as u64));
            manager.spawn(&spawn, &self.graph);
        }
        log::info!(
            "Scenario '{}': {} footholds, {} mobs",
            self.name,
            self.graph.len(),
            manager.len()
        );
        manager
    }

    fn describe(name: &'static str) -> &'static str {
        SCENARIOS
            .iter()
            .find(|(n, _)| *n == name)
            .map_or("", |(_, description)| *description)
    }

    /// Single floor, walkers only
    pub fn flat() -> Result<Self, FootholdError> {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))])?;
        let spawns = vec![
            MobSpawn::new(1000, 500, MobCapabilities::walker())
                .with_roam(100, 100)
                .with_facing(MoveDirection::Right),
            MobSpawn::new(400, 500, MobCapabilities::walker()).with_roam(300, 300),
            MobSpawn::new(1600, 500, MobCapabilities::default()),
        ];
        Ok(Self {
            name: "flat",
            description: Self::describe("flat"),
            graph,
            spawns,
            map_bounds: MapBounds::new(0, 0, 2000, 800),
        })
    }

    /// Hills made of connected slopes
    pub fn slopes() -> Result<Self, FootholdError> {
        let points = [
            p(0, 600),
            p(300, 600),
            p(450, 520),
            p(600, 500),
            p(800, 560),
            p(1000, 600),
            p(1200, 480),
            p(1400, 460),
            p(1600, 600),
            p(2000, 600),
        ];
        let graph = FootholdGraph::from_segments(points.windows(2).map(|w| (w[0], w[1])))?;
        let spawns = vec![
            MobSpawn::new(500, 510, MobCapabilities::walker()).with_roam(400, 400),
            MobSpawn::new(1300, 470, MobCapabilities::walker()).with_roam(500, 500),
            MobSpawn::new(900, 580, MobCapabilities::jumper()).with_roam(300, 300),
        ];
        Ok(Self {
            name: "slopes",
            description: Self::describe("slopes"),
            graph,
            spawns,
            map_bounds: MapBounds::new(0, 0, 2000, 900),
        })
    }

    /// A floor split into rooms by walls
    pub fn walls() -> Result<Self, FootholdError> {
        let mut builder = FootholdGraphBuilder::new();
        builder
            .ground(p(0, 500), p(1800, 500))
            .wall(p(600, 300), p(600, 500))
            .wall(p(1200, 350), p(1200, 500));
        let graph = builder.build()?;
        let spawns = vec![
            MobSpawn::new(400, 500, MobCapabilities::walker()).with_roam(350, 350),
            MobSpawn::new(900, 500, MobCapabilities::jumper()).with_roam(400, 400),
            MobSpawn::new(1500, 500, MobCapabilities::jumper()).with_roam(400, 400),
        ];
        Ok(Self {
            name: "walls",
            description: Self::describe("walls"),
            graph,
            spawns,
            map_bounds: MapBounds::new(0, 0, 1800, 800),
        })
    }

    /// Ledges at several heights above a floor
    pub fn ledges() -> Result<Self, FootholdError> {
        let graph = FootholdGraph::from_segments([
            (p(0, 700), p(2000, 700)),
            (p(200, 550), p(700, 550)),
            (p(900, 450), p(1300, 450)),
            (p(1300, 450), p(1400, 430)),
            (p(1500, 560), p(1900, 560)),
        ])?;
        let spawns = vec![
            MobSpawn::new(450, 550, MobCapabilities::walker()).with_roam(400, 400),
            MobSpawn::new(1100, 450, MobCapabilities::walker())
                .with_roam(50, 50)
                .with_platform_bounds(),
            MobSpawn::new(1700, 560, MobCapabilities::jumper()).with_roam(300, 300),
            MobSpawn::new(1000, 700, MobCapabilities::jumper()).with_roam(600, 600),
        ];
        Ok(Self {
            name: "ledges",
            description: Self::describe("ledges"),
            graph,
            spawns,
            map_bounds: MapBounds::new(0, 0, 2000, 1000),
        })
    }

    /// Floating platforms with everything moving at once
    pub fn towers() -> Result<Self, FootholdError> {
        let mut builder = FootholdGraphBuilder::new();
        builder
            .ground(p(0, 800), p(2400, 800))
            .ground(p(300, 650), p(600, 650))
            .ground(p(800, 520), p(1100, 520))
            .ground(p(1100, 520), p(1250, 470))
            .ground(p(1500, 650), p(1900, 650))
            .wall(p(1500, 650), p(1500, 800))
            .wall(p(2200, 500), p(2200, 800));
        let graph = builder.build()?;
        let spawns = vec![
            MobSpawn::new(450, 650, MobCapabilities::walker()).with_roam(200, 200),
            MobSpawn::new(1000, 520, MobCapabilities::jumper()).with_roam(300, 300),
            MobSpawn::new(1700, 650, MobCapabilities::jumper()).with_roam(250, 250),
            MobSpawn::new(800, 800, MobCapabilities::walker()).with_roam(500, 500),
            MobSpawn::new(1200, 300, MobCapabilities::flyer()).with_roam(600, 600),
            MobSpawn::new(2000, 400, MobCapabilities::flyer())
                .with_roam(150, 150)
                .with_no_flip(),
        ];
        Ok(Self {
            name: "towers",
            description: Self::describe("towers"),
            graph,
            spawns,
            map_bounds: MapBounds::new(0, 0, 2400, 1100),
        })
    }
}

/// SplitMix64 step so neighboring spawn indices get unrelated seeds
fn mix_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
