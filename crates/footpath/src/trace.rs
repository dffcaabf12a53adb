//! Trace recording
//!
//! Runs a scenario tick by tick and reports every mob's snapshot, then
//! condenses the run into per-mob statistics.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use footpath_mob::{JumpState, MobId, MobManager, MobSnapshot, MoveType};
use glam::Vec2;
use serde::Serialize;

use crate::config::{OutputFormat, SimConfig};
use crate::scenario::Scenario;

/// A single-tick displacement larger than this is treated as a respawn
const RESPAWN_JUMP: f32 = 100.0;

/// One mob's state after one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceFrame {
    pub tick: u32,
    pub mob: MobId,
    #[serde(flatten)]
    pub snapshot: MobSnapshot,
}

impl TraceFrame {
    /// Write the frame in `format`, one line
    pub fn write(&self, out: &mut impl Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => {
                let s = &self.snapshot;
                let foothold = s
                    .foothold
                    .map_or_else(|| "-".to_string(), |fh| fh.to_string());
                writeln!(
                    out,
                    "{:>6} {:<8} x={:>8.2} y={:>8.2} {:<5} {:<4} {:?} {}",
                    self.tick,
                    self.mob.to_string(),
                    s.position.x,
                    s.position.y,
                    if s.facing_right { "right" } else { "left" },
                    s.action,
                    s.jump_state,
                    foothold
                )?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

/// Per-mob statistics over a whole run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MobSummary {
    pub mob: MobId,
    pub move_type: MoveType,
    /// Horizontal distance covered, respawn jumps excluded
    pub distance: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub jumps: u32,
    pub landings: u32,
    pub respawns: u32,
    pub final_position: Vec2,
}

impl MobSummary {
    fn new(mob: MobId, move_type: MoveType, position: Vec2) -> Self {
        Self {
            mob,
            move_type,
            distance: 0.0,
            min_x: position.x,
            max_x: position.x,
            jumps: 0,
            landings: 0,
            respawns: 0,
            final_position: position,
        }
    }

    fn observe(&mut self, previous: &MobSnapshot, current: &MobSnapshot) {
        let step = current.position - previous.position;
        if step.length() > RESPAWN_JUMP {
            self.respawns += 1;
        } else {
            self.distance += step.x.abs();
        }

        match (previous.jump_state, current.jump_state) {
            (JumpState::None, JumpState::Jumping) => self.jumps += 1,
            (JumpState::Jumping | JumpState::Falling, JumpState::None) => self.landings += 1,
            _ => {}
        }

        self.min_x = self.min_x.min(current.position.x);
        self.max_x = self.max_x.max(current.position.x);
        self.final_position = current.position;
    }
}

/// Condensed result of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub scenario: String,
    pub ticks: u32,
    pub dt_ms: f32,
    pub mobs: Vec<MobSummary>,
}

impl TraceSummary {
    pub fn write(&self, out: &mut impl Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => {
                writeln!(
                    out,
                    "Scenario '{}': {} ticks at {:.2} ms",
                    self.scenario, self.ticks, self.dt_ms
                )?;
                for m in &self.mobs {
                    writeln!(
                        out,
                        "  {:<8} {:<5} dist={:>8.1} x=[{:.1}, {:.1}] jumps={} landings={} respawns={}",
                        m.mob.to_string(),
                        format!("{:?}", m.move_type),
                        m.distance,
                        m.min_x,
                        m.max_x,
                        m.jumps,
                        m.landings,
                        m.respawns
                    )?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

/// Drives a populated scenario and tracks statistics
pub struct Recorder {
    scenario: Scenario,
    manager: MobManager,
    dt_ms: f32,
    tick: u32,
    last: BTreeMap<MobId, MobSnapshot>,
    stats: BTreeMap<MobId, MobSummary>,
}

impl Recorder {
    pub fn new(scenario: Scenario, config: &SimConfig) -> Self {
        let manager = scenario.populate(&config.movement, config.run.seed);

        let mut last = BTreeMap::new();
        let mut stats = BTreeMap::new();
        for (id, mob) in manager.iter() {
            let snapshot = mob.snapshot();
            stats.insert(id, MobSummary::new(id, mob.move_type(), snapshot.position));
            last.insert(id, snapshot);
        }

        Self {
            scenario,
            manager,
            dt_ms: config.run.dt_ms,
            tick: 0,
            last,
            stats,
        }
    }

    pub fn manager(&self) -> &MobManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut MobManager {
        &mut self.manager
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Advance one tick and return every mob's frame
    pub fn step(&mut self) -> Vec<TraceFrame> {
        self.manager.update_all(&self.scenario.graph, self.dt_ms);
        self.tick += 1;

        let mut frames = Vec::with_capacity(self.manager.len());
        for (id, mob) in self.manager.iter() {
            let snapshot = mob.snapshot();
            if let (Some(previous), Some(stats)) = (self.last.get(&id), self.stats.get_mut(&id)) {
                stats.observe(previous, &snapshot);
            }
            self.last.insert(id, snapshot);
            frames.push(TraceFrame {
                tick: self.tick,
                mob: id,
                snapshot,
            });
        }
        frames
    }

    /// Run `ticks` ticks, handing every frame to `on_frame`
    pub fn run<F>(&mut self, ticks: u32, mut on_frame: F) -> Result<()>
    where
        F: FnMut(&TraceFrame) -> Result<()>,
    {
        for _ in 0..ticks {
            for frame in self.step() {
                on_frame(&frame)?;
            }
        }
        log::info!(
            "Recorded {} ticks of '{}' ({} mobs)",
            self.tick,
            self.scenario.name,
            self.manager.len()
        );
        Ok(())
    }

    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            scenario: self.scenario.name.to_string(),
            ticks: self.tick,
            dt_ms: self.dt_ms,
            mobs: self.stats.values().cloned().collect(),
        }
    }
}
