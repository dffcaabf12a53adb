//! Per-mob movement state and the per-tick dispatch
//!
//! A [`MobMovement`] is created from a [`MobSpawn`], placed onto a
//! [`FootholdGraph`] once, and then advanced by [`MobMovement::update`]
//! every host tick. The mode-specific updaters live in sibling modules and
//! extend this type with further `impl` blocks.

use std::sync::Arc;

use footpath_geometry::{FootholdGraph, FootholdId};
use glam::Vec2;
use rand::SeedableRng;

use crate::config::MovementConfig;
use crate::rng::{DecisionRng, MobRng};
use crate::types::{
    JumpState, MapBounds, MobAction, MobSnapshot, MobSpawn, MoveDirection, MoveType,
};

/// Queued knockback and the recovery window it opened
#[derive(Debug, Clone, Default)]
pub(crate) struct KnockbackState {
    pub pending: Option<Vec2>,
    pub recovery_ms: f32,
}

/// Host-side steering overrides
#[derive(Debug, Clone)]
pub(crate) struct SteeringState {
    pub stopped: bool,
    pub speed_multiplier: f32,
    pub pending_direction: Option<MoveDirection>,
    pub frames_since_turn: u32,
    pub last_frame: Option<usize>,
}

impl Default for SteeringState {
    fn default() -> Self {
        Self {
            stopped: false,
            speed_multiplier: 1.0,
            pending_direction: None,
            frames_since_turn: 0,
            last_frame: None,
        }
    }
}

/// Movement state of one mob
#[derive(Debug, Clone)]
pub struct MobMovement {
    pub(crate) config: Arc<MovementConfig>,
    pub(crate) spawn: Vec2,
    pub(crate) y_shift: f32,

    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) move_type: MoveType,
    pub(crate) direction: MoveDirection,
    pub(crate) facing_right: bool,
    pub(crate) no_flip: bool,
    pub(crate) jump_state: JumpState,
    pub(crate) action: MobAction,

    pub(crate) foothold: Option<FootholdId>,
    /// Segment the mob left the ground from; bounds air control
    pub(crate) takeoff: Option<FootholdId>,

    pub(crate) roam: (i32, i32),
    pub(crate) platform: (i32, i32),
    pub(crate) use_platform_bounds: bool,
    pub(crate) map_bounds: MapBounds,

    pub(crate) decision_timer: f32,
    pub(crate) jump_cooldown: f32,
    pub(crate) direction_cooldown: f32,
    pub(crate) bob_phase: f32,

    pub(crate) knockback: KnockbackState,
    pub(crate) steering: SteeringState,
    pub(crate) rng: MobRng,
}

impl MobMovement {
    /// Create the movement state for a freshly spawned mob
    ///
    /// The mob is not attached to any foothold until [`Self::place`] runs.
    pub fn new(spawn: &MobSpawn, config: Arc<MovementConfig>) -> Self {
        let mut rng = MobRng::seed_from_u64(spawn.seed);
        let move_type = spawn.capabilities.move_type();

        let roam = roam_range(spawn, &config);

        let direction = match spawn.facing {
            Some(direction) => direction,
            None if rng.coin() => MoveDirection::Right,
            None => MoveDirection::Left,
        };

        let decision_timer = rng.roll_ms(config.timing.initial_decision);
        let jump_cooldown = if move_type == MoveType::Jump {
            rng.roll_ms(config.timing.initial_jump_cooldown)
        } else {
            0.0
        };

        let action = match move_type {
            MoveType::Stand => MobAction::Stand,
            MoveType::Move | MoveType::Jump => MobAction::Move,
            MoveType::Fly => MobAction::Fly,
        };

        let spawn_position = Vec2::new(spawn.x as f32, spawn.y as f32);

        Self {
            config,
            spawn: spawn_position,
            y_shift: spawn.y_shift as f32,
            position: spawn_position,
            velocity: Vec2::ZERO,
            move_type,
            direction,
            facing_right: direction.is_right(),
            no_flip: spawn.no_flip,
            jump_state: JumpState::None,
            action,
            foothold: None,
            takeoff: None,
            roam,
            platform: roam,
            use_platform_bounds: spawn.use_platform_bounds,
            map_bounds: MapBounds::unbounded(),
            decision_timer,
            jump_cooldown,
            direction_cooldown: 0.0,
            bob_phase: 0.0,
            knockback: KnockbackState::default(),
            steering: SteeringState::default(),
            rng,
        }
    }

    /// Attach the mob to the ground below its spawn point
    ///
    /// Probes straight down from just above the expected ground line first,
    /// then falls back to the ground segment closest in height that spans the
    /// spawn X or overlaps the roam range. When nothing qualifies the mob
    /// stays at spawn without a foothold and will not move until placed again.
    /// Flyers never attach.
    pub fn place(&mut self, graph: &FootholdGraph) -> Option<FootholdId> {
        if self.move_type == MoveType::Fly {
            return None;
        }

        let tolerances = &self.config.tolerances;
        let expected_y = self.spawn.y - self.y_shift;
        let x = self.position.x;

        let found = graph
            .find_below(x, expected_y - tolerances.placement_probe)
            .or_else(|| {
                graph.find_ground_for_placement(
                    x,
                    expected_y,
                    self.roam,
                    tolerances.placement_y,
                    tolerances.roam_placement_y,
                )
            })
            .and_then(|id| graph.foothold(id));

        match found {
            Some(fh) => {
                self.position.x = fh.clamp_x(x);
                self.position.y = fh.y_at(self.position.x);
                self.foothold = Some(fh.id);
                self.platform = graph
                    .platform_span(fh.id, tolerances.platform_y)
                    .unwrap_or(self.roam);
                log::trace!(
                    "Placed mob at ({:.1}, {:.1}) on {}",
                    self.position.x,
                    self.position.y,
                    fh.id
                );
            }
            None => {
                log::warn!(
                    "No ground near spawn ({}, {}); mob stays unplaced",
                    self.spawn.x,
                    self.spawn.y
                );
                self.foothold = None;
                self.platform = self.roam;
                self.position = self.spawn;
            }
        }

        self.foothold
    }

    /// Advance the mob by `dt_ms` milliseconds
    pub fn update(&mut self, graph: &FootholdGraph, dt_ms: f32) {
        if !(dt_ms.is_finite() && dt_ms > 0.0) {
            return;
        }
        let sf = self.config.speed_factor(dt_ms);

        // 1. Knockback overrides the AI while recovering
        if self.knockback.recovery_ms > 0.0 {
            self.knockback.recovery_ms -= dt_ms;
        }
        self.process_pending_knockback();
        if self.knockback.recovery_ms > 0.0 {
            self.update_knockback(graph, sf);
            return;
        }
        if self.action == MobAction::Hit {
            self.action = self.resting_action();
            if !self.is_airborne() {
                self.velocity = Vec2::ZERO;
            }
        }

        // 2. Ground mobs knocked off their feet finish the fall ballistically
        let ballistic = matches!(self.move_type, MoveType::Stand | MoveType::Move);
        if ballistic && self.is_airborne() {
            self.update_knockback(graph, sf);
            return;
        }

        if self.move_type == MoveType::Stand {
            return;
        }

        // 3. Ground mobs wait for placement
        if self.move_type != MoveType::Fly && self.foothold.is_none() && !self.is_airborne() {
            return;
        }

        // 4. Stopped mobs only finish an airborne arc
        if self.steering.stopped {
            if self.is_airborne() {
                self.update_airborne(graph, sf, false);
            }
            return;
        }

        match self.move_type {
            MoveType::Fly => self.update_flying(sf),
            MoveType::Jump => self.update_jumping(graph, dt_ms, sf),
            MoveType::Move => self.update_walking(graph, dt_ms, sf),
            MoveType::Stand => {}
        }
    }

    /// Host-facing view of the current state
    pub fn snapshot(&self) -> MobSnapshot {
        MobSnapshot {
            position: self.position,
            facing_right: self.facing_right,
            action: self.action,
            jump_state: self.jump_state,
            foothold: self.foothold,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn move_type(&self) -> MoveType {
        self.move_type
    }

    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    pub fn jump_state(&self) -> JumpState {
        self.jump_state
    }

    pub fn action(&self) -> MobAction {
        self.action
    }

    pub fn current_foothold(&self) -> Option<FootholdId> {
        self.foothold
    }

    pub fn spawn_position(&self) -> Vec2 {
        self.spawn
    }

    /// Absolute `[left, right]` roam range
    pub fn roam_range(&self) -> (i32, i32) {
        self.roam
    }

    /// Horizontal extent of the platform the mob was last placed on
    pub fn platform_range(&self) -> (i32, i32) {
        self.platform
    }

    pub fn map_bounds(&self) -> MapBounds {
        self.map_bounds
    }

    pub fn set_map_bounds(&mut self, bounds: MapBounds) {
        self.map_bounds = bounds;
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn is_airborne(&self) -> bool {
        self.jump_state != JumpState::None
    }

    /// Change travel direction, keeping facing in sync unless flipping is disabled
    pub(crate) fn set_direction(&mut self, direction: MoveDirection) {
        self.direction = direction;
        if !self.no_flip {
            self.facing_right = direction.is_right();
        }
    }

    pub(crate) fn turn_around(&mut self) {
        self.set_direction(self.direction.reversed());
    }

    /// Action shown when nothing more specific is going on
    pub(crate) fn resting_action(&self) -> MobAction {
        match self.move_type {
            MoveType::Stand => MobAction::Stand,
            MoveType::Move | MoveType::Jump => MobAction::Move,
            MoveType::Fly => MobAction::Fly,
        }
    }

    /// `base` intersected with the map bounds inset by `margin`
    ///
    /// Collapses to the default window around spawn when the intersection
    /// is empty.
    pub(crate) fn bounded(&self, base: (i32, i32), margin: i32) -> (i32, i32) {
        let (left, right) = self.map_bounds.clamp_window(base, margin);
        if left >= right {
            let half = self.config.margins.default_roam_half_width;
            let spawn_x = self.spawn.x as i32;
            return (spawn_x - half, spawn_x + half);
        }
        (left, right)
    }

    /// Clamp X into `[left, right]`, turning back when heading out at an edge
    ///
    /// Returns true when the mob turned.
    pub(crate) fn clamp_reversing(&mut self, (left, right): (i32, i32)) -> bool {
        let (left, right) = (left as f32, right as f32);
        if self.position.x <= left {
            self.position.x = left;
            if self.direction == MoveDirection::Left {
                self.set_direction(MoveDirection::Right);
                return true;
            }
        } else if self.position.x >= right {
            self.position.x = right;
            if self.direction == MoveDirection::Right {
                self.set_direction(MoveDirection::Left);
                return true;
            }
        }
        false
    }

    /// Send the mob back to its spawn point and place it again
    pub(crate) fn respawn(&mut self, graph: &FootholdGraph) {
        log::warn!(
            "Mob fell out of bounds at ({:.1}, {:.1}); respawning at ({}, {})",
            self.position.x,
            self.position.y,
            self.spawn.x,
            self.spawn.y
        );
        self.position = self.spawn;
        self.velocity = Vec2::ZERO;
        self.jump_state = JumpState::None;
        self.foothold = None;
        self.takeoff = None;
        self.knockback = KnockbackState::default();
        self.action = self.resting_action();
        self.place(graph);
    }

    /// Whether the mob has fallen far enough to give up on it
    pub(crate) fn fell_out_of_map(&self) -> bool {
        let recovery = &self.config.recovery;
        match self.map_bounds.bottom {
            Some(bottom) => self.position.y > bottom as f32 + recovery.fall_past_bottom,
            None => self.position.y > self.spawn.y + recovery.unbounded_fall_limit,
        }
    }
}

/// Absolute roam range from the spawn shifts, with the default window
/// substituted for missing or degenerate ranges
fn roam_range(spawn: &MobSpawn, config: &MovementConfig) -> (i32, i32) {
    let mut left = spawn.x - spawn.roam_left_shift;
    let mut right = spawn.x + spawn.roam_right_shift;
    if left > right {
        std::mem::swap(&mut left, &mut right);
    }

    let margins = &config.margins;
    if right - left < margins.min_roam_width {
        if spawn.capabilities.move_type() != MoveType::Stand {
            log::debug!(
                "Roam range [{}, {}] too narrow; using ±{} around spawn",
                left,
                right,
                margins.default_roam_half_width
            );
        }
        left = spawn.x - margins.default_roam_half_width;
        right = spawn.x + margins.default_roam_half_width;
    }
    (left, right)
}
