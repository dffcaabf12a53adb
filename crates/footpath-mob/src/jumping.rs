//! Jumping mobs: grounded patrol with random jumps, and ballistic air phase
//!
//! `None -> Jumping -> Falling -> None`. Rising ends when the vertical speed
//! turns non-negative; landing is detected by probing for ground from just
//! above the position reached this tick.

use footpath_geometry::{FootholdGraph, FootholdId};

use crate::movement::MobMovement;
use crate::rng::DecisionRng;
use crate::types::{JumpState, MobAction, MoveDirection, MoveType};
use crate::walking::GroundStep;

/// Outcome of a landing probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Landing {
    Landed,
    Airborne { ground_below: bool },
}

impl MobMovement {
    pub(crate) fn update_jumping(&mut self, graph: &FootholdGraph, dt_ms: f32, sf: f32) {
        if self.jump_cooldown > 0.0 {
            self.jump_cooldown -= dt_ms;
        }

        if self.is_airborne() {
            self.update_airborne(graph, sf, true);
        } else {
            self.update_jumper_ground(graph, dt_ms, sf);
        }

        let bounds = self.bounded(self.roam, self.config.margins.walk);
        let from_x = self.position.x;
        self.clamp_reversing(bounds);
        self.reproject(graph, from_x);
    }

    /// Start a jump from the ground
    ///
    /// Refused while airborne, cooling down, or for mobs that cannot jump.
    /// Close to the jump bounds in the travel direction the mob turns around
    /// instead, so it never jumps off the playable area. Returns whether the
    /// mob left the ground.
    pub fn trigger_jump(&mut self) -> bool {
        if self.move_type != MoveType::Jump || self.is_airborne() || self.jump_cooldown > 0.0 {
            return false;
        }

        let margins = &self.config.margins;
        let guard = margins.jump_guard as f32;
        let (left, right) = self.bounded(self.roam, margins.jump_bounds);
        let x = self.position.x;
        let too_close = match self.direction {
            MoveDirection::Left => x <= left as f32 + guard,
            MoveDirection::Right => x >= right as f32 - guard,
        };

        if too_close {
            self.turn_around();
            self.jump_cooldown = self.rng.roll_ms(self.config.timing.refused_jump_cooldown);
            log::debug!("Jump refused near bounds at x={:.1}; turning around", x);
            return false;
        }

        self.jump_state = JumpState::Jumping;
        self.velocity.y = -self.config.physics.jump_velocity;
        self.jump_cooldown = self.rng.roll_ms(self.config.timing.jump_cooldown);
        self.action = MobAction::Jump;
        self.takeoff = self.foothold.take();
        log::debug!("Jump from ({:.1}, {:.1})", self.position.x, self.position.y);
        true
    }

    fn update_jumper_ground(&mut self, graph: &FootholdGraph, dt_ms: f32, sf: f32) {
        if self.direction_cooldown > 0.0 {
            self.direction_cooldown -= dt_ms;
        }

        self.decision_timer -= dt_ms;
        if self.decision_timer <= 0.0 {
            let chances = &self.config.chances;
            let (jump, reverse) = (
                chances.jumper_jump,
                chances.jumper_jump + chances.jumper_reverse,
            );
            let roll = self.rng.roll_percent();
            if roll < jump {
                self.trigger_jump();
            } else if roll < reverse && self.direction_cooldown <= 0.0 {
                self.reverse_with_cooldown();
            }
            self.decision_timer = self.rng.roll_ms(self.config.timing.jump_decision);
            if self.is_airborne() {
                return;
            }
        }

        if self.near_platform_edge(graph) {
            if self.jump_cooldown <= 0.0 && self.rng.chance(self.config.chances.edge_jump) {
                self.trigger_jump();
            } else {
                self.reverse_with_cooldown();
            }
            return;
        }

        self.action = MobAction::Move;
        let amount = self.effective_move_speed() * sf;

        if let Some(stop_x) = self.wall_stop(graph, self.direction, amount) {
            let from_x = self.position.x;
            self.position.x = stop_x;
            self.reproject(graph, from_x);
            if self.jump_cooldown <= 0.0 && self.rng.chance(self.config.chances.wall_jump) {
                self.trigger_jump();
            } else {
                self.reverse_with_cooldown();
            }
            return;
        }

        if let GroundStep::Ledge { edge_x, heading } = self.slide(graph, amount, None) {
            self.step_back_to(graph, edge_x);
            if self.direction_cooldown > 0.0 {
                return;
            }
            if self.jump_cooldown <= 0.0 && self.rng.chance(self.config.chances.ledge_jump) {
                self.trigger_jump();
            } else {
                self.set_direction(heading.reversed());
                self.direction_cooldown = self.config.timing.reversal_cooldown;
            }
        }
    }

    fn reverse_with_cooldown(&mut self) {
        self.turn_around();
        self.direction_cooldown = self.config.timing.reversal_cooldown;
    }

    /// Close to an unconnected end of a wide segment, heading toward it
    fn near_platform_edge(&self, graph: &FootholdGraph) -> bool {
        if self.direction_cooldown > 0.0 {
            return false;
        }
        let Some(fh) = self.foothold.and_then(|id| graph.foothold(id)) else {
            return false;
        };
        let margins = &self.config.margins;
        if fh.width() <= margins.edge_detect_min_width {
            return false;
        }

        let x = self.position.x;
        let reach = margins.edge_detect as f32;
        let near = match self.direction {
            MoveDirection::Left => x <= fh.min_x() as f32 + reach,
            MoveDirection::Right => x >= fh.max_x() as f32 - reach,
        };

        near && graph
            .next_connected(
                fh.id,
                self.direction.is_right(),
                x,
                self.position.y,
                self.config.tolerances.transition_y,
            )
            .is_none()
    }

    /// One tick of the air phase
    ///
    /// With `steer` unset the mob only falls; horizontal air control is
    /// skipped.
    pub(crate) fn update_airborne(&mut self, graph: &FootholdGraph, sf: f32, steer: bool) {
        self.action = MobAction::Jump;

        // 1. Gravity and terminal velocity
        let physics = &self.config.physics;
        self.velocity.y = (self.velocity.y + physics.gravity * sf).min(physics.max_fall_speed);
        if self.jump_state == JumpState::Jumping && self.velocity.y >= 0.0 {
            self.jump_state = JumpState::Falling;
        }
        self.position.y += self.velocity.y * sf;

        // 2. Reduced air control, only over ground or the take-off segment
        if steer {
            self.steer_in_air(graph, sf);
        }

        // 3. Landing, or giving up on a mob that fell off the world
        if self.jump_state != JumpState::Falling {
            return;
        }
        match self.try_land(graph, sf) {
            Landing::Landed => self.action = MobAction::Stand,
            Landing::Airborne { ground_below } => {
                if self.should_respawn(ground_below) {
                    self.respawn(graph);
                }
            }
        }
    }

    fn steer_in_air(&mut self, graph: &FootholdGraph, sf: f32) {
        let heading = self.direction;
        self.set_direction(heading);

        let amount = self.effective_move_speed() * self.config.physics.air_control * sf;
        let new_x = self
            .wall_stop(graph, heading, amount)
            .unwrap_or(self.position.x + heading.sign() * amount);

        if graph.find_below(new_x, self.position.y).is_some() {
            self.position.x = new_x;
            return;
        }

        if let Some(takeoff) = self.takeoff.and_then(|id| graph.foothold(id)) {
            if takeoff.spans_x(self.position.x) {
                self.position.x = takeoff.clamp_x(new_x);
            }
        }
    }

    /// Snap onto ground found just above the position reached this tick
    pub(crate) fn try_land(&mut self, graph: &FootholdGraph, sf: f32) -> Landing {
        let tolerances = &self.config.tolerances;
        let probe_y = self.position.y - self.velocity.y * sf - tolerances.landing_lookahead;
        let Some(id) = graph.find_below(self.position.x, probe_y) else {
            return Landing::Airborne { ground_below: false };
        };
        let Some(ground_y) = graph.y_on_segment(id, self.position.x) else {
            return Landing::Airborne { ground_below: false };
        };

        if self.position.y >= ground_y - tolerances.landing {
            self.land(id, ground_y);
            Landing::Landed
        } else {
            Landing::Airborne { ground_below: true }
        }
    }

    fn land(&mut self, id: FootholdId, ground_y: f32) {
        self.position.y = ground_y;
        self.velocity.y = 0.0;
        self.jump_state = JumpState::None;
        self.foothold = Some(id);
        self.takeoff = None;
        log::trace!("Landed on {} at x={:.1}", id, self.position.x);
    }

    fn should_respawn(&self, ground_below: bool) -> bool {
        if self.fell_out_of_map() {
            return true;
        }
        let recovery = &self.config.recovery;
        let (left, right) = self.bounded(self.roam, self.config.margins.walk);
        let x = self.position.x;
        let at_edge = x <= left as f32 + recovery.edge_reset_slack
            || x >= right as f32 - recovery.edge_reset_slack;
        at_edge && !ground_below && self.position.y > self.spawn.y + recovery.fall_below_spawn
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use footpath_geometry::{FootholdGraph, FootholdId};
    use glam::{IVec2, Vec2};

    use crate::config::{MovementConfig, MsRange};
    use crate::movement::MobMovement;
    use crate::types::{JumpState, MapBounds, MobAction, MobCapabilities, MobSpawn, MoveDirection};

    fn p(x: i32, y: i32) -> IVec2 {
        IVec2::new(x, y)
    }

    /// Jumpers that never decide on their own and may jump right away
    fn manual() -> Arc<MovementConfig> {
        let mut config = MovementConfig::default();
        config.timing.initial_decision = MsRange::new(1_000_000, 1_000_001);
        config.timing.initial_jump_cooldown = MsRange::new(0, 0);
        config.chances.edge_jump = 0;
        config.chances.wall_jump = 0;
        config.chances.ledge_jump = 0;
        Arc::new(config)
    }

    fn jumper(graph: &FootholdGraph, x: i32, y: i32, facing: MoveDirection) -> MobMovement {
        let spawn = MobSpawn::new(x, y, MobCapabilities::jumper())
            .with_roam(400, 400)
            .with_facing(facing);
        let mut mob = MobMovement::new(&spawn, manual());
        mob.place(graph);
        mob
    }

    #[test]
    fn test_jump_rises_then_lands() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = jumper(&graph, 1000, 500, MoveDirection::Right);

        assert!(mob.trigger_jump());
        assert_eq!(mob.jump_state(), JumpState::Jumping);
        assert_eq!(mob.action(), MobAction::Jump);
        assert_eq!(mob.current_foothold(), None);

        let mut lowest_y = f32::MAX;
        let mut ticks = 0;
        while mob.is_airborne() && ticks < 200 {
            mob.update(&graph, 16.67);
            lowest_y = lowest_y.min(mob.y());
            ticks += 1;
        }

        assert!(ticks < 200, "Jump never landed");
        assert!(lowest_y < 440.0, "Apex should be well above the floor");
        assert_eq!(mob.y(), 500.0);
        assert_eq!(mob.velocity().y, 0.0);
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
    }

    #[test]
    fn test_falling_transition_at_apex() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = jumper(&graph, 1000, 500, MoveDirection::Right);
        mob.trigger_jump();

        let mut previous_y = mob.y();
        while mob.jump_state() == JumpState::Jumping {
            mob.update(&graph, 16.67);
            if mob.jump_state() == JumpState::Jumping {
                assert!(mob.y() < previous_y, "Still rising while Jumping");
            }
            previous_y = mob.y();
        }
        assert_eq!(mob.jump_state(), JumpState::Falling);
        assert!(mob.velocity().y >= 0.0);
    }

    #[test]
    fn test_jump_refused_near_bounds_turns_around() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = jumper(&graph, 1000, 500, MoveDirection::Right);
        mob.set_map_bounds(MapBounds::new(0, 0, 1060, 1000));

        // Jump bounds end at 1010; 1000 is within the 30px guard
        assert!(!mob.trigger_jump());
        assert_eq!(mob.jump_state(), JumpState::None);
        assert_eq!(mob.direction(), MoveDirection::Left);
        assert!(!mob.trigger_jump(), "Refusal starts a cooldown");
    }

    #[test]
    fn test_jump_cooldown_blocks_second_jump() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = jumper(&graph, 1000, 500, MoveDirection::Right);
        assert!(mob.trigger_jump());
        while mob.is_airborne() {
            mob.update(&graph, 16.67);
        }
        assert!(!mob.trigger_jump());
    }

    #[test]
    fn test_walkers_cannot_jump() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let spawn = MobSpawn::new(1000, 500, MobCapabilities::walker());
        let mut mob = MobMovement::new(&spawn, manual());
        mob.place(&graph);
        assert!(!mob.trigger_jump());
    }

    #[test]
    fn test_air_control_stays_over_takeoff_segment() {
        // Short platform with nothing around it
        let graph = FootholdGraph::from_segments([(p(980, 500), p(1020, 500))]).unwrap();
        let mut mob = jumper(&graph, 1010, 500, MoveDirection::Right);
        assert!(mob.trigger_jump());
        while mob.is_airborne() {
            mob.update(&graph, 16.67);
            assert!(mob.x() <= 1020.0);
        }
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
    }

    #[test]
    fn test_jump_lands_on_lower_platform() {
        let graph = FootholdGraph::from_segments([
            (p(900, 400), p(1000, 400)),
            (p(800, 500), p(1400, 500)),
        ])
        .unwrap();
        let mut mob = jumper(&graph, 995, 400, MoveDirection::Right);
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
        assert!(mob.trigger_jump());
        while mob.is_airborne() {
            mob.update(&graph, 16.67);
        }
        assert_eq!(mob.current_foothold(), Some(FootholdId(1)));
        assert_eq!(mob.y(), 500.0);
    }

    #[test]
    fn test_falling_past_map_bottom_respawns() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = jumper(&graph, 1000, 500, MoveDirection::Right);
        mob.set_map_bounds(MapBounds::new(-5000, -5000, 5000, 800));

        // Knock it below the floor so nothing can catch it
        mob.position.y = 950.0;
        mob.foothold = None;
        mob.jump_state = JumpState::Falling;
        mob.update(&graph, 16.67);

        assert_eq!(mob.jump_state(), JumpState::None);
        assert_eq!(mob.position().y, 500.0);
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
    }

    #[test]
    fn test_falling_at_roam_edge_respawns() {
        let graph = FootholdGraph::from_segments([(p(600, 500), p(1100, 500))]).unwrap();
        let spawn = MobSpawn::new(900, 500, MobCapabilities::jumper())
            .with_roam(300, 300)
            .with_facing(MoveDirection::Right);
        let mut mob = MobMovement::new(&spawn, manual());
        mob.place(&graph);

        // Past the floor's end, at the right roam edge, below spawn height
        mob.position = Vec2::new(1200.0, 600.0);
        mob.foothold = None;
        mob.jump_state = JumpState::Falling;
        mob.update(&graph, 16.67);

        assert_eq!(mob.position(), Vec2::new(900.0, 500.0));
        assert_eq!(mob.jump_state(), JumpState::None);
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
    }

    #[test]
    fn test_falling_without_map_bottom_respawns_past_limit() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = jumper(&graph, 1000, 500, MoveDirection::Right);
        mob.foothold = None;
        mob.jump_state = JumpState::Falling;

        // Within the fall limit below spawn: keeps falling
        mob.position.y = 2400.0;
        mob.update(&graph, 16.67);
        assert_eq!(mob.jump_state(), JumpState::Falling);
        assert!(mob.position().y > 2400.0);

        mob.position.y = 2600.0;
        mob.update(&graph, 16.67);
        assert_eq!(mob.jump_state(), JumpState::None);
        assert_eq!(mob.position(), Vec2::new(1000.0, 500.0));
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
    }

    #[test]
    fn test_jumper_turns_at_unconnected_edge() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(1100, 500))]).unwrap();
        let mut mob = jumper(&graph, 1080, 500, MoveDirection::Right);
        for _ in 0..20 {
            mob.update(&graph, 16.67);
            assert!(!mob.is_airborne(), "Edge jumps are disabled in this config");
        }
        assert_eq!(mob.direction(), MoveDirection::Left);
    }

    #[test]
    fn test_jumper_crosses_connected_segments() {
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(1100, 500)),
            (p(1100, 500), p(2000, 500)),
        ])
        .unwrap();
        let mut mob = jumper(&graph, 1050, 500, MoveDirection::Right);
        for _ in 0..60 {
            mob.update(&graph, 16.67);
        }
        assert_eq!(mob.direction(), MoveDirection::Right);
        assert_eq!(mob.current_foothold(), Some(FootholdId(1)));
    }
}
