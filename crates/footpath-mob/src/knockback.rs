//! Knockback and impacts
//!
//! Queued impulses accumulate until the next update, where they replace the
//! mob's velocity and open a recovery window. While recovering the normal AI
//! is suspended and the mob moves ballistically with air drag.

use footpath_geometry::FootholdGraph;
use glam::Vec2;

use crate::jumping::Landing;
use crate::movement::MobMovement;
use crate::types::{JumpState, MobAction, MoveDirection, MoveType};

/// Vertical impulse needed to lift a grounded mob off its foothold
const DETACH_THRESHOLD: f32 = 0.5;

impl MobMovement {
    /// Queue a knockback impulse (positive X is right, negative Y is up)
    ///
    /// Impulses in the same direction combine but never exceed the strongest
    /// single one; an opposite impulse partially cancels the queued one.
    pub fn apply_knockback(&mut self, impulse: Vec2) {
        let pending = self.knockback.pending.get_or_insert(Vec2::ZERO);
        pending.x = accumulate(pending.x, impulse.x);
        pending.y = accumulate(pending.y, impulse.y);
        self.knockback.recovery_ms = self.config.timing.knockback_recovery;
    }

    /// Queue a knockback of `force` to one side with half of it upward
    pub fn apply_knockback_toward(&mut self, force: f32, direction: MoveDirection) {
        self.apply_knockback(Vec2::new(direction.sign() * force, -force * 0.5));
    }

    /// Set the velocity immediately, dropping any queued knockback
    ///
    /// An upward component lifts the mob off its foothold.
    pub fn apply_impact(&mut self, velocity: Vec2) {
        self.knockback.pending = None;
        self.knockback.recovery_ms = self.config.timing.knockback_recovery;
        self.action = MobAction::Hit;

        if self.move_type == MoveType::Fly {
            self.velocity = Vec2::new(velocity.x, 0.0);
            return;
        }
        self.velocity = velocity;
        if velocity.y < 0.0 {
            self.detach();
        }
    }

    /// Impact pushing the mob away from `source_x`
    pub fn apply_impact_from(&mut self, source_x: f32, force: f32, lift: f32) {
        let away = if source_x < self.position.x {
            MoveDirection::Right
        } else {
            MoveDirection::Left
        };
        self.apply_impact(Vec2::new(away.sign() * force, lift));
    }

    pub fn is_in_knockback(&self) -> bool {
        self.knockback.recovery_ms > 0.0
    }

    pub(crate) fn process_pending_knockback(&mut self) {
        let Some(impulse) = self.knockback.pending.take() else {
            return;
        };

        self.action = MobAction::Hit;
        if self.move_type == MoveType::Fly {
            self.velocity = Vec2::new(impulse.x, 0.0);
            return;
        }

        self.velocity = impulse;
        if self.foothold.is_some() && impulse.y.abs() > DETACH_THRESHOLD {
            self.detach();
        }
    }

    /// Leave the ground, rising or falling depending on the current velocity
    fn detach(&mut self) {
        if self.jump_state == JumpState::None {
            self.jump_state = if self.velocity.y < 0.0 {
                JumpState::Jumping
            } else {
                JumpState::Falling
            };
        }
        if let Some(id) = self.foothold.take() {
            self.takeoff = Some(id);
        }
    }

    /// Ballistic motion while recovering from a hit
    pub(crate) fn update_knockback(&mut self, graph: &FootholdGraph, sf: f32) {
        let physics = &self.config.physics;
        let (gravity, max_fall) = (physics.gravity, physics.max_fall_speed);
        self.velocity.x *= physics.air_drag.powf(sf);

        if self.move_type == MoveType::Fly {
            let bounds = self.fly_bounds();
            self.push_horizontally(graph, sf, bounds);
            return;
        }

        let grounded = !self.is_airborne();
        if grounded && self.foothold.is_none() {
            // Unplaced mobs stay put
            return;
        }

        let bounds = self.bounded(self.roam, self.config.margins.walk);

        if grounded {
            // Slide along the ground until drag stops it
            self.velocity.y = 0.0;
            let from_x = self.position.x;
            let hit_wall = self.push_horizontally(graph, sf, bounds);
            if self.reacquire_ground(graph, from_x) {
                return;
            }
            // Pinned against a wall past the segment end: stay on the segment
            if let Some(fh) = self.foothold.and_then(|id| graph.foothold(id)) {
                if hit_wall {
                    let x = fh.clamp_x(self.position.x);
                    self.step_back_to(graph, x);
                    return;
                }
            }
            log::trace!("Knocked off a ledge at x={:.1}", self.position.x);
            self.detach();
            return;
        }

        // 1. Gravity
        self.velocity.y = (self.velocity.y + gravity * sf).min(max_fall);
        if self.jump_state == JumpState::Jumping && self.velocity.y >= 0.0 {
            self.jump_state = JumpState::Falling;
        }

        // 2. Integrate, stopping at walls and bouncing off the bounds
        self.push_horizontally(graph, sf, bounds);
        self.position.y += self.velocity.y * sf;

        // 3. Landing uses the same look-ahead as jumps
        if self.jump_state == JumpState::Falling && self.try_land(graph, sf) == Landing::Landed {
            self.velocity.x = 0.0;
            return;
        }

        if self.fell_out_of_map() {
            self.respawn(graph);
        }
    }

    /// Move by the horizontal velocity; walls and bounds bounce at half speed
    ///
    /// Returns true when a wall stopped the move.
    fn push_horizontally(
        &mut self,
        graph: &FootholdGraph,
        sf: f32,
        (left, right): (i32, i32),
    ) -> bool {
        let dx = self.velocity.x * sf;
        let mut hit_wall = false;
        if dx != 0.0 {
            let heading = if dx > 0.0 {
                MoveDirection::Right
            } else {
                MoveDirection::Left
            };
            match self.wall_stop(graph, heading, dx.abs()) {
                Some(stop_x) => {
                    self.position.x = stop_x;
                    self.velocity.x *= -0.5;
                    hit_wall = true;
                }
                None => self.position.x += dx,
            }
        }

        let (left, right) = (left as f32, right as f32);
        if self.position.x < left {
            self.position.x = left;
            self.velocity.x *= -0.5;
        } else if self.position.x > right {
            self.position.x = right;
            self.velocity.x *= -0.5;
        }
        hit_wall
    }
}

/// Combine a queued velocity component with a new impulse
fn accumulate(current: f32, impulse: f32) -> f32 {
    if impulse < 0.0 && impulse < current {
        (impulse + current).max(impulse)
    } else if impulse > 0.0 && impulse > current {
        (impulse + current).min(impulse)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use footpath_geometry::{FootholdGraph, FootholdId};
    use glam::{IVec2, Vec2};

    use super::*;
    use crate::config::{MovementConfig, MsRange};
    use crate::types::{MapBounds, MobCapabilities, MobSpawn};

    fn p(x: i32, y: i32) -> IVec2 {
        IVec2::new(x, y)
    }

    fn steady() -> Arc<MovementConfig> {
        let mut config = MovementConfig::default();
        config.timing.initial_decision = MsRange::new(1_000_000, 1_000_001);
        Arc::new(config)
    }

    fn placed(graph: &FootholdGraph, capabilities: MobCapabilities) -> MobMovement {
        let spawn = MobSpawn::new(1000, 500, capabilities)
            .with_roam(300, 300)
            .with_facing(MoveDirection::Right);
        let mut mob = MobMovement::new(&spawn, steady());
        mob.place(graph);
        mob
    }

    fn run_until_recovered(mob: &mut MobMovement, graph: &FootholdGraph) {
        for _ in 0..120 {
            mob.update(graph, 16.67);
            if !mob.is_in_knockback() && !mob.is_airborne() {
                break;
            }
        }
    }

    #[test]
    fn test_accumulate_same_direction_is_capped() {
        assert_eq!(accumulate(0.0, -5.0), -5.0);
        assert_eq!(accumulate(-3.0, -5.0), -5.0);
        assert_eq!(accumulate(-5.0, -3.0), -5.0);
        assert_eq!(accumulate(2.0, 4.0), 4.0);
    }

    #[test]
    fn test_accumulate_opposite_direction_cancels() {
        assert_eq!(accumulate(3.0, -5.0), -2.0);
        assert_eq!(accumulate(-4.0, 1.0), -3.0);
    }

    #[test]
    fn test_knockback_lifts_and_lands() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());

        mob.apply_knockback_toward(6.0, MoveDirection::Left);
        assert!(mob.is_in_knockback());
        mob.update(&graph, 16.67);
        assert_eq!(mob.action(), MobAction::Hit);
        assert!(mob.is_airborne());
        assert!(mob.x() < 1000.0);
        assert!(mob.y() < 500.0);

        run_until_recovered(&mut mob, &graph);
        assert!(!mob.is_airborne());
        assert_eq!(mob.y(), 500.0);
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));

        mob.update(&graph, 16.67);
        assert_eq!(mob.action(), MobAction::Move);
    }

    #[test]
    fn test_horizontal_knockback_slides_on_ground() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());

        mob.apply_knockback(Vec2::new(4.0, 0.0));
        mob.update(&graph, 16.67);
        assert!(!mob.is_airborne());
        assert_eq!(mob.y(), 500.0);
        assert!(mob.x() > 1003.0);
    }

    #[test]
    fn test_impact_from_pushes_away_from_source() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());

        mob.apply_impact_from(1100.0, 5.0, -4.0);
        assert_eq!(mob.current_foothold(), None);
        mob.update(&graph, 16.67);
        assert!(mob.x() < 1000.0);

        run_until_recovered(&mut mob, &graph);
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
    }

    #[test]
    fn test_knockback_stops_at_wall() {
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(2000, 500)),
            (p(990, 400), p(990, 500)),
        ])
        .unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());

        mob.apply_knockback(Vec2::new(-20.0, 0.0));
        for _ in 0..30 {
            mob.update(&graph, 16.67);
            assert!(mob.x() > 990.0);
        }
    }

    #[test]
    fn test_ground_slide_stops_at_wall_over_gap() {
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(1010, 500)),
            (p(1013, 500), p(2000, 500)),
            (p(1012, 300), p(1012, 500)),
        ])
        .unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());

        mob.apply_knockback(Vec2::new(20.0, 0.0));
        for tick in 0..60 {
            mob.update(&graph, 16.67);
            assert!(mob.x() < 1012.0, "Crossed the wall at tick {tick}: x={}", mob.x());
            assert!(!mob.is_airborne());
            assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
        }
    }

    #[test]
    fn test_knockback_past_map_bottom_respawns() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());
        mob.set_map_bounds(MapBounds::new(-5000, -5000, 5000, 800));

        mob.apply_impact(Vec2::new(0.0, -2.0));
        assert!(mob.is_airborne());
        mob.position.y = 950.0;
        mob.update(&graph, 16.67);

        assert_eq!(mob.position(), Vec2::new(1000.0, 500.0));
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
        assert!(!mob.is_in_knockback());
        assert!(!mob.is_airborne());
    }

    #[test]
    fn test_knockback_respects_roam_range() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = placed(&graph, MobCapabilities::walker());

        mob.apply_impact(Vec2::new(200.0, 0.0));
        for _ in 0..30 {
            mob.update(&graph, 16.67);
            assert!(mob.x() <= 1300.0);
        }
    }

    #[test]
    fn test_flyers_take_only_horizontal_knockback() {
        let graph = FootholdGraph::empty();
        let spawn = MobSpawn::new(1000, 300, MobCapabilities::flyer()).with_roam(300, 300);
        let mut mob = MobMovement::new(&spawn, steady());

        mob.apply_knockback(Vec2::new(5.0, -20.0));
        mob.update(&graph, 16.67);
        assert_eq!(mob.velocity().y, 0.0);
        assert_eq!(mob.y(), 300.0);
        assert!(mob.x() > 1004.0);
        assert!(!mob.is_airborne());
    }

    #[test]
    fn test_knocked_off_ledge_falls_to_lower_floor() {
        let graph = FootholdGraph::from_segments([
            (p(800, 400), p(1010, 400)),
            (p(0, 600), p(2000, 600)),
        ])
        .unwrap();
        let spawn = MobSpawn::new(1000, 400, MobCapabilities::walker()).with_roam(300, 300);
        let mut mob = MobMovement::new(&spawn, steady());
        mob.place(&graph);

        mob.apply_knockback(Vec2::new(8.0, 0.0));
        for _ in 0..120 {
            mob.update(&graph, 16.67);
        }
        assert_eq!(mob.current_foothold(), Some(FootholdId(1)));
        assert_eq!(mob.y(), 600.0);
    }
}
