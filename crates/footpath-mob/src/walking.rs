//! Ground movement along footholds
//!
//! Walkers patrol with a random decision timer. The slope step, wall stop and
//! foothold transition below are shared with the grounded phase of jumpers.

use footpath_geometry::{angle256, cos256, sin256, Foothold, FootholdGraph};

use crate::movement::MobMovement;
use crate::rng::DecisionRng;
use crate::types::{MobAction, MoveDirection};

/// Result of one slope step
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GroundStep {
    /// Still supported by a ground segment
    Supported,
    /// Walked off a ledge; `edge_x` is just inside the departed segment
    Ledge {
        edge_x: f32,
        heading: MoveDirection,
    },
}

impl MobMovement {
    pub(crate) fn update_walking(&mut self, graph: &FootholdGraph, dt_ms: f32, sf: f32) {
        self.decision_timer -= dt_ms;
        if self.decision_timer <= 0.0 {
            self.decide_walk();
        }

        if self.action != MobAction::Move {
            return;
        }

        let bounds = self.walk_bounds();
        let amount = self.effective_move_speed() * sf;

        if let Some(stop_x) = self.wall_stop(graph, self.direction, amount) {
            let from_x = self.position.x;
            self.position.x = stop_x.clamp(bounds.0 as f32, bounds.1 as f32);
            self.reproject(graph, from_x);
            self.turn_around();
            return;
        }

        if let GroundStep::Ledge { edge_x, heading } = self.slide(graph, amount, Some(bounds)) {
            self.step_back_to(graph, edge_x);
            self.set_direction(heading.reversed());
            log::debug!("Walker turned at ledge x={:.1}", self.position.x);
        }
    }

    fn decide_walk(&mut self) {
        let chances = &self.config.chances;
        let (reverse, pause) = (
            chances.walker_reverse,
            chances.walker_reverse + chances.walker_pause,
        );
        let roll = self.rng.roll_percent();

        if roll < reverse {
            self.turn_around();
            self.action = MobAction::Move;
        } else if roll < pause {
            self.action = MobAction::Stand;
            self.decision_timer = self.rng.roll_ms(self.config.timing.pause);
        } else {
            self.action = MobAction::Move;
        }

        if self.action == MobAction::Move {
            self.decision_timer = self.rng.roll_ms(self.config.timing.walk_decision);
        }
    }

    /// Horizontal window a walker patrols
    pub(crate) fn walk_bounds(&self) -> (i32, i32) {
        let base = if self.use_platform_bounds {
            self.platform
        } else {
            self.roam
        };
        self.bounded(base, self.config.margins.walk)
    }

    /// X to stop at when moving `amount` toward `heading` would reach a wall
    ///
    /// Walls are probed from the mob's current X, `wall_probe` px above its
    /// feet, so a wall that is already close can never be skipped.
    pub(crate) fn wall_stop(
        &self,
        graph: &FootholdGraph,
        heading: MoveDirection,
        amount: f32,
    ) -> Option<f32> {
        let x = self.position.x;
        let probe_y = self.position.y - self.config.tolerances.wall_probe;
        match heading {
            MoveDirection::Left => {
                let wall_x = graph.foothold(graph.find_wall_left(x, probe_y)?)?.wall_x() as f32;
                (x - amount <= wall_x).then_some(wall_x + 1.0)
            }
            MoveDirection::Right => {
                let wall_x = graph.foothold(graph.find_wall_right(x, probe_y)?)?.wall_x() as f32;
                (x + amount >= wall_x).then_some(wall_x - 1.0)
            }
        }
    }

    /// Whether a wall stands between `from_x` and `to_x` at the mob's height
    pub(crate) fn wall_between(&self, graph: &FootholdGraph, from_x: f32, to_x: f32) -> bool {
        let probe_y = self.position.y - self.config.tolerances.wall_probe;
        let wall = if to_x > from_x {
            graph.find_wall_right(from_x, probe_y)
        } else if to_x < from_x {
            graph.find_wall_left(from_x, probe_y)
        } else {
            None
        };
        let reach = (to_x - from_x).abs();
        wall.and_then(|id| graph.foothold(id))
            .is_some_and(|fh| (fh.wall_x() as f32 - from_x).abs() <= reach)
    }

    /// Advance `amount` along the current segment in the travel direction
    ///
    /// When `bounds` is given the mob is clamped into it and turned back at
    /// either edge. Leaving the segment tries the connected neighbor at the
    /// departed anchor first and a broader ground search second.
    pub(crate) fn slide(
        &mut self,
        graph: &FootholdGraph,
        amount: f32,
        bounds: Option<(i32, i32)>,
    ) -> GroundStep {
        let moving = self.direction;
        let start_x = self.position.x;
        let Some(fh) = self
            .foothold
            .and_then(|id| graph.foothold(id))
            .filter(|fh| fh.is_ground())
        else {
            // Off the graph: move flat and look for anything to stand on
            self.position.x += moving.sign() * amount;
            if let Some(bounds) = bounds {
                self.clamp_reversing(bounds);
            }
            self.reacquire_ground(graph, start_x);
            return GroundStep::Supported;
        };

        let (from, to) = fh.directed(moving.is_right());
        let angle = angle256(from, to) as f32;
        self.set_direction(moving);
        self.position.x += cos256(angle) * amount;
        self.position.y += sin256(angle) * amount;

        if let Some(bounds) = bounds {
            self.clamp_reversing(bounds);
        }

        if fh.spans_x(self.position.x) {
            // Quantized angles drift off the line on steep slopes
            self.position.y = fh.y_at(self.position.x);
            return GroundStep::Supported;
        }

        if self.transition(graph, fh, moving, start_x) || self.reacquire_ground(graph, start_x)
        {
            GroundStep::Supported
        } else {
            let step_back = self.config.tolerances.edge_step_back;
            let edge_x = match moving {
                MoveDirection::Left => fh.min_x() as f32 + step_back,
                MoveDirection::Right => fh.max_x() as f32 - step_back,
            };
            GroundStep::Ledge {
                edge_x,
                heading: moving,
            }
        }
    }

    /// Continue onto a segment sharing the departed edge anchor
    fn transition(
        &mut self,
        graph: &FootholdGraph,
        from: &Foothold,
        moving: MoveDirection,
        start_x: f32,
    ) -> bool {
        let Some(next) = graph
            .next_connected(
                from.id,
                moving.is_right(),
                self.position.x,
                self.position.y,
                self.config.tolerances.transition_y,
            )
            .and_then(|id| graph.foothold(id))
        else {
            return false;
        };

        let x = next.clamp_x(self.position.x);
        if self.wall_between(graph, start_x, x) {
            return false;
        }

        log::trace!("Foothold transition {} -> {}", from.id, next.id);
        self.foothold = Some(next.id);
        self.position.x = x;
        self.position.y = next.y_at(self.position.x);
        true
    }

    /// Find ground under the current X
    ///
    /// Keeps the current segment while it still spans X; otherwise searches
    /// every other ground segment near the mob's height. A candidate that
    /// would put the mob on the far side of a wall from `from_x` is refused.
    pub(crate) fn reacquire_ground(&mut self, graph: &FootholdGraph, from_x: f32) -> bool {
        if let Some(fh) = self
            .foothold
            .and_then(|id| graph.foothold(id))
            .filter(|fh| fh.is_ground() && fh.spans_x(self.position.x))
        {
            self.position.y = fh.y_at(self.position.x);
            return true;
        }

        let tolerances = &self.config.tolerances;
        let Some(fh) = graph
            .find_ground_near(
                self.position.x,
                self.position.y,
                tolerances.search_y,
                tolerances.edge_slack_x,
                tolerances.edge_slack_y,
                self.foothold,
            )
            .and_then(|id| graph.foothold(id))
        else {
            return false;
        };

        let x = fh.clamp_x(self.position.x);
        if self.wall_between(graph, from_x, x) {
            log::trace!("Ground {} is behind a wall from x={:.1}", fh.id, from_x);
            return false;
        }

        self.foothold = Some(fh.id);
        self.position.x = x;
        self.position.y = fh.y_at(self.position.x);
        true
    }

    /// Re-derive Y from the current segment after X was moved from `from_x`
    pub(crate) fn reproject(&mut self, graph: &FootholdGraph, from_x: f32) {
        if self.foothold.is_some() && !self.is_airborne() {
            self.reacquire_ground(graph, from_x);
        }
    }

    /// Put the mob back on its segment at `edge_x`
    pub(crate) fn step_back_to(&mut self, graph: &FootholdGraph, edge_x: f32) {
        self.position.x = edge_x;
        if let Some(y) = self
            .foothold
            .and_then(|id| graph.y_on_segment(id, self.position.x))
        {
            self.position.y = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use footpath_geometry::{FootholdGraph, FootholdId};
    use glam::IVec2;

    use crate::config::{MovementConfig, MsRange};
    use crate::movement::MobMovement;
    use crate::types::{MobAction, MobCapabilities, MobSpawn, MoveDirection};

    fn p(x: i32, y: i32) -> IVec2 {
        IVec2::new(x, y)
    }

    /// Config whose walkers never make a decision during a test
    fn steady() -> Arc<MovementConfig> {
        let mut config = MovementConfig::default();
        config.timing.initial_decision = MsRange::new(1_000_000, 1_000_001);
        Arc::new(config)
    }

    fn walker(
        graph: &FootholdGraph,
        x: i32,
        y: i32,
        roam: i32,
        facing: MoveDirection,
    ) -> MobMovement {
        let spawn = MobSpawn::new(x, y, MobCapabilities::walker())
            .with_roam(roam, roam)
            .with_facing(facing);
        let mut mob = MobMovement::new(&spawn, steady());
        mob.place(graph);
        mob
    }

    #[test]
    fn test_walks_flat_ground_at_move_speed() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = walker(&graph, 1000, 500, 300, MoveDirection::Right);
        for _ in 0..10 {
            mob.update(&graph, 16.67);
        }
        assert!((mob.x() - 1020.0).abs() < 1e-3);
        assert_eq!(mob.y(), 500.0);
        assert_eq!(mob.action(), MobAction::Move);
    }

    #[test]
    fn test_follows_slope_and_transitions() {
        // Flat, then a 45 degree rise to the right, then flat again
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(400, 500)),
            (p(400, 500), p(500, 400)),
            (p(500, 400), p(900, 400)),
        ])
        .unwrap();
        let mut mob = walker(&graph, 350, 500, 300, MoveDirection::Right);

        let mut visited = Vec::new();
        for _ in 0..150 {
            mob.update(&graph, 16.67);
            let fh = mob.current_foothold().unwrap();
            if visited.last() != Some(&fh) {
                visited.push(fh);
            }
            let expected = graph.y_on_segment(fh, mob.x()).unwrap();
            assert!(
                (mob.y() - expected).abs() < 1e-3,
                "Mob at x={} should sit on {}",
                mob.x(),
                fh
            );
        }
        assert_eq!(visited, vec![FootholdId(0), FootholdId(1), FootholdId(2)]);
        assert!(mob.y() <= 400.0 + 1e-3);
    }

    #[test]
    fn test_wall_stops_and_reverses() {
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(1000, 500)),
            (p(600, 300), p(600, 500)),
        ])
        .unwrap();
        let mut mob = walker(&graph, 550, 500, 300, MoveDirection::Right);

        for _ in 0..100 {
            mob.update(&graph, 16.67);
            assert!(mob.x() < 600.0, "Crossed the wall at x={}", mob.x());
        }
        assert_eq!(mob.direction(), MoveDirection::Left);
    }

    #[test]
    fn test_ledge_turns_back() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(500, 500))]).unwrap();
        let mut mob = walker(&graph, 480, 500, 300, MoveDirection::Right);

        for _ in 0..30 {
            mob.update(&graph, 16.67);
            assert!(mob.x() <= 500.0);
            assert_eq!(mob.y(), 500.0);
        }
        assert_eq!(mob.direction(), MoveDirection::Left);
        assert!(!mob.facing_right());
    }

    #[test]
    fn test_ledge_does_not_drop_to_distant_floor() {
        // Upper ledge ends at 500; a floor far below continues under it
        let graph = FootholdGraph::from_segments([
            (p(0, 300), p(500, 300)),
            (p(0, 600), p(1000, 600)),
        ])
        .unwrap();
        let mut mob = walker(&graph, 480, 300, 300, MoveDirection::Right);
        for _ in 0..30 {
            mob.update(&graph, 16.67);
        }
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
        assert_eq!(mob.y(), 300.0);
    }

    #[test]
    fn test_small_gap_is_bridged_by_slack() {
        let graph =
            FootholdGraph::from_segments([(p(0, 500), p(500, 500)), (p(503, 500), p(1000, 500))])
                .unwrap();
        let mut mob = walker(&graph, 480, 500, 300, MoveDirection::Right);
        for _ in 0..30 {
            mob.update(&graph, 16.67);
        }
        assert_eq!(mob.current_foothold(), Some(FootholdId(1)));
        assert!(mob.x() > 503.0);
    }

    #[test]
    fn test_gap_behind_wall_is_not_bridged() {
        // Same small gap, but a wall rises out of it
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(600, 500)),
            (p(603, 500), p(1200, 500)),
            (p(602, 300), p(602, 500)),
        ])
        .unwrap();
        let mut mob = walker(&graph, 590, 500, 300, MoveDirection::Right);
        for tick in 0..100 {
            mob.update(&graph, 16.67);
            assert!(mob.x() < 602.0, "Crossed the wall at tick {tick}: x={}", mob.x());
            assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
            assert_eq!(mob.y(), 500.0);
        }
        assert_eq!(mob.direction(), MoveDirection::Left);
    }

    #[test]
    fn test_wall_between() {
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(1000, 500)),
            (p(602, 300), p(602, 500)),
        ])
        .unwrap();
        let mob = walker(&graph, 590, 500, 300, MoveDirection::Right);
        assert!(mob.wall_between(&graph, 601.0, 603.0));
        assert!(mob.wall_between(&graph, 601.0, 602.0));
        assert!(!mob.wall_between(&graph, 590.0, 600.0));
        assert!(!mob.wall_between(&graph, 601.0, 580.0));
        assert!(!mob.wall_between(&graph, 601.0, 601.0));
    }

    #[test]
    fn test_roam_edge_reverses() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut mob = walker(&graph, 1000, 500, 100, MoveDirection::Left);
        for _ in 0..60 {
            mob.update(&graph, 16.67);
            assert!(mob.x() >= 900.0);
        }
        assert_eq!(mob.direction(), MoveDirection::Right);
    }

    #[test]
    fn test_platform_bounds_widen_patrol() {
        let graph = FootholdGraph::from_segments([
            (p(0, 500), p(600, 500)),
            (p(600, 500), p(1200, 500)),
        ])
        .unwrap();
        let spawn = MobSpawn::new(1000, 500, MobCapabilities::walker())
            .with_roam(50, 50)
            .with_facing(MoveDirection::Left)
            .with_platform_bounds();
        let mut mob = MobMovement::new(&spawn, steady());
        mob.place(&graph);
        assert_eq!(mob.platform_range(), (0, 1200));

        for _ in 0..100 {
            mob.update(&graph, 16.67);
        }
        assert!(mob.x() < 950.0, "Platform walker should leave its roam range");
    }

    #[test]
    fn test_pause_reports_stand() {
        let graph = FootholdGraph::from_segments([(p(0, 500), p(2000, 500))]).unwrap();
        let mut config = MovementConfig::default();
        config.timing.initial_decision = MsRange::new(1, 2);
        config.chances.walker_reverse = 0;
        config.chances.walker_pause = 100;
        let spawn = MobSpawn::new(1000, 500, MobCapabilities::walker())
            .with_roam(300, 300)
            .with_facing(MoveDirection::Right);
        let mut mob = MobMovement::new(&spawn, Arc::new(config));
        mob.place(&graph);

        mob.update(&graph, 16.67);
        assert_eq!(mob.action(), MobAction::Stand);
        let x = mob.x();
        mob.update(&graph, 16.67);
        assert_eq!(mob.x(), x);
    }
}
