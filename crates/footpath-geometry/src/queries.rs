//! Spatial queries over the foothold graph
//!
//! All queries are linear scans over the static segment set (or over one
//! anchor's neighbors) and never allocate.

use crate::{FootholdGraph, FootholdId};

impl FootholdGraph {
    /// Nearest ground at or below `(x, y)`
    ///
    /// Among non-vertical ground segments whose X span contains `x`, picks the
    /// one whose line Y is the smallest value still `>= y` (screen Y grows
    /// downward). Earlier segments win ties.
    pub fn find_below(&self, x: f32, y: f32) -> Option<FootholdId> {
        let mut best: Option<(FootholdId, f32)> = None;
        for fh in self.ground() {
            if !fh.spans_x(x) {
                continue;
            }
            let Some(fh_y) = fh.line_y_at(x) else {
                continue;
            };
            if fh_y < y {
                continue;
            }
            if best.map_or(true, |(_, best_y)| fh_y < best_y) {
                best = Some((fh.id, fh_y));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Closest wall at or left of `x` whose vertical span contains `y`
    pub fn find_wall_left(&self, x: f32, y: f32) -> Option<FootholdId> {
        let mut best: Option<(FootholdId, i32)> = None;
        for wall in self.walls() {
            let wall_x = wall.wall_x();
            if wall_x as f32 > x || !wall.spans_y(y) {
                continue;
            }
            if best.map_or(true, |(_, best_x)| wall_x > best_x) {
                best = Some((wall.id, wall_x));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Closest wall at or right of `x` whose vertical span contains `y`
    pub fn find_wall_right(&self, x: f32, y: f32) -> Option<FootholdId> {
        let mut best: Option<(FootholdId, i32)> = None;
        for wall in self.walls() {
            let wall_x = wall.wall_x();
            if (wall_x as f32) < x || !wall.spans_y(y) {
                continue;
            }
            if best.map_or(true, |(_, best_x)| wall_x < best_x) {
                best = Some((wall.id, wall_x));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Interpolated Y on segment `id` at `x` (clamped to its span)
    pub fn y_on_segment(&self, id: FootholdId, x: f32) -> Option<f32> {
        self.foothold(id).map(|fh| fh.y_at(x))
    }

    /// Continuation of `current` through the anchor at the edge being left
    ///
    /// Candidates are ground segments sharing that anchor which extend
    /// further in the travel direction than `x` and whose Y at `x` is within
    /// `max_dy` of `y`. The closest in Y wins.
    pub fn next_connected(
        &self,
        current: FootholdId,
        moving_right: bool,
        x: f32,
        y: f32,
        max_dy: f32,
    ) -> Option<FootholdId> {
        let fh = self.foothold(current)?;
        let edge = if moving_right {
            fh.right_anchor()
        } else {
            fh.left_anchor()
        };

        let mut best: Option<(FootholdId, f32)> = None;
        for &candidate_id in self.neighbors_at(edge) {
            if candidate_id == current {
                continue;
            }
            let Some(candidate) = self.foothold(candidate_id) else {
                continue;
            };
            if candidate.is_wall() {
                continue;
            }

            let continues = if moving_right {
                candidate.max_x() as f32 > x
            } else {
                (candidate.min_x() as f32) < x
            };
            if !continues {
                continue;
            }

            let dy = (candidate.y_at(x) - y).abs();
            if dy < max_dy && best.map_or(true, |(_, best_dy)| dy < best_dy) {
                best = Some((candidate_id, dy));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Any ground near `(x, y)` when anchor traversal found nothing
    ///
    /// First pass: segments spanning `x` exactly whose Y is within `max_dy`
    /// of `y`. Second pass: span widened by `slack_x`, Y taken at the clamped
    /// X, within `slack_dy`. Closest |dY| wins; `except` is never returned.
    pub fn find_ground_near(
        &self,
        x: f32,
        y: f32,
        max_dy: f32,
        slack_x: f32,
        slack_dy: f32,
        except: Option<FootholdId>,
    ) -> Option<FootholdId> {
        let exact = self.closest_ground(y, max_dy, except, |fh| {
            fh.spans_x(x).then(|| fh.y_at(x))
        });
        exact.or_else(|| {
            self.closest_ground(y, slack_dy, except, |fh| {
                fh.spans_x_with_slack(x, slack_x)
                    .then(|| fh.y_at(fh.clamp_x(x)))
            })
        })
    }

    fn closest_ground<F>(
        &self,
        y: f32,
        max_dy: f32,
        except: Option<FootholdId>,
        mut sample: F,
    ) -> Option<FootholdId>
    where
        F: FnMut(&crate::Foothold) -> Option<f32>,
    {
        let mut best: Option<(FootholdId, f32)> = None;
        for fh in self.ground().filter(|fh| Some(fh.id) != except) {
            let Some(fh_y) = sample(fh) else {
                continue;
            };
            let dy = (fh_y - y).abs();
            if dy <= max_dy && best.map_or(true, |(_, best_dy)| dy < best_dy) {
                best = Some((fh.id, dy));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Ground closest in Y to `expected_y` for initial placement
    ///
    /// Segments spanning `x` qualify within `near_dy`; segments that only
    /// overlap the horizontal window `[left, right]` are sampled at the
    /// clamped X and qualify within `window_dy`.
    pub fn find_ground_for_placement(
        &self,
        x: f32,
        expected_y: f32,
        (left, right): (i32, i32),
        near_dy: f32,
        window_dy: f32,
    ) -> Option<FootholdId> {
        let mut best: Option<(FootholdId, f32)> = None;
        for fh in self.ground() {
            let (dy, limit) = if fh.spans_x(x) {
                ((fh.y_at(x) - expected_y).abs(), near_dy)
            } else if fh.max_x() >= left && fh.min_x() <= right {
                ((fh.y_at(fh.clamp_x(x)) - expected_y).abs(), window_dy)
            } else {
                continue;
            };
            if dy < limit && best.map_or(true, |(_, best_dy)| dy < best_dy) {
                best = Some((fh.id, dy));
            }
        }
        best.map(|(id, _)| id)
    }
}
