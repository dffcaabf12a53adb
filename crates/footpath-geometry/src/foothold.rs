//! Anchors and foothold segments
//!
//! Segments live in an arena owned by [`FootholdGraph`](crate::FootholdGraph)
//! and are referred to by [`FootholdId`]. Anchors keep index lists of the
//! segments touching them instead of back-references.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a foothold segment inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FootholdId(pub u32);

impl FootholdId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FootholdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fh#{}", self.0)
    }
}

/// Index of an anchor inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub u32);

impl AnchorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a segment can be walked on or only blocks horizontal motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FootholdKind {
    Ground,
    Wall,
}

/// Shared endpoint of one or more segments
#[derive(Debug, Clone)]
pub struct Anchor {
    pub position: IVec2,
    /// Segments touching this point (non-owning)
    pub connected: SmallVec<[FootholdId; 4]>,
}

impl Anchor {
    pub fn new(position: IVec2) -> Self {
        Self {
            position,
            connected: SmallVec::new(),
        }
    }
}

/// A line segment between two anchors
#[derive(Debug, Clone)]
pub struct Foothold {
    pub id: FootholdId,
    pub kind: FootholdKind,
    pub first_anchor: AnchorId,
    pub second_anchor: AnchorId,
    /// Copy of the first anchor's position
    pub first: IVec2,
    /// Copy of the second anchor's position
    pub second: IVec2,
}

impl Foothold {
    pub fn is_wall(&self) -> bool {
        self.kind == FootholdKind::Wall
    }

    pub fn is_ground(&self) -> bool {
        self.kind == FootholdKind::Ground
    }

    pub fn min_x(&self) -> i32 {
        self.first.x.min(self.second.x)
    }

    pub fn max_x(&self) -> i32 {
        self.first.x.max(self.second.x)
    }

    pub fn min_y(&self) -> i32 {
        self.first.y.min(self.second.y)
    }

    pub fn max_y(&self) -> i32 {
        self.first.y.max(self.second.y)
    }

    pub fn width(&self) -> i32 {
        self.max_x() - self.min_x()
    }

    /// Average Y of both endpoints
    pub fn mid_y(&self) -> f32 {
        (self.first.y + self.second.y) as f32 / 2.0
    }

    /// Whether `x` lies inside the segment's closed X span
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.min_x() as f32 && x <= self.max_x() as f32
    }

    /// Whether `x` lies inside the X span widened by `slack` on both sides
    pub fn spans_x_with_slack(&self, x: f32, slack: f32) -> bool {
        x >= self.min_x() as f32 - slack && x <= self.max_x() as f32 + slack
    }

    /// Whether `y` lies inside the segment's closed Y span
    pub fn spans_y(&self, y: f32) -> bool {
        y >= self.min_y() as f32 && y <= self.max_y() as f32
    }

    /// Clamp `x` into the segment's X span
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.min_x() as f32, self.max_x() as f32)
    }

    /// Endpoints ordered by ascending X
    pub fn ordered(&self) -> (IVec2, IVec2) {
        if self.first.x <= self.second.x {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }

    /// Anchor on the left end
    pub fn left_anchor(&self) -> AnchorId {
        if self.first.x <= self.second.x {
            self.first_anchor
        } else {
            self.second_anchor
        }
    }

    /// Anchor on the right end
    pub fn right_anchor(&self) -> AnchorId {
        if self.first.x <= self.second.x {
            self.second_anchor
        } else {
            self.first_anchor
        }
    }

    /// Wall X position (first endpoint; walls are vertical)
    pub fn wall_x(&self) -> i32 {
        self.first.x
    }

    /// Y on the segment at `x`, clamped to the segment's span
    ///
    /// A vertical segment has no slope; its left endpoint's Y is returned
    /// instead of dividing by zero.
    pub fn y_at(&self, x: f32) -> f32 {
        let (left, right) = self.ordered();
        if left.x == right.x {
            return left.y as f32;
        }

        let t = ((x - left.x as f32) / (right.x - left.x) as f32).clamp(0.0, 1.0);
        left.y as f32 + t * (right.y - left.y) as f32
    }

    /// Unclamped line Y at `x`, used by the ground-below query
    ///
    /// Returns `None` for vertical segments.
    pub fn line_y_at(&self, x: f32) -> Option<f32> {
        if self.first.x == self.second.x {
            return None;
        }
        let (x1, y1) = (self.first.x as f32, self.first.y as f32);
        let (x2, y2) = (self.second.x as f32, self.second.y as f32);
        Some((y1 - y2) / (x1 - x2) * (x - x1) + y1)
    }

    /// Endpoints as floats, ordered so the first point is where a walker
    /// moving in the given direction starts
    pub fn directed(&self, moving_right: bool) -> (Vec2, Vec2) {
        let (left, right) = self.ordered();
        if moving_right {
            (left.as_vec2(), right.as_vec2())
        } else {
            (right.as_vec2(), left.as_vec2())
        }
    }
}
