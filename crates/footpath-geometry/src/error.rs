//! Errors raised while building a foothold graph

use glam::IVec2;
use thiserror::Error;

use crate::AnchorId;

/// Rejected geometry. Movement itself never fails; only construction does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FootholdError {
    /// Both endpoints of a segment are the same point
    #[error("segment {index} has coincident endpoints at ({}, {})", .at.x, .at.y)]
    DegenerateSegment { index: usize, at: IVec2 },

    /// A walkable segment whose endpoints share an X coordinate cannot be interpolated
    #[error("ground segment {index} is vertical at x = {x}; tag it as a wall instead")]
    DegenerateGround { index: usize, x: i32 },

    /// A segment references an anchor that was never added
    #[error("segment {index} references unknown anchor {anchor:?}")]
    UnknownAnchor { index: usize, anchor: AnchorId },
}
