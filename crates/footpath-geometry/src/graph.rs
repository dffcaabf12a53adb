//! Foothold graph arena and its builder
//!
//! The graph is built once per map and then shared read-only by every mob.
//! Anchors at identical coordinates are merged while building, so segments
//! that touch end-to-end become neighbors.

use std::collections::VecDeque;

use ahash::AHashMap;
use glam::IVec2;

use crate::{Anchor, AnchorId, Foothold, FootholdError, FootholdId, FootholdKind};

/// Immutable arena of anchors and segments
#[derive(Debug, Clone, Default)]
pub struct FootholdGraph {
    anchors: Vec<Anchor>,
    footholds: Vec<Foothold>,
}

impl FootholdGraph {
    /// Graph with no geometry; every query returns nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a graph from raw segments, deriving walls from equal X coordinates
    pub fn from_segments<I>(segments: I) -> Result<Self, FootholdError>
    where
        I: IntoIterator<Item = (IVec2, IVec2)>,
    {
        let mut builder = FootholdGraphBuilder::new();
        for (a, b) in segments {
            builder.segment(a, b);
        }
        builder.build()
    }

    pub fn foothold(&self, id: FootholdId) -> Option<&Foothold> {
        self.footholds.get(id.index())
    }

    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(id.index())
    }

    pub fn footholds(&self) -> impl Iterator<Item = &Foothold> {
        self.footholds.iter()
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    /// Walkable segments only
    pub fn ground(&self) -> impl Iterator<Item = &Foothold> {
        self.footholds.iter().filter(|fh| fh.is_ground())
    }

    /// Blocking walls only
    pub fn walls(&self) -> impl Iterator<Item = &Foothold> {
        self.footholds.iter().filter(|fh| fh.is_wall())
    }

    pub fn len(&self) -> usize {
        self.footholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footholds.is_empty()
    }

    /// Segments touching an anchor (empty for unknown anchors)
    pub fn neighbors_at(&self, anchor: AnchorId) -> &[FootholdId] {
        self.anchor(anchor)
            .map(|a| a.connected.as_slice())
            .unwrap_or(&[])
    }

    pub fn left_anchor(&self, id: FootholdId) -> Option<AnchorId> {
        self.foothold(id).map(Foothold::left_anchor)
    }

    pub fn right_anchor(&self, id: FootholdId) -> Option<AnchorId> {
        self.foothold(id).map(Foothold::right_anchor)
    }

    /// Horizontal extent of the platform containing `start`
    ///
    /// Walks connected ground segments breadth-first, skipping any whose
    /// mid-Y differs from the start segment's by more than `max_dy`.
    /// Returns `None` when `start` is unknown or a wall.
    pub fn platform_span(&self, start: FootholdId, max_dy: f32) -> Option<(i32, i32)> {
        let origin = self.foothold(start).filter(|fh| fh.is_ground())?;
        let reference_y = origin.mid_y();

        let mut visited = vec![false; self.footholds.len()];
        let mut queue = VecDeque::from([start]);
        let mut left = i32::MAX;
        let mut right = i32::MIN;

        while let Some(id) = queue.pop_front() {
            let Some(fh) = self.foothold(id) else {
                continue;
            };
            if visited[id.index()] || fh.is_wall() {
                continue;
            }
            if (fh.mid_y() - reference_y).abs() > max_dy {
                continue;
            }
            visited[id.index()] = true;

            left = left.min(fh.min_x());
            right = right.max(fh.max_x());

            for anchor in [fh.first_anchor, fh.second_anchor] {
                for &next in self.neighbors_at(anchor) {
                    if !visited[next.index()] {
                        queue.push_back(next);
                    }
                }
            }
        }

        (left <= right).then_some((left, right))
    }
}

/// Collects segments and merges their anchors
#[derive(Debug, Default)]
pub struct FootholdGraphBuilder {
    anchors: Vec<Anchor>,
    by_position: AHashMap<IVec2, AnchorId>,
    segments: Vec<(AnchorId, AnchorId, FootholdKind)>,
}

impl FootholdGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor at `position`, reusing an existing one at the same point
    pub fn anchor(&mut self, position: IVec2) -> AnchorId {
        if let Some(&id) = self.by_position.get(&position) {
            return id;
        }
        let id = AnchorId(self.anchors.len() as u32);
        self.anchors.push(Anchor::new(position));
        self.by_position.insert(position, id);
        id
    }

    /// Add a segment, tagging it as a wall when both ends share an X
    pub fn segment(&mut self, a: IVec2, b: IVec2) -> &mut Self {
        let kind = if a.x == b.x {
            FootholdKind::Wall
        } else {
            FootholdKind::Ground
        };
        self.push(a, b, kind)
    }

    /// Add a walkable segment
    pub fn ground(&mut self, a: IVec2, b: IVec2) -> &mut Self {
        self.push(a, b, FootholdKind::Ground)
    }

    /// Add a blocking wall
    pub fn wall(&mut self, a: IVec2, b: IVec2) -> &mut Self {
        self.push(a, b, FootholdKind::Wall)
    }

    /// Add a segment between two anchors created earlier with [`Self::anchor`]
    pub fn connect(&mut self, first: AnchorId, second: AnchorId, kind: FootholdKind) -> &mut Self {
        self.segments.push((first, second, kind));
        self
    }

    fn push(&mut self, a: IVec2, b: IVec2, kind: FootholdKind) -> &mut Self {
        let first = self.anchor(a);
        let second = self.anchor(b);
        self.connect(first, second, kind)
    }

    /// Validate all segments and wire anchor connectivity
    pub fn build(self) -> Result<FootholdGraph, FootholdError> {
        let FootholdGraphBuilder {
            mut anchors,
            segments,
            ..
        } = self;

        let mut footholds = Vec::with_capacity(segments.len());
        for (index, (first_anchor, second_anchor, kind)) in segments.into_iter().enumerate() {
            let first = anchors
                .get(first_anchor.index())
                .ok_or(FootholdError::UnknownAnchor {
                    index,
                    anchor: first_anchor,
                })?
                .position;
            let second = anchors
                .get(second_anchor.index())
                .ok_or(FootholdError::UnknownAnchor {
                    index,
                    anchor: second_anchor,
                })?
                .position;

            if first == second {
                return Err(FootholdError::DegenerateSegment { index, at: first });
            }
            if kind == FootholdKind::Ground && first.x == second.x {
                return Err(FootholdError::DegenerateGround { index, x: first.x });
            }

            let id = FootholdId(index as u32);
            anchors[first_anchor.index()].connected.push(id);
            anchors[second_anchor.index()].connected.push(id);
            footholds.push(Foothold {
                id,
                kind,
                first_anchor,
                second_anchor,
                first,
                second,
            });
        }

        log::info!(
            "Built foothold graph: {} segments ({} walls), {} anchors",
            footholds.len(),
            footholds.iter().filter(|fh| fh.is_wall()).count(),
            anchors.len()
        );

        Ok(FootholdGraph { anchors, footholds })
    }
}
