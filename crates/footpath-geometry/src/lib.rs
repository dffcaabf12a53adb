//! Foothold graph data and spatial queries for Footpath
//!
//! This crate provides the read-only geometry every mob walks on:
//! - Anchors and foothold segments stored in an index arena (Anchor, Foothold, FootholdGraph)
//! - Graph construction with anchor merging (FootholdGraphBuilder)
//! - Spatial queries (ground below a point, nearest walls, platform span)
//! - 256-unit angle helpers for slope-following trigonometry

mod angle;
mod error;
mod foothold;
mod graph;
mod queries;

pub use angle::{angle256, cos256, sin256, ANGLE_UNITS};
pub use error::FootholdError;
pub use foothold::{Anchor, AnchorId, Foothold, FootholdId, FootholdKind};
pub use graph::{FootholdGraph, FootholdGraphBuilder};
