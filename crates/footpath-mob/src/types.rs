//! Common types for mob movement
//!
//! Enums reported to the host every tick, spawn parameters, and the map
//! boundary rectangle.

use std::sync::atomic::{AtomicU64, Ordering};

use footpath_geometry::FootholdId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier for a simulated mob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MobId(u64);

static NEXT_MOB_ID: AtomicU64 = AtomicU64::new(1);

impl MobId {
    /// Generate a new unique mob ID
    pub fn new() -> Self {
        MobId(NEXT_MOB_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Create a MobId from a raw u64
    pub fn from_raw(id: u64) -> Self {
        // Keep freshly generated IDs from colliding with this one
        reserve_id(&NEXT_MOB_ID, id);
        MobId(id)
    }
}

fn reserve_id(counter: &AtomicU64, id: u64) {
    counter.fetch_max(id.saturating_add(1), Ordering::Relaxed);
}

impl Default for MobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mob({})", self.0)
    }
}

/// Movement mode, fixed at spawn from capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    /// No movement at all
    Stand,
    /// Walks along footholds
    Move,
    /// Walks and periodically jumps under gravity
    Jump,
    /// Ignores footholds, bounces horizontally and bobs vertically
    Fly,
}

/// Horizontal travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_right(self) -> bool {
        self == Self::Right
    }

    /// -1.0 for left, 1.0 for right
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Airborne sub-state of jump-capable mobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JumpState {
    /// On the ground
    #[default]
    None,
    /// Ascending
    Jumping,
    /// Descending
    Falling,
}

/// High-level action reported to the host for animation selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MobAction {
    #[default]
    Stand,
    Move,
    Jump,
    Fly,
    /// Recovering from knockback
    Hit,
}

impl std::fmt::Display for MobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stand => write!(f, "stand"),
            Self::Move => write!(f, "move"),
            Self::Jump => write!(f, "jump"),
            Self::Fly => write!(f, "fly"),
            Self::Hit => write!(f, "hit"),
        }
    }
}

/// What a mob is able to do; the strongest capability picks its [`MoveType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MobCapabilities {
    pub can_fly: bool,
    pub can_jump: bool,
    pub can_move: bool,
}

impl MobCapabilities {
    pub fn walker() -> Self {
        Self {
            can_move: true,
            ..Self::default()
        }
    }

    pub fn jumper() -> Self {
        Self {
            can_move: true,
            can_jump: true,
            ..Self::default()
        }
    }

    pub fn flyer() -> Self {
        Self {
            can_fly: true,
            ..Self::default()
        }
    }

    /// Fly > Jump > Move > Stand
    pub fn move_type(&self) -> MoveType {
        if self.can_fly {
            MoveType::Fly
        } else if self.can_jump {
            MoveType::Jump
        } else if self.can_move {
            MoveType::Move
        } else {
            MoveType::Stand
        }
    }
}

/// Optional playable rectangle; each unset side is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapBounds {
    pub left: Option<i32>,
    pub right: Option<i32>,
    pub top: Option<i32>,
    pub bottom: Option<i32>,
}

impl MapBounds {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            top: Some(top),
            bottom: Some(bottom),
        }
    }

    /// Intersect `[left, right]` with the horizontal bounds inset by `margin`
    pub fn clamp_window(&self, (left, right): (i32, i32), margin: i32) -> (i32, i32) {
        let left = match self.left {
            Some(map_left) => left.max(map_left + margin),
            None => left,
        };
        let right = match self.right {
            Some(map_right) => right.min(map_right - margin),
            None => right,
        };
        (left, right)
    }
}

/// Per-mob spawn parameters supplied by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobSpawn {
    /// Spawn X
    pub x: i32,
    /// Spawn Y (the mob's display position)
    pub y: i32,
    /// Distance from spawn to the left roam edge
    pub roam_left_shift: i32,
    /// Distance from spawn to the right roam edge
    pub roam_right_shift: i32,
    /// Display Y minus ground Y; positive when the mob is drawn above its foothold
    pub y_shift: i32,
    pub capabilities: MobCapabilities,
    /// Initial travel direction; random when `None`
    pub facing: Option<MoveDirection>,
    /// Facing never changes
    pub no_flip: bool,
    /// Walk across the whole connected platform instead of the roam range
    pub use_platform_bounds: bool,
    /// Seed of this mob's private decision generator
    pub seed: u64,
}

impl MobSpawn {
    pub fn new(x: i32, y: i32, capabilities: MobCapabilities) -> Self {
        Self {
            x,
            y,
            roam_left_shift: 0,
            roam_right_shift: 0,
            y_shift: 0,
            capabilities,
            facing: None,
            no_flip: false,
            use_platform_bounds: false,
            seed: 0,
        }
    }

    pub fn with_roam(mut self, left_shift: i32, right_shift: i32) -> Self {
        self.roam_left_shift = left_shift;
        self.roam_right_shift = right_shift;
        self
    }

    pub fn with_facing(mut self, direction: MoveDirection) -> Self {
        self.facing = Some(direction);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_y_shift(mut self, y_shift: i32) -> Self {
        self.y_shift = y_shift;
        self
    }

    pub fn with_platform_bounds(mut self) -> Self {
        self.use_platform_bounds = true;
        self
    }

    pub fn with_no_flip(mut self) -> Self {
        self.no_flip = true;
        self
    }
}

/// Everything the host reads after a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobSnapshot {
    pub position: Vec2,
    pub facing_right: bool,
    pub action: MobAction,
    pub jump_state: JumpState,
    pub foothold: Option<FootholdId>,
}
