//! Mob movement over foothold graphs for Footpath
//!
//! This crate implements:
//! - Per-mob movement state created from spawn parameters (MobMovement)
//! - Slope-following ground patrol with foothold transitions and wall stops
//! - Jumping under gravity with landing detection and respawn on bad falls
//! - Flying with horizontal bouncing and a vertical bob
//! - Knockback, host steering and a population manager (MobManager)
//!
//! Every mob owns its own seeded generator and only reads the shared
//! [`footpath_geometry::FootholdGraph`], so mobs can be updated in any order.

pub mod config;
pub mod manager;
pub mod movement;
pub mod rng;
pub mod types;

// Mode updaters extending MobMovement
mod control;
mod flying;
mod jumping;
mod knockback;
mod walking;

// Re-export main types for convenience
pub use config::{
    ChanceConfig, MarginConfig, MovementConfig, MsRange, PhysicsConfig, RecoveryConfig,
    TimingConfig, ToleranceConfig,
};
pub use control::MIN_SPEED_MULTIPLIER;
pub use manager::MobManager;
pub use movement::MobMovement;
pub use rng::{DecisionRng, MobRng};
pub use types::{
    JumpState, MapBounds, MobAction, MobCapabilities, MobId, MobSnapshot, MobSpawn,
    MoveDirection, MoveType,
};
