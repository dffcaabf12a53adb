//! Tunable movement constants
//!
//! Values are tuned for a 60 tick/s reference rate. Speeds are pixels per
//! reference tick and are scaled by `dt / reference_frame_ms` at runtime.

use serde::{Deserialize, Serialize};

/// All movement constants, grouped by concern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MovementConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub tolerances: ToleranceConfig,

    #[serde(default)]
    pub margins: MarginConfig,

    #[serde(default)]
    pub recovery: RecoveryConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub chances: ChanceConfig,
}

impl MovementConfig {
    /// Elapsed milliseconds as a multiple of the reference tick
    pub fn speed_factor(&self, dt_ms: f32) -> f32 {
        dt_ms / self.physics.reference_frame_ms
    }
}

/// Speeds, gravity and bobbing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Ground speed in px/tick
    pub move_speed: f32,
    /// Base flying speed in px/tick
    pub fly_speed: f32,
    /// Multiplier applied to `fly_speed` for horizontal flight
    pub fly_speed_factor: f32,
    /// Fraction of ground speed kept while airborne
    pub air_control: f32,
    /// Downward acceleration in px/tick^2
    pub gravity: f32,
    /// Initial upward speed of a jump in px/tick
    pub jump_velocity: f32,
    /// Terminal fall speed in px/tick
    pub max_fall_speed: f32,
    /// Per-tick horizontal damping while knocked back
    pub air_drag: f32,
    /// Duration of one reference tick in milliseconds
    pub reference_frame_ms: f32,
    /// Vertical bob amplitude of flyers in px
    pub bob_amplitude: f32,
    /// Bob phase advance per tick, in 256-unit angle steps
    pub bob_phase_step: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            fly_speed: 2.0,
            fly_speed_factor: 1.5,
            air_control: 0.8,
            gravity: 0.556,
            jump_velocity: 9.25,
            max_fall_speed: 11.17,
            air_drag: 0.98,
            reference_frame_ms: 16.67,
            bob_amplitude: 16.0,
            bob_phase_step: 7.0,
        }
    }
}

/// Search slack used by ground queries
///
/// These are empirical and kept as-is for compatibility with recorded traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Max |dY| when continuing through an edge anchor
    pub transition_y: f32,
    /// How far above the mob a re-acquired ground segment may be
    pub search_y: f32,
    /// X slack of the second re-acquisition pass
    pub edge_slack_x: f32,
    /// Rise allowed by the second re-acquisition pass
    pub edge_slack_y: f32,
    /// Placement probes from this far above the expected ground line
    pub placement_probe: f32,
    /// Max |dY| for placement onto a segment spanning the spawn X
    pub placement_y: f32,
    /// Max |dY| for placement onto a segment only overlapping the roam range
    pub roam_placement_y: f32,
    /// Max mid-Y difference for segments counted as the same platform
    pub platform_y: f32,
    /// Landing snaps when within this distance above the ground
    pub landing: f32,
    /// Extra height added to the landing look-ahead probe
    pub landing_lookahead: f32,
    /// Wall probe offset ahead of and above the mob
    pub wall_probe: f32,
    /// Distance kept from a segment edge after refusing a ledge
    pub edge_step_back: f32,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            transition_y: 50.0,
            search_y: 50.0,
            edge_slack_x: 5.0,
            edge_slack_y: 80.0,
            placement_probe: 5.0,
            placement_y: 100.0,
            roam_placement_y: 150.0,
            platform_y: 100.0,
            landing: 3.0,
            landing_lookahead: 2.0,
            wall_probe: 4.0,
            edge_step_back: 2.0,
        }
    }
}

/// Horizontal insets and roam-range sanity limits, in px
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    /// Map-bound inset for walkers and jumpers
    pub walk: i32,
    /// Map-bound inset for flyers
    pub fly: i32,
    /// No jumping this close to the jump bounds in the travel direction
    pub jump_guard: i32,
    /// Map-bound inset used by the jump guard
    pub jump_bounds: i32,
    /// Jumpers react to a segment edge this close ahead
    pub edge_detect: i32,
    /// Edge reactions only happen on segments wider than this
    pub edge_detect_min_width: i32,
    /// Narrower roam ranges are replaced by the default window
    pub min_roam_width: i32,
    /// Half width of the default window around spawn
    pub default_roam_half_width: i32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            walk: 30,
            fly: 50,
            jump_guard: 30,
            jump_bounds: 50,
            edge_detect: 15,
            edge_detect_min_width: 60,
            min_roam_width: 50,
            default_roam_half_width: 100,
        }
    }
}

/// Respawn thresholds, in px
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Respawn once this far below the map bottom
    pub fall_past_bottom: f32,
    /// Respawn at a roam edge with no ground once this far below spawn
    pub fall_below_spawn: f32,
    /// Distance from a roam edge that counts as being at it
    pub edge_reset_slack: f32,
    /// Respawn this far below spawn when the map has no bottom
    pub unbounded_fall_limit: f32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            fall_past_bottom: 100.0,
            fall_below_spawn: 50.0,
            edge_reset_slack: 5.0,
            unbounded_fall_limit: 2000.0,
        }
    }
}

/// Half-open millisecond window `[min, max)` for random timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsRange {
    pub min: u32,
    pub max: u32,
}

impl MsRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Timer windows in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// First decision of a walker after spawning
    pub initial_decision: MsRange,
    /// Walker keeps moving this long before the next decision
    pub walk_decision: MsRange,
    /// Walker pause length
    pub pause: MsRange,
    /// Jumper decision interval
    pub jump_decision: MsRange,
    /// Jump cooldown right after spawning
    pub initial_jump_cooldown: MsRange,
    /// Jump cooldown after a jump
    pub jump_cooldown: MsRange,
    /// Jump cooldown after a jump was refused near the bounds
    pub refused_jump_cooldown: MsRange,
    /// Jumper cannot reverse again for this long
    pub reversal_cooldown: f32,
    /// Normal AI is suspended this long after a knockback
    pub knockback_recovery: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_decision: MsRange::new(2000, 5000),
            walk_decision: MsRange::new(1500, 4000),
            pause: MsRange::new(1000, 2500),
            jump_decision: MsRange::new(800, 2000),
            initial_jump_cooldown: MsRange::new(1000, 3000),
            jump_cooldown: MsRange::new(1500, 3500),
            refused_jump_cooldown: MsRange::new(500, 1500),
            reversal_cooldown: 500.0,
            knockback_recovery: 500.0,
        }
    }
}

/// Decision probabilities in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChanceConfig {
    pub walker_reverse: u32,
    pub walker_pause: u32,
    pub jumper_jump: u32,
    pub jumper_reverse: u32,
    /// Jump instead of turning at a segment edge
    pub edge_jump: u32,
    /// Jump instead of turning at a wall
    pub wall_jump: u32,
    /// Jump instead of turning at a ledge
    pub ledge_jump: u32,
}

impl Default for ChanceConfig {
    fn default() -> Self {
        Self {
            walker_reverse: 20,
            walker_pause: 20,
            jumper_jump: 30,
            jumper_reverse: 20,
            edge_jump: 60,
            wall_jump: 40,
            ledge_jump: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert_eq!(config.physics.move_speed, 2.0);
        assert_eq!(config.physics.gravity, 0.556);
        assert_eq!(config.tolerances.edge_slack_x, 5.0);
        assert_eq!(config.margins.walk, 30);
        assert_eq!(config.timing.pause, MsRange::new(1000, 2500));
        assert_eq!(config.chances.ledge_jump, 50);
    }

    #[test]
    fn test_speed_factor_is_one_at_reference_rate() {
        let config = MovementConfig::default();
        assert_eq!(config.speed_factor(16.67), 1.0);
        assert!((config.speed_factor(33.34) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_group_keeps_defaults() {
        let physics: PhysicsConfig = serde_json::from_str(r#"{ "gravity": 1.0 }"#).unwrap();
        assert_eq!(physics.gravity, 1.0);
        assert_eq!(physics.jump_velocity, 9.25);
    }
}
