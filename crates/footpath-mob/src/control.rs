//! Host-side steering: stop/resume, speed scaling and forced turns
//!
//! Forced turns against the current travel direction wait until the host has
//! shown a few distinct animation frames, so a turn never pops mid-stride.

use glam::Vec2;

use crate::movement::MobMovement;
use crate::types::{MobAction, MoveDirection};

/// Lowest accepted speed multiplier
pub const MIN_SPEED_MULTIPLIER: f32 = 0.1;

impl MobMovement {
    /// Freeze the AI; an airborne mob still finishes its fall
    pub fn stop(&mut self) {
        self.steering.stopped = true;
        self.velocity.x = 0.0;
        if !self.is_airborne() {
            self.velocity = Vec2::ZERO;
            self.action = MobAction::Stand;
        }
    }

    pub fn resume(&mut self) {
        if !self.steering.stopped {
            return;
        }
        self.steering.stopped = false;
        if !self.is_airborne() {
            self.action = self.resting_action();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.steering.stopped
    }

    /// Scale walking and flying speed; values below 0.1 are raised to it
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.steering.speed_multiplier = if multiplier.is_finite() {
            multiplier.max(MIN_SPEED_MULTIPLIER)
        } else {
            1.0
        };
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.steering.speed_multiplier
    }

    /// Ground speed per reference frame after the multiplier
    pub fn effective_move_speed(&self) -> f32 {
        self.config.physics.move_speed * self.steering.speed_multiplier
    }

    /// Make the mob travel toward `direction`
    ///
    /// Standing mobs start moving right away. A moving mob asked to reverse
    /// keeps going until [`Self::note_animation_frame`] has seen enough
    /// distinct frames.
    pub fn force_direction(&mut self, direction: MoveDirection) {
        if self.action == MobAction::Stand {
            self.steering.pending_direction = None;
            self.set_direction(direction);
            if !self.steering.stopped {
                self.action = self.resting_action();
            }
            return;
        }

        if direction == self.direction {
            self.steering.pending_direction = None;
            return;
        }

        if self.steering.pending_direction != Some(direction) {
            self.steering.pending_direction = Some(direction);
            self.steering.frames_since_turn = 0;
            self.steering.last_frame = None;
        }
    }

    pub fn pending_direction(&self) -> Option<MoveDirection> {
        self.steering.pending_direction
    }

    /// Report the animation frame the host is currently showing
    pub fn note_animation_frame(&mut self, index: usize, frame_count: usize) {
        let Some(direction) = self.steering.pending_direction else {
            return;
        };

        if self.steering.last_frame != Some(index) {
            self.steering.last_frame = Some(index);
            self.steering.frames_since_turn += 1;
        }

        let needed = frame_count.saturating_sub(1).max(2).min(4) as u32;
        if self.steering.frames_since_turn >= needed {
            self.steering.pending_direction = None;
            self.steering.frames_since_turn = 0;
            self.steering.last_frame = None;
            self.set_direction(direction);
            log::debug!("Forced turn to {:?} at x={:.1}", direction, self.position.x);
        }
    }
}
