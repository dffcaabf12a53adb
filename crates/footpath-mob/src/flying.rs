//! Flying mobs ignore footholds entirely
//!
//! Horizontal: constant speed between the roam edges. Vertical: a cosine bob
//! around the spawn height, independent of horizontal motion.

use footpath_geometry::cos256;

use crate::movement::MobMovement;
use crate::types::MobAction;

impl MobMovement {
    pub(crate) fn update_flying(&mut self, sf: f32) {
        self.action = MobAction::Fly;

        let physics = &self.config.physics;
        let amount =
            physics.fly_speed * physics.fly_speed_factor * self.steering.speed_multiplier * sf;
        let (phase_step, amplitude) = (physics.bob_phase_step, physics.bob_amplitude);

        let heading = self.direction;
        self.set_direction(heading);
        self.position.x += heading.sign() * amount;
        let bounds = self.fly_bounds();
        self.clamp_reversing(bounds);

        self.bob_phase = (self.bob_phase + phase_step * sf).rem_euclid(256.0);
        self.position.y = self.spawn.y - cos256(self.bob_phase) * amplitude;
    }

    pub(crate) fn fly_bounds(&self) -> (i32, i32) {
        self.bounded(self.roam, self.config.margins.fly)
    }
}
