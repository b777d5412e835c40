use glam::DVec2;
use pitlane_core::vehicle::VehicleClassProfile;

use crate::physics::bounding_box::BoundingBox;

const FULL_TURN: f64 = std::f64::consts::TAU;
const HALF_TURN: f64 = std::f64::consts::PI;

// into (-pi, pi]; anything that is not a finite angle becomes 0
pub fn wrap_signed_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    if angle > -HALF_TURN && angle <= HALF_TURN {
        return angle;
    }
    let wrapped = (angle + HALF_TURN).rem_euclid(FULL_TURN) - HALF_TURN;
    if wrapped <= -HALF_TURN {
        wrapped + FULL_TURN
    } else {
        wrapped
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub position: DVec2,
    // radians, counterclockwise; 0 faces +y
    pub heading: f64,
    pub linear_velocity: DVec2,
    // radians per second
    pub angular_velocity: f64,
}

// Throttle and steer after remapping, as the motion model consumes them
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriveControls {
    pub throttle: f64,
    pub steer: f64,
}

impl VehicleState {
    pub fn at_rest(position: DVec2, heading: f64) -> VehicleState {
        VehicleState {
            position,
            heading: wrap_signed_angle(heading),
            linear_velocity: DVec2::ZERO,
            angular_velocity: 0.0,
        }
    }

    // the "up" axis of the car
    pub fn unit_forward(&self) -> DVec2 {
        DVec2::new(-self.heading.sin(), self.heading.cos())
    }

    // forward rotated a quarter turn clockwise
    pub fn unit_right(&self) -> DVec2 {
        DVec2::new(self.heading.cos(), self.heading.sin())
    }

    pub fn bounding_box(&self, size: DVec2) -> BoundingBox {
        let mut bounds = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        bounds.set_dimensions(self.position, size, self.unit_forward());
        bounds
    }

    /* Given the held controls, compute and return what next tick's state will
     * be for this vehicle. The order mirrors a rigid body step: engine force,
     * speed limit, steering, lateral grip, then the position update. */
    pub fn do_physics_step(
        &self,
        controls: DriveControls,
        time_step: f64,
        profile: &VehicleClassProfile,
        drift_enabled: bool,
    ) -> VehicleState {
        let force = self.engine_force(controls.throttle, profile);

        let mut new_velocity = self.linear_velocity + force * time_step;
        if new_velocity.length() > profile.max_speed {
            new_velocity = new_velocity.normalize() * profile.max_speed;
        }

        // positive steer turns clockwise
        let angular_velocity = -controls.steer * profile.turn_speed.to_radians();
        let heading = wrap_signed_angle(self.heading + angular_velocity * time_step);

        let mut new_state = VehicleState {
            position: self.position,
            heading,
            linear_velocity: new_velocity,
            angular_velocity,
        };

        if drift_enabled {
            new_state.linear_velocity = new_state.apply_lateral_grip(profile.drift_factor);
        }

        new_state.position = self.position + new_state.linear_velocity * time_step;
        new_state
    }

    // The accelerator pushes along the heading; so does the brake, but with the
    // throttle's negative sign kept, so holding it long enough reverses the car
    fn engine_force(&self, throttle: f64, profile: &VehicleClassProfile) -> DVec2 {
        if throttle > 0.0 {
            self.unit_forward() * throttle * profile.acceleration
        } else if throttle < 0.0 {
            self.unit_forward() * throttle * profile.braking_force
        } else {
            DVec2::ZERO
        }
    }

    // keep the forward part of the velocity, bleed off part of the sideways slide
    fn apply_lateral_grip(&self, drift_factor: f64) -> DVec2 {
        let forward = self.unit_forward();
        let right = self.unit_right();
        let forward_velocity = forward * self.linear_velocity.dot(forward);
        let lateral_velocity = right * self.linear_velocity.dot(right);
        forward_velocity + lateral_velocity * drift_factor
    }
}
