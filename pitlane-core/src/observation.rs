use glam::DVec2;
use serde::{Deserialize, Serialize};

// Layout of every observation vector, in order:
// [direction to checkpoint (2), distance to checkpoint (1), rays (K),
//  velocity (2), signed angle to checkpoint (1)]
const DIRECTION_OFFSET: usize = 0;
const DISTANCE_OFFSET: usize = 2;
const RAYS_OFFSET: usize = 3;
const FIXED_WIDTH: usize = 6;

pub fn observation_len(ray_count: usize) -> usize {
    FIXED_WIDTH + ray_count
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    ray_count: usize,
    values: Vec<f32>,
}

impl Observation {
    pub fn assemble(
        direction_to_checkpoint: DVec2,
        distance_to_checkpoint: f64,
        ray_readings: &[f32],
        velocity: DVec2,
        signed_angle: f64,
    ) -> Observation {
        let ray_count = ray_readings.len();
        let mut values = Vec::with_capacity(observation_len(ray_count));

        values.push(direction_to_checkpoint.x as f32);
        values.push(direction_to_checkpoint.y as f32);
        values.push(distance_to_checkpoint as f32);
        values.extend_from_slice(ray_readings);
        values.push(velocity.x as f32);
        values.push(velocity.y as f32);
        values.push(signed_angle as f32);

        Observation { ray_count, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    pub fn direction_to_checkpoint(&self) -> DVec2 {
        DVec2::new(
            self.values[DIRECTION_OFFSET] as f64,
            self.values[DIRECTION_OFFSET + 1] as f64,
        )
    }

    pub fn distance_to_checkpoint(&self) -> f32 {
        self.values[DISTANCE_OFFSET]
    }

    pub fn rays(&self) -> &[f32] {
        &self.values[RAYS_OFFSET..RAYS_OFFSET + self.ray_count]
    }

    pub fn velocity(&self) -> DVec2 {
        let offset = RAYS_OFFSET + self.ray_count;
        DVec2::new(self.values[offset] as f64, self.values[offset + 1] as f64)
    }

    // in [-1, 1]; positive means the checkpoint lies to the left
    pub fn signed_angle(&self) -> f32 {
        self.values[RAYS_OFFSET + self.ray_count + 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_matches_ray_configuration() {
        let rays = [1.0_f32; 8];
        let observation = Observation::assemble(DVec2::Y, 4.0, &rays, DVec2::ZERO, 0.0);
        assert_eq!(observation.len(), 14);
        assert_eq!(observation_len(16), 22);
    }

    #[test]
    fn accessors_read_back_their_slots() {
        let rays = [0.5_f32, 0.25, 1.0, 1.0, 1.0, 1.0, 1.0, 0.75];
        let observation = Observation::assemble(
            DVec2::new(0.6, 0.8),
            12.0,
            &rays,
            DVec2::new(-1.0, 2.0),
            -0.5,
        );
        assert!(observation
            .direction_to_checkpoint()
            .abs_diff_eq(DVec2::new(0.6, 0.8), 1e-6));
        assert_eq!(observation.distance_to_checkpoint(), 12.0);
        assert_eq!(observation.rays(), &rays);
        assert!(observation.velocity().abs_diff_eq(DVec2::new(-1.0, 2.0), 1e-6));
        assert_eq!(observation.signed_angle(), -0.5);
    }
}
