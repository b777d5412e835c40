use glam::DVec2;

use crate::physics::constants::DIRECTION_EPSILON;
use crate::physics::sensors::SensorReadings;

// None when the offset is too short to have a meaningful direction
pub fn unit_direction(offset: DVec2) -> Option<DVec2> {
    let length = offset.length();
    if length.is_finite() && length > DIRECTION_EPSILON {
        Some(offset / length)
    } else {
        None
    }
}

// Signed: facing the checkpoint earns the full weight, facing away costs it
pub fn alignment_reward(forward: DVec2, direction: DVec2, weight: f64) -> f64 {
    forward.dot(direction) * weight
}

// Radians in [-pi, pi], positive when `to` lies counterclockwise of `from`
pub fn signed_angle_between(from: DVec2, to: DVec2) -> f64 {
    let cross = from.x * to.y - from.y * to.x;
    cross.atan2(from.dot(to))
}

// Summed over every ray that hit a wall closer than the safe distance
pub fn proximity_penalty(readings: &SensorReadings, safe_distance: f64, weight: f64) -> f64 {
    readings
        .hit_distances()
        .filter(|distance| *distance < safe_distance)
        .map(|distance| -(safe_distance - distance) * weight)
        .sum()
}

pub fn out_of_order_penalty(distance: usize, multiplier: f64) -> f64 {
    -(distance as f64) * multiplier
}
