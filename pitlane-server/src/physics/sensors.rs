use glam::DVec2;
use pitlane_core::error::ConfigurationError;
use pitlane_core::settings::SensorSettings;

use crate::physics::bounding_box::BoundingBox;
use crate::physics::constants::{DIRECTION_EPSILON, SHALLOW_RAY_BLEND, WIDE_RAY_BLEND};
use crate::physics::vehicle_entity::VehicleState;

// Something the rays can hit. `layers` is a bitmask matched against the
// sensor's obstacle mask.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub bounds: BoundingBox,
    pub layers: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RayFan {
    // cardinal and diagonal directions
    Eight,
    // the eight above plus shallow and wide blends around forward and backward
    Sixteen,
}

impl RayFan {
    pub fn from_count(ray_count: usize) -> Result<RayFan, ConfigurationError> {
        match ray_count {
            8 => Ok(RayFan::Eight),
            16 => Ok(RayFan::Sixteen),
            other => Err(ConfigurationError::UnsupportedRayCount(other)),
        }
    }

    pub fn ray_count(&self) -> usize {
        match self {
            RayFan::Eight => 8,
            RayFan::Sixteen => 16,
        }
    }

    // The order here is the order of the rays in the observation vector and
    // must never change
    pub fn directions(&self, forward: DVec2, right: DVec2) -> Vec<DVec2> {
        let mut directions = vec![
            forward,
            -forward,
            right,
            -right,
            (forward + right).normalize(),
            (forward - right).normalize(),
            (-forward + right).normalize(),
            (-forward - right).normalize(),
        ];

        if *self == RayFan::Sixteen {
            for (f, r) in [SHALLOW_RAY_BLEND, WIDE_RAY_BLEND] {
                directions.push((forward * f + right * r).normalize());
                directions.push((forward * f - right * r).normalize());
                directions.push((-forward * f + right * r).normalize());
                directions.push((-forward * f - right * r).normalize());
            }
        }

        directions
    }
}

// One scan's worth of readings, each in [0, 1]; 1.0 means nothing within range
#[derive(Clone, Debug, PartialEq)]
pub struct SensorReadings {
    pub normalized: Vec<f32>,
    pub ray_distance: f64,
}

impl SensorReadings {
    pub fn clear(ray_count: usize, ray_distance: f64) -> SensorReadings {
        SensorReadings {
            normalized: vec![1.0; ray_count],
            ray_distance,
        }
    }

    // real distances of the rays that actually hit something
    pub fn hit_distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.normalized
            .iter()
            .filter(|reading| **reading < 1.0)
            .map(move |reading| *reading as f64 * self.ray_distance)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProximitySensor {
    pub fan: RayFan,
    pub ray_distance: f64,
    pub obstacle_mask: u32,
}

impl ProximitySensor {
    pub fn new(settings: &SensorSettings) -> Result<ProximitySensor, ConfigurationError> {
        if !(settings.ray_distance.is_finite() && settings.ray_distance > 0.0) {
            return Err(ConfigurationError::NonPositive {
                field: "sensors.ray_distance",
                value: settings.ray_distance,
            });
        }

        Ok(ProximitySensor {
            fan: RayFan::from_count(settings.ray_count)?,
            ray_distance: settings.ray_distance,
            obstacle_mask: settings.obstacle_mask,
        })
    }

    pub fn scan_vehicle(&self, vehicle: &VehicleState, obstacles: &[Obstacle]) -> SensorReadings {
        self.scan(
            vehicle.position,
            vehicle.unit_forward(),
            vehicle.unit_right(),
            obstacles,
        )
    }

    pub fn scan(
        &self,
        origin: DVec2,
        forward: DVec2,
        right: DVec2,
        obstacles: &[Obstacle],
    ) -> SensorReadings {
        let normalized = self
            .fan
            .directions(forward, right)
            .into_iter()
            .map(|direction| {
                let nearest = obstacles
                    .iter()
                    .filter(|obstacle| obstacle.layers & self.obstacle_mask != 0)
                    .filter_map(|obstacle| {
                        ray_aabb_slab(origin, direction, self.ray_distance, &obstacle.bounds)
                    })
                    .fold(None, |closest: Option<f64>, hit| {
                        Some(closest.map_or(hit, |c| c.min(hit)))
                    });

                match nearest {
                    Some(distance) => (distance / self.ray_distance) as f32,
                    None => 1.0,
                }
            })
            .collect();

        SensorReadings {
            normalized,
            ray_distance: self.ray_distance,
        }
    }
}

// Distance along `dir` (unit length) to the first point of `aabb`, if it is
// within max_distance. A ray starting inside the box hits at distance 0.
fn ray_aabb_slab(origin: DVec2, dir: DVec2, max_distance: f64, aabb: &BoundingBox) -> Option<f64> {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;

    for (o, d, min, max) in [
        (origin.x, dir.x, aabb.min_x, aabb.max_x),
        (origin.y, dir.y, aabb.min_y, aabb.max_y),
    ] {
        if d.abs() < DIRECTION_EPSILON {
            // parallel to this slab: either always inside it or never
            if o < min || o > max {
                return None;
            }
            continue;
        }

        let t1 = (min - o) / d;
        let t2 = (max - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    if t_enter > t_exit || t_exit < 0.0 {
        return None;
    }

    let distance = t_enter.max(0.0);
    if distance <= max_distance {
        Some(distance)
    } else {
        None
    }
}
