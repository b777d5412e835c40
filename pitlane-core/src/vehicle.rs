use serde::{Deserialize, Serialize};

// Each vehicle runs exactly one class; the class picks the whole profile at
// once, so there is no way to mix fields from two classes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Standard,
    RallyCar,
    Truck,
    Tank,
}

/// Physical constants for one vehicle class.
///
/// `turn_speed` is in degrees per second; `drift_factor` is the fraction of
/// lateral velocity kept every physics tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleClassProfile {
    pub max_speed: f64,
    pub acceleration: f64,
    pub braking_force: f64,
    pub turn_speed: f64,
    pub drift_factor: f64,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Standard,
        VehicleClass::RallyCar,
        VehicleClass::Truck,
        VehicleClass::Tank,
    ];

    pub fn profile(&self) -> VehicleClassProfile {
        match self {
            VehicleClass::Standard => VehicleClassProfile {
                max_speed: 10.0,
                acceleration: 5.0,
                braking_force: 10.0,
                turn_speed: 200.0,
                drift_factor: 0.9,
            },
            // light and loose: fast, but slides the most
            VehicleClass::RallyCar => VehicleClassProfile {
                max_speed: 15.0,
                acceleration: 8.0,
                braking_force: 5.0,
                turn_speed: 200.0,
                drift_factor: 0.85,
            },
            VehicleClass::Truck => VehicleClassProfile {
                max_speed: 8.0,
                acceleration: 4.0,
                braking_force: 10.0,
                turn_speed: 200.0,
                drift_factor: 0.95,
            },
            VehicleClass::Tank => VehicleClassProfile {
                max_speed: 6.0,
                acceleration: 3.0,
                braking_force: 15.0,
                turn_speed: 100.0,
                drift_factor: 0.98,
            },
        }
    }
}

impl Default for VehicleClass {
    fn default() -> Self {
        VehicleClass::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_factors_are_fractions() {
        for class in VehicleClass::ALL {
            let drift = class.profile().drift_factor;
            assert!((0.0..=1.0).contains(&drift), "{:?} drifts {}", class, drift);
        }
    }

    #[test]
    fn tank_turns_slower_than_everything_else() {
        let tank = VehicleClass::Tank.profile();
        for class in [
            VehicleClass::Standard,
            VehicleClass::RallyCar,
            VehicleClass::Truck,
        ] {
            assert!(tank.turn_speed < class.profile().turn_speed);
        }
    }
}
