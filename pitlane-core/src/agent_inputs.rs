use serde::{Deserialize, Serialize};

// An Action gets sent from the policy to the simulator once per decision step;
// both channels are expected in [-1, 1].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub throttle: f32,
    pub steer: f32,
}

impl Action {
    pub const IDLE: Action = Action {
        throttle: 0.0,
        steer: 0.0,
    };

    pub fn new(throttle: f32, steer: f32) -> Self {
        Self { throttle, steer }
    }

    // out-of-range or NaN outputs from a policy are pulled back into [-1, 1]
    pub fn clamped(&self) -> Action {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Action {
            throttle: clamp(self.throttle),
            steer: clamp(self.steer),
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::IDLE
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleMode {
    // throttle passes through untouched; negative values brake and reverse
    Signed,
    // throttle is remapped from [-1, 1] to [0, 1], so the car can never brake
    Unsigned,
}

impl ThrottleMode {
    pub fn remap(&self, throttle: f32) -> f32 {
        match self {
            ThrottleMode::Signed => throttle,
            ThrottleMode::Unsigned => (throttle + 1.0) / 2.0,
        }
    }
}
