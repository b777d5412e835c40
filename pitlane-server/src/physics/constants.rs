// Below this many world units of travel between decisions, a car counts as idle
pub const IDLE_DISTANCE_THRESHOLD: f64 = 0.01;
pub const IDLE_TIME_LIMIT: f64 = 1.0;

pub const ALIVE_REWARD_INTERVAL: f64 = 1.0;

// forward/right weights of the extra ray directions used by the 16-ray fan
pub const SHALLOW_RAY_BLEND: (f64, f64) = (0.85, 0.15);
pub const WIDE_RAY_BLEND: (f64, f64) = (0.6, 0.4);

// directions shorter than this are treated as "no direction"
pub const DIRECTION_EPSILON: f64 = 1e-9;
