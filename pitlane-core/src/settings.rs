use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::agent_inputs::ThrottleMode;
use crate::error::ConfigurationError;
use crate::vehicle::VehicleClass;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub vehicle: VehicleSettings,
    pub sensors: SensorSettings,
    pub rewards: RewardWeights,
    pub episode: EpisodeSettings,
    pub policy: PolicySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SimulationSettings {
    // fixed physics timestep, in seconds
    pub physics_dt: f64,
    // physics ticks between two policy decisions
    pub decision_interval: u32,
    // 0 runs forever
    pub max_ticks: u64,
    pub agent_count: usize,
    pub rng_seed: u64,
    pub inspect_agent_index: usize,
    pub telemetry_interval_ticks: u64,
    // 0 disables truncation
    pub max_episode_seconds: f64,
    pub track_file: String,
    // 0 runs ticks back to back instead of in real time
    pub tick_pacing_ms: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct VehicleSettings {
    pub class: VehicleClass,
    pub drift_enabled: bool,
    pub width: f64,
    pub length: f64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SensorSettings {
    pub ray_count: usize,
    pub ray_distance: f64,
    pub safe_distance_from_wall: f64,
    pub obstacle_mask: u32,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RewardWeights {
    pub timer_alive_weight: f64,
    pub idle_penalty_timer_weight: f64,
    pub wall_collision_weight: f64,
    pub checkpoint_achieve_weight: f64,
    pub alignment_reward_weight: f64,
    pub checkpoint_penalty_weight: f64,
    // a positive magnitude; the shaped term itself is always a penalty
    pub proximity_penalty_weight: f64,
    pub out_of_order_multiplier: f64,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SpawnBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl SpawnBounds {
    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct EpisodeSettings {
    pub checkpoint_time_limit: f64,
    pub throttle_mode: ThrottleMode,
    pub spawn_heading_degrees: f64,
    pub spawn: SpawnBounds,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    Heuristic,
    Remote,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PolicySettings {
    pub mode: PolicyMode,
    pub listen_address: String,
}

impl Settings {
    // Reads the given yaml file on top of the built-in defaults. The file is
    // optional; a missing file just means every value is the default.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigurationError> {
        let mut builder = Config::builder()
            .set_default("simulation.physics_dt", 0.02)?
            .set_default("simulation.decision_interval", 1)?
            .set_default("simulation.max_ticks", 0)?
            .set_default("simulation.agent_count", 4)?
            .set_default("simulation.rng_seed", 24247)?
            .set_default("simulation.inspect_agent_index", 0)?
            .set_default("simulation.telemetry_interval_ticks", 500)?
            .set_default("simulation.max_episode_seconds", 0.0)?
            .set_default("simulation.track_file", "tracks/oval.yaml")?
            .set_default("simulation.tick_pacing_ms", 0)?
            .set_default("vehicle.class", "standard")?
            .set_default("vehicle.drift_enabled", true)?
            .set_default("vehicle.width", 1.0)?
            .set_default("vehicle.length", 2.0)?
            .set_default("sensors.ray_count", 16)?
            .set_default("sensors.ray_distance", 5.0)?
            .set_default("sensors.safe_distance_from_wall", 1.0)?
            .set_default("sensors.obstacle_mask", 1)?
            .set_default("rewards.timer_alive_weight", 0.01)?
            .set_default("rewards.idle_penalty_timer_weight", -0.1)?
            .set_default("rewards.wall_collision_weight", -10.0)?
            .set_default("rewards.checkpoint_achieve_weight", 1.0)?
            .set_default("rewards.alignment_reward_weight", 0.001)?
            .set_default("rewards.checkpoint_penalty_weight", -0.5)?
            .set_default("rewards.proximity_penalty_weight", 0.01)?
            .set_default("rewards.out_of_order_multiplier", 2.0)?
            .set_default("episode.checkpoint_time_limit", 15.0)?
            .set_default("episode.throttle_mode", "signed")?
            .set_default("episode.spawn_heading_degrees", 0.0)?
            .set_default("episode.spawn.x_min", -17.0)?
            .set_default("episode.spawn.x_max", -14.0)?
            .set_default("episode.spawn.y_min", -3.0)?
            .set_default("episode.spawn.y_max", -1.0)?
            .set_default("policy.mode", "heuristic")?
            .set_default("policy.listen_address", "127.0.0.1:24247")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    // Rejects malformed configuration up front rather than at first use
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let sim = &self.simulation;
        positive("simulation.physics_dt", sim.physics_dt)?;
        if sim.decision_interval == 0 {
            return Err(ConfigurationError::ZeroDecisionInterval);
        }
        if sim.agent_count == 0 {
            return Err(ConfigurationError::NoAgents);
        }

        positive("vehicle.width", self.vehicle.width)?;
        positive("vehicle.length", self.vehicle.length)?;
        let profile = self.vehicle.class.profile();
        if !(0.0..=1.0).contains(&profile.drift_factor) {
            return Err(ConfigurationError::DriftFactorOutOfRange {
                class: self.vehicle.class,
                value: profile.drift_factor,
            });
        }

        if !matches!(self.sensors.ray_count, 8 | 16) {
            return Err(ConfigurationError::UnsupportedRayCount(
                self.sensors.ray_count,
            ));
        }
        positive("sensors.ray_distance", self.sensors.ray_distance)?;
        non_negative(
            "sensors.safe_distance_from_wall",
            self.sensors.safe_distance_from_wall,
        )?;

        // magnitudes only, the reward terms apply the sign
        non_negative(
            "rewards.out_of_order_multiplier",
            self.rewards.out_of_order_multiplier,
        )?;
        non_negative(
            "rewards.proximity_penalty_weight",
            self.rewards.proximity_penalty_weight,
        )?;

        positive(
            "episode.checkpoint_time_limit",
            self.episode.checkpoint_time_limit,
        )?;
        finite(
            "episode.spawn_heading_degrees",
            self.episode.spawn_heading_degrees,
        )?;
        let spawn = &self.episode.spawn;
        non_degenerate("x", spawn.x_min, spawn.x_max)?;
        non_degenerate("y", spawn.y_min, spawn.y_max)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::Negative { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::NonFinite { field, value })
    }
}

fn non_degenerate(axis: &'static str, min: f64, max: f64) -> Result<(), ConfigurationError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(ConfigurationError::DegenerateSpawnBounds { axis, min, max })
    }
}
