use std::f64::consts::PI;
use std::sync::Arc;

use glam::DVec2;
use pitlane_core::agent_inputs::{Action, ThrottleMode};
use pitlane_core::error::ConfigurationError;
use pitlane_core::observation::Observation;
use pitlane_core::progress::{
    CheckpointIndex, EpisodeNumber, EpisodeStatus, EpisodeSummary, TerminationReason,
};
use pitlane_core::settings::{RewardWeights, Settings, SpawnBounds};
use pitlane_core::vehicle::VehicleClassProfile;
use pitlane_core::AgentID;
use rand::Rng;
use tracing::debug;

use crate::checkpoints::{CheckpointHit, CheckpointTrack};
use crate::physics::bounding_box::BoundingBox;
use crate::physics::collisions::TickEvents;
use crate::physics::constants::{ALIVE_REWARD_INTERVAL, IDLE_DISTANCE_THRESHOLD, IDLE_TIME_LIMIT};
use crate::physics::sensors::SensorReadings;
use crate::physics::trigger_entity::TriggerEntity;
use crate::physics::vehicle_entity::{DriveControls, VehicleState};

pub mod reward;

// Everything an episode needs to know about its car and its reward scheme,
// fixed for the lifetime of the agent
#[derive(Clone, Debug)]
pub struct EpisodeConfig {
    pub profile: VehicleClassProfile,
    pub drift_enabled: bool,
    pub vehicle_size: DVec2,
    pub rewards: RewardWeights,
    pub checkpoint_time_limit: f64,
    pub throttle_mode: ThrottleMode,
    pub spawn: SpawnBounds,
    // radians
    pub spawn_heading: f64,
    pub safe_distance_from_wall: f64,
    // 0 disables truncation
    pub max_episode_seconds: f64,
}

impl EpisodeConfig {
    pub fn from_settings(settings: &Settings) -> EpisodeConfig {
        EpisodeConfig {
            profile: settings.vehicle.class.profile(),
            drift_enabled: settings.vehicle.drift_enabled,
            vehicle_size: DVec2::new(settings.vehicle.width, settings.vehicle.length),
            rewards: settings.rewards,
            checkpoint_time_limit: settings.episode.checkpoint_time_limit,
            throttle_mode: settings.episode.throttle_mode,
            spawn: settings.episode.spawn,
            spawn_heading: settings.episode.spawn_heading_degrees.to_radians(),
            safe_distance_from_wall: settings.sensors.safe_distance_from_wall,
            max_episode_seconds: settings.simulation.max_episode_seconds,
        }
    }
}

// Sensor readings for a decision tick, and how long the decision will be held
pub struct Decision<'a> {
    pub readings: &'a SensorReadings,
    pub dt: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    // only on decision ticks
    pub observation: Option<Observation>,
    pub reward: f64,
    pub status: EpisodeStatus,
}

pub struct AgentEpisode {
    track: Arc<CheckpointTrack>,
    config: EpisodeConfig,

    vehicle: VehicleState,
    controls: DriveControls,

    next_checkpoint_index: CheckpointIndex,
    cumulative_reward: f64,
    pending_reward: f64,
    idle_timer: f64,
    alive_timer: f64,
    time_since_checkpoint: f64,
    episode_time: f64,
    checkpoints_passed: u32,
    last_position: DVec2,
    status: EpisodeStatus,
}

impl AgentEpisode {
    pub fn new<R: Rng>(
        track: Arc<CheckpointTrack>,
        config: EpisodeConfig,
        rng: &mut R,
    ) -> AgentEpisode {
        let vehicle = VehicleState::at_rest(DVec2::ZERO, config.spawn_heading);
        let mut episode = AgentEpisode {
            track,
            config,
            vehicle,
            controls: DriveControls::default(),
            next_checkpoint_index: 0,
            cumulative_reward: 0.0,
            pending_reward: 0.0,
            idle_timer: 0.0,
            alive_timer: 0.0,
            time_since_checkpoint: 0.0,
            episode_time: 0.0,
            checkpoints_passed: 0,
            last_position: DVec2::ZERO,
            status: EpisodeStatus::Running,
        };
        episode.reset(rng);
        episode
    }

    // Start a fresh episode. The cumulative reward is left alone: whoever keeps
    // the episode books clears it when it reads the final total.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        let (x_min, x_max) = self.config.spawn.x_range();
        let (y_min, y_max) = self.config.spawn.y_range();
        let position = DVec2::new(rng.gen_range(x_min..=x_max), rng.gen_range(y_min..=y_max));

        self.vehicle = VehicleState::at_rest(position, self.config.spawn_heading);
        self.controls = DriveControls::default();
        self.next_checkpoint_index = 0;
        self.pending_reward = 0.0;
        self.idle_timer = 0.0;
        self.alive_timer = 0.0;
        self.time_since_checkpoint = 0.0;
        self.episode_time = 0.0;
        self.checkpoints_passed = 0;
        self.last_position = position;
        self.status = EpisodeStatus::Running;
    }

    /* Sensing phase: build this tick's observation from the vehicle and the
     * sensor readings, and shape the reward from what was sensed (alignment
     * with the next checkpoint, closeness to walls). */
    pub fn observe(&mut self, readings: &SensorReadings) -> Result<Observation, ConfigurationError> {
        let target = self.track.get(self.next_checkpoint_index)?.pos();
        let offset = target - self.vehicle.position;
        let forward = self.vehicle.unit_forward();
        let weights = self.config.rewards;

        let (direction, signed_angle) = match reward::unit_direction(offset) {
            Some(direction) => {
                self.add_reward(reward::alignment_reward(
                    forward,
                    direction,
                    weights.alignment_reward_weight,
                ));
                (
                    direction,
                    reward::signed_angle_between(forward, direction) / PI,
                )
            }
            // sitting right on the checkpoint center; no alignment term this tick
            None => (DVec2::ZERO, 0.0),
        };

        self.add_reward(reward::proximity_penalty(
            readings,
            self.config.safe_distance_from_wall,
            weights.proximity_penalty_weight,
        ));

        Ok(Observation::assemble(
            direction,
            offset.length(),
            &readings.normalized,
            self.vehicle.linear_velocity,
            signed_angle,
        ))
    }

    // Returns the reward earned by this hit
    pub fn on_checkpoint_triggered(
        &mut self,
        triggered: CheckpointIndex,
    ) -> Result<f64, ConfigurationError> {
        self.track.get(triggered)?;
        let expected = self.next_checkpoint_index;
        self.track.get(expected)?;

        let delta = match self.track.classify(triggered, expected) {
            CheckpointHit::OnTarget => {
                self.next_checkpoint_index = self.track.next_index_after(expected);
                self.time_since_checkpoint = 0.0;
                self.checkpoints_passed += 1;
                debug!(
                    "checkpoint {} reached, heading for {}",
                    triggered, self.next_checkpoint_index
                );
                self.config.rewards.checkpoint_achieve_weight
            }
            CheckpointHit::OutOfOrder { distance } => {
                debug!(
                    "checkpoint {} hit out of order (expected {}, {} off)",
                    triggered, expected, distance
                );
                reward::out_of_order_penalty(distance, self.config.rewards.out_of_order_multiplier)
            }
        };

        self.add_reward(delta);
        Ok(delta)
    }

    // Hitting a wall ends the episode on this tick
    pub fn on_wall_collision(&mut self) -> f64 {
        let delta = self.config.rewards.wall_collision_weight;
        self.add_reward(delta);
        self.status = EpisodeStatus::Terminated(TerminationReason::WallCollision);
        delta
    }

    /* Decision phase: advance the survival, checkpoint and idle timers by one
     * decision interval, then latch the new action for the motion model. */
    pub fn on_action_received(&mut self, action: Action, dt: f64) {
        let weights = self.config.rewards;
        let action = action.clamped();

        self.episode_time += dt;

        // accumulate rather than count ticks, so the payout is once per
        // simulated second whatever the tick size
        self.alive_timer += dt;
        while self.alive_timer >= ALIVE_REWARD_INTERVAL {
            self.add_reward(weights.timer_alive_weight);
            self.alive_timer -= ALIVE_REWARD_INTERVAL;
        }

        self.time_since_checkpoint += dt;
        if self.time_since_checkpoint > self.config.checkpoint_time_limit {
            self.add_reward(weights.checkpoint_penalty_weight);
            self.time_since_checkpoint = 0.0;
        }

        let distance_moved = (self.vehicle.position - self.last_position).length();
        if distance_moved < IDLE_DISTANCE_THRESHOLD {
            self.idle_timer += dt;
            if self.idle_timer > IDLE_TIME_LIMIT {
                self.add_reward(weights.idle_penalty_timer_weight);
                self.idle_timer = 0.0;
            }
        } else {
            self.idle_timer = 0.0;
        }
        self.last_position = self.vehicle.position;

        self.controls = DriveControls {
            throttle: self.config.throttle_mode.remap(action.throttle) as f64,
            steer: action.steer as f64,
        };

        if self.config.max_episode_seconds > 0.0
            && self.episode_time >= self.config.max_episode_seconds
            && !self.status.is_terminated()
        {
            self.status = EpisodeStatus::Terminated(TerminationReason::Truncated);
        }
    }

    // Physics phase: move the car with whatever controls were latched last
    pub fn integrate(&mut self, dt: f64) {
        if self.status.is_terminated() {
            return;
        }
        self.vehicle = self.vehicle.do_physics_step(
            self.controls,
            dt,
            &self.config.profile,
            self.config.drift_enabled,
        );
    }

    /* All phases of one physics tick, in their fixed order:
     *   1. on decision ticks, sense and shape the reward, ask `act` for an
     *      action, and advance the timers by the decision interval
     *   2. move the car
     *   3. unless the episode already ended, let `detect` report what the new
     *      footprint touched, and apply checkpoint hits before the wall hit
     * The reward returned is everything earned during this tick. */
    pub fn step<E, A, D>(
        &mut self,
        physics_dt: f64,
        decision: Option<Decision>,
        act: A,
        detect: D,
    ) -> Result<StepOutcome, E>
    where
        E: From<ConfigurationError>,
        A: FnOnce(&AgentEpisode, &Observation) -> Result<Action, E>,
        D: FnOnce(&BoundingBox) -> TickEvents,
    {
        self.take_pending_reward();

        let observation = match decision {
            Some(decision) => {
                let observation = self.observe(decision.readings)?;
                let action = act(self, &observation)?;
                self.on_action_received(action, decision.dt);
                Some(observation)
            }
            None => None,
        };

        self.integrate(physics_dt);

        if !self.status.is_terminated() {
            let events = detect(&self.footprint());
            for triggered in &events.triggered_checkpoints {
                self.on_checkpoint_triggered(*triggered)?;
            }
            if events.wall_collision {
                self.on_wall_collision();
            }
        }

        Ok(StepOutcome {
            observation,
            reward: self.take_pending_reward(),
            status: self.status,
        })
    }

    fn add_reward(&mut self, delta: f64) {
        self.cumulative_reward += delta;
        self.pending_reward += delta;
    }

    // reward earned since the last call
    pub fn take_pending_reward(&mut self) -> f64 {
        std::mem::take(&mut self.pending_reward)
    }

    // hands the episode total to the caller and starts the next total from zero
    pub fn clear_cumulative_reward(&mut self) -> f64 {
        std::mem::take(&mut self.cumulative_reward)
    }

    pub fn summary(&self, agent: AgentID, episode: EpisodeNumber) -> Option<EpisodeSummary> {
        match self.status {
            EpisodeStatus::Running => None,
            EpisodeStatus::Terminated(reason) => Some(EpisodeSummary {
                agent,
                episode,
                reason,
                cumulative_reward: self.cumulative_reward,
                checkpoints_passed: self.checkpoints_passed,
                elapsed_seconds: self.episode_time,
            }),
        }
    }

    pub fn footprint(&self) -> BoundingBox {
        self.vehicle.bounding_box(self.config.vehicle_size)
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn controls(&self) -> DriveControls {
        self.controls
    }

    pub fn track(&self) -> &CheckpointTrack {
        &self.track
    }

    pub fn next_checkpoint_index(&self) -> CheckpointIndex {
        self.next_checkpoint_index
    }

    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    pub fn checkpoints_passed(&self) -> u32 {
        self.checkpoints_passed
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_terminated(&self) -> bool {
        self.status.is_terminated()
    }
}
