use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pitlane_core::error::ConfigurationError;
use pitlane_core::observation::observation_len;
use pitlane_core::Settings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::checkpoints::CheckpointTrack;
use crate::episode::Decision;
use crate::fleet::FleetCoordinator;
use crate::map::Map;
use crate::physics::collisions::detect_tick_events;
use crate::physics::sensors::{Obstacle, ProximitySensor};
use crate::policy::{DecisionRequest, Policy, PolicyError};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("policy failed: {0}")]
    Policy(#[from] PolicyError),
}

pub struct Simulation<P: Policy> {
    settings: Settings,
    track: Arc<CheckpointTrack>,
    walls: Vec<Obstacle>,
    sensor: ProximitySensor,
    fleet: FleetCoordinator,
    policy: P,
    rng: StdRng,
    tick: u64,
    episodes_finished: u64,
}

impl<P: Policy> Simulation<P> {
    pub fn new(settings: Settings, map: Map, policy: P) -> Result<Simulation<P>, SimulationError> {
        settings.validate()?;

        let mut rng = StdRng::seed_from_u64(settings.simulation.rng_seed);
        let sensor = ProximitySensor::new(&settings.sensors)?;
        let fleet = FleetCoordinator::new(map.track.clone(), &settings, &mut rng)?;

        info!(
            "simulating {} agents, {} rays each ({} observation values), decisions every {} ticks",
            fleet.len(),
            sensor.fan.ray_count(),
            observation_len(sensor.fan.ray_count()),
            settings.simulation.decision_interval
        );
        info!(
            "agents spawn in x {:?}, y {:?}",
            fleet.x_range(),
            fleet.y_range()
        );

        Ok(Simulation {
            settings,
            track: map.track,
            walls: map.walls,
            sensor,
            fleet,
            policy,
            rng,
            tick: 0,
            episodes_finished: 0,
        })
    }

    // Runs until max_ticks (forever when that is zero), then tells the policy
    // the run is over
    pub fn run(&mut self) -> Result<(), SimulationError> {
        let max_ticks = self.settings.simulation.max_ticks;
        let pacing = Duration::from_millis(self.settings.simulation.tick_pacing_ms);

        while max_ticks == 0 || self.tick < max_ticks {
            let start_time = Instant::now();

            self.step()?;

            // only pace when asked to; training wants the loop flat out
            if let Some(remaining) = pacing.checked_sub(start_time.elapsed()) {
                if !remaining.is_zero() {
                    thread::sleep(remaining);
                }
            }
        }

        info!(
            "finished after {} ticks and {} episodes",
            self.tick, self.episodes_finished
        );
        self.policy.shutdown()?;
        Ok(())
    }

    /* One physics tick for the whole fleet. Every `decision_interval` ticks each
     * agent is sensed and asked for a new action; each agent then runs its
     * episode step against the track, and finished episodes are closed out and
     * respawned. */
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let physics_dt = self.settings.simulation.physics_dt;
        let interval = self.settings.simulation.decision_interval;
        let decision_tick = self.tick % interval as u64 == 0;

        let decision_dt = physics_dt * interval as f64;

        for agent in self.fleet.agents_mut() {
            let readings = decision_tick
                .then(|| self.sensor.scan_vehicle(agent.episode.vehicle(), &self.walls));
            let decision = readings.as_ref().map(|readings| Decision {
                readings,
                dt: decision_dt,
            });

            let id = agent.id;
            let policy = &mut self.policy;
            let track = &self.track;
            let walls = &self.walls;
            let current_triggers = &mut agent.current_triggers;

            agent.episode.step(
                physics_dt,
                decision,
                |episode, observation| -> Result<_, SimulationError> {
                    Ok(policy.act(&DecisionRequest {
                        agent: id,
                        observation,
                        cumulative_reward: episode.cumulative_reward(),
                        next_checkpoint: episode.next_checkpoint_index(),
                        position: episode.vehicle().position,
                    })?)
                },
                |footprint| detect_tick_events(footprint, track.triggers(), walls, current_triggers),
            )?;

            if let Some(summary) = agent.finish_episode(&mut self.rng) {
                info!(
                    "agent {} finished episode {} ({:?}): reward {:.3}, {} checkpoints in {:.1}s",
                    summary.agent,
                    summary.episode,
                    summary.reason,
                    summary.cumulative_reward,
                    summary.checkpoints_passed,
                    summary.elapsed_seconds
                );
                self.policy.episode_ended(&summary)?;
                self.episodes_finished += 1;
            }
        }

        self.tick += 1;

        let telemetry_interval = self.settings.simulation.telemetry_interval_ticks;
        if telemetry_interval > 0 && self.tick % telemetry_interval == 0 {
            self.log_telemetry();
        }

        Ok(())
    }

    fn log_telemetry(&self) {
        let inspected = self.settings.simulation.inspect_agent_index;
        match self.fleet.agent(inspected) {
            Some(agent) => info!(
                "tick {}: agent {} has reward {:.3}, heading for checkpoint {}",
                self.tick,
                agent.id,
                agent.episode.cumulative_reward(),
                agent.episode.next_checkpoint_index()
            ),
            None => warn!(
                "inspected agent {} does not exist, the fleet has {} agents",
                inspected,
                self.fleet.len()
            ),
        }

        if let Some(leader) = self.fleet.leader() {
            info!(
                "tick {}: agent {} leads, heading for checkpoint {}",
                self.tick,
                leader.id,
                leader.episode.next_checkpoint_index()
            );
        }
        debug!("tick {}: standings {:?}", self.tick, self.fleet.standings());
    }

    pub fn fleet(&self) -> &FleetCoordinator {
        &self.fleet
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn episodes_finished(&self) -> u64 {
        self.episodes_finished
    }
}
