use std::cmp::Ordering;
use std::sync::Arc;

use pitlane_core::error::ConfigurationError;
use pitlane_core::progress::{EpisodeNumber, EpisodeSummary};
use pitlane_core::settings::{Settings, SpawnBounds};
use pitlane_core::AgentID;
use rand::Rng;

use crate::checkpoints::CheckpointTrack;
use crate::episode::{AgentEpisode, EpisodeConfig};
use crate::physics::trigger_entity::TriggerEvent;

pub struct Agent {
    pub id: AgentID,
    pub episode: AgentEpisode,
    // triggers the car was already inside of last tick; only new overlaps fire
    pub current_triggers: Vec<TriggerEvent>,
    pub episodes_completed: EpisodeNumber,
}

impl Agent {
    fn new<R: Rng>(id: AgentID, track: Arc<CheckpointTrack>, config: EpisodeConfig, rng: &mut R) -> Self {
        Agent {
            id,
            episode: AgentEpisode::new(track, config, rng),
            current_triggers: Vec::new(),
            episodes_completed: 0,
        }
    }

    /* Close out a terminated episode: hand back its summary, zero the running
     * total and respawn. Returns None (and does nothing) while the episode is
     * still running. */
    pub fn finish_episode<R: Rng>(&mut self, rng: &mut R) -> Option<EpisodeSummary> {
        let summary = self.episode.summary(self.id, self.episodes_completed)?;
        self.episode.clear_cumulative_reward();
        self.episode.reset(rng);
        self.current_triggers.clear();
        self.episodes_completed += 1;
        Some(summary)
    }

    // furthest along first; ties keep fleet order when sorted stably
    pub fn cmp_progress(&self, other: &Agent) -> Ordering {
        self.episode
            .next_checkpoint_index()
            .cmp(&other.episode.next_checkpoint_index())
            .reverse()
    }
}

// Owns every agent on the track and answers questions about the fleet as a whole
pub struct FleetCoordinator {
    agents: Vec<Agent>,
    track: Arc<CheckpointTrack>,
    spawn: SpawnBounds,
}

impl FleetCoordinator {
    pub fn new<R: Rng>(
        track: Arc<CheckpointTrack>,
        settings: &Settings,
        rng: &mut R,
    ) -> Result<FleetCoordinator, ConfigurationError> {
        if settings.simulation.agent_count == 0 {
            return Err(ConfigurationError::NoAgents);
        }

        let config = EpisodeConfig::from_settings(settings);
        let agents = (0..settings.simulation.agent_count)
            .map(|id| Agent::new(id, track.clone(), config.clone(), rng))
            .collect();

        Ok(FleetCoordinator {
            agents,
            track,
            spawn: settings.episode.spawn,
        })
    }

    pub fn track(&self) -> &CheckpointTrack {
        &self.track
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.spawn.x_range()
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.spawn.y_range()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn agent(&self, id: AgentID) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    // The agent with the highest next checkpoint index; the earliest one wins ties
    pub fn leader(&self) -> Option<&Agent> {
        let mut leader: Option<&Agent> = None;
        for agent in &self.agents {
            match leader {
                Some(current)
                    if agent.episode.next_checkpoint_index()
                        <= current.episode.next_checkpoint_index() => {}
                _ => leader = Some(agent),
            }
        }
        leader
    }

    pub fn standings(&self) -> Vec<AgentID> {
        let mut ranked: Vec<&Agent> = self.agents.iter().collect();
        ranked.sort_by(|a, b| a.cmp_progress(b));
        ranked.iter().map(|agent| agent.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoints::tests::straight_track;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn get_fleet(agent_count: usize) -> (FleetCoordinator, StdRng) {
        let mut settings = Settings::load(None).unwrap();
        settings.simulation.agent_count = agent_count;
        let mut rng = StdRng::seed_from_u64(3);
        let fleet = FleetCoordinator::new(Arc::new(straight_track(6)), &settings, &mut rng).unwrap();
        (fleet, rng)
    }

    fn advance(fleet: &mut FleetCoordinator, id: AgentID, checkpoints: usize) {
        let episode = &mut fleet.agents_mut()[id].episode;
        for _ in 0..checkpoints {
            let next = episode.next_checkpoint_index();
            episode.on_checkpoint_triggered(next).unwrap();
        }
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let mut settings = Settings::load(None).unwrap();
        settings.simulation.agent_count = 0;
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            FleetCoordinator::new(Arc::new(straight_track(3)), &settings, &mut rng),
            Err(ConfigurationError::NoAgents)
        ));
    }

    #[test]
    fn every_agent_spawns_inside_the_bounds() {
        let (fleet, _) = get_fleet(16);
        let (x_min, x_max) = fleet.x_range();
        let (y_min, y_max) = fleet.y_range();
        assert_eq!(fleet.len(), 16);
        for (i, agent) in fleet.agents().iter().enumerate() {
            let position = agent.episode.vehicle().position;
            assert_eq!(agent.id, i);
            assert!(position.x >= x_min && position.x <= x_max);
            assert!(position.y >= y_min && position.y <= y_max);
        }
    }

    #[test]
    fn leader_has_the_highest_next_checkpoint() {
        let (mut fleet, _) = get_fleet(4);
        advance(&mut fleet, 1, 2);
        advance(&mut fleet, 2, 4);
        advance(&mut fleet, 3, 1);
        assert_eq!(fleet.leader().unwrap().id, 2);
    }

    #[test]
    fn leader_ties_go_to_the_first_agent() {
        let (mut fleet, _) = get_fleet(4);
        assert_eq!(fleet.leader().unwrap().id, 0);

        advance(&mut fleet, 1, 3);
        advance(&mut fleet, 3, 3);
        assert_eq!(fleet.leader().unwrap().id, 1);
    }

    #[test]
    fn standings_are_stable_and_descending() {
        let (mut fleet, _) = get_fleet(5);
        advance(&mut fleet, 1, 2);
        advance(&mut fleet, 3, 2);
        advance(&mut fleet, 4, 5);
        assert_eq!(fleet.standings(), vec![4, 1, 3, 0, 2]);
    }

    #[test]
    fn finishing_an_episode_resets_the_agent() {
        let (mut fleet, mut rng) = get_fleet(2);
        advance(&mut fleet, 0, 2);

        let agent = &mut fleet.agents_mut()[0];
        assert!(agent.finish_episode(&mut rng).is_none());

        let wall = agent.episode.on_wall_collision();
        agent.current_triggers.push(TriggerEvent::Checkpoint(1));
        let summary = agent.finish_episode(&mut rng).unwrap();

        assert_eq!(summary.agent, 0);
        assert_eq!(summary.episode, 0);
        assert_eq!(summary.checkpoints_passed, 2);
        assert!((summary.cumulative_reward - (2.0 + wall)).abs() < 1e-9);
        assert_eq!(agent.episodes_completed, 1);
        assert_eq!(agent.episode.cumulative_reward(), 0.0);
        assert_eq!(agent.episode.next_checkpoint_index(), 0);
        assert!(agent.current_triggers.is_empty());
        assert!(!agent.episode.is_terminated());
    }
}
