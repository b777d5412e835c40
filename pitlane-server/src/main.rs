use std::path::Path;

use anyhow::{Context, Result};
use pitlane_core::observation::observation_len;
use pitlane_core::settings::PolicyMode;
use pitlane_core::Settings;
use tracing_subscriber::EnvFilter;

use pitlane_server::game::Simulation;
use pitlane_server::map::Map;
use pitlane_server::policy::{HeuristicPolicy, Policy, RemotePolicy};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = Settings::load(Some(Path::new(&config_path)))
        .with_context(|| format!("could not load settings from {}", config_path))?;
    tracing::info!("settings loaded from {}", config_path);

    let map = Map::load(&settings.simulation.track_file)?;

    let policy: Box<dyn Policy> = match settings.policy.mode {
        PolicyMode::Heuristic => Box::new(HeuristicPolicy),
        PolicyMode::Remote => Box::new(RemotePolicy::listen(
            &settings.policy.listen_address,
            settings.simulation.agent_count,
            observation_len(settings.sensors.ray_count),
        )?),
    };

    // kick off the simulation loop
    Simulation::new(settings, map, policy)?.run()?;
    Ok(())
}
