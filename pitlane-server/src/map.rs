use std::path::Path;
use std::sync::Arc;

use glam::DVec2;
use pitlane_core::error::ConfigurationError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::checkpoints::{Checkpoint, CheckpointTrack};
use crate::physics::bounding_box::BoundingBox;
use crate::physics::sensors::Obstacle;

const DEFAULT_WALL_LAYERS: u32 = 1;

#[derive(Debug, Error)]
pub enum TrackLoadError {
    #[error("could not read track file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed track layout: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

// A node of the checkpoint hierarchy. Positions are relative to the parent.
#[derive(Deserialize, Clone, Debug)]
pub struct TrackNode {
    pub name: String,
    #[serde(default)]
    pub position: DVec2,
    #[serde(default)]
    pub size: DVec2,
    #[serde(default)]
    pub children: Vec<TrackNode>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WallLayout {
    #[serde(default)]
    pub name: String,
    pub min: DVec2,
    pub max: DVec2,
    #[serde(default = "default_wall_layers")]
    pub layers: u32,
}

fn default_wall_layers() -> u32 {
    DEFAULT_WALL_LAYERS
}

#[derive(Deserialize, Clone, Debug)]
pub struct TrackLayout {
    pub checkpoints: TrackNode,
    #[serde(default)]
    pub walls: Vec<WallLayout>,
}

pub struct Map {
    pub track: Arc<CheckpointTrack>,
    pub walls: Vec<Obstacle>,
}

impl TrackNode {
    // Depth first, parents before their children, the way a scene hierarchy
    // lists its descendants
    fn collect_descendants(&self, origin: DVec2, out: &mut Vec<Checkpoint>) {
        for child in &self.children {
            let center = origin + child.position;
            out.push(Checkpoint::new(
                out.len(),
                child.name.clone(),
                BoundingBox::from_center(center, child.size),
            ));
            child.collect_descendants(center, out);
        }
    }
}

impl Map {
    pub fn load(filename: &str) -> Result<Map, TrackLoadError> {
        info!("loading track {}", filename);
        let contents = std::fs::read_to_string(Path::new(filename)).map_err(|source| {
            TrackLoadError::Io {
                path: filename.to_string(),
                source,
            }
        })?;
        Map::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Map, TrackLoadError> {
        let layout: TrackLayout = serde_yaml::from_str(contents)?;
        Ok(Map::from_layout(&layout)?)
    }

    // The container node only groups the checkpoints; it is never a checkpoint
    // itself
    pub fn from_layout(layout: &TrackLayout) -> Result<Map, ConfigurationError> {
        let mut checkpoints = Vec::new();
        layout
            .checkpoints
            .collect_descendants(layout.checkpoints.position, &mut checkpoints);
        let track = CheckpointTrack::new(checkpoints)?;

        let walls = layout
            .walls
            .iter()
            .map(|wall| {
                debug!("wall {:?} on layers {:#b}", wall.name, wall.layers);
                Obstacle {
                    bounds: BoundingBox::from_vecs(wall.min, wall.max),
                    layers: wall.layers,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "track ready: {} checkpoints, {} walls",
            track.len(),
            walls.len()
        );

        Ok(Map {
            track: Arc::new(track),
            walls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"
checkpoints:
  name: holder
  position: [100.0, 0.0]
  children:
    - name: first
      position: [0.0, 10.0]
      size: [4.0, 1.0]
      children:
        - name: nested
          position: [5.0, 0.0]
          size: [1.0, 1.0]
    - name: second
      position: [0.0, 20.0]
      size: [4.0, 1.0]
walls:
  - name: left
    min: [-10.0, -50.0]
    max: [-9.0, 50.0]
  - name: marker
    min: [9.0, -50.0]
    max: [10.0, 50.0]
    layers: 2
"#;

    #[test]
    fn container_is_excluded_and_children_flatten_depth_first() {
        let map = Map::parse(LAYOUT).unwrap();
        let names: Vec<&str> = map.track.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "nested", "second"]);
        assert_eq!(map.track.len(), 3);
    }

    #[test]
    fn child_positions_are_relative_to_parents() {
        let map = Map::parse(LAYOUT).unwrap();
        let nested = map.track.get(1).unwrap();
        assert!(nested.bounds.pos().abs_diff_eq(DVec2::new(105.0, 10.0), 1e-9));
        let second = map.track.get(2).unwrap();
        assert!(second
            .bounds
            .min()
            .abs_diff_eq(DVec2::new(98.0, 19.5), 1e-9));
    }

    #[test]
    fn walls_keep_their_layers() {
        let map = Map::parse(LAYOUT).unwrap();
        assert_eq!(map.walls.len(), 2);
        assert_eq!(map.walls[0].layers, DEFAULT_WALL_LAYERS);
        assert_eq!(map.walls[1].layers, 2);
    }

    #[test]
    fn container_without_children_is_an_empty_track() {
        let layout = "checkpoints:\n  name: holder\n";
        assert!(matches!(
            Map::parse(layout),
            Err(TrackLoadError::Configuration(ConfigurationError::EmptyTrack))
        ));
    }

    #[test]
    fn bundled_track_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../tracks/oval.yaml");
        let map = Map::load(path).unwrap();
        assert!(map.track.len() >= 4);
        assert!(!map.walls.is_empty());
    }
}
