//! Per-step telemetry of played episodes
//!
//! Each step is captured as a plain record before the move is applied: the
//! chosen direction plus head, body and item layout. Records are grouped per
//! episode and written as one JSON array of episodes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::{Direction, GameConfig, Item, ItemKind, Occupant, Position, Snake, World};

/// Snapshot of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Upper-case direction name chosen at this step
    pub direction: String,
    pub head: (i32, i32),
    /// Segments neck first
    pub body: Vec<(i32, i32)>,
    /// `(x, y, beneficial)` for every item
    pub items: Vec<(i32, i32, bool)>,
}

impl StepRecord {
    /// Capture `world` together with the direction about to be played
    ///
    /// Returns `None` for a world without a snake.
    pub fn capture(world: &World, direction: Direction) -> Option<Self> {
        let snake = world.snake()?;

        Some(Self {
            direction: direction.name().to_string(),
            head: (snake.head().x, snake.head().y),
            body: snake.segments().iter().map(|p| (p.x, p.y)).collect(),
            items: world
                .items()
                .map(|(_, item)| {
                    let pos = item.position();
                    (pos.x, pos.y, item.kind() == ItemKind::Beneficial)
                })
                .collect(),
        })
    }

    pub fn direction(&self) -> Option<Direction> {
        Direction::from_name(&self.direction)
    }

    /// Rebuild a world showing this step, for playback
    pub fn to_world(&self, config: &GameConfig) -> World {
        let mut world = World::new(config.grid_width, config.grid_height);
        let last_direction = self.direction().unwrap_or(Direction::North);

        world.add(Snake::from_parts(
            Position::from(self.head),
            self.body.iter().copied().map(Position::from),
            last_direction,
        ));

        for &(x, y, beneficial) in &self.items {
            let item = if beneficial {
                Item::beneficial(config.rewards.beneficial_reward)
            } else {
                Item::detrimental(config.rewards.detrimental_reward)
            };
            world.add(item.at(Position::new(x, y)));
        }

        world
    }
}

/// Steps of a single episode, in play order
pub type EpisodeRecord = Vec<StepRecord>;

/// Collects step records across episodes
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    episodes: Vec<EpisodeRecord>,
    current: EpisodeRecord,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the world before `direction` is applied
    pub fn record(&mut self, world: &World, direction: Direction) {
        if let Some(record) = StepRecord::capture(world, direction) {
            self.current.push(record);
        }
    }

    /// Close the current episode; empty episodes are dropped
    pub fn finish_episode(&mut self) {
        if !self.current.is_empty() {
            self.episodes.push(std::mem::take(&mut self.current));
        }
    }

    /// Finished episodes
    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    /// Write every finished episode plus the one in progress
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.finish_episode();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let json =
            serde_json::to_string(&self.episodes).context("Failed to serialize replay")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write replay to {:?}", path))?;

        info!(path = %path.display(), episodes = self.episodes.len(), "Replay saved");
        Ok(())
    }
}

/// Read a replay file written by [`ReplayRecorder::save`]
pub fn load_replay(path: &Path) -> Result<Vec<EpisodeRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay from {:?}", path))?;
    let episodes: Vec<EpisodeRecord> =
        serde_json::from_str(&json).context("Failed to deserialize replay")?;

    for (index, step) in episodes.iter().flatten().enumerate() {
        if step.direction().is_none() {
            anyhow::bail!("Unknown direction {:?} at step {}", step.direction, index);
        }
    }

    Ok(episodes)
}
