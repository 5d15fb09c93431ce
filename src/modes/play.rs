//! Headless play mode
//!
//! Loads a learned table and plays greedy episodes with loop breaking,
//! printing the final size of each. Steps can be recorded to a replay file.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

use crate::game::GameConfig;
use crate::render::world_to_text;
use crate::rl::{
    EpisodeReport, LoopGuard, QAgent, ReplayRecorder, SnakeEnvironment, TableMetadata, load_agent,
    run_inference_episode,
};

/// Configuration for play mode
#[derive(Debug, Clone)]
pub struct PlayConfig {
    /// Learned table to play with
    pub table_path: PathBuf,

    /// Number of episodes to play
    pub num_episodes: usize,

    /// Optional cap on steps per episode
    pub max_steps_per_episode: Option<usize>,

    /// Record every step to this file
    pub replay_path: Option<PathBuf>,

    /// Overrides the loop threshold stored with the table
    pub loop_threshold: Option<usize>,

    /// Print the board at the end of each episode
    pub show_board: bool,

    pub seed: Option<u64>,

    pub game_config: GameConfig,
}

impl PlayConfig {
    pub fn new(table_path: PathBuf) -> Self {
        Self {
            table_path,
            num_episodes: 1,
            max_steps_per_episode: Some(10_000),
            replay_path: None,
            loop_threshold: None,
            show_board: false,
            seed: None,
            game_config: GameConfig::default(),
        }
    }
}

pub struct PlayMode {
    agent: QAgent,
    env: SnakeEnvironment,
    guard: LoopGuard,
    recorder: Option<ReplayRecorder>,
    metadata: TableMetadata,
    config: PlayConfig,
}

impl PlayMode {
    pub fn new(config: PlayConfig) -> Result<Self> {
        let (agent, metadata) = load_agent(&config.table_path)
            .with_context(|| format!("Failed to load table from {:?}", config.table_path))?;

        if (metadata.grid_width, metadata.grid_height)
            != (config.game_config.grid_width, config.game_config.grid_height)
        {
            warn!(
                trained = %format!("{}x{}", metadata.grid_width, metadata.grid_height),
                playing = %format!("{}x{}", config.game_config.grid_width, config.game_config.grid_height),
                "Grid size differs from the one the table was trained on"
            );
        }

        let threshold = config
            .loop_threshold
            .unwrap_or(metadata.q_config.loop_threshold);
        let (env, guard) = match config.seed {
            Some(seed) => (
                SnakeEnvironment::with_seed(config.game_config.clone(), seed)?,
                LoopGuard::with_seed(threshold, seed.wrapping_add(1)),
            ),
            None => (
                SnakeEnvironment::new(config.game_config.clone())?,
                LoopGuard::new(threshold),
            ),
        };

        Ok(Self {
            agent,
            env,
            guard,
            recorder: config.replay_path.as_ref().map(|_| ReplayRecorder::new()),
            metadata,
            config,
        })
    }

    /// Play every episode, returning the reports in order
    pub fn run(&mut self) -> Result<Vec<EpisodeReport>> {
        println!("{}", "=".repeat(60));
        println!("Loaded Table Information");
        println!("{}", "=".repeat(60));
        println!("Table path: {:?}", self.config.table_path);
        println!("Entries: {}", self.agent.table().len());
        println!("Episodes trained: {}", self.metadata.episodes_trained);
        println!(
            "Grid size: {}x{}",
            self.metadata.grid_width, self.metadata.grid_height
        );
        println!("Version: {}", self.metadata.version);
        println!("{}", "=".repeat(60));

        let mut reports = Vec::with_capacity(self.config.num_episodes);
        for episode in 0..self.config.num_episodes {
            let report = run_inference_episode(
                &mut self.env,
                &mut self.agent,
                &mut self.guard,
                self.recorder.as_mut(),
                self.config.max_steps_per_episode,
            )
            .with_context(|| format!("Episode {} failed", episode + 1))?;

            println!(
                "Episode {}: size {} after {} steps ({}, {} loop breaks)",
                episode + 1,
                report.final_size,
                report.steps,
                report
                    .cause
                    .map(|c| format!("{:?}", c))
                    .unwrap_or_else(|| "step limit".to_string()),
                report.loop_breaks,
            );
            if self.config.show_board {
                println!("{}", world_to_text(self.env.world()));
            }

            reports.push(report);
        }

        if let (Some(recorder), Some(path)) = (self.recorder.as_mut(), &self.config.replay_path) {
            recorder.save(path)?;
            println!("Replay saved to: {:?}", path);
        }

        if !reports.is_empty() {
            let best = reports.iter().map(|r| r.final_size).max().unwrap_or(0);
            let mean =
                reports.iter().map(|r| r.final_size).sum::<usize>() as f64 / reports.len() as f64;
            println!("\nBest size: {} | Mean size: {:.2}", best, mean);
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{QLearningConfig, load_replay, save_table};
    use tempfile::TempDir;

    fn saved_table(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("q_table.json");
        let agent = QAgent::with_seed(QLearningConfig::default(), 1).unwrap();
        save_table(&agent, 10, 10, &path).unwrap();
        path
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = PlayConfig::new(dir.path().join("missing.json"));
        assert!(PlayMode::new(config).is_err());
    }

    #[test]
    fn test_play_records_replay() {
        let dir = TempDir::new().unwrap();
        let replay_path = dir.path().join("replay.json");
        let mut config = PlayConfig::new(saved_table(&dir));
        config.num_episodes = 3;
        config.seed = Some(5);
        config.max_steps_per_episode = Some(200);
        config.replay_path = Some(replay_path.clone());

        let reports = PlayMode::new(config).unwrap().run().unwrap();

        assert_eq!(reports.len(), 3);
        let episodes = load_replay(&replay_path).unwrap();
        assert_eq!(episodes.len(), 3);
        for (episode, report) in episodes.iter().zip(&reports) {
            assert_eq!(episode.len(), report.steps);
        }
    }
}
