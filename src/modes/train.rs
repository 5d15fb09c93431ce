//! Training mode for the Q-learning agent
//!
//! This module runs training episodes in the Snake environment, updating the
//! table after every transition, and periodically logs progress and saves
//! checkpoints. The per-episode reward history is written next to the table.
//!
//! # Example
//!
//! ```rust,no_run
//! use q_snake::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = TrainConfig::new(5000, PathBuf::from("models/q_table.json"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::game::GameConfig;
use crate::metrics::TrainingStats;
use crate::rl::{
    EpisodeReport, QAgent, QLearningConfig, SnakeEnvironment, run_training_episode,
    save_reward_history, save_table,
};

/// Configuration for training mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path to save the final table
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes, 0 disables checkpoints
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Optional cap on steps per episode
    pub max_steps_per_episode: Option<usize>,

    /// Where to write the `episode,total_reward` history; defaults to a file
    /// next to `save_path`
    pub history_path: Option<PathBuf>,

    /// Seed for reproducible runs
    pub seed: Option<u64>,

    /// Game configuration (grid size, rewards)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub q_config: QLearningConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// ```rust
    /// use q_snake::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(5000, PathBuf::from("models/q_table.json"));
    /// assert_eq!(config.log_frequency, 100);
    /// ```
    pub fn new(num_episodes: usize, save_path: PathBuf) -> Self {
        Self {
            num_episodes,
            save_path,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            max_steps_per_episode: Some(10_000),
            history_path: None,
            seed: None,
            game_config: GameConfig::default(),
            q_config: QLearningConfig::default(),
        }
    }

    /// Path of the reward history file
    pub fn history_path(&self) -> PathBuf {
        self.history_path
            .clone()
            .unwrap_or_else(|| self.save_path.with_extension("rewards.csv"))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.log_frequency == 0 {
            return Err("log_frequency must be > 0".to_string());
        }

        if self.max_steps_per_episode == Some(0) {
            return Err("max_steps_per_episode must be > 0 when set".to_string());
        }

        self.game_config.validate()?;
        self.q_config.validate()
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::new(5000, PathBuf::from("models/q_table.json"))
    }
}

/// Training mode for the Q-learning agent
pub struct TrainMode {
    agent: QAgent,
    env: SnakeEnvironment,
    stats: TrainingStats,
    config: TrainConfig,

    /// Current episode number
    current_episode: usize,

    /// Total reward of every finished episode
    reward_history: Vec<f64>,
}

impl TrainMode {
    /// Create a new training mode with a fresh table
    pub fn new(config: TrainConfig) -> Result<Self> {
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid training configuration")?;

        let (env, agent) = match config.seed {
            Some(seed) => (
                SnakeEnvironment::with_seed(config.game_config.clone(), seed)?,
                QAgent::with_seed(config.q_config.clone(), seed.wrapping_add(1))?,
            ),
            None => (
                SnakeEnvironment::new(config.game_config.clone())?,
                QAgent::new(config.q_config.clone())?,
            ),
        };

        Ok(Self {
            agent,
            env,
            // 100-episode rolling window
            stats: TrainingStats::new(100),
            config,
            current_episode: 0,
            reward_history: Vec::new(),
        })
    }

    /// Run the training loop
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for episode in 0..self.config.num_episodes {
            self.current_episode = episode;

            let report = self.run_episode()?;
            self.reward_history.push(report.total_reward);
            self.stats.record_report(&report);
            self.stats.set_exploration_rate(self.agent.exploration_rate());

            if (episode + 1) % self.config.log_frequency == 0 {
                self.print_progress(episode + 1);
            }

            if self.config.checkpoint_frequency > 0
                && (episode + 1) % self.config.checkpoint_frequency == 0
            {
                self.save_checkpoint()?;
            }
        }

        self.save_table()?;
        save_reward_history(&self.reward_history, &self.config.history_path())?;

        println!("\nTraining complete!");
        println!("Final table saved to: {:?}", self.config.save_path);
        println!("Reward history saved to: {:?}", self.config.history_path());
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Run a single training episode
    fn run_episode(&mut self) -> Result<EpisodeReport> {
        let report = run_training_episode(
            &mut self.env,
            &mut self.agent,
            self.config.max_steps_per_episode,
        )
        .with_context(|| format!("Episode {} failed", self.current_episode + 1))?;
        Ok(report)
    }

    pub fn agent(&self) -> &QAgent {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn reward_history(&self) -> &[f64] {
        &self.reward_history
    }

    fn save_checkpoint(&self) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.json", self.current_episode + 1));

        self.write_table(&checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        info!(path = %checkpoint_path.display(), "Checkpoint saved");
        println!("  Checkpoint saved: {:?}", checkpoint_path);
        Ok(())
    }

    fn save_table(&self) -> Result<()> {
        self.write_table(&self.config.save_path).with_context(|| {
            format!("Failed to save final table to {:?}", self.config.save_path)
        })
    }

    fn write_table(&self, path: &Path) -> Result<()> {
        save_table(
            &self.agent,
            self.config.game_config.grid_width,
            self.config.game_config.grid_height,
            path,
        )
    }

    fn print_header(&self) {
        let q = &self.config.q_config;
        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Snake");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.num_episodes);
        println!(
            "Game Config: {}x{} grid, {} beneficial / {} detrimental items",
            self.config.game_config.grid_width,
            self.config.game_config.grid_height,
            self.config.game_config.beneficial_items,
            self.config.game_config.detrimental_items,
        );
        println!("Q-Learning Config:");
        println!("  Alpha: {}", q.alpha);
        println!("  Gamma: {}", q.gamma);
        println!("  Default value: {}", q.default_value);
        println!(
            "  Exploration: {} -> {} (decay {})",
            q.initial_exploration, q.min_exploration, q.exploration_decay
        );
        if self.config.checkpoint_frequency > 0 {
            println!("Checkpoints: Every {} episodes", self.config.checkpoint_frequency);
        }
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {}",
            episode,
            self.config.num_episodes,
            self.stats.format_summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::load_table;
    use tempfile::TempDir;

    fn small_config(dir: &TempDir, episodes: usize) -> TrainConfig {
        let mut config = TrainConfig::new(episodes, dir.path().join("q_table.json"));
        config.seed = Some(42);
        config.log_frequency = 10;
        config.checkpoint_frequency = 0;
        config.max_steps_per_episode = Some(500);
        config
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(1000, PathBuf::from("test.json"));
        assert_eq!(config.num_episodes, 1000);
        assert_eq!(config.save_path, PathBuf::from("test.json"));
        assert_eq!(config.history_path(), PathBuf::from("test.rewards.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = TrainConfig::default();
        config.q_config.gamma = 2.0;
        assert!(TrainMode::new(config).is_err());

        let mut config = TrainConfig::default();
        config.log_frequency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_single_episode() {
        let dir = TempDir::new().unwrap();
        let mut mode = TrainMode::new(small_config(&dir, 1)).unwrap();

        let report = mode.run_episode().unwrap();

        assert!(report.steps > 0);
        assert!(report.steps <= 500);
    }

    #[test]
    fn test_run_writes_table_and_history() {
        let dir = TempDir::new().unwrap();
        let config = small_config(&dir, 20);
        let history = config.history_path();
        let save_path = config.save_path.clone();
        let mut mode = TrainMode::new(config).unwrap();

        mode.run().unwrap();

        assert_eq!(mode.reward_history().len(), 20);
        assert_eq!(mode.stats().total_episodes(), 20);
        assert_eq!(mode.agent().episodes_trained(), 20);

        let (table, metadata) = load_table(&save_path).unwrap();
        assert_eq!(&table, mode.agent().table());
        assert_eq!(metadata.episodes_trained, 20);

        let text = std::fs::read_to_string(history).unwrap();
        assert_eq!(text.lines().count(), 21);
    }

    #[test]
    fn test_checkpoints() {
        let dir = TempDir::new().unwrap();
        let mut config = small_config(&dir, 4);
        config.checkpoint_frequency = 2;
        let mut mode = TrainMode::new(config).unwrap();

        mode.run().unwrap();

        assert!(dir.path().join("checkpoint_ep2.json").exists());
        assert!(dir.path().join("checkpoint_ep4.json").exists());
    }
}
