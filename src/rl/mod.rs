//! Reinforcement learning for the Snake game
//!
//! Provides:
//! - 12-flag observations cast from the snake head
//! - Standard RL environment interface (reset, step)
//! - Tabular Q-learning agent with epsilon-greedy exploration
//! - Episode drivers for training and greedy play with loop breaking
//! - JSON persistence of learned tables and per-step replays

pub mod agent;
pub mod config;
pub mod environment;
pub mod episode;
pub mod loop_guard;
pub mod observation;
pub mod persistence;
pub mod q_table;
pub mod replay;

pub use agent::QAgent;
pub use config::QLearningConfig;
pub use environment::SnakeEnvironment;
pub use episode::{EpisodeReport, run_inference_episode, run_training_episode};
pub use loop_guard::LoopGuard;
pub use observation::{
    CellView, OBSERVATION_SIZE, Observation, RayHit, cast_ray, create_observation, snake_view,
};
pub use persistence::{TableMetadata, load_agent, load_table, save_reward_history, save_table};
pub use q_table::QTable;
pub use replay::{EpisodeRecord, ReplayRecorder, StepRecord, load_replay};
