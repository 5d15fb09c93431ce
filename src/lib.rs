//! Q-Snake - grid Snake with a tabular Q-learning agent
//!
//! This library provides:
//! - Core game logic: walled grid, snake, items and the step engine (game module)
//! - Perception, Q-table, agent, episode drivers and persistence (rl module)
//! - TUI rendering (render module) and key handling (input module)
//! - Rolling training statistics and play counters (metrics module)
//! - Execution modes: train, play, watch, replay, human (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
