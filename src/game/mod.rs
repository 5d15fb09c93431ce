//! Core game logic module for Snake
//!
//! This module contains the deterministic grid simulation without any I/O or
//! rendering dependencies: the walled grid, the entities living on it, and the
//! engine resolving moves, collisions and item consumption.

pub mod action;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod grid;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use action::Direction;
pub use config::{GameConfig, RewardConfig};
pub use engine::{GameEngine, StepInfo, StepOutcome, StepResult};
pub use entity::{Entity, EntityId, Item, ItemKind, Occupant};
pub use error::EngineError;
pub use grid::{CellKind, Grid};
pub use state::{Position, Snake, TerminalCause};
pub use world::{MapLocation, World};
