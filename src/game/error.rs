use super::entity::EntityId;
use thiserror::Error;

/// Errors raised by the simulation
///
/// Collisions and starvation are not errors: they end an episode and are
/// reported through [`StepOutcome`](super::StepOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no open cell left to place an entity")]
    NoOpenCell,
    #[error("the world has no snake")]
    MissingAgent,
    #[error("entity {0:?} is not registered in the world")]
    UnknownEntity(EntityId),
    #[error("action index {0} is outside the action space")]
    InvalidAction(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
