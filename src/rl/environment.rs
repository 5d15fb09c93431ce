use super::observation::{Observation, create_observation};
use crate::game::{Direction, EngineError, GameConfig, GameEngine, StepResult, World};

/// Snake environment for reinforcement learning
///
/// Wraps the game engine and provides the standard RL interface with:
/// - 12-flag observations seen from the head
/// - Discrete action space (4 actions: North, South, East, West)
/// - Standard RL interface (reset, step)
pub struct SnakeEnvironment {
    engine: GameEngine,
    world: World,
}

impl SnakeEnvironment {
    /// Create a new Snake environment
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        Self::from_engine(GameEngine::new(config)?)
    }

    /// Create an environment with reproducible spawns
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::from_engine(GameEngine::with_seed(config, seed)?)
    }

    fn from_engine(mut engine: GameEngine) -> Result<Self, EngineError> {
        let world = engine.reset()?;
        Ok(Self { engine, world })
    }

    /// Reset the environment and return the initial observation
    pub fn reset(&mut self) -> Result<Observation, EngineError> {
        self.engine.reset_world(&mut self.world)?;
        Ok(self.observation())
    }

    /// Step the environment with a discrete action
    ///
    /// Returns: (observation, reward, done)
    /// - observation: flags seen after the move
    /// - reward: item reward, step reward or death penalty
    /// - done: true if the episode ended
    pub fn step(&mut self, action_idx: usize) -> Result<(Observation, f64, bool), EngineError> {
        let direction =
            Direction::from_index(action_idx).ok_or(EngineError::InvalidAction(action_idx))?;
        let (observation, result) = self.step_direction(direction)?;
        Ok((observation, result.reward, result.is_terminal()))
    }

    /// Step with a direction and keep the full step result
    pub fn step_direction(
        &mut self,
        direction: Direction,
    ) -> Result<(Observation, StepResult), EngineError> {
        let result = self.engine.step(&mut self.world, direction)?;
        Ok((self.observation(), result))
    }

    /// Get current observation without stepping
    pub fn observation(&self) -> Observation {
        create_observation(&self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Current snake size, 0 if the world has no snake
    pub fn snake_size(&self) -> usize {
        self.world.snake().map(|s| s.size()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_creation() {
        let env = SnakeEnvironment::with_seed(GameConfig::default(), 1).unwrap();

        let snake = env.world().snake().unwrap();
        assert!(snake.is_alive());
        assert_eq!(env.snake_size(), 4);
        assert_eq!(env.world().items().count(), 3);
    }

    #[test]
    fn test_reset_returns_valid_observation() {
        let mut env = SnakeEnvironment::with_seed(GameConfig::default(), 2).unwrap();

        let obs = env.reset().unwrap();

        assert_eq!(obs.flags().iter().filter(|f| **f).count(), 4);
        assert_eq!(obs, env.observation());
    }

    #[test]
    fn test_invalid_action_index() {
        let mut env = SnakeEnvironment::with_seed(GameConfig::small(), 3).unwrap();
        assert_eq!(env.step(4), Err(EngineError::InvalidAction(4)));
    }

    #[test]
    fn test_episode_terminates() {
        let mut env = SnakeEnvironment::with_seed(GameConfig::small(), 4).unwrap();
        env.reset().unwrap();

        // Walking in one direction always ends at a wall or the body
        let mut done = false;
        for _ in 0..50 {
            let (_, reward, finished) = env.step(0).unwrap();
            if finished {
                assert_eq!(reward, -15.0);
                done = true;
                break;
            }
        }
        assert!(done);
    }

    #[test]
    fn test_reset_revives_snake() {
        let mut env = SnakeEnvironment::with_seed(GameConfig::small(), 5).unwrap();
        for _ in 0..50 {
            if env.step(1).unwrap().2 {
                break;
            }
        }
        assert!(!env.world().snake().unwrap().is_alive());

        env.reset().unwrap();
        assert!(env.world().snake().unwrap().is_alive());
    }
}
