use super::{
    action::Direction,
    config::GameConfig,
    entity::{Entity, EntityId, Item, ItemKind},
    error::EngineError,
    state::{Position, Snake, TerminalCause},
    world::World,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Whether the episode goes on after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Terminal(TerminalCause),
}

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Kind of item eaten this step, if any
    pub ate: Option<ItemKind>,
    /// Snake size after the step
    pub size: usize,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f64,
    /// Whether the episode goes on
    pub outcome: StepOutcome,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    pub fn is_terminal(&self) -> bool {
        matches!(self.outcome, StepOutcome::Terminal(_))
    }

    pub fn terminal_cause(&self) -> Option<TerminalCause> {
        match self.outcome {
            StepOutcome::Terminal(cause) => Some(cause),
            StepOutcome::Continue => None,
        }
    }

    fn terminal(reward: f64, cause: TerminalCause, size: usize) -> Self {
        Self {
            reward,
            outcome: StepOutcome::Terminal(cause),
            info: StepInfo { ate: None, size },
        }
    }
}

/// The game engine that handles all game logic
///
/// The engine owns the configuration and the random source; the [`World`] it
/// drives is passed in by the caller.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine whose randomness is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Build a fresh world: walls, a snake at a random open cell with a random
    /// heading, then every configured item
    pub fn reset(&mut self) -> Result<World, EngineError> {
        let mut world = World::new(self.config.grid_width, self.config.grid_height);
        self.populate(&mut world)?;
        Ok(world)
    }

    /// Reset an existing world in place
    pub fn reset_world(&mut self, world: &mut World) -> Result<(), EngineError> {
        world.reset();
        self.populate(world)
    }

    fn populate(&mut self, world: &mut World) -> Result<(), EngineError> {
        let head = world.random_open_cell(&mut self.rng)?;
        let heading = Direction::ALL[self.rng.gen_range(0..Direction::COUNT)];
        let snake = Snake::spawn(
            world,
            head,
            heading,
            self.config.initial_segments,
            &mut self.rng,
        );
        world.add(snake);

        let rewards = &self.config.rewards;
        let items = std::iter::repeat(ItemKind::Beneficial)
            .take(self.config.beneficial_items)
            .map(|kind| Item::new(kind, rewards.beneficial_reward))
            .chain(
                std::iter::repeat(ItemKind::Detrimental)
                    .take(self.config.detrimental_items)
                    .map(|kind| Item::new(kind, rewards.detrimental_reward)),
            )
            .collect::<Vec<_>>();

        for item in items {
            world.place_at_random_open_cell(item, &mut self.rng)?;
        }

        Ok(())
    }

    /// Move the snake one cell in `direction`
    ///
    /// Walls and body segments kill the snake. An item in the target cell is
    /// eaten in the same step: a beneficial one keeps the tail (net +1), a
    /// detrimental one drops an extra tail segment (net -1) or starves a snake
    /// that has no segment left. The eaten item is relocated once the head has
    /// moved, so it never respawns under the head.
    pub fn step(
        &mut self,
        world: &mut World,
        direction: Direction,
    ) -> Result<StepResult, EngineError> {
        let snake = world.snake().ok_or(EngineError::MissingAgent)?;

        if let Some(cause) = snake.death() {
            return Ok(StepResult::terminal(0.0, cause, snake.size()));
        }

        let target = snake.head().moved_in_direction(direction);
        let rewards = self.config.rewards.clone();

        if let Some(cause) = self.check_collision(world, snake, target) {
            let snake = world.snake_mut().ok_or(EngineError::MissingAgent)?;
            snake.kill(cause);
            return Ok(StepResult::terminal(
                rewards.death_penalty,
                cause,
                snake.size(),
            ));
        }

        let eaten = match world.occupant_at(target) {
            Some((id, Entity::Item(item))) => Some((id, item.kind(), item.reward())),
            _ => None,
        };

        let mut reward = rewards.step_reward + rewards.alive_bonus;
        let snake = world.snake_mut().ok_or(EngineError::MissingAgent)?;

        if let Some((_, kind, value)) = eaten {
            match kind {
                ItemKind::Beneficial => {
                    snake.grow();
                    reward += value + rewards.growth_bonus;
                }
                ItemKind::Detrimental => {
                    if !snake.shrink() {
                        snake.kill(TerminalCause::Starvation);
                        return Ok(StepResult::terminal(
                            rewards.death_penalty,
                            TerminalCause::Starvation,
                            snake.size(),
                        ));
                    }
                    reward += value;
                }
            }
        }

        snake.advance(target, direction);
        let size = snake.size();
        reward += rewards.size_bonus_factor * size as f64;

        if let Some((item_id, _, _)) = eaten {
            self.respawn(world, item_id)?;
        }

        Ok(StepResult {
            reward,
            outcome: StepOutcome::Continue,
            info: StepInfo {
                ate: eaten.map(|(_, kind, _)| kind),
                size,
            },
        })
    }

    /// Relocate the snake head to `pos` and regrow its body from there
    pub fn teleport_snake(&mut self, world: &mut World, pos: Position) -> Result<(), EngineError> {
        let id = world.snake_id().ok_or(EngineError::MissingAgent)?;
        let Some(Entity::Snake(mut snake)) = world.remove(id) else {
            return Err(EngineError::MissingAgent);
        };
        snake.teleport(world, pos, &mut self.rng);
        world.add(snake);
        Ok(())
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, world: &World, snake: &Snake, pos: Position) -> Option<TerminalCause> {
        if world.grid().is_wall(pos) {
            return Some(TerminalCause::Wall);
        }

        if snake.collides_with_body(pos) {
            return Some(TerminalCause::SelfCollision);
        }

        None
    }

    fn respawn(&mut self, world: &mut World, item_id: EntityId) -> Result<(), EngineError> {
        world.relocate(item_id, &mut self.rng)?;
        Ok(())
    }
}
