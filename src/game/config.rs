use serde::{Deserialize, Serialize};

/// Reward values produced by the engine on every step
///
/// A non-terminal step earns `step_reward + alive_bonus`, plus
/// `size_bonus_factor * size` after the move, plus the reward of any item
/// eaten (and `growth_bonus` when that item grows the body). A terminal step
/// earns `death_penalty` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Reward for a step where nothing is eaten
    pub step_reward: f64,
    /// Reward carried by beneficial items
    pub beneficial_reward: f64,
    /// Reward carried by detrimental items
    pub detrimental_reward: f64,
    /// Reward for colliding or starving
    pub death_penalty: f64,
    /// Extra reward when the body grows
    pub growth_bonus: f64,
    /// Extra reward for surviving a step
    pub alive_bonus: f64,
    /// Multiplier applied to the snake size after each surviving step
    pub size_bonus_factor: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            step_reward: 0.0,
            beneficial_reward: 10.0,
            detrimental_reward: -15.0,
            death_penalty: -15.0,
            growth_bonus: 0.0,
            alive_bonus: 0.0,
            size_bonus_factor: 0.0,
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the playable area (walls excluded)
    pub grid_width: usize,
    /// Height of the playable area (walls excluded)
    pub grid_height: usize,
    /// Number of body segments trailing the head at spawn
    pub initial_segments: usize,
    /// Number of beneficial items kept on the grid
    pub beneficial_items: usize,
    /// Number of detrimental items kept on the grid
    pub detrimental_items: usize,
    /// Reward values
    pub rewards: RewardConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            initial_segments: 3,
            beneficial_items: 2,
            detrimental_items: 1,
            rewards: RewardConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(5, 5)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(20, 20)
    }

    /// Number of cells that must be free when the world is reset
    pub fn required_cells(&self) -> usize {
        1 + self.initial_segments + self.beneficial_items + self.detrimental_items
    }

    /// Validate configuration parameters
    ///
    /// The playable area must hold the snake and every item at once, otherwise
    /// spawning could not succeed.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        let capacity = self.grid_width * self.grid_height;
        if self.required_cells() > capacity {
            return Err(format!(
                "grid {}x{} has {} cells but {} are needed for the snake and items",
                self.grid_width,
                self.grid_height,
                capacity,
                self.required_cells()
            ));
        }

        let rewards = [
            self.rewards.step_reward,
            self.rewards.beneficial_reward,
            self.rewards.detrimental_reward,
            self.rewards.death_penalty,
            self.rewards.growth_bonus,
            self.rewards.alive_bonus,
            self.rewards.size_bonus_factor,
        ];
        if rewards.iter().any(|r| !r.is_finite()) {
            return Err("reward values must be finite".to_string());
        }

        Ok(())
    }
}
