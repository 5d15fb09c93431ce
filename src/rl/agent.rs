//! Tabular Q-learning agent
//!
//! Wraps a [`QTable`] with an epsilon-greedy action rule, the one-step
//! Q-learning update and a multiplicative exploration schedule.

use super::{config::QLearningConfig, observation::Observation, q_table::QTable};
use crate::game::{Direction, EngineError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct QAgent {
    table: QTable,
    config: QLearningConfig,
    exploration_rate: f64,
    rng: StdRng,
    episodes_trained: usize,
}

impl QAgent {
    /// Create an agent with an empty table
    pub fn new(config: QLearningConfig) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an agent whose exploration draws are reproducible
    pub fn with_seed(config: QLearningConfig, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: QLearningConfig, rng: StdRng) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self {
            table: QTable::new(config.default_value),
            exploration_rate: config.initial_exploration,
            config,
            rng,
            episodes_trained: 0,
        })
    }

    /// Wrap a previously learned table
    ///
    /// The exploration rate starts at the configured floor, so the loaded
    /// policy acts almost greedily until told otherwise.
    pub fn from_table(table: QTable, config: QLearningConfig) -> Result<Self, EngineError> {
        let mut agent = Self::new(config)?;
        agent.exploration_rate = agent.config.min_exploration;
        agent.table = table;
        Ok(agent)
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn set_exploration_rate(&mut self, rate: f64) {
        self.exploration_rate = rate.clamp(0.0, 1.0);
    }

    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    pub fn set_episodes_trained(&mut self, episodes: usize) {
        self.episodes_trained = episodes;
    }

    /// Epsilon-greedy choice
    ///
    /// With probability `exploration_rate` a uniformly random action index is
    /// returned, otherwise the argmax of the table. A rate of 0 never draws.
    pub fn select_action(&mut self, state: &Observation, exploration_rate: f64) -> usize {
        if exploration_rate > 0.0 && self.rng.gen::<f64>() < exploration_rate {
            self.rng.gen_range(0..Direction::COUNT)
        } else {
            self.table.best_action(state)
        }
    }

    /// Choose with the agent's own exploration rate
    pub fn act(&mut self, state: &Observation) -> usize {
        let rate = self.exploration_rate;
        self.select_action(state, rate)
    }

    pub fn greedy_action(&self, state: &Observation) -> usize {
        self.table.best_action(state)
    }

    /// One-step Q-learning update, returns the new value
    pub fn update(
        &mut self,
        state: Observation,
        action: usize,
        reward: f64,
        next_state: &Observation,
    ) -> f64 {
        let target = reward + self.config.gamma * self.table.max_value(next_state);
        self.move_towards(state, action, target)
    }

    /// Update for a transition that ended the episode: no bootstrap term
    pub fn update_terminal(&mut self, state: Observation, action: usize, reward: f64) -> f64 {
        self.move_towards(state, action, reward)
    }

    fn move_towards(&mut self, state: Observation, action: usize, target: f64) -> f64 {
        let current = self.table.get(&state, action);
        let value = current + self.config.alpha * (target - current);
        self.table.set(state, action, value);
        value
    }

    /// Apply one step of the exploration schedule
    pub fn decay_exploration(&mut self) {
        self.exploration_rate =
            (self.exploration_rate * self.config.exploration_decay).max(self.config.min_exploration);
    }

    /// Bookkeeping once an episode is over
    pub fn end_episode(&mut self) {
        self.episodes_trained += 1;
        self.decay_exploration();
    }
}
