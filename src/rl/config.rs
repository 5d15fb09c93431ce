//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the tabular Q-learning agent
///
/// Defaults follow the values the agent was tuned with on a 10x10 grid.
///
/// # Example
///
/// ```rust
/// use q_snake::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     alpha: 0.2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Learning rate
    ///
    /// Default: 0.1
    pub alpha: f64,

    /// Discount factor for future rewards
    ///
    /// Default: 0.9
    pub gamma: f64,

    /// Value returned for (state, action) pairs never updated
    ///
    /// An optimistic default pushes the greedy policy to try unseen actions.
    ///
    /// Default: 10.0
    pub default_value: f64,

    /// Exploration rate at the start of training
    ///
    /// Default: 1.0
    pub initial_exploration: f64,

    /// Floor the exploration rate decays towards; strictly positive
    ///
    /// Default: 0.01
    pub min_exploration: f64,

    /// Multiplicative decay applied once per episode
    ///
    /// Default: 0.995
    pub exploration_decay: f64,

    /// Repeats of the same configuration tolerated before the loop breaker
    /// overrides the policy during inference
    ///
    /// Default: 15
    pub loop_threshold: usize,
}

impl QLearningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(format!("alpha must be in (0, 1], got {}", self.alpha));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !self.default_value.is_finite() {
            return Err(format!(
                "default_value must be finite, got {}",
                self.default_value
            ));
        }

        if !(self.min_exploration > 0.0 && self.min_exploration <= 1.0) {
            return Err(format!(
                "min_exploration must be in (0, 1], got {}",
                self.min_exploration
            ));
        }

        if !(self.min_exploration..=1.0).contains(&self.initial_exploration) {
            return Err(format!(
                "initial_exploration must be in [min_exploration, 1], got {}",
                self.initial_exploration
            ));
        }

        if !(self.exploration_decay > 0.0 && self.exploration_decay <= 1.0) {
            return Err(format!(
                "exploration_decay must be in (0, 1], got {}",
                self.exploration_decay
            ));
        }

        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            default_value: 10.0,
            initial_exploration: 1.0,
            min_exploration: 0.01,
            exploration_decay: 0.995,
            loop_threshold: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QLearningConfig::default();
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.default_value, 10.0);
        assert_eq!(config.initial_exploration, 1.0);
        assert_eq!(config.min_exploration, 0.01);
        assert_eq!(config.exploration_decay, 0.995);
        assert_eq!(config.loop_threshold, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_creates_default() {
        assert_eq!(QLearningConfig::new(), QLearningConfig::default());
    }

    #[test]
    fn test_validation_alpha_out_of_range() {
        let mut config = QLearningConfig::default();
        config.alpha = 0.0;
        assert!(config.validate().is_err());

        config.alpha = 1.5;
        assert!(config.validate().is_err());

        config.alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let mut config = QLearningConfig::default();
        config.gamma = 1.5;
        assert!(config.validate().is_err());

        config.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_exploration_floor_must_be_positive() {
        let mut config = QLearningConfig::default();
        config.min_exploration = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_initial_below_floor() {
        let mut config = QLearningConfig::default();
        config.min_exploration = 0.5;
        config.initial_exploration = 0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_decay() {
        let mut config = QLearningConfig::default();
        config.exploration_decay = 0.0;
        assert!(config.validate().is_err());

        config.exploration_decay = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_nan_default_value() {
        let mut config = QLearningConfig::default();
        config.default_value = f64::NAN;
        assert!(config.validate().is_err());
    }
}
