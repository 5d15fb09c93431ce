//! Training statistics tracking for Q-learning
//!
//! This module keeps rolling windows of episode rewards, lengths and final
//! snake sizes, plus run-wide totals, for the periodic progress lines of a
//! training run.

use std::collections::VecDeque;

use crate::rl::EpisodeReport;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use q_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(25.0, 150, 6);
/// stats.set_exploration_rate(0.5);
///
/// assert_eq!(stats.best_size(), 6);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f64>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Final snake sizes (rolling window)
    final_sizes: VecDeque<usize>,

    /// Largest final size seen in the run
    best_size: usize,

    /// Latest exploration rate of the agent
    exploration_rate: f64,

    total_episodes: usize,
    total_steps: usize,
    total_loop_breaks: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            final_sizes: VecDeque::with_capacity(window_size),
            best_size: 0,
            exploration_rate: 1.0,
            total_episodes: 0,
            total_steps: 0,
            total_loop_breaks: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, reward: f64, length: usize, final_size: usize) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.final_sizes, final_size, self.window_size);
        self.best_size = self.best_size.max(final_size);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record an episode from the driver's report
    pub fn record_report(&mut self, report: &EpisodeReport) {
        self.record_episode(report.total_reward, report.steps, report.final_size);
        self.total_loop_breaks += report.loop_breaks;
    }

    pub fn set_exploration_rate(&mut self, rate: f64) {
        self.exploration_rate = rate;
    }

    /// Mean episode reward over the rolling window, 0.0 when empty
    pub fn mean_episode_reward(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f64>() / self.episode_rewards.len() as f64
        }
    }

    pub fn mean_episode_length(&self) -> f64 {
        Self::mean_count(&self.episode_lengths)
    }

    pub fn mean_final_size(&self) -> f64 {
        Self::mean_count(&self.final_sizes)
    }

    /// Best reward in the current window
    pub fn max_episode_reward(&self) -> Option<f64> {
        self.episode_rewards.iter().copied().reduce(f64::max)
    }

    pub fn best_size(&self) -> usize {
        self.best_size
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn total_loop_breaks(&self) -> usize {
        self.total_loop_breaks
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the current statistics
    ///
    /// ```text
    /// Episodes: 1 | Steps: 150 | Reward: 25.00 | Size: 6.00 | Best: 6 | Len: 150.0 | Eps: 0.5000
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Size: {:.2} | Best: {} | Len: {:.1} | Eps: {:.4}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_final_size(),
            self.best_size,
            self.mean_episode_length(),
            self.exploration_rate,
        )
    }

    fn mean_count(deque: &VecDeque<usize>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<usize>() as f64 / deque.len() as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
        assert_eq!(stats.max_episode_reward(), None);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(10.0, 50, 5);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert!((stats.mean_episode_reward() - 10.0).abs() < 1e-9);
        assert!((stats.mean_episode_length() - 50.0).abs() < 1e-9);
        assert!((stats.mean_final_size() - 5.0).abs() < 1e-9);
        assert_eq!(stats.best_size(), 5);
    }

    #[test]
    fn test_record_report() {
        let mut stats = TrainingStats::new(10);
        let report = EpisodeReport {
            total_reward: -5.0,
            steps: 12,
            final_size: 3,
            cause: None,
            loop_breaks: 2,
        };

        stats.record_report(&report);
        stats.record_report(&report);

        assert_eq!(stats.total_steps(), 24);
        assert_eq!(stats.total_loop_breaks(), 4);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_episode(1.0, 10, 4);
        stats.record_episode(2.0, 20, 5);
        stats.record_episode(3.0, 30, 6);
        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-9);

        // A 4th episode evicts the first
        stats.record_episode(4.0, 40, 2);

        assert_eq!(stats.total_episodes(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-9);
        assert_eq!(stats.max_episode_reward(), Some(4.0));
        // Best size survives eviction
        assert_eq!(stats.best_size(), 6);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(25.0, 150, 6);
        stats.set_exploration_rate(0.5);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 150"));
        assert!(summary.contains("Reward: 25.00"));
        assert!(summary.contains("Size: 6.00"));
        assert!(summary.contains("Best: 6"));
        assert!(summary.contains("Len: 150.0"));
        assert!(summary.contains("Eps: 0.5000"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.mean_final_size(), 0.0);
    }
}
