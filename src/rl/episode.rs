//! Episode driver
//!
//! One episode runs from a world reset to a terminal condition (or an optional
//! step cap): perceive, pick an action, move, and in training update the
//! table from the observed transition. Terminal conditions end the episode
//! normally; only engine errors abort it.

use super::{
    agent::QAgent, environment::SnakeEnvironment, loop_guard::LoopGuard, replay::ReplayRecorder,
};
use crate::game::{Direction, EngineError, TerminalCause};
use tracing::{debug, trace};

/// Outcome of a finished episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    pub total_reward: f64,
    pub steps: usize,
    /// Snake size when the episode ended (head included)
    pub final_size: usize,
    /// `None` when the step cap ended the episode
    pub cause: Option<TerminalCause>,
    /// Steps where the loop guard overrode the policy
    pub loop_breaks: usize,
}

impl EpisodeReport {
    fn new() -> Self {
        Self {
            total_reward: 0.0,
            steps: 0,
            final_size: 0,
            cause: None,
            loop_breaks: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.cause.is_some()
    }
}

fn reached_cap(steps: usize, max_steps: Option<usize>) -> bool {
    max_steps.is_some_and(|cap| steps >= cap)
}

/// Play one epsilon-greedy episode and learn from every transition
///
/// The exploration rate decays once when the episode is over.
pub fn run_training_episode(
    env: &mut SnakeEnvironment,
    agent: &mut QAgent,
    max_steps: Option<usize>,
) -> Result<EpisodeReport, EngineError> {
    let mut report = EpisodeReport::new();
    let mut state = env.reset()?;

    while !reached_cap(report.steps, max_steps) {
        let action = agent.act(&state);
        let direction = Direction::from_index(action).ok_or(EngineError::InvalidAction(action))?;
        let (next_state, result) = env.step_direction(direction)?;

        report.steps += 1;
        report.total_reward += result.reward;

        if let Some(cause) = result.terminal_cause() {
            agent.update_terminal(state, action, result.reward);
            report.cause = Some(cause);
            break;
        }

        agent.update(state, action, result.reward, &next_state);
        trace!(step = report.steps, %direction, reward = result.reward, "Training step");
        state = next_state;
    }

    report.final_size = env.snake_size();
    agent.end_episode();

    debug!(
        episode = agent.episodes_trained(),
        reward = report.total_reward,
        steps = report.steps,
        size = report.final_size,
        exploration = agent.exploration_rate(),
        "Training episode finished"
    );

    Ok(report)
}

/// Play one greedy episode without learning
///
/// The loop guard can override a single step when the policy keeps revisiting
/// the same configurations. When a recorder is given every step is captured
/// before it is played.
pub fn run_inference_episode(
    env: &mut SnakeEnvironment,
    agent: &mut QAgent,
    guard: &mut LoopGuard,
    mut recorder: Option<&mut ReplayRecorder>,
    max_steps: Option<usize>,
) -> Result<EpisodeReport, EngineError> {
    let mut report = EpisodeReport::new();
    let mut state = env.reset()?;
    guard.reset();

    while !reached_cap(report.steps, max_steps) {
        let action = agent.select_action(&state, 0.0);
        let mut direction =
            Direction::from_index(action).ok_or(EngineError::InvalidAction(action))?;

        let snake = env.world().snake().ok_or(EngineError::MissingAgent)?;
        if guard.observe(snake, action) {
            direction = guard.break_loop(env.world(), direction);
            report.loop_breaks += 1;
        }

        if let Some(recorder) = recorder.as_deref_mut() {
            recorder.record(env.world(), direction);
        }

        let (next_state, result) = env.step_direction(direction)?;
        report.steps += 1;
        report.total_reward += result.reward;

        if let Some(cause) = result.terminal_cause() {
            report.cause = Some(cause);
            break;
        }

        state = next_state;
    }

    if let Some(recorder) = recorder {
        recorder.finish_episode();
    }

    report.final_size = env.snake_size();
    debug!(
        steps = report.steps,
        size = report.final_size,
        loop_breaks = report.loop_breaks,
        cause = ?report.cause,
        "Inference episode finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::rl::QLearningConfig;

    fn setup(seed: u64) -> (SnakeEnvironment, QAgent) {
        let env = SnakeEnvironment::with_seed(GameConfig::default(), seed).unwrap();
        let agent = QAgent::with_seed(QLearningConfig::default(), seed).unwrap();
        (env, agent)
    }

    #[test]
    fn test_training_episode_ends_and_learns() {
        let (mut env, mut agent) = setup(11);

        let report = run_training_episode(&mut env, &mut agent, Some(10_000)).unwrap();

        assert!(report.steps > 0);
        assert!(report.final_size >= 1);
        assert!(!agent.table().is_empty());
        assert_eq!(agent.episodes_trained(), 1);
        assert!(agent.exploration_rate() < 1.0);
    }

    #[test]
    fn test_step_cap() {
        let (mut env, mut agent) = setup(12);

        let report = run_training_episode(&mut env, &mut agent, Some(1)).unwrap();

        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_training_reports_terminal_cause() {
        let (mut env, mut agent) = setup(13);

        let report = run_training_episode(&mut env, &mut agent, None).unwrap();

        assert!(report.is_terminal());
    }

    #[test]
    fn test_inference_does_not_learn() {
        let (mut env, mut agent) = setup(14);
        let mut guard = LoopGuard::with_seed(15, 14);

        let report =
            run_inference_episode(&mut env, &mut agent, &mut guard, None, Some(2_000)).unwrap();

        assert!(report.steps > 0);
        assert!(agent.table().is_empty());
        assert_eq!(agent.episodes_trained(), 0);
    }

    #[test]
    fn test_inference_records_every_step() {
        let (mut env, mut agent) = setup(15);
        let mut guard = LoopGuard::with_seed(15, 15);
        let mut recorder = ReplayRecorder::new();

        let report = run_inference_episode(
            &mut env,
            &mut agent,
            &mut guard,
            Some(&mut recorder),
            Some(500),
        )
        .unwrap();

        assert_eq!(recorder.episodes().len(), 1);
        assert_eq!(recorder.episodes()[0].len(), report.steps);
    }
}
