//! Watch mode for trained agents
//!
//! Loads a learned table and shows the greedy agent playing in the terminal,
//! with the loop breaker active. Episodes restart automatically.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::time::{Interval, interval};
use tracing::info;

use crate::game::{Direction, EngineError, GameConfig};
use crate::input::{InputHandler, KeyAction, PlaybackSpeed};
use crate::metrics::GameMetrics;
use crate::render::{HudInfo, Renderer};
use crate::rl::{LoopGuard, Observation, QAgent, SnakeEnvironment, TableMetadata, load_agent};

use super::terminal::{TuiTerminal, cleanup_terminal, setup_terminal};

pub struct WatchMode {
    agent: QAgent,
    env: SnakeEnvironment,
    guard: LoopGuard,
    renderer: Renderer,
    input_handler: InputHandler,
    metrics: GameMetrics,
    metadata: TableMetadata,
    should_quit: bool,
    paused: bool,
    speed: PlaybackSpeed,
    episode_count: usize,
    last_direction: Option<Direction>,
}

impl WatchMode {
    /// Load the table at `table_path` and prepare a fresh environment
    pub fn new(table_path: &Path, config: GameConfig, loop_threshold: Option<usize>) -> Result<Self> {
        let (agent, metadata) = load_agent(table_path)
            .with_context(|| format!("Failed to load table from {:?}", table_path))?;

        info!(
            path = %table_path.display(),
            entries = agent.table().len(),
            episodes_trained = metadata.episodes_trained,
            "Loaded table for watching"
        );

        let threshold = loop_threshold.unwrap_or(metadata.q_config.loop_threshold);
        let env = SnakeEnvironment::new(config)?;

        Ok(Self {
            agent,
            env,
            guard: LoopGuard::new(threshold),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metrics: GameMetrics::new(),
            metadata,
            should_quit: false,
            paused: false,
            speed: PlaybackSpeed::Normal,
            episode_count: 0,
            last_direction: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.run_watch_loop(&mut terminal).await;
        cleanup_terminal(&mut terminal)?;

        println!(
            "Watched {} episodes, best size {} ({} episodes trained)",
            self.metrics.episodes_played, self.metrics.best_size, self.metadata.episodes_trained
        );
        result
    }

    async fn run_watch_loop(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        let mut obs = self.restart()?;
        let mut done = false;

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        if self.handle_event(event, &mut tick_timer) {
                            obs = self.restart()?;
                            done = false;
                        }
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        if done {
                            obs = self.restart()?;
                            done = false;
                        } else {
                            let (next, finished) = self.step_agent(&obs)?;
                            obs = next;
                            done = finished;
                        }
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let hud = self.hud();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.env.world(), &hud);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn restart(&mut self) -> Result<Observation, EngineError> {
        self.guard.reset();
        self.metrics.on_episode_start();
        self.episode_count += 1;
        self.last_direction = None;
        self.env.reset()
    }

    /// Greedy step with the loop breaker, returns the new observation and
    /// whether the episode ended
    fn step_agent(&mut self, obs: &Observation) -> Result<(Observation, bool)> {
        let action = self.agent.greedy_action(obs);
        let mut direction =
            Direction::from_index(action).ok_or(EngineError::InvalidAction(action))?;

        let snake = self.env.world().snake().ok_or(EngineError::MissingAgent)?;
        let looping = self.guard.observe(snake, action);
        if looping {
            direction = self.guard.break_loop(self.env.world(), direction);
        }

        let (next, result) = self.env.step_direction(direction)?;
        self.metrics.on_step(looping);
        self.last_direction = Some(direction);

        if result.is_terminal() {
            self.metrics.on_episode_end(self.env.snake_size());
        }

        Ok((next, result.is_terminal()))
    }

    /// Returns true when the episode should restart
    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Restart => return true,
            KeyAction::Speed(speed) => {
                self.speed = speed;
                tick_timer.reset_after(speed.tick_interval());
            }
            KeyAction::Move(_) | KeyAction::None => {}
        }

        false
    }

    fn hud(&self) -> HudInfo {
        HudInfo {
            title: "Watch".to_string(),
            episode: self.episode_count,
            steps: self.metrics.steps,
            best_size: self.metrics.best_size,
            time: self.metrics.format_time(),
            speed: self.speed.as_str().to_string(),
            paused: self.paused,
            loop_breaks: self.metrics.loop_breaks,
            direction: self.last_direction,
        }
    }
}
