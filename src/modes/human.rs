//! Human mode: play the grid yourself, one move per key press

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::interval;

use crate::game::{Direction, GameConfig, GameEngine, World};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{HudInfo, Renderer};

use super::terminal::{TuiTerminal, cleanup_terminal, setup_terminal};

pub struct HumanMode {
    engine: GameEngine,
    world: World,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    last_direction: Option<Direction>,
    total_reward: f64,
}

impl HumanMode {
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut engine = GameEngine::new(config)?;
        let world = engine.reset()?;

        Ok(Self {
            engine,
            world,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            last_direction: None,
            total_reward: 0.0,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.run_game_loop(&mut terminal).await;
        cleanup_terminal(&mut terminal)?;
        result
    }

    async fn run_game_loop(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let hud = self.hud();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.world, &hud);
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

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Move(direction) => self.move_snake(direction)?,
                KeyAction::Restart => self.reset_game()?,
                KeyAction::Quit => self.should_quit = true,
                KeyAction::Pause | KeyAction::Speed(_) | KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn move_snake(&mut self, direction: Direction) -> Result<()> {
        if !self.world.snake().is_some_and(|s| s.is_alive()) {
            return Ok(());
        }

        let result = self.engine.step(&mut self.world, direction)?;
        self.total_reward += result.reward;
        self.last_direction = Some(direction);
        self.metrics.on_step(false);

        if result.is_terminal() {
            self.metrics.on_episode_end(result.info.size);
        }

        Ok(())
    }

    fn reset_game(&mut self) -> Result<()> {
        self.engine.reset_world(&mut self.world)?;
        self.metrics.on_episode_start();
        self.last_direction = None;
        self.total_reward = 0.0;
        Ok(())
    }

    fn hud(&self) -> HudInfo {
        HudInfo {
            title: format!("Snake | Reward {:.0}", self.total_reward),
            episode: self.metrics.episodes_played as usize + 1,
            steps: self.metrics.steps,
            best_size: self.metrics.best_size,
            time: self.metrics.format_time(),
            speed: "Manual".to_string(),
            paused: false,
            loop_breaks: 0,
            direction: self.last_direction,
        }
    }
}
