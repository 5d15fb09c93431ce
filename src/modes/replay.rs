//! Replay mode: TUI playback of a recorded replay file
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Restart the current episode
//! - Left/Right: Previous/next episode
//! - 1-4: Speed control
//! - Q/Esc: Quit

use anyhow::{Context, Result, bail};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::time::{Interval, interval};

use crate::game::{Direction, GameConfig, World};
use crate::input::{InputHandler, KeyAction, PlaybackSpeed};
use crate::metrics::GameMetrics;
use crate::render::{HudInfo, Renderer};
use crate::rl::{EpisodeRecord, load_replay};

use super::terminal::{TuiTerminal, cleanup_terminal, setup_terminal};

/// Cursor over the recorded episodes
#[derive(Debug)]
struct Playback {
    episodes: Vec<EpisodeRecord>,
    episode: usize,
    step: usize,
}

impl Playback {
    fn new(episodes: Vec<EpisodeRecord>, episode: usize) -> Self {
        Self {
            episodes,
            episode,
            step: 0,
        }
    }

    fn len(&self) -> usize {
        self.episodes.len()
    }

    fn current_len(&self) -> usize {
        self.episodes.get(self.episode).map(Vec::len).unwrap_or(0)
    }

    /// Advance one step, rolling over to the next episode; false once the
    /// last step of the last episode is shown
    fn advance(&mut self) -> bool {
        if self.step + 1 < self.current_len() {
            self.step += 1;
            true
        } else if self.episode + 1 < self.len() {
            self.episode += 1;
            self.step = 0;
            true
        } else {
            false
        }
    }

    fn jump(&mut self, offset: isize) {
        let last = self.len().saturating_sub(1) as isize;
        self.episode = (self.episode as isize + offset).clamp(0, last) as usize;
        self.step = 0;
    }

    fn restart_episode(&mut self) {
        self.step = 0;
    }

    fn world(&self, config: &GameConfig) -> Option<(World, Option<Direction>)> {
        let record = self.episodes.get(self.episode)?.get(self.step)?;
        Some((record.to_world(config), record.direction()))
    }
}

pub struct ReplayMode {
    playback: Playback,
    game_config: GameConfig,
    renderer: Renderer,
    input_handler: InputHandler,
    metrics: GameMetrics,
    should_quit: bool,
    paused: bool,
    speed: PlaybackSpeed,
}

impl ReplayMode {
    /// Load `path`; `episode` selects where playback starts
    pub fn new(path: &Path, game_config: GameConfig, episode: Option<usize>) -> Result<Self> {
        let episodes =
            load_replay(path).with_context(|| format!("Failed to load replay {:?}", path))?;
        if episodes.is_empty() {
            bail!("Replay {:?} contains no episodes", path);
        }

        let start = episode.unwrap_or(0);
        if start >= episodes.len() {
            bail!(
                "Episode {} out of range, replay has {} episodes",
                start,
                episodes.len()
            );
        }

        Ok(Self {
            playback: Playback::new(episodes, start),
            game_config,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metrics: GameMetrics::new(),
            should_quit: false,
            paused: false,
            speed: PlaybackSpeed::Slow,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.run_replay_loop(&mut terminal).await;
        cleanup_terminal(&mut terminal)?;
        result
    }

    async fn run_replay_loop(&mut self, terminal: &mut TuiTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(self.speed.tick_interval());
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer);
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused && !self.playback.advance() {
                        self.paused = true;
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    if let Some((world, direction)) = self.playback.world(&self.game_config) {
                        let hud = self.hud(direction);
                        terminal.draw(|frame| {
                            self.renderer.render(frame, &world, &hud);
                        }).context("Failed to draw frame")?;
                    }
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

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Restart => self.playback.restart_episode(),
            KeyAction::Move(Direction::East) => self.playback.jump(1),
            KeyAction::Move(Direction::West) => self.playback.jump(-1),
            KeyAction::Speed(speed) => {
                self.speed = speed;
                tick_timer.reset_after(speed.tick_interval());
            }
            KeyAction::Move(_) | KeyAction::None => {}
        }
    }

    fn hud(&self, direction: Option<Direction>) -> HudInfo {
        HudInfo {
            title: format!("Replay {}/{}", self.playback.episode + 1, self.playback.len()),
            episode: self.playback.episode,
            steps: self.playback.step + 1,
            best_size: 0,
            time: self.metrics.format_time(),
            speed: self.speed.as_str().to_string(),
            paused: self.paused,
            loop_breaks: 0,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Position, Snake};
    use crate::rl::ReplayRecorder;
    use tempfile::TempDir;

    fn recorded(dir: &TempDir, lengths: &[usize]) -> std::path::PathBuf {
        let mut world = World::new(10, 10);
        world.add(Snake::new(Position::new(5, 5), Direction::East, 3));
        let mut recorder = ReplayRecorder::new();
        for &len in lengths {
            for _ in 0..len {
                recorder.record(&world, Direction::East);
            }
            recorder.finish_episode();
        }
        let path = dir.path().join("replay.json");
        recorder.save(&path).unwrap();
        path
    }

    #[test]
    fn test_playback_rolls_over_episodes() {
        let dir = TempDir::new().unwrap();
        let path = recorded(&dir, &[2, 1]);
        let mut mode = ReplayMode::new(&path, GameConfig::default(), None).unwrap();

        assert!(mode.playback.advance());
        assert_eq!((mode.playback.episode, mode.playback.step), (0, 1));
        assert!(mode.playback.advance());
        assert_eq!((mode.playback.episode, mode.playback.step), (1, 0));
        assert!(!mode.playback.advance());
    }

    #[test]
    fn test_jump_is_clamped() {
        let dir = TempDir::new().unwrap();
        let path = recorded(&dir, &[1, 1, 1]);
        let mut mode = ReplayMode::new(&path, GameConfig::default(), Some(1)).unwrap();

        mode.playback.jump(5);
        assert_eq!(mode.playback.episode, 2);
        mode.playback.jump(-7);
        assert_eq!(mode.playback.episode, 0);
    }

    #[test]
    fn test_world_from_current_step() {
        let dir = TempDir::new().unwrap();
        let path = recorded(&dir, &[1]);
        let mode = ReplayMode::new(&path, GameConfig::default(), None).unwrap();

        let (world, direction) = mode.playback.world(&GameConfig::default()).unwrap();
        assert_eq!(world.snake().unwrap().head(), Position::new(5, 5));
        assert_eq!(direction, Some(Direction::East));
    }

    #[test]
    fn test_episode_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = recorded(&dir, &[1]);
        assert!(ReplayMode::new(&path, GameConfig::default(), Some(3)).is_err());
    }
}
