use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::game::Direction;

/// Playback speed of the TUI modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSpeed {
    /// 2 Hz (500ms per step)
    Slow,
    /// 8 Hz (125ms per step)
    Normal,
    /// 20 Hz (50ms per step)
    Fast,
    /// 60 Hz (16ms per step)
    VeryFast,
}

impl PlaybackSpeed {
    pub fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    Pause,
    Speed(PlaybackSpeed),
    Restart,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Up => KeyAction::Move(Direction::North),
            KeyCode::Down => KeyAction::Move(Direction::South),
            KeyCode::Left => KeyAction::Move(Direction::West),
            KeyCode::Right => KeyAction::Move(Direction::East),

            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Move(Direction::North),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Move(Direction::South),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Move(Direction::West),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Move(Direction::East),

            KeyCode::Char(' ') => KeyAction::Pause,
            KeyCode::Char('1') => KeyAction::Speed(PlaybackSpeed::Slow),
            KeyCode::Char('2') => KeyAction::Speed(PlaybackSpeed::Normal),
            KeyCode::Char('3') => KeyAction::Speed(PlaybackSpeed::Fast),
            KeyCode::Char('4') => KeyAction::Speed(PlaybackSpeed::VeryFast),

            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyAction {
        InputHandler::new().handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(press(KeyCode::Up), KeyAction::Move(Direction::North));
        assert_eq!(press(KeyCode::Down), KeyAction::Move(Direction::South));
        assert_eq!(press(KeyCode::Left), KeyAction::Move(Direction::West));
        assert_eq!(press(KeyCode::Right), KeyAction::Move(Direction::East));
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(press(KeyCode::Char('w')), KeyAction::Move(Direction::North));
        assert_eq!(press(KeyCode::Char('a')), KeyAction::Move(Direction::West));
        assert_eq!(press(KeyCode::Char('S')), KeyAction::Move(Direction::South));
        assert_eq!(press(KeyCode::Char('D')), KeyAction::Move(Direction::East));
    }

    #[test]
    fn test_playback_keys() {
        assert_eq!(press(KeyCode::Char(' ')), KeyAction::Pause);
        assert_eq!(press(KeyCode::Char('1')), KeyAction::Speed(PlaybackSpeed::Slow));
        assert_eq!(press(KeyCode::Char('4')), KeyAction::Speed(PlaybackSpeed::VeryFast));
        assert_eq!(press(KeyCode::Char('r')), KeyAction::Restart);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(press(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(press(KeyCode::Esc), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(InputHandler::new().handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(press(KeyCode::Char('x')), KeyAction::None);
    }

    #[test]
    fn test_speed_intervals() {
        assert_eq!(PlaybackSpeed::Slow.tick_interval(), Duration::from_millis(500));
        assert_eq!(PlaybackSpeed::Normal.tick_interval(), Duration::from_millis(125));
        assert_eq!(PlaybackSpeed::Fast.tick_interval(), Duration::from_millis(50));
        assert_eq!(PlaybackSpeed::VeryFast.tick_interval(), Duration::from_millis(16));
    }
}
