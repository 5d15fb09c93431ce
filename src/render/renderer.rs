use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Direction, Entity, ItemKind, Position, World};
use crate::rl::{CellView, create_observation, snake_view};

/// Status shown in the header around the grid
#[derive(Debug, Clone, Default)]
pub struct HudInfo {
    pub title: String,
    pub episode: usize,
    pub steps: usize,
    pub best_size: usize,
    pub time: String,
    pub speed: String,
    pub paused: bool,
    pub loop_breaks: usize,
    /// Direction chosen for the step on screen
    pub direction: Option<Direction>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, world: &World, hud: &HudInfo) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(world, hud), chunks[0]);

        let body = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        let alive = world.snake().is_some_and(|s| s.is_alive());
        if alive {
            frame.render_widget(self.render_grid(world, &hud.title), body[0]);
        } else {
            frame.render_widget(self.render_game_over(world), body[0]);
        }
        frame.render_widget(self.render_vision(world), body[1]);

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn cell_span(&self, world: &World, pos: Position) -> Span<'static> {
        if world.grid().is_wall(pos) {
            return Span::styled("██", Style::default().fg(Color::Gray));
        }

        match world.occupant_at(pos) {
            Some((_, Entity::Snake(snake))) if snake.head() == pos => Span::styled(
                "■ ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Some((_, Entity::Snake(_))) => Span::styled("□ ", Style::default().fg(Color::Blue)),
            Some((_, Entity::Item(item))) => match item.kind() {
                ItemKind::Beneficial => Span::styled(
                    "● ",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                ItemKind::Detrimental => Span::styled(
                    "● ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            },
            None => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        }
    }

    fn render_grid(&self, world: &World, title: &str) -> Paragraph<'static> {
        let lines: Vec<Line> = (0..world.grid().total_height())
            .map(|y| {
                let spans: Vec<Span> = (0..world.grid().total_width())
                    .map(|x| self.cell_span(world, Position::new(x as i32, y as i32)))
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(format!(" {} ", title)),
            )
            .alignment(Alignment::Center)
    }

    /// What the policy sees: the head's row and column, and the flag triples
    fn render_vision(&self, world: &World) -> Paragraph<'static> {
        let mut lines: Vec<Line> = snake_view(world)
            .into_iter()
            .map(|row| {
                let text: String = row
                    .into_iter()
                    .map(|cell| match cell {
                        Some(view) => format!("{} ", view.symbol()),
                        None => "  ".to_string(),
                    })
                    .collect();
                Line::from(Span::styled(text, Style::default().fg(Color::White)))
            })
            .collect();

        lines.push(Line::from(""));
        let observation = create_observation(world);
        for direction in Direction::ALL {
            let [obstacle, beneficial, detrimental] = observation.towards(direction);
            let (label, color) = if obstacle {
                ("obstacle", Color::Gray)
            } else if beneficial {
                ("beneficial", Color::Green)
            } else if detrimental {
                ("detrimental", Color::Red)
            } else {
                ("-", Color::DarkGray)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<6}", direction.name()), Style::default().fg(Color::Yellow)),
                Span::styled(label, Style::default().fg(color)),
            ]));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Vision "),
        )
    }

    fn render_stats(&self, world: &World, hud: &HudInfo) -> Paragraph<'static> {
        let size = world.snake().map(|s| s.size()).unwrap_or(0);
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled("Episode: ", label),
            Span::styled(hud.episode.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Size: ", label),
            Span::styled(size.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(hud.best_size.to_string(), value),
            Span::raw("    "),
            Span::styled("Steps: ", label),
            Span::styled(hud.steps.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(hud.time.clone(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(hud.speed.clone(), value),
        ];

        if let Some(direction) = hud.direction {
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Move: ", label));
            spans.push(Span::styled(direction.name(), value));
        }
        if hud.loop_breaks > 0 {
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Loop breaks: ", label));
            spans.push(Span::styled(hud.loop_breaks.to_string(), value));
        }
        if hud.paused {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, world: &World) -> Paragraph<'static> {
        let (size, cause) = world
            .snake()
            .map(|s| (s.size(), s.death()))
            .unwrap_or((0, None));
        let cause = cause.map(|c| format!("{:?}", c)).unwrap_or_default();

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Size: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    size.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Cause: ", Style::default().fg(Color::Yellow)),
                Span::styled(cause, Style::default().fg(Color::White)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("R", Style::default().fg(Color::Cyan)),
            Span::raw(" restart | "),
            Span::styled("1-4", Style::default().fg(Color::Cyan)),
            Span::raw(" speed | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text drawing of a world, one row per line
///
/// Used by the headless play mode when asked to show the final board.
pub fn world_to_text(world: &World) -> String {
    let mut out = String::new();
    for y in 0..world.grid().total_height() {
        for x in 0..world.grid().total_width() {
            let pos = Position::new(x as i32, y as i32);
            let c = if world.grid().is_wall(pos) {
                CellView::Wall.symbol()
            } else {
                match world.occupant_at(pos) {
                    Some((_, Entity::Snake(snake))) if snake.head() == pos => CellView::Head.symbol(),
                    Some((_, Entity::Snake(_))) => CellView::Body.symbol(),
                    Some((_, Entity::Item(item))) => match item.kind() {
                        ItemKind::Beneficial => 'G',
                        ItemKind::Detrimental => 'R',
                    },
                    None => ' ',
                }
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Item, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn world() -> World {
        let mut world = World::new(4, 3);
        world.add(Snake::new(Position::new(2, 2), Direction::East, 1));
        world.add(Item::beneficial(10.0).at(Position::new(4, 1)));
        world.add(Item::detrimental(-15.0).at(Position::new(4, 3)));
        world
    }

    #[test]
    fn test_world_to_text() {
        let text = world_to_text(&world());

        assert_eq!(text, "******\n*   G*\n*SH  *\n*   R*\n******\n");
    }

    #[test]
    fn test_render_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let hud = HudInfo {
            title: "Watch".to_string(),
            paused: true,
            direction: Some(Direction::East),
            ..Default::default()
        };

        terminal
            .draw(|frame| Renderer::new().render(frame, &world(), &hud))
            .unwrap();
    }

    #[test]
    fn test_render_game_over() {
        let mut world = world();
        world.snake_mut().unwrap().kill(crate::game::TerminalCause::Wall);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal
            .draw(|frame| Renderer::new().render(frame, &world, &HudInfo::default()))
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("GAME OVER"));
    }
}
