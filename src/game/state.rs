use super::action::Direction;
use super::world::World;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Direction leading from self to an adjacent position
    pub fn direction_to(&self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.moved_in_direction(*d) == other)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalCause {
    /// Snake hit a wall
    Wall,
    /// Snake hit its own body
    SelfCollision,
    /// A detrimental item would have removed the last body segment
    Starvation,
}

/// The snake: a head plus neck-first trailing segments
///
/// The head is never stored in `segments`; `segments[0]` is adjacent to the
/// head and the back of the deque is the tail.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    head: Position,
    segments: VecDeque<Position>,
    last_direction: Direction,
    death: Option<TerminalCause>,
}

impl Snake {
    /// Create a straight snake whose segments trail behind the head
    pub fn new(head: Position, direction: Direction, segments: usize) -> Self {
        let back = direction.opposite();
        let mut body = VecDeque::with_capacity(segments);
        let mut cursor = head;

        for _ in 0..segments {
            cursor = cursor.moved_in_direction(back);
            body.push_back(cursor);
        }

        Self {
            head,
            segments: body,
            last_direction: direction,
            death: None,
        }
    }

    /// Rebuild a snake from an explicit layout (replays, tests)
    pub fn from_parts(
        head: Position,
        segments: impl IntoIterator<Item = Position>,
        last_direction: Direction,
    ) -> Self {
        Self {
            head,
            segments: segments.into_iter().collect(),
            last_direction,
            death: None,
        }
    }

    /// Spawn a snake inside `world` with its segments trailing behind `head`
    ///
    /// Each segment is first tried straight behind the previous cell; when that
    /// cell is blocked the other adjacent cells are tried in random order. When
    /// nothing is free the last placed cell is duplicated, which leaves a
    /// degenerate but usable body on near-full grids.
    pub fn spawn<R: Rng + ?Sized>(
        world: &World,
        head: Position,
        heading: Direction,
        segments: usize,
        rng: &mut R,
    ) -> Self {
        let mut body: VecDeque<Position> = VecDeque::with_capacity(segments);
        let mut cursor = head;
        let mut step = heading.opposite();

        for _ in 0..segments {
            let mut candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| *d != step)
                .collect();
            candidates.shuffle(rng);
            candidates.insert(0, step);

            let placement = candidates
                .into_iter()
                .map(|d| (d, cursor.moved_in_direction(d)))
                .find(|(_, p)| *p != head && !body.contains(p) && world.location(*p).is_empty());

            match placement {
                Some((direction, pos)) => {
                    body.push_back(pos);
                    cursor = pos;
                    step = direction;
                }
                None => body.push_back(cursor),
            }
        }

        Self {
            head,
            segments: body,
            last_direction: heading,
            death: None,
        }
    }

    /// Relocate the head and rebuild the segments from scratch
    ///
    /// The body is regrown as a random walk from the new head that never
    /// doubles back on its previous step and only enters empty cells. A
    /// direction that leads nowhere is discarded and another one tried; when
    /// all are exhausted the body stays shorter than before. The snake ends up
    /// facing away from its neck.
    pub fn teleport<R: Rng + ?Sized>(&mut self, world: &World, head: Position, rng: &mut R) {
        let target = self.segments.len();
        let mut body: VecDeque<Position> = VecDeque::with_capacity(target);
        let mut cursor = head;
        let mut previous: Option<Direction> = None;

        for _ in 0..target {
            let mut candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| previous.map_or(true, |p| p.opposite() != *d))
                .collect();
            let mut placed = false;

            while !candidates.is_empty() {
                let direction = candidates.swap_remove(rng.gen_range(0..candidates.len()));
                let pos = cursor.moved_in_direction(direction);

                if pos != head && !body.contains(&pos) && world.location(pos).is_empty() {
                    body.push_back(pos);
                    cursor = pos;
                    previous = Some(direction);
                    placed = true;
                    break;
                }
            }

            if !placed {
                break;
            }
        }

        if let Some(facing) = body.front().and_then(|neck| neck.direction_to(head)) {
            self.last_direction = facing;
        }
        self.head = head;
        self.segments = body;
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.head
    }

    /// Get the tail position, if the snake has any segment
    pub fn tail(&self) -> Option<Position> {
        self.segments.back().copied()
    }

    /// Get body segments (excluding head), neck first
    pub fn segments(&self) -> &VecDeque<Position> {
        &self.segments
    }

    /// Direction of the last successful move
    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    /// Head plus segments
    pub fn size(&self) -> usize {
        1 + self.segments.len()
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.segments.contains(&pos)
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    /// Cause of death, if the snake is dead
    pub fn death(&self) -> Option<TerminalCause> {
        self.death
    }

    pub(crate) fn kill(&mut self, cause: TerminalCause) {
        self.death = Some(cause);
    }

    /// Append one segment beyond the tail, extruded along the last direction
    pub fn grow(&mut self) {
        let anchor = self.tail().unwrap_or(self.head);
        self.segments
            .push_back(anchor.moved_in_direction(self.last_direction));
    }

    /// Remove the tail segment
    ///
    /// Returns false without touching the body when there is no segment left
    /// to remove.
    pub fn shrink(&mut self) -> bool {
        self.segments.pop_back().is_some()
    }

    /// Move the head to `new_head`, dragging the segments along
    pub fn advance(&mut self, new_head: Position, direction: Direction) {
        self.segments.push_front(self.head);
        self.segments.pop_back();
        self.head = new_head;
        self.last_direction = direction;
    }
}
