//! Loop detection for greedy play
//!
//! A deterministic policy can cycle forever through the same configurations.
//! The guard remembers every (head, body, action) it has seen and, once the
//! same configurations keep coming back, overrides a single step with a
//! random safe direction. The learned table is never touched.

use std::collections::HashSet;

use crate::game::{Direction, Position, Snake, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

type Configuration = (Position, Vec<Position>, usize);

pub struct LoopGuard {
    threshold: usize,
    seen: HashSet<Configuration>,
    repeats: usize,
    rng: StdRng,
}

impl LoopGuard {
    pub fn new(threshold: usize) -> Self {
        Self::with_rng(threshold, StdRng::from_entropy())
    }

    pub fn with_seed(threshold: usize, seed: u64) -> Self {
        Self::with_rng(threshold, StdRng::seed_from_u64(seed))
    }

    fn with_rng(threshold: usize, rng: StdRng) -> Self {
        Self {
            threshold,
            seen: HashSet::new(),
            repeats: 0,
            rng,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Consecutive repeats counted so far
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Forget all history, called at the start of each episode
    pub fn reset(&mut self) {
        self.seen.clear();
        self.repeats = 0;
    }

    /// Record the configuration about to be played
    ///
    /// Returns true once repeats exceed the threshold. A configuration not
    /// seen before resets the counter.
    pub fn observe(&mut self, snake: &Snake, action: usize) -> bool {
        let configuration = (
            snake.head(),
            snake.segments().iter().copied().collect::<Vec<_>>(),
            action,
        );

        if self.seen.contains(&configuration) {
            self.repeats += 1;
        } else {
            self.repeats = 0;
            self.seen.insert(configuration);
        }

        self.repeats > self.threshold
    }

    /// Pick a direction other than `current` that leads to an open cell
    ///
    /// Walls, body segments and items all rule a direction out. The reverse
    /// of the snake's last move is only used when nothing else is open, and
    /// when no direction is open at all the opposite of `current` is returned.
    pub fn break_loop(&mut self, world: &World, current: Direction) -> Direction {
        let Some(snake) = world.snake() else {
            return current.opposite();
        };

        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| *d != current)
            .filter(|d| world.location(snake.head().moved_in_direction(*d)).is_empty())
            .collect();

        let forward: Vec<Direction> = open
            .iter()
            .copied()
            .filter(|d| !d.is_opposite(snake.last_direction()))
            .collect();

        let pool = if forward.is_empty() { &open } else { &forward };
        let choice = pool
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_else(|| current.opposite());

        debug!(?current, ?choice, repeats = self.repeats, "Breaking policy loop");
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Item;

    fn world_with(snake: Snake) -> World {
        let mut world = World::new(10, 10);
        world.add(snake);
        world
    }

    #[test]
    fn test_detects_repeats_after_threshold() {
        let mut guard = LoopGuard::with_seed(2, 1);
        let snake = Snake::new(Position::new(5, 5), Direction::East, 3);

        assert!(!guard.observe(&snake, 0));
        assert!(!guard.observe(&snake, 0));
        assert!(!guard.observe(&snake, 0));
        assert!(guard.observe(&snake, 0));
        assert_eq!(guard.repeats(), 3);
    }

    #[test]
    fn test_new_configuration_resets_counter() {
        let mut guard = LoopGuard::with_seed(1, 1);
        let snake = Snake::new(Position::new(5, 5), Direction::East, 3);

        guard.observe(&snake, 0);
        guard.observe(&snake, 0);
        assert_eq!(guard.repeats(), 1);

        guard.observe(&snake, 2);
        assert_eq!(guard.repeats(), 0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut guard = LoopGuard::with_seed(0, 1);
        let snake = Snake::new(Position::new(5, 5), Direction::East, 3);
        guard.observe(&snake, 0);
        assert!(guard.observe(&snake, 0));

        guard.reset();
        assert!(!guard.observe(&snake, 0));
    }

    #[test]
    fn test_break_loop_avoids_current_and_collisions() {
        let mut guard = LoopGuard::with_seed(15, 9);
        // Heading east along the top wall: north is a wall, west is the neck
        let world = world_with(Snake::new(Position::new(5, 1), Direction::East, 3));

        for _ in 0..50 {
            assert_eq!(guard.break_loop(&world, Direction::East), Direction::South);
        }
    }

    #[test]
    fn test_break_loop_steers_around_items() {
        let mut guard = LoopGuard::with_seed(15, 9);
        let mut world = world_with(Snake::new(Position::new(5, 5), Direction::East, 3));
        // Neck to the west, a detrimental item to the north, south is open
        world.add(Item::detrimental(-15.0).at(Position::new(5, 4)));

        for _ in 0..200 {
            assert_eq!(guard.break_loop(&world, Direction::East), Direction::South);
        }
    }

    #[test]
    fn test_break_loop_falls_back_when_only_items_remain() {
        let mut guard = LoopGuard::with_seed(15, 9);
        let mut world = world_with(Snake::new(Position::new(1, 1), Direction::North, 3));
        // Walls north and west, body south, an item east
        world.add(Item::beneficial(10.0).at(Position::new(2, 1)));

        assert_eq!(guard.break_loop(&world, Direction::North), Direction::South);
    }

    #[test]
    fn test_break_loop_never_reverses_with_alternatives() {
        let mut guard = LoopGuard::with_seed(15, 4);
        // A bare head has no neck to block the reverse move
        let world = world_with(Snake::from_parts(Position::new(5, 5), vec![], Direction::East));

        for _ in 0..100 {
            let choice = guard.break_loop(&world, Direction::East);
            assert_ne!(choice, Direction::East);
            assert_ne!(choice, Direction::West);
        }
    }

    #[test]
    fn test_break_loop_falls_back_to_opposite() {
        let mut guard = LoopGuard::with_seed(15, 4);
        // Boxed into the corner by walls and its own body
        let world = world_with(Snake::from_parts(
            Position::new(1, 1),
            vec![Position::new(2, 1), Position::new(2, 2), Position::new(1, 2)],
            Direction::North,
        ));

        assert_eq!(guard.break_loop(&world, Direction::North), Direction::South);
    }
}
