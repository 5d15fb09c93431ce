use serde::{Deserialize, Serialize};

use crate::game::{Direction, Entity, ItemKind, Position, World};

/// Number of flags in an observation: three per cardinal direction
pub const OBSERVATION_SIZE: usize = 12;

/// What a ray cast from the head stopped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayHit {
    /// Wall or own body
    Obstacle,
    Beneficial,
    Detrimental,
}

/// Fixed-size perception of the snake
///
/// For each direction in action order (North, South, East, West) three flags
/// are stored: obstacle, beneficial item, detrimental item. Exactly one flag
/// of each triple is set, describing the first thing the ray from the head
/// hits. This is the only input the policy sees, and its layout is the key
/// space of the learned table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Observation([bool; OBSERVATION_SIZE]);

impl Observation {
    pub fn from_flags(flags: [bool; OBSERVATION_SIZE]) -> Self {
        Self(flags)
    }

    pub fn flags(&self) -> &[bool; OBSERVATION_SIZE] {
        &self.0
    }

    /// The (obstacle, beneficial, detrimental) triple seen in `direction`
    pub fn towards(&self, direction: Direction) -> [bool; 3] {
        let base = direction.index() * 3;
        [self.0[base], self.0[base + 1], self.0[base + 2]]
    }

    /// Flags as 0.0 / 1.0 features for numeric policies
    pub fn to_features(&self) -> Vec<f32> {
        self.0.iter().map(|&f| if f { 1.0 } else { 0.0 }).collect()
    }

    /// Compact `0`/`1` string used by the persisted table
    pub fn to_key(&self) -> String {
        self.0.iter().map(|&f| if f { '1' } else { '0' }).collect()
    }

    /// Parse a key produced by [`Observation::to_key`]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.chars().count() != OBSERVATION_SIZE {
            return None;
        }
        let mut flags = [false; OBSERVATION_SIZE];
        for (flag, c) in flags.iter_mut().zip(key.chars()) {
            *flag = match c {
                '1' => true,
                '0' => false,
                _ => return None,
            };
        }
        Some(Self(flags))
    }
}

/// Encode the world as seen from the snake head
///
/// A world without a snake encodes to the all-false observation.
pub fn create_observation(world: &World) -> Observation {
    let Some(snake) = world.snake() else {
        return Observation::default();
    };

    let mut flags = [false; OBSERVATION_SIZE];
    for direction in Direction::ALL {
        let offset = match cast_ray(world, snake.head(), direction) {
            RayHit::Obstacle => 0,
            RayHit::Beneficial => 1,
            RayHit::Detrimental => 2,
        };
        flags[direction.index() * 3 + offset] = true;
    }

    Observation(flags)
}

/// Walk from `origin` in `direction` until something blocks the view
pub fn cast_ray(world: &World, origin: Position, direction: Direction) -> RayHit {
    let mut cursor = origin.moved_in_direction(direction);

    loop {
        if world.grid().is_wall(cursor) {
            return RayHit::Obstacle;
        }

        match world.occupant_at(cursor) {
            Some((_, Entity::Snake(_))) => return RayHit::Obstacle,
            Some((_, Entity::Item(item))) => {
                return match item.kind() {
                    ItemKind::Beneficial => RayHit::Beneficial,
                    ItemKind::Detrimental => RayHit::Detrimental,
                };
            }
            None => cursor = cursor.moved_in_direction(direction),
        }
    }
}

/// Symbol shown in the cross-shaped view of the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Wall,
    Beneficial,
    Detrimental,
    Head,
    Body,
}

impl CellView {
    pub fn symbol(&self) -> char {
        match self {
            CellView::Wall => '*',
            CellView::Beneficial => '.',
            CellView::Detrimental => '~',
            CellView::Head => 'H',
            CellView::Body => 'S',
        }
    }
}

/// What the snake can see: its head row and column, everything else `None`
///
/// The returned grid covers the full addressable area including walls,
/// indexed as `view[y][x]`.
pub fn snake_view(world: &World) -> Vec<Vec<Option<CellView>>> {
    let width = world.grid().total_width();
    let height = world.grid().total_height();
    let mut view = vec![vec![None; width]; height];

    let Some(snake) = world.snake() else {
        return view;
    };
    let head = snake.head();

    let describe = |pos: Position| -> Option<CellView> {
        if world.grid().is_wall(pos) {
            return Some(CellView::Wall);
        }
        match world.occupant_at(pos) {
            Some((_, Entity::Item(item))) => Some(match item.kind() {
                ItemKind::Beneficial => CellView::Beneficial,
                ItemKind::Detrimental => CellView::Detrimental,
            }),
            Some((_, Entity::Snake(s))) if s.head() == pos => Some(CellView::Head),
            Some((_, Entity::Snake(_))) => Some(CellView::Body),
            None => None,
        }
    };

    if let Ok(row) = usize::try_from(head.y) {
        if row < height {
            for x in 0..width {
                view[row][x] = describe(Position::new(x as i32, head.y));
            }
        }
    }
    if let Ok(col) = usize::try_from(head.x) {
        if col < width {
            for (y, line) in view.iter_mut().enumerate() {
                line[col] = describe(Position::new(head.x, y as i32));
            }
        }
    }

    view
}
