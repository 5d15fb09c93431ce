use super::state::{Position, Snake};
use serde::{Deserialize, Serialize};

/// Positional capability shared by everything placed on the grid
pub trait Occupant {
    /// Anchor position (the head for multi-cell entities)
    fn position(&self) -> Position;

    /// Every cell this entity covers
    fn occupied_cells(&self) -> Vec<Position>;

    /// Single-character tag used when drawing the world
    fn display_tag(&self) -> char;

    fn occupies(&self, pos: Position) -> bool {
        self.occupied_cells().contains(&pos)
    }
}

/// Stable handle of an entity registered in a [`World`](super::World)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// Effect of an item on the snake body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Grows the body by one segment
    Beneficial,
    /// Shrinks the body by one segment
    Detrimental,
}

/// A consumable, reward-bearing item occupying a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    position: Position,
    kind: ItemKind,
    reward: f64,
}

impl Item {
    pub fn new(kind: ItemKind, reward: f64) -> Self {
        Self {
            position: Position::new(0, 0),
            kind,
            reward,
        }
    }

    pub fn beneficial(reward: f64) -> Self {
        Self::new(ItemKind::Beneficial, reward)
    }

    pub fn detrimental(reward: f64) -> Self {
        Self::new(ItemKind::Detrimental, reward)
    }

    /// Same item placed at `position`
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn grows_body(&self) -> bool {
        self.kind == ItemKind::Beneficial
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl Occupant for Item {
    fn position(&self) -> Position {
        self.position
    }

    fn occupied_cells(&self) -> Vec<Position> {
        vec![self.position]
    }

    fn display_tag(&self) -> char {
        match self.kind {
            ItemKind::Beneficial => '.',
            ItemKind::Detrimental => '~',
        }
    }

    fn occupies(&self, pos: Position) -> bool {
        self.position == pos
    }
}

impl Occupant for Snake {
    fn position(&self) -> Position {
        self.head()
    }

    fn occupied_cells(&self) -> Vec<Position> {
        std::iter::once(self.head())
            .chain(self.segments().iter().copied())
            .collect()
    }

    fn display_tag(&self) -> char {
        '#'
    }

    fn occupies(&self, pos: Position) -> bool {
        self.head() == pos || self.collides_with_body(pos)
    }
}

/// Closed set of things that can live in the world
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Snake(Snake),
    Item(Item),
}

impl Entity {
    pub fn as_snake(&self) -> Option<&Snake> {
        match self {
            Entity::Snake(snake) => Some(snake),
            Entity::Item(_) => None,
        }
    }

    pub fn as_snake_mut(&mut self) -> Option<&mut Snake> {
        match self {
            Entity::Snake(snake) => Some(snake),
            Entity::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Entity::Item(item) => Some(item),
            Entity::Snake(_) => None,
        }
    }

    fn inner(&self) -> &dyn Occupant {
        match self {
            Entity::Snake(snake) => snake,
            Entity::Item(item) => item,
        }
    }
}

impl Occupant for Entity {
    fn position(&self) -> Position {
        self.inner().position()
    }

    fn occupied_cells(&self) -> Vec<Position> {
        self.inner().occupied_cells()
    }

    fn display_tag(&self) -> char {
        self.inner().display_tag()
    }

    fn occupies(&self, pos: Position) -> bool {
        self.inner().occupies(pos)
    }
}

impl From<Snake> for Entity {
    fn from(snake: Snake) -> Self {
        Entity::Snake(snake)
    }
}

impl From<Item> for Entity {
    fn from(item: Item) -> Self {
        Entity::Item(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    #[test]
    fn test_item_occupies_single_cell() {
        let item = Item::beneficial(10.0).at(Position::new(3, 4));
        assert_eq!(item.occupied_cells(), vec![Position::new(3, 4)]);
        assert!(item.grows_body());
        assert_eq!(item.display_tag(), '.');
        assert_eq!(Item::detrimental(-15.0).display_tag(), '~');
    }

    #[test]
    fn test_snake_occupies_head_and_segments() {
        let snake = Snake::new(Position::new(5, 5), Direction::East, 2);
        let entity = Entity::from(snake);

        assert_eq!(
            entity.occupied_cells(),
            vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]
        );
        assert!(entity.occupies(Position::new(3, 5)));
        assert!(!entity.occupies(Position::new(6, 5)));
        assert_eq!(entity.position(), Position::new(5, 5));
        assert!(entity.as_snake().is_some());
        assert!(entity.as_item().is_none());
    }
}
