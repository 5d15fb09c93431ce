use super::entity::{Entity, EntityId, Item, Occupant};
use super::error::EngineError;
use super::grid::{CellKind, Grid};
use super::state::{Position, Snake};
use rand::seq::SliceRandom;
use rand::Rng;

/// Snapshot of a single cell, built on demand and never cached
#[derive(Debug, Clone, Copy)]
pub struct MapLocation<'a> {
    pub x: i32,
    pub y: i32,
    pub is_wall: bool,
    pub occupant: Option<(EntityId, &'a Entity)>,
}

impl MapLocation<'_> {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Not a wall and not occupied
    pub fn is_empty(&self) -> bool {
        !self.is_wall && self.occupant.is_none()
    }
}

/// The grid together with every live entity
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    entities: Vec<(EntityId, Entity)>,
    next_id: usize,
}

impl World {
    /// Create an empty world with the given playable size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            entities: Vec::new(),
            next_id: 0,
        }
    }

    /// Rebuild the wall border and drop every entity
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.grid.width(), self.grid.height());
        self.entities.clear();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn classify(&self, pos: Position) -> CellKind {
        self.grid.classify(pos)
    }

    /// Describe the cell at `pos`
    pub fn location(&self, pos: Position) -> MapLocation<'_> {
        MapLocation {
            x: pos.x,
            y: pos.y,
            is_wall: self.grid.is_wall(pos),
            occupant: self.occupant_at(pos),
        }
    }

    /// First entity covering `pos`
    pub fn occupant_at(&self, pos: Position) -> Option<(EntityId, &Entity)> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.occupies(pos))
            .map(|(id, entity)| (*id, entity))
    }

    /// Playable cells with no occupant, in row-major order
    pub fn open_cells(&self) -> Vec<Position> {
        self.grid
            .playable_cells()
            .filter(|pos| self.occupant_at(*pos).is_none())
            .collect()
    }

    /// Uniformly random open cell
    pub fn random_open_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Position, EngineError> {
        self.open_cells()
            .choose(rng)
            .copied()
            .ok_or(EngineError::NoOpenCell)
    }

    /// Register an entity exactly where it currently is
    pub fn add(&mut self, entity: impl Into<Entity>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push((id, entity.into()));
        id
    }

    /// Move an entity to a random open cell and register it
    ///
    /// A snake is rebuilt around its new head with [`Snake::teleport`].
    pub fn place_at_random_open_cell<R: Rng + ?Sized>(
        &mut self,
        entity: impl Into<Entity>,
        rng: &mut R,
    ) -> Result<EntityId, EngineError> {
        let mut entity = entity.into();
        self.settle(&mut entity, rng)?;
        Ok(self.add(entity))
    }

    /// Move a registered entity to a random open cell, keeping its id
    pub fn relocate<R: Rng + ?Sized>(
        &mut self,
        id: EntityId,
        rng: &mut R,
    ) -> Result<Position, EngineError> {
        let index = self
            .entities
            .iter()
            .position(|(entity_id, _)| *entity_id == id)
            .ok_or(EngineError::UnknownEntity(id))?;
        let (_, mut entity) = self.entities.remove(index);

        let settled = self.settle(&mut entity, rng);
        self.entities.insert(index, (id, entity));
        settled
    }

    fn settle<R: Rng + ?Sized>(
        &self,
        entity: &mut Entity,
        rng: &mut R,
    ) -> Result<Position, EngineError> {
        let pos = self.random_open_cell(rng)?;
        match entity {
            Entity::Snake(snake) => snake.teleport(self, pos, rng),
            Entity::Item(item) => item.set_position(pos),
        }
        Ok(pos)
    }

    /// Deregister an entity; a missing id is a no-op
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self
            .entities
            .iter()
            .position(|(entity_id, _)| *entity_id == id)?;
        Some(self.entities.remove(index).1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|(entity_id, _)| *entity_id == id)
            .map(|(_, entity)| entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    pub fn snake(&self) -> Option<&Snake> {
        self.entities
            .iter()
            .find_map(|(_, entity)| entity.as_snake())
    }

    pub fn snake_mut(&mut self) -> Option<&mut Snake> {
        self.entities
            .iter_mut()
            .find_map(|(_, entity)| entity.as_snake_mut())
    }

    pub fn snake_id(&self) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.as_snake().is_some())
            .map(|(id, _)| *id)
    }

    pub fn items(&self) -> impl Iterator<Item = (EntityId, &Item)> {
        self.entities
            .iter()
            .filter_map(|(id, entity)| entity.as_item().map(|item| (*id, item)))
    }
}
