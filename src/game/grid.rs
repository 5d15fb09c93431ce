use super::state::Position;

/// Static classification of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Wall,
    Open,
}

/// Bounded playable rectangle surrounded by a one-cell wall border
///
/// Playable cells span `1..=width` horizontally and `1..=height` vertically.
/// The addressable rectangle is `(width + 2) x (height + 2)`; anything outside
/// it classifies as a wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Build a grid with the given playable size and its wall border
    pub fn new(width: usize, height: usize) -> Self {
        let total_width = width + 2;
        let total_height = height + 2;
        let mut cells = Vec::with_capacity(total_width * total_height);

        for y in 0..total_height {
            for x in 0..total_width {
                let border = x == 0 || y == 0 || x == total_width - 1 || y == total_height - 1;
                cells.push(if border { CellKind::Wall } else { CellKind::Open });
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Playable width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Playable height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width including the wall border
    pub fn total_width(&self) -> usize {
        self.width + 2
    }

    /// Height including the wall border
    pub fn total_height(&self) -> usize {
        self.height + 2
    }

    /// Classify a cell; out-of-bounds coordinates are walls
    pub fn classify(&self, pos: Position) -> CellKind {
        if pos.x < 0 || pos.y < 0 {
            return CellKind::Wall;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.total_width() || y >= self.total_height() {
            return CellKind::Wall;
        }
        self.cells[y * self.total_width() + x]
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.classify(pos) == CellKind::Wall
    }

    /// Playable cells in row-major order
    pub fn playable_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (1..=self.height).flat_map(move |y| {
            (1..=self.width).map(move |x| Position::new(x as i32, y as i32))
        })
    }

    /// Center of the playable area
    pub fn center(&self) -> Position {
        Position::new((self.width / 2 + 1) as i32, (self.height / 2 + 1) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_is_wall() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.total_width(), 6);
        assert_eq!(grid.total_height(), 5);

        for x in 0..6 {
            assert!(grid.is_wall(Position::new(x, 0)));
            assert!(grid.is_wall(Position::new(x, 4)));
        }
        for y in 0..5 {
            assert!(grid.is_wall(Position::new(0, y)));
            assert!(grid.is_wall(Position::new(5, y)));
        }
    }

    #[test]
    fn test_interior_is_open() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.classify(Position::new(1, 1)), CellKind::Open);
        assert_eq!(grid.classify(Position::new(4, 3)), CellKind::Open);
        assert_eq!(grid.playable_cells().count(), 12);
        assert!(grid.playable_cells().all(|p| !grid.is_wall(p)));
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.classify(Position::new(-1, 2)), CellKind::Wall);
        assert_eq!(grid.classify(Position::new(2, -7)), CellKind::Wall);
        assert_eq!(grid.classify(Position::new(100, 2)), CellKind::Wall);
        assert_eq!(grid.classify(Position::new(2, 100)), CellKind::Wall);
    }

    #[test]
    fn test_center() {
        let grid = Grid::new(10, 10);
        assert_eq!(grid.center(), Position::new(6, 6));
        assert!(!grid.is_wall(grid.center()));
    }
}
