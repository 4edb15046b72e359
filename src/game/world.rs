//! # Tiles and Levels
//!
//! A level is a rectangular grid of tiles indexed `tiles[y][x]`. Every lookup is
//! bounds-checked and returns an `Option`, so callers can tell an illegal
//! coordinate apart from a real tile.

use crate::{DelveError, DelveResult, Position};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Relative weights of the eight wall decoration variants.
pub const WALL_DECORATION_WEIGHTS: [f64; 8] = [0.30, 0.15, 0.15, 0.15, 0.10, 0.10, 0.025, 0.025];

/// Relative weights of the nine floor decoration variants.
pub const FLOOR_DECORATION_WEIGHTS: [f64; 9] =
    [0.15, 0.15, 0.15, 0.15, 0.15, 0.10, 0.10, 0.025, 0.025];

/// What a tile is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
}

impl TileKind {
    /// The character used for this kind in level text and debug dumps.
    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
        }
    }

    fn decoration_weights(self) -> &'static [f64] {
        match self {
            TileKind::Wall => &WALL_DECORATION_WEIGHTS,
            TileKind::Floor => &FLOOR_DECORATION_WEIGHTS,
        }
    }
}

/// A single map cell.
///
/// The blocking flags follow from the kind and the decoration index is fixed
/// at construction. Only `explored` changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    blocks_movement: bool,
    blocks_sight: bool,
    blocks_flight: bool,
    decoration: u8,
    /// Whether the tile has ever been visible
    pub explored: bool,
}

impl Tile {
    /// Creates a tile with an explicit decoration index.
    pub fn new(kind: TileKind, decoration: u8) -> Self {
        let blocks = kind == TileKind::Wall;
        Self {
            kind,
            blocks_movement: blocks,
            blocks_sight: blocks,
            blocks_flight: blocks,
            decoration,
            explored: false,
        }
    }

    /// Creates a tile with a decoration drawn from the kind's distribution.
    pub fn random<R: Rng + ?Sized>(kind: TileKind, rng: &mut R) -> Self {
        Self::new(kind, draw_decoration(kind, rng))
    }

    /// A wall tile with a random decoration.
    pub fn wall<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random(TileKind::Wall, rng)
    }

    /// A floor tile with a random decoration.
    pub fn floor<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random(TileKind::Floor, rng)
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn is_wall(&self) -> bool {
        self.kind == TileKind::Wall
    }

    pub fn is_floor(&self) -> bool {
        self.kind == TileKind::Floor
    }

    pub fn blocks_movement(&self) -> bool {
        self.blocks_movement
    }

    pub fn blocks_sight(&self) -> bool {
        self.blocks_sight
    }

    pub fn blocks_flight(&self) -> bool {
        self.blocks_flight
    }

    /// Index into the renderer's variant set for this tile kind.
    pub fn decoration(&self) -> u8 {
        self.decoration
    }
}

fn draw_decoration<R: Rng + ?Sized>(kind: TileKind, rng: &mut R) -> u8 {
    match WeightedIndex::new(kind.decoration_weights()) {
        Ok(distribution) => distribution.sample(rng) as u8,
        Err(_) => 0,
    }
}

/// One dungeon level: a grid of tiles at a fixed depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Vertical index of this level, 0 is the entry level
    pub depth: u32,
    pub width: i32,
    pub height: i32,
    /// Rows of tiles, indexed `tiles[y][x]`
    pub tiles: Vec<Vec<Tile>>,
}

impl Level {
    /// Creates a level filled with wall tiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Level, Position};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let level = Level::filled(0, 20, 10, &mut rng);
    /// assert!(level.get_tile(Position::new(3, 3)).unwrap().is_wall());
    /// assert!(level.get_tile(Position::new(20, 3)).is_none());
    /// ```
    pub fn filled<R: Rng + ?Sized>(depth: u32, width: i32, height: i32, rng: &mut R) -> Self {
        let mut tiles = Vec::with_capacity(height.max(0) as usize);
        for _ in 0..height.max(0) {
            let mut row = Vec::with_capacity(width.max(0) as usize);
            for _ in 0..width.max(0) {
                row.push(Tile::wall(rng));
            }
            tiles.push(row);
        }
        Self {
            depth,
            width: width.max(0),
            height: height.max(0),
            tiles,
        }
    }

    /// Builds a level from rows of tiles. All rows must have the same length.
    pub fn from_rows(depth: u32, tiles: Vec<Vec<Tile>>) -> DelveResult<Self> {
        let height = tiles.len() as i32;
        let width = tiles.first().map(|row| row.len()).unwrap_or(0) as i32;
        if tiles.iter().any(|row| row.len() as i32 != width) {
            return Err(DelveError::MalformedLevel(
                "rows of a level must all have the same length".to_string(),
            ));
        }
        Ok(Self {
            depth,
            width,
            height,
            tiles,
        })
    }

    /// Parses a plain `#`/`.` picture, mostly useful in tests.
    ///
    /// Any character other than `.` becomes wall. Decorations are all zero.
    pub fn from_ascii(depth: u32, picture: &str) -> DelveResult<Self> {
        let rows: Vec<Vec<Tile>> = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(|c| match c {
                        '.' => Tile::new(TileKind::Floor, 0),
                        _ => Tile::new(TileKind::Wall, 0),
                    })
                    .collect()
            })
            .collect();
        Self::from_rows(depth, rows)
    }

    /// Checks whether a position lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
    }

    /// Turns a tile into floor unless it already is one.
    ///
    /// Existing floor keeps its decoration. Positions outside the grid are ignored.
    pub fn carve<R: Rng + ?Sized>(&mut self, pos: Position, rng: &mut R) {
        if let Some(tile) = self.get_tile_mut(pos) {
            if !tile.is_floor() {
                *tile = Tile::floor(rng);
            }
        }
    }

    /// Whether the tile blocks movement. `None` for positions outside the grid.
    pub fn blocks_movement(&self, pos: Position) -> Option<bool> {
        self.get_tile(pos).map(Tile::blocks_movement)
    }

    /// Whether a creature may step onto this position.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.blocks_movement(pos) == Some(false)
    }

    /// Iterates over every position of the grid, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// First floor tile in reading order.
    pub fn first_floor(&self) -> Option<Position> {
        self.positions()
            .find(|&pos| self.get_tile(pos).map(Tile::is_floor).unwrap_or(false))
    }

    /// Marks every tile as explored.
    pub fn reveal_all(&mut self) {
        for tile in self.tiles.iter_mut().flatten() {
            tile.explored = true;
        }
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|tile| tile.is_floor()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_wall_and_floor_flags() {
        let wall = Tile::new(TileKind::Wall, 0);
        assert!(wall.blocks_movement() && wall.blocks_sight() && wall.blocks_flight());

        let floor = Tile::new(TileKind::Floor, 3);
        assert!(!floor.blocks_movement() && !floor.blocks_sight() && !floor.blocks_flight());
        assert_eq!(floor.decoration(), 3);
        assert!(!floor.explored);
    }

    #[test]
    fn test_decorations_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            assert!(Tile::wall(&mut rng).decoration() < 8);
            assert!(Tile::floor(&mut rng).decoration() < 9);
        }
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut level = Level::filled(0, 10, 5, &mut rng);
        assert!(level.get_tile(Position::new(-1, 0)).is_none());
        assert!(level.get_tile(Position::new(0, 5)).is_none());
        assert_eq!(level.blocks_movement(Position::new(10, 0)), None);
        assert_eq!(level.blocks_movement(Position::new(9, 4)), Some(true));
        assert!(level.get_tile_mut(Position::new(11, 1)).is_none());
    }

    #[test]
    fn test_carve_keeps_existing_floor() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut level = Level::filled(0, 10, 5, &mut rng);
        let pos = Position::new(2, 2);
        *level.get_tile_mut(pos).unwrap() = Tile::new(TileKind::Floor, 7);
        level.carve(pos, &mut rng);
        assert_eq!(level.get_tile(pos).unwrap().decoration(), 7);

        let other = Position::new(3, 2);
        level.carve(other, &mut rng);
        assert!(level.is_walkable(other));
        level.carve(Position::new(30, 30), &mut rng);
    }

    #[test]
    fn test_from_ascii() {
        let level = Level::from_ascii(
            2,
            "
            #####
            #..x#
            #####
            ",
        )
        .unwrap();
        assert_eq!((level.width, level.height, level.depth), (5, 3, 2));
        assert_eq!(level.floor_count(), 2);
        assert!(level.get_tile(Position::new(3, 1)).unwrap().is_wall());
        assert_eq!(level.first_floor(), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![
            vec![Tile::new(TileKind::Wall, 0); 3],
            vec![Tile::new(TileKind::Wall, 0); 2],
        ];
        assert!(Level::from_rows(0, rows).is_err());
    }
}
