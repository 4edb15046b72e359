//! # Generation Module
//!
//! Procedural and hand-authored level creation.
//!
//! Every way of producing a level implements [`LevelSource`]. A source gets a
//! [`LevelRequest`] describing where the level sits in the dungeon and returns
//! the tile grid together with the entities that should be spawned on it. The
//! World owns the entity registry, so sources only describe spawns and never
//! insert them.

pub mod dungeon;
pub mod encounters;
pub mod items;
pub mod level_file;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;
pub use level_file::*;

use crate::game::{EntityKind, Level, Position};
use crate::DelveResult;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls room placement and how densely rooms are seeded with monsters
/// and items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of room placements attempted per level
    pub max_rooms: u32,
    /// Smallest room width or height, including walls
    pub room_min_size: i32,
    /// Largest room width or height, including walls
    pub room_max_size: i32,
    /// Probability that a room receives a monster (0.0 to 1.0)
    pub monster_chance: f64,
    /// Probability that a room receives an item (0.0 to 1.0)
    pub item_chance: f64,
    /// Share of items that are gold; the rest are scrolls (0.0 to 1.0)
    pub gold_share: f64,
    /// Fewest stairs down per level
    pub min_stairs_down: u32,
    /// Most stairs down per level
    pub max_stairs_down: u32,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.max_rooms, 30);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// ```
    pub fn new() -> Self {
        Self {
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            monster_chance: 0.66,
            item_chance: 0.33,
            gold_share: 0.7,
            min_stairs_down: 1,
            max_stairs_down: 3,
        }
    }

    /// Creates a configuration for testing with fewer, smaller rooms and no
    /// monsters or items.
    pub fn for_testing() -> Self {
        Self {
            max_rooms: 10,
            room_min_size: 4,
            room_max_size: 6,
            monster_chance: 0.0,
            item_chance: 0.0,
            gold_share: 0.7,
            min_stairs_down: 1,
            max_stairs_down: 3,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An axis-aligned room rectangle.
///
/// `x2`/`y2` are exclusive of the size: a room at `x` with width `w` spans
/// `x..=x + w`. The outermost ring stays wall, the interior is carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Room {
    /// Creates a room from its top-left corner and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, Room};
    ///
    /// let room = Room::new(5, 5, 10, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains_interior(Position::new(6, 6)));
    /// assert!(!room.contains_interior(Position::new(5, 6)));
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Inclusive rectangle overlap test. Rooms that merely touch intersect.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Whether a position lies in the carved interior.
    pub fn contains_interior(&self, pos: Position) -> bool {
        pos.x > self.x1 && pos.x < self.x2 && pos.y > self.y1 && pos.y < self.y2
    }

    /// Every interior position, row by row.
    pub fn interior_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for y in (self.y1 + 1)..self.y2 {
            for x in (self.x1 + 1)..self.x2 {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// A uniformly random interior position.
    pub fn random_interior<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let x = rng.gen_range((self.x1 + 1)..=(self.x2 - 1).max(self.x1 + 1));
        let y = rng.gen_range((self.y1 + 1)..=(self.y2 - 1).max(self.y1 + 1));
        Position::new(x, y)
    }
}

/// An entity a source wants placed on its level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub position: Position,
    pub kind: EntityKind,
}

impl Spawn {
    pub fn new(position: Position, kind: EntityKind) -> Self {
        Self { position, kind }
    }
}

/// Where a new level sits in the dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequest {
    pub depth: u32,
    pub width: i32,
    pub height: i32,
    /// Tile the first room's tunnel connects to
    pub entry: Position,
    /// Stairs down of the level above, each of which needs a stair up here
    pub prev_stairs_down: Vec<Position>,
    /// Tiles already taken by entities living on this depth
    pub occupied: Vec<Position>,
}

impl LevelRequest {
    pub fn new(depth: u32, width: i32, height: i32, entry: Position) -> Self {
        Self {
            depth,
            width,
            height,
            entry,
            prev_stairs_down: Vec::new(),
            occupied: Vec::new(),
        }
    }
}

/// A finished level and what should live on it.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub level: Level,
    /// Rooms accepted during generation; empty for hand-authored levels
    pub rooms: Vec<Room>,
    pub spawns: Vec<Spawn>,
}

impl GeneratedLevel {
    /// Positions of all stair spawns leading the given way.
    pub fn stairs(&self, direction: crate::StairDirection) -> Vec<Position> {
        self.spawns
            .iter()
            .filter(|spawn| spawn.kind == EntityKind::Stair(direction))
            .map(|spawn| spawn.position)
            .collect()
    }
}

/// Something that can produce levels on demand.
pub trait LevelSource {
    /// Builds the level described by `request`.
    fn build(&self, request: &LevelRequest, rng: &mut StdRng) -> DelveResult<GeneratedLevel>;

    /// Short name used in log output.
    fn source_type(&self) -> &'static str;
}
