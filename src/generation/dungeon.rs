//! # Dungeon Generation
//!
//! Procedural dungeon layout generation using the classic rooms-and-tunnels
//! algorithm.
//!
//! The generator:
//! 1. Fills the level with wall
//! 2. Tries a fixed number of random rooms, rejecting any that intersect an
//!    earlier one
//! 3. Connects each room to the previous one with an L-shaped tunnel, and the
//!    first room to the level's entry point
//! 4. Places stairs up (matching the stairs down of the level above) and
//!    stairs down
//! 5. Seeds rooms with monsters and items

use crate::{
    seed_items, seed_monsters, DelveResult, EntityKind, GeneratedLevel, GenerationConfig, Level,
    LevelRequest, LevelSource, Position, Room, Spawn, StairDirection,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Primary dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone, Default)]
pub struct RoomCorridorGenerator {
    pub config: GenerationConfig,
}

impl RoomCorridorGenerator {
    /// Creates a generator with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GenerationConfig, LevelRequest, LevelSource, Position, RoomCorridorGenerator};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let generator = RoomCorridorGenerator::new(GenerationConfig::default());
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let request = LevelRequest::new(0, 80, 40, Position::new(1, 1));
    /// let generated = generator.build(&request, &mut rng).unwrap();
    /// assert!(generated.level.is_walkable(Position::new(1, 1)));
    /// ```
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Places and carves rooms, tunnelling each to its predecessor.
    fn place_rooms(
        &self,
        level: &mut Level,
        entry: Position,
        rng: &mut StdRng,
    ) -> Vec<Room> {
        let mut rooms: Vec<Room> = Vec::new();
        // Smaller rooms have no interior to carve or seed.
        let min = self.config.room_min_size.max(3);
        let max = self.config.room_max_size.max(min);

        for attempt in 0..self.config.max_rooms {
            let w = rng.gen_range(min..=max);
            let h = rng.gen_range(min..=max);
            let x_max = level.width - w - 1;
            let y_max = level.height - h - 1;
            if x_max < 0 || y_max < 0 {
                debug!("room {}x{} does not fit, attempt {} skipped", w, h, attempt);
                continue;
            }
            let x = rng.gen_range(0..=x_max);
            let y = rng.gen_range(0..=y_max);
            let candidate = Room::new(x, y, w, h);

            if rooms.iter().any(|other| candidate.intersects(other)) {
                continue;
            }

            carve_room(level, &candidate, rng);
            let from = rooms.last().map(Room::center).unwrap_or(entry);
            carve_tunnel(level, from, candidate.center(), rng);
            debug!(
                "room {} accepted at ({}, {})-({}, {})",
                rooms.len(),
                candidate.x1,
                candidate.y1,
                candidate.x2,
                candidate.y2
            );
            rooms.push(candidate);
        }

        rooms
    }

    /// Puts a stair up under every stair down of the level above, or a single
    /// one in a random room on the top level.
    fn place_stairs_up(
        &self,
        level: &mut Level,
        request: &LevelRequest,
        rooms: &[Room],
        rng: &mut StdRng,
    ) -> Vec<Spawn> {
        if request.depth == 0 {
            return rooms
                .choose(rng)
                .map(|room| vec![stair(room.center(), StairDirection::Up)])
                .unwrap_or_default();
        }

        let mut spawns = Vec::new();
        for &pos in &request.prev_stairs_down {
            if !level.is_valid_position(pos) {
                warn!("stair down at {} lies outside depth {}", pos, request.depth);
                continue;
            }
            if !level.is_walkable(pos) {
                if let Some(room) = rooms.choose(rng) {
                    carve_tunnel(level, pos, room.center(), rng);
                }
            }
            spawns.push(stair(pos, StairDirection::Up));
        }
        spawns
    }

    /// Puts stairs down in distinct, unoccupied room centers.
    fn place_stairs_down(
        &self,
        rooms: &[Room],
        occupied: &BTreeSet<Position>,
        rng: &mut StdRng,
    ) -> Vec<Spawn> {
        let free: BTreeSet<Position> = rooms
            .iter()
            .map(Room::center)
            .filter(|center| !occupied.contains(center))
            .collect();

        let low = self.config.min_stairs_down.min(self.config.max_stairs_down);
        let wanted = rng.gen_range(low..=self.config.max_stairs_down) as usize;
        let count = wanted.min(free.len());
        if count < wanted {
            warn!("only {} of {} stairs down fit", count, wanted);
        }

        let mut taken = BTreeSet::new();
        let mut spawns = Vec::new();
        while spawns.len() < count {
            let Some(center) = rooms.choose(rng).map(Room::center) else {
                break;
            };
            if occupied.contains(&center) || !taken.insert(center) {
                continue;
            }
            spawns.push(stair(center, StairDirection::Down));
        }
        spawns
    }
}

impl LevelSource for RoomCorridorGenerator {
    fn build(&self, request: &LevelRequest, rng: &mut StdRng) -> DelveResult<GeneratedLevel> {
        let mut level = Level::filled(request.depth, request.width, request.height, rng);

        let rooms = self.place_rooms(&mut level, request.entry, rng);
        if rooms.is_empty() {
            warn!("no room fits on depth {}, leaving it solid", request.depth);
            return Ok(GeneratedLevel {
                level,
                rooms,
                spawns: Vec::new(),
            });
        }

        let mut spawns = self.place_stairs_up(&mut level, request, &rooms, rng);

        let mut occupied: BTreeSet<Position> = request.occupied.iter().copied().collect();
        occupied.extend(spawns.iter().map(|spawn| spawn.position));
        let stairs_down = self.place_stairs_down(&rooms, &occupied, rng);
        occupied.extend(stairs_down.iter().map(|spawn| spawn.position));
        spawns.extend(stairs_down);

        spawns.extend(seed_monsters(&rooms, &occupied, &self.config, rng));
        spawns.extend(seed_items(&rooms, &self.config, rng));

        info!(
            "generated depth {}: {} rooms, {} floor tiles, {} spawns",
            request.depth,
            rooms.len(),
            level.floor_count(),
            spawns.len()
        );

        Ok(GeneratedLevel {
            level,
            rooms,
            spawns,
        })
    }

    fn source_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

fn stair(position: Position, direction: StairDirection) -> Spawn {
    Spawn::new(position, EntityKind::Stair(direction))
}

/// Carves the interior of a room, leaving its bounding ring as wall.
pub fn carve_room<R: Rng + ?Sized>(level: &mut Level, room: &Room, rng: &mut R) {
    for pos in room.interior_positions() {
        level.carve(pos, rng);
    }
}

/// Carves a straight horizontal run between two columns, inclusive.
pub fn carve_h_tunnel<R: Rng + ?Sized>(level: &mut Level, x1: i32, x2: i32, y: i32, rng: &mut R) {
    for x in x1.min(x2)..=x1.max(x2) {
        level.carve(Position::new(x, y), rng);
    }
}

/// Carves a straight vertical run between two rows, inclusive.
pub fn carve_v_tunnel<R: Rng + ?Sized>(level: &mut Level, y1: i32, y2: i32, x: i32, rng: &mut R) {
    for y in y1.min(y2)..=y1.max(y2) {
        level.carve(Position::new(x, y), rng);
    }
}

/// Carves an L-shaped tunnel; a coin flip decides which leg comes first.
pub fn carve_tunnel<R: Rng + ?Sized>(level: &mut Level, from: Position, to: Position, rng: &mut R) {
    if rng.gen_bool(0.5) {
        carve_h_tunnel(level, from.x, to.x, from.y, rng);
        carve_v_tunnel(level, from.y, to.y, to.x, rng);
    } else {
        carve_v_tunnel(level, from.y, to.y, from.x, rng);
        carve_h_tunnel(level, from.x, to.x, to.y, rng);
    }
}
