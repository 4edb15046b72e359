//! # Visibility Engine
//!
//! Ray-cast field of view. Rays run from the observer to every point on the
//! perimeter of the torch square; a second pass lights walls that sit behind
//! lit floor, which removes the diagonal "see-through corner" artifacts that
//! plain ray casting leaves behind.
//!
//! The map is rebuilt from scratch on every call. Tiles that end up visible are
//! marked explored on the level.

use crate::{bresenham_line, Level, Position, TileKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Boolean grid of currently visible tiles for one level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityMap {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl VisibilityMap {
    /// An all-dark map of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    /// Whether a tile is visible. Positions outside the map are not.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.index(pos)
            .and_then(|i| self.cells.get(i).copied())
            .unwrap_or(false)
    }

    fn set_visible(&mut self, pos: Position) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = true;
        }
    }

    /// All visible positions in reading order.
    pub fn visible_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
            .filter(move |&pos| self.is_visible(pos))
    }

    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|&&visible| visible).count()
    }
}

/// Recomputes the field of view of an observer and marks what it sees explored.
///
/// # Examples
///
/// ```
/// use delve::{recompute, Level, Position};
///
/// let mut level = Level::from_ascii(0, "
///     ######
///     #...#
///     ######
/// ").unwrap();
/// let map = recompute(&mut level, Position::new(2, 1), 5);
/// assert!(map.is_visible(Position::new(1, 1)));
/// assert!(map.is_visible(Position::new(0, 0)));
/// assert!(level.get_tile(Position::new(3, 1)).unwrap().explored);
/// ```
pub fn recompute(level: &mut Level, observer: Position, torch_radius: i32) -> VisibilityMap {
    let mut map = VisibilityMap::new(level.width, level.height);
    map.set_visible(observer);

    let radius = torch_radius.max(0);
    for end in torch_square_perimeter(observer, radius) {
        cast_ray(level, &mut map, observer, end, radius);
    }

    light_corner_walls(level, &mut map, observer, radius);

    for pos in map.visible_positions().collect::<Vec<_>>() {
        if let Some(tile) = level.get_tile_mut(pos) {
            tile.explored = true;
        }
    }

    map
}

/// Integer points on the border of the square of half-width `radius`.
fn torch_square_perimeter(center: Position, radius: i32) -> BTreeSet<Position> {
    let mut points = BTreeSet::new();
    for y in (center.y - radius)..=(center.y + radius) {
        if y == center.y - radius || y == center.y + radius {
            for x in (center.x - radius)..=(center.x + radius) {
                points.insert(Position::new(x, y));
            }
        } else {
            points.insert(Position::new(center.x - radius, y));
            points.insert(Position::new(center.x + radius, y));
        }
    }
    points
}

fn cast_ray(level: &Level, map: &mut VisibilityMap, observer: Position, end: Position, radius: i32) {
    for point in bresenham_line(observer, end) {
        if point == observer {
            continue;
        }
        let Some(tile) = level.get_tile(point) else {
            continue;
        };
        if observer.euclidean_distance(point) > radius as f64 {
            continue;
        }
        map.set_visible(point);
        if tile.blocks_sight() {
            break;
        }
    }
}

/// Lights hidden walls that touch lit floor on the side facing the observer.
///
/// Each quadrant is scanned from its outer corner toward the observer. The
/// neighbours checked are the ones one step closer to the observer along the
/// row, the column and the diagonal.
fn light_corner_walls(level: &Level, map: &mut VisibilityMap, observer: Position, radius: i32) {
    let quadrants = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

    for (side_x, side_y) in quadrants {
        // Steps point from the outer corner back toward the observer.
        let (step_x, step_y) = (-side_x, -side_y);
        let neighbours = [(0, step_y), (step_x, 0), (step_x, step_y)];

        let mut x = observer.x + side_x * radius;
        while x != observer.x {
            let mut y = observer.y + side_y * radius;
            while y != observer.y {
                let pos = Position::new(x, y);
                if should_light(level, map, pos, &neighbours) {
                    map.set_visible(pos);
                }
                y += step_y;
            }
            x += step_x;
        }
    }
}

fn should_light(level: &Level, map: &VisibilityMap, pos: Position, neighbours: &[(i32, i32)]) -> bool {
    let Some(tile) = level.get_tile(pos) else {
        return false;
    };
    if map.is_visible(pos) || tile.kind() != TileKind::Wall {
        return false;
    }
    neighbours.iter().any(|&(dx, dy)| {
        let next = pos.offset(dx, dy);
        map.is_visible(next)
            && level
                .get_tile(next)
                .map(|t| t.kind() == TileKind::Floor)
                .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_room(size: i32) -> Level {
        let mut picture = String::new();
        for y in 0..size {
            for x in 0..size {
                let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                picture.push(if edge { '#' } else { '.' });
            }
            picture.push('\n');
        }
        Level::from_ascii(0, &picture).unwrap()
    }

    #[test]
    fn test_perimeter_size() {
        let points = torch_square_perimeter(Position::new(0, 0), 3);
        assert_eq!(points.len(), 24);
        assert!(points.contains(&Position::new(-3, 2)));
        assert!(!points.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_observer_tile_is_visible() {
        let mut level = open_room(7);
        let observer = Position::new(3, 3);
        let map = recompute(&mut level, observer, 0);
        assert!(map.is_visible(observer));
        assert_eq!(map.visible_count(), 1);
    }

    #[test]
    fn test_walls_block_sight() {
        let mut level = Level::from_ascii(
            0,
            "
            #########
            #...#...#
            #########
            ",
        )
        .unwrap();
        let map = recompute(&mut level, Position::new(1, 1), 10);
        assert!(map.is_visible(Position::new(3, 1)));
        assert!(map.is_visible(Position::new(4, 1)));
        assert!(!map.is_visible(Position::new(5, 1)));
        assert!(!level.get_tile(Position::new(6, 1)).unwrap().explored);
    }

    #[test]
    fn test_radius_limits_sight() {
        let mut level = open_room(21);
        let observer = Position::new(10, 10);
        let map = recompute(&mut level, observer, 3);
        assert!(map.is_visible(Position::new(13, 10)));
        assert!(!map.is_visible(Position::new(14, 10)));
        assert!(!map.is_visible(Position::new(13, 13)));
    }

    #[test]
    fn test_whole_small_room_is_lit() {
        let mut level = open_room(7);
        let map = recompute(&mut level, Position::new(3, 3), 10);
        assert_eq!(map.visible_count(), 49);
    }

    #[test]
    fn test_corner_wall_behind_lit_floor_is_lit() {
        // The observer looks down a corridor that opens into a room; the room's
        // corner wall would be skipped by the rays alone.
        let mut level = Level::from_ascii(
            0,
            "
            ##########
            #........#
            #........#
            #####.####
            #####.####
            #####.####
            ##########
            ",
        )
        .unwrap();
        let map = recompute(&mut level, Position::new(5, 5), 6);
        assert!(map.is_visible(Position::new(5, 2)));
        assert!(map.is_visible(Position::new(4, 3)));
        assert!(map.is_visible(Position::new(6, 3)));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut level = open_room(15);
        let first = recompute(&mut level, Position::new(4, 6), 5);
        let second = recompute(&mut level, Position::new(4, 6), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_explored_is_sticky() {
        let mut level = open_room(30);
        recompute(&mut level, Position::new(3, 3), 2);
        assert!(level.get_tile(Position::new(4, 4)).unwrap().explored);
        recompute(&mut level, Position::new(25, 25), 2);
        assert!(level.get_tile(Position::new(4, 4)).unwrap().explored);
    }

    proptest! {
        #[test]
        fn visible_tiles_respect_torch(ox in 1i32..19, oy in 1i32..19, radius in 1i32..8) {
            let mut level = open_room(20);
            let observer = Position::new(ox, oy);
            let map = recompute(&mut level, observer, radius);
            for pos in map.visible_positions() {
                let within = observer.euclidean_distance(pos) <= radius as f64;
                let tile = level.get_tile(pos).unwrap();
                if !within {
                    // Only corrected walls may sit outside the disc, and they must
                    // touch a visible floor tile.
                    prop_assert!(tile.is_wall());
                    let touches = pos.adjacent_positions().into_iter().any(|n| {
                        map.is_visible(n) && level.get_tile(n).map(|t| t.is_floor()).unwrap_or(false)
                    });
                    prop_assert!(touches);
                }
                prop_assert!(tile.explored);
            }
        }
    }
}
