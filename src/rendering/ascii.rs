//! # ASCII Dump
//!
//! Text rendering of a snapshot for debugging and headless runs.
//!
//! Visible tiles show their kind, remembered floor is drawn as `,` and unseen
//! tiles stay blank. Entities appear on visible tiles. Stairs and shops also
//! appear on remembered tiles once they have been seen.

use crate::{Entity, EntityKind, Position, Snapshot};
use std::fmt::Write;

/// Turns snapshots into printable text.
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    /// Number of trailing log lines printed under the map
    pub log_lines: usize,
    /// Whether to print the status line
    pub show_status: bool,
    /// Character for explored floor that is out of sight
    pub remembered_floor: char,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self {
            log_lines: 5,
            show_status: true,
            remembered_floor: ',',
        }
    }

    /// Renders only the map rows, one line per row.
    pub fn render_map(&self, snapshot: &Snapshot<'_>) -> String {
        let level = snapshot.level;
        let mut grid: Vec<Vec<char>> = level
            .tiles
            .iter()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, tile)| {
                        let pos = Position::new(x as i32, y as i32);
                        if snapshot.visibility.is_visible(pos) {
                            tile.kind().glyph()
                        } else if tile.explored {
                            if tile.is_floor() {
                                self.remembered_floor
                            } else {
                                tile.kind().glyph()
                            }
                        } else {
                            ' '
                        }
                    })
                    .collect()
            })
            .collect();

        let mut shown: Vec<&Entity> = snapshot
            .entities
            .iter()
            .copied()
            .filter(|e| is_shown(snapshot, e))
            .collect();
        shown.sort_by_key(|e| draw_order(e));
        for entity in shown {
            let (x, y) = (entity.position.x, entity.position.y);
            if let Some(cell) = grid
                .get_mut(y as usize)
                .and_then(|row| row.get_mut(x as usize))
            {
                *cell = entity.glyph();
            }
        }

        let mut out = String::new();
        for row in grid {
            let line: String = row.into_iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    /// Renders the map, the status line and the newest log lines.
    pub fn render(&self, snapshot: &Snapshot<'_>) -> String {
        let mut out = self.render_map(snapshot);

        if self.show_status {
            let player = &snapshot.player;
            let _ = write!(
                out,
                "Depth {}  HP {}/{}  Gold {}  Turn {}  Torch {}",
                snapshot.depth,
                player.hitpoints,
                player.hitpoints_max,
                player.gold,
                snapshot.turn,
                snapshot.torch_radius
            );
            let scrolls: Vec<String> = player
                .scrolls
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(spell, count)| format!("{} x{}", spell, count))
                .collect();
            if !scrolls.is_empty() {
                let _ = write!(out, "  Scrolls: {}", scrolls.join(", "));
            }
            if snapshot.game_over {
                let _ = write!(out, "  [{:?}]", snapshot.completion_state);
            }
            out.push('\n');
        }

        let start = snapshot.log.len().saturating_sub(self.log_lines);
        for line in &snapshot.log[start..] {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Renders a snapshot with the default settings.
pub fn render_ascii(snapshot: &Snapshot<'_>) -> String {
    AsciiRenderer::new().render(snapshot)
}

fn is_shown(snapshot: &Snapshot<'_>, entity: &Entity) -> bool {
    if snapshot.visibility.is_visible(entity.position) {
        return true;
    }
    entity.stays_visible_once_explored
        && entity.explored
        && snapshot
            .level
            .get_tile(entity.position)
            .map(|tile| tile.explored)
            .unwrap_or(false)
}

/// Later entries are drawn over earlier ones on a shared tile.
fn draw_order(entity: &Entity) -> u8 {
    match entity.kind {
        EntityKind::Stair(_) | EntityKind::Shop => 0,
        EntityKind::Item(_) => 1,
        EntityKind::Monster(_) => 2,
        EntityKind::Player(_) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_level, Command, GenerationConfig, World, WorldConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world(picture: &str, start: Position, torch: i32) -> World {
        let mut rng = StdRng::seed_from_u64(0);
        let generated = parse_level(0, picture, &mut rng).unwrap();
        let mut config = WorldConfig::new(5);
        config.torch_radius = torch;
        config.generation = GenerationConfig::for_testing();
        World::with_level(config, generated, start).unwrap()
    }

    #[test]
    fn test_visible_room_and_player() {
        let world = world("#####\n#..<#\n#####\n", Position::new(1, 1), 10);
        let snapshot = world.snapshot().unwrap();
        let map = AsciiRenderer::new().render_map(&snapshot);
        assert_eq!(map.lines().count(), 3);
        assert_eq!(map.lines().nth(1), Some("#@.<#"));
    }

    #[test]
    fn test_unseen_tiles_stay_blank() {
        let world = world("#########\n#.......#\n#########\n", Position::new(1, 1), 1);
        let snapshot = world.snapshot().unwrap();
        let map = AsciiRenderer::new().render_map(&snapshot);
        let middle = map.lines().nth(1).unwrap();
        assert!(middle.starts_with("#@."));
        assert_eq!(middle.trim_end().len(), 3);
    }

    #[test]
    fn test_stairs_are_remembered() {
        let mut world = world("#######\n#<....#\n#######\n", Position::new(1, 1), 2);
        for _ in 0..4 {
            world.execute(Command::Move { dx: 1, dy: 0 }).unwrap();
        }
        let snapshot = world.snapshot().unwrap();
        let map = AsciiRenderer::new().render_map(&snapshot);
        let middle = map.lines().nth(1).unwrap();
        assert!(middle.starts_with("#<,"));
        assert!(middle.contains('@'));
    }

    #[test]
    fn test_status_and_log() {
        let world = world("###\n#.#\n###\n", Position::new(1, 1), 10);
        let text = render_ascii(&world.snapshot().unwrap());
        assert!(text.contains("HP 100/100"));
        assert!(text.contains("Welcome"));
    }
}
