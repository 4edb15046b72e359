//! # Hand-Authored Levels
//!
//! Levels drawn as text, one character per tile:
//!
//! | char | tile  | entity                         |
//! |------|-------|--------------------------------|
//! | `#`  | wall  |                                |
//! | `.`  | floor |                                |
//! | `<`  | floor | stair up                       |
//! | `>`  | floor | stair down                     |
//! | `$`  | floor | shop                           |
//! | `*`  | floor | gold pile worth 1 to 100       |
//! | `M`  | floor | a wolf or a snake, even odds   |
//!
//! Blank lines are ignored. Any other character becomes wall, and short rows
//! are padded with wall up to the widest row.

use crate::{
    DelveError, DelveResult, EntityKind, GeneratedLevel, ItemKind, Level, LevelRequest,
    LevelSource, Position, Spawn, Species, StairDirection, Tile,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use std::fs;
use std::path::PathBuf;

/// Parses level text into a tile grid and its spawns.
///
/// # Examples
///
/// ```
/// use delve::{parse_level, Position};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let generated = parse_level(0, "#####\n#<.>#\n#####\n", &mut rng).unwrap();
/// assert_eq!(generated.level.width, 5);
/// assert!(generated.level.is_walkable(Position::new(1, 1)));
/// assert_eq!(generated.spawns.len(), 2);
/// ```
pub fn parse_level<R: Rng + ?Sized>(depth: u32, text: &str, rng: &mut R) -> DelveResult<GeneratedLevel> {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return Err(DelveError::MalformedLevel(format!(
            "level text for depth {} has no rows",
            depth
        )));
    }
    let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);

    let mut rows = Vec::with_capacity(lines.len());
    let mut spawns = Vec::new();
    for (y, line) in lines.iter().enumerate() {
        let mut row = Vec::with_capacity(width);
        for (x, c) in line.chars().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            let spawn = match c {
                '#' => {
                    row.push(Tile::wall(rng));
                    continue;
                }
                '.' => None,
                '<' => Some(EntityKind::Stair(StairDirection::Up)),
                '>' => Some(EntityKind::Stair(StairDirection::Down)),
                '$' => Some(EntityKind::Shop),
                '*' => Some(EntityKind::Item(ItemKind::random_gold(rng))),
                'M' => {
                    let species = if rng.gen_bool(0.5) {
                        Species::Wolf
                    } else {
                        Species::Snake
                    };
                    Some(EntityKind::Monster(species))
                }
                other => {
                    warn!("unknown level character {:?} at {}, using wall", other, pos);
                    row.push(Tile::wall(rng));
                    continue;
                }
            };
            row.push(Tile::floor(rng));
            if let Some(kind) = spawn {
                spawns.push(Spawn::new(pos, kind));
            }
        }
        while row.len() < width {
            row.push(Tile::wall(rng));
        }
        rows.push(row);
    }

    Ok(GeneratedLevel {
        level: Level::from_rows(depth, rows)?,
        rooms: Vec::new(),
        spawns,
    })
}

/// Loads `levelNNN.txt` files from a directory, where NNN is the depth plus one.
#[derive(Debug, Clone)]
pub struct LevelFileLoader {
    pub directory: PathBuf,
}

impl LevelFileLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// File name for a depth: depth 0 is `level001.txt`.
    pub fn file_name(depth: u32) -> String {
        format!("level{:03}.txt", depth + 1)
    }

    pub fn path_for(&self, depth: u32) -> PathBuf {
        self.directory.join(Self::file_name(depth))
    }

    /// Whether a file exists for the depth.
    pub fn has_level(&self, depth: u32) -> bool {
        self.path_for(depth).is_file()
    }
}

impl LevelSource for LevelFileLoader {
    fn build(&self, request: &LevelRequest, rng: &mut StdRng) -> DelveResult<GeneratedLevel> {
        let path = self.path_for(request.depth);
        let text = fs::read_to_string(&path)?;
        let generated = parse_level(request.depth, &text, rng)?;
        info!(
            "loaded depth {} from {} ({}x{})",
            request.depth,
            path.display(),
            generated.level.width,
            generated.level.height
        );
        Ok(generated)
    }

    fn source_type(&self) -> &'static str {
        "LevelFileLoader"
    }
}
