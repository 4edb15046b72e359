//! # Command Definitions
//!
//! The abstract command surface: everything a front end may ask the World to do.

use crate::{Direction, Position, Spell};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player intent, independent of any physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Step, attack or bump into a wall, one tile in any of the 8 directions
    Move { dx: i32, dy: i32 },
    /// Pass a turn; on a shop tile this buys healing
    Wait,
    /// Take the stair on the player's tile
    UseStairs,
    /// Read a scroll, optionally aimed at a tile
    Cast {
        spell: Spell,
        target: Option<Position>,
    },
    /// Shoot an arrow at a tile
    FireAt { target: Position },
    /// Grow or shrink the torch radius; takes no time
    ChangeTorchRadius { delta: i32 },
}

impl Command {
    /// A one-step move in a direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Command, Direction};
    ///
    /// assert_eq!(Command::step(Direction::Northeast), Command::Move { dx: 1, dy: -1 });
    /// ```
    pub fn step(direction: Direction) -> Self {
        let delta = direction.to_delta();
        Command::Move {
            dx: delta.x,
            dy: delta.y,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { dx, dy } => write!(f, "move ({}, {})", dx, dy),
            Command::Wait => write!(f, "wait"),
            Command::UseStairs => write!(f, "use stairs"),
            Command::Cast {
                spell,
                target: Some(target),
            } => write!(f, "cast {} at {}", spell, target),
            Command::Cast { spell, target: None } => write!(f, "cast {}", spell),
            Command::FireAt { target } => write!(f, "fire at {}", target),
            Command::ChangeTorchRadius { delta } => write!(f, "torch {:+}", delta),
        }
    }
}
