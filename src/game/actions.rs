//! # Actions
//!
//! Results handed back to the input layer, and the flight path of arrows.

use crate::{bresenham_line, EntityId, EntityRegistry, Level, Position};
use serde::{Deserialize, Serialize};

/// What a command did, for the caller to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command was carried out. Rejected commands consume no turn.
    pub accepted: bool,
    /// Log lines appended while the command ran
    pub messages: Vec<String>,
    /// The player's arrow, when the command fired one
    pub arrow: Option<ArrowFlight>,
}

impl CommandOutcome {
    pub fn rejected(messages: Vec<String>) -> Self {
        Self {
            accepted: false,
            messages,
            arrow: None,
        }
    }
}

/// Path of a single arrow: where it left from, where it stopped and whom it hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowFlight {
    pub start: Position,
    pub end: Position,
    pub victim: Option<EntityId>,
}

/// Traces an arrow from `start` toward `target` on one depth.
///
/// The arrow ignores its own starting tile. It stops on the tile before the
/// first flight-blocking tile, or on the first tile holding a living creature,
/// which becomes the victim. Positions outside the level block flight.
pub fn trace_arrow(
    level: &Level,
    registry: &EntityRegistry,
    start: Position,
    target: Position,
) -> ArrowFlight {
    let path = bresenham_line(start, target);
    let mut end = target;
    let mut previous = start;

    for &point in path.iter().skip(1) {
        let blocked = level.get_tile(point).map(|t| t.blocks_flight()).unwrap_or(true);
        if blocked {
            end = previous;
            break;
        }
        if let Some(creature) = registry.creature_at(point, level.depth) {
            return ArrowFlight {
                start,
                end: point,
                victim: Some(creature.id),
            };
        }
        previous = point;
    }

    ArrowFlight {
        start,
        end,
        victim: None,
    }
}
