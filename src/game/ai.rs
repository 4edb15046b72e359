//! # Monster AI
//!
//! Monsters either close in on the player or wander. The returned step is
//! always legal with respect to the tile grid; occupancy by other creatures
//! is checked by the scheduler when the step is applied.

use crate::{step_toward, Entity, Level, Position};
use log::trace;
use rand::Rng;

/// Chooses the next step `(dx, dy)` of a monster, each component in {-1, 0, 1}.
///
/// Stationary monsters and entities without AI never move. Inside the aggro
/// radius a monster steps toward the player on both axes; outside it picks a
/// random step. A step that would leave the grid or enter a blocking tile
/// becomes `(0, 0)`.
pub fn monster_step<R: Rng + ?Sized>(
    monster: &Entity,
    player_pos: Position,
    level: &Level,
    rng: &mut R,
) -> (i32, i32) {
    let Some(ai) = monster.ai.as_ref() else {
        return (0, 0);
    };
    if ai.stationary {
        return (0, 0);
    }

    let here = monster.position;
    let (dx, dy) = if here.euclidean_distance(player_pos) < ai.aggro_radius {
        (
            step_toward(player_pos.x - here.x),
            step_toward(player_pos.y - here.y),
        )
    } else {
        (rng.gen_range(-1..=1), rng.gen_range(-1..=1))
    };

    let target = here.offset(dx, dy);
    if !level.is_walkable(target) {
        trace!("{} at {} cannot step to {}", monster.name(), here, target);
        return (0, 0);
    }
    (dx, dy)
}
