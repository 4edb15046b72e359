//! # Item Generation
//!
//! Gold piles and scrolls scattered through procedurally generated rooms.

use crate::{EntityKind, GenerationConfig, ItemKind, Room, Spawn};
use log::debug;
use rand::Rng;

/// Rolls once per room for an item; gold or a scroll by `gold_share`.
pub fn seed_items<R: Rng + ?Sized>(
    rooms: &[Room],
    config: &GenerationConfig,
    rng: &mut R,
) -> Vec<Spawn> {
    let chance = config.item_chance.clamp(0.0, 1.0);
    let gold_share = config.gold_share.clamp(0.0, 1.0);
    let mut spawns = Vec::new();
    for room in rooms {
        if !rng.gen_bool(chance) {
            continue;
        }
        let item = if rng.gen_bool(gold_share) {
            ItemKind::random_gold(rng)
        } else {
            ItemKind::random_scroll(rng)
        };
        let position = room.random_interior(rng);
        debug!("{:?} placed at {}", item, position);
        spawns.push(Spawn::new(position, EntityKind::Item(item)));
    }
    spawns
}
