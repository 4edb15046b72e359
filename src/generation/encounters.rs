//! # Encounter Generation
//!
//! Monster placement for procedurally generated rooms.

use crate::{EntityKind, GenerationConfig, Position, Room, Spawn, Species};
use log::debug;
use rand::Rng;
use std::collections::BTreeSet;

/// Rolls once per room and places a wolf on a random interior tile on success.
///
/// A wolf whose tile is in `occupied` (stairs, arriving entities) is not placed.
pub fn seed_monsters<R: Rng + ?Sized>(
    rooms: &[Room],
    occupied: &BTreeSet<Position>,
    config: &GenerationConfig,
    rng: &mut R,
) -> Vec<Spawn> {
    let chance = config.monster_chance.clamp(0.0, 1.0);
    let mut spawns = Vec::new();
    for room in rooms {
        if rng.gen_bool(chance) {
            let position = room.random_interior(rng);
            if occupied.contains(&position) {
                debug!("wolf skipped, {} is taken", position);
                continue;
            }
            debug!("wolf placed at {}", position);
            spawns.push(Spawn::new(position, EntityKind::Monster(Species::Wolf)));
        }
    }
    spawns
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_chance_extremes() {
        let mut rng = StdRng::seed_from_u64(4);
        let rooms = vec![Room::new(0, 0, 6, 6), Room::new(10, 0, 6, 6), Room::new(20, 0, 8, 6)];

        let mut config = GenerationConfig::default();
        config.monster_chance = 1.0;
        let spawns = seed_monsters(&rooms, &BTreeSet::new(), &config, &mut rng);
        assert_eq!(spawns.len(), 3);
        for (spawn, room) in spawns.iter().zip(&rooms) {
            assert!(room.contains_interior(spawn.position));
            assert_eq!(spawn.kind, EntityKind::Monster(Species::Wolf));
        }

        config.monster_chance = 0.0;
        assert!(seed_monsters(&rooms, &BTreeSet::new(), &config, &mut rng).is_empty());
    }

    #[test]
    fn test_taken_tiles_get_no_wolf() {
        let mut rng = StdRng::seed_from_u64(9);
        let small = Room::new(0, 0, 2, 2);
        let rooms = vec![small, Room::new(10, 0, 6, 6)];
        let occupied: BTreeSet<Position> = small.interior_positions().into_iter().collect();

        let mut config = GenerationConfig::default();
        config.monster_chance = 1.0;
        for _ in 0..20 {
            let spawns = seed_monsters(&rooms, &occupied, &config, &mut rng);
            assert_eq!(spawns.len(), 1);
            assert!(rooms[1].contains_interior(spawns[0].position));
        }
    }
}
