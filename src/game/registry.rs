//! # Entity Registry
//!
//! Id-keyed storage for every entity in the dungeon. Ids grow monotonically
//! and are never handed out twice, even after the entity is removed.

use crate::{Entity, EntityId, EntityKind, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All entities of the world, ordered by id for deterministic iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and stores a new entity, returning its fresh id.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        kind: EntityKind,
        position: Position,
        depth: u32,
        rng: &mut R,
    ) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entities
            .insert(id, Entity::build(id, kind, position, depth, rng));
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Entities on one depth, in id order.
    pub fn on_depth(&self, depth: u32) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.depth == depth)
    }

    /// Entities standing exactly on a tile.
    pub fn at(&self, position: Position, depth: u32) -> impl Iterator<Item = &Entity> {
        self.on_depth(depth).filter(move |e| e.position == position)
    }

    /// The living creature (player or monster) on a tile, if any.
    pub fn creature_at(&self, position: Position, depth: u32) -> Option<&Entity> {
        self.at(position, depth)
            .find(|e| e.is_creature() && e.is_alive())
    }

    /// The living monster on a tile, if any.
    pub fn living_monster_at(&self, position: Position, depth: u32) -> Option<&Entity> {
        self.at(position, depth).find(|e| e.is_monster() && e.is_alive())
    }

    /// Ids of all living monsters on a depth, taken as a snapshot.
    pub fn living_monster_ids(&self, depth: u32) -> Vec<EntityId> {
        self.on_depth(depth)
            .filter(|e| e.is_monster() && e.is_alive())
            .map(|e| e.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemKind, Species, StairDirection};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ids_are_never_reused() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut registry = EntityRegistry::new();
        let a = registry.spawn(EntityKind::Shop, Position::new(1, 1), 0, &mut rng);
        let b = registry.spawn(EntityKind::Shop, Position::new(2, 1), 0, &mut rng);
        assert!(b > a);

        registry.remove(b);
        let c = registry.spawn(EntityKind::Shop, Position::new(3, 1), 0, &mut rng);
        assert!(c > b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_spatial_queries() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut registry = EntityRegistry::new();
        let here = Position::new(4, 4);
        registry.spawn(EntityKind::Stair(StairDirection::Down), here, 0, &mut rng);
        registry.spawn(EntityKind::Item(ItemKind::Gold { value: 5 }), here, 0, &mut rng);
        let wolf = registry.spawn(EntityKind::Monster(Species::Wolf), here, 0, &mut rng);
        registry.spawn(EntityKind::Monster(Species::Snake), here, 1, &mut rng);

        assert_eq!(registry.at(here, 0).count(), 3);
        assert_eq!(registry.living_monster_at(here, 0).map(|e| e.id), Some(wolf));
        assert_eq!(registry.living_monster_ids(0), vec![wolf]);
        assert!(registry.creature_at(Position::new(5, 4), 0).is_none());

        if let Some(entity) = registry.get_mut(wolf) {
            entity.hitpoints = 0;
        }
        assert!(registry.living_monster_at(here, 0).is_none());
        assert!(registry.living_monster_ids(0).is_empty());
    }
}
