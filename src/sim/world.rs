//! Entity arena
//!
//! Owns the live entities in spawn order. Ids are handed out once and never
//! reused within a world, so processors can refer to each other's entities
//! (captured objects, AI targets) by `EntityId` across ticks.

use super::entity::{Entity, EntityId};
use super::tags::Tags;

#[derive(Debug, Clone)]
pub struct World {
    entities: Vec<Entity>,
    /// Next entity ID
    next_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Give `entity` an id if it does not have one yet
    pub fn register(&mut self, entity: &mut Entity) -> EntityId {
        if !entity.id().is_assigned() {
            let id = self.next_entity_id();
            entity.set_id(id);
        }
        entity.id()
    }

    /// Append an entity, registering it first
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.register(&mut entity);
        self.entities.push(entity);
        id
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Mutable access to two distinct entities at once
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Entity, &mut Entity) {
        assert_ne!(a, b, "pair_mut needs two distinct indices");
        if a < b {
            let (left, right) = self.entities.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.entities.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }

    /// Entities carrying all of `tags`
    pub fn tagged(&self, tags: Tags) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.has(tags))
    }

    pub fn count_tagged(&self, tags: Tags) -> usize {
        self.tagged(tags).count()
    }

    /// Drop dead entities and one-shot markers; returns how many were removed
    pub fn prune(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !e.tags().intersects(Tags::PRUNED));
        before - self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::factory::{make_human, make_rock};

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let mut world = World::new();
        let a = world.spawn(make_human());
        let b = world.spawn(make_rock());
        assert_ne!(a, b);
        assert!(a.is_assigned() && b.is_assigned());
        assert_eq!(world.index_of(b), Some(1));
    }

    #[test]
    fn test_register_keeps_existing_id() {
        let mut world = World::new();
        let mut rock = make_rock();
        let id = world.register(&mut rock);
        assert_eq!(world.spawn(rock), id);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut world = World::new();
        world.spawn(make_human());
        world.spawn(make_rock());
        {
            let (a, b) = world.pair_mut(0, 1);
            assert!(a.has(Tags::HUMAN));
            assert!(b.has(Tags::ROCK));
        }
        let (a, b) = world.pair_mut(1, 0);
        assert!(a.has(Tags::ROCK));
        assert!(b.has(Tags::HUMAN));
    }

    #[test]
    fn test_prune_keeps_order() {
        let mut world = World::new();
        let human = world.spawn(make_human());
        let dead = world.spawn(make_rock());
        let rock = world.spawn(make_rock());
        world.get_mut(dead).unwrap().kill();

        assert_eq!(world.prune(), 1);
        let ids: Vec<_> = world.entities().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![human, rock]);
    }
}
