//! Capability tags
//!
//! Tags decide which processor logic touches an entity and which attributes
//! it is guaranteed to have.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Tags: u64 {
        // Fundamental characteristics
        const HUMAN = 1 << 0;
        const ENEMY = 1 << 1;
        const ROCK = 1 << 2;
        const BULLET = 1 << 3;
        const STAR = 1 << 4;
        const EXPLOSION = 1 << 5;

        // Interactions with others
        const MOVEABLE = 1 << 6;
        const SOLID = 1 << 7;
        const ORBITABLE = 1 << 8;
        const COLLECTOR = 1 << 9;
        const DRAWABLE = 1 << 10;
        const DAMAGEABLE = 1 << 11;
        const BOUNDED = 1 << 12;

        // Object state
        const USER_CONTROLLABLE = 1 << 13;
        const ROTATES = 1 << 14;
        const FACES_USER = 1 << 15;
        const DEAD = 1 << 16;
        const AI = 1 << 17;
        const COLLECTOR_ACTIVE = 1 << 18;

        // Attack patterns
        const SHOOTING_ATTACK = 1 << 19;
        const CONTACT_ATTACK = 1 << 20;
        const WIDE_SHOOTING_ATTACK = 1 << 21;
        const EXPLODING_ATTACK = 1 << 22;
        const SWARMING_ATTACK = 1 << 23;

        // Movement patterns
        const JAGGED_PATH = 1 << 24;
        const TRACKING_PATH = 1 << 25;
        const BULLDOZE_PATH = 1 << 26;
        const CIRCLE_PATH = 1 << 27;
    }
}

impl Tags {
    /// Entities removed from the collection at the end of a tick
    pub const PRUNED: Tags = Tags::DEAD.union(Tags::EXPLOSION);

    pub const MOVEMENT_PATTERNS: Tags = Tags::JAGGED_PATH
        .union(Tags::TRACKING_PATH)
        .union(Tags::BULLDOZE_PATH)
        .union(Tags::CIRCLE_PATH);

    pub const ATTACK_PATTERNS: Tags = Tags::SHOOTING_ATTACK
        .union(Tags::CONTACT_ATTACK)
        .union(Tags::WIDE_SHOOTING_ATTACK)
        .union(Tags::EXPLODING_ATTACK)
        .union(Tags::SWARMING_ATTACK);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_groups_are_disjoint() {
        assert!(!Tags::MOVEMENT_PATTERNS.intersects(Tags::ATTACK_PATTERNS));
        assert_eq!(Tags::MOVEMENT_PATTERNS.bits().count_ones(), 4);
        assert_eq!(Tags::ATTACK_PATTERNS.bits().count_ones(), 5);
    }

    #[test]
    fn test_pruned_covers_dead_and_explosion() {
        assert!(Tags::PRUNED.contains(Tags::DEAD));
        assert!(Tags::PRUNED.contains(Tags::EXPLOSION));
        assert!(!Tags::PRUNED.contains(Tags::ENEMY));
    }
}
