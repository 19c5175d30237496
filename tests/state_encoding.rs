//! State encoder tests against the World port

mod common;

use std::collections::HashSet;

use common::MockWorld;
use evader::{
    q_learning::{Horizontal, Observation, StateEncoder, StateId, Vertical},
    types::Cell,
};

#[test]
fn test_enclosed_learner_reads_only_pursuer_position() {
    let world = MockWorld::from_rows(&["###", "#.#", "###"]);
    let learner = Cell::new(1, 1);

    // walls everywhere: bitmask 0, so id = vertical*3 + horizontal
    assert_eq!(StateEncoder::encode(&world, learner, Cell::new(2, 2)).index(), 0);
    assert_eq!(StateEncoder::encode(&world, learner, Cell::new(0, 0)).index(), 4);
    assert_eq!(StateEncoder::encode(&world, learner, learner).index(), 8);
}

#[test]
fn test_open_cell_pursuer_above_right() {
    let world = MockWorld::open(5, 5);
    let id = StateEncoder::encode(&world, Cell::new(2, 2), Cell::new(4, 4));
    assert_eq!(id.index(), 135);
}

#[test]
fn test_world_edge_counts_as_blocked() {
    let world = MockWorld::open(2, 2);
    // (0, 0): north and east open, south and west off the grid
    let observation = Observation::observe(&world, Cell::new(0, 0), Cell::new(1, 0));
    assert!(observation.north && observation.east);
    assert!(!observation.south && !observation.west);
    assert_eq!(observation.bitmask(), 1 + 4);
    assert_eq!(observation.vertical, Vertical::Level);
    assert_eq!(observation.horizontal, Horizontal::Right);
    assert_eq!(observation.state_id().index(), 5 * 9 + 2 * 3);
}

#[test]
fn test_every_id_is_reachable_and_distinct() {
    // a plus-shaped neighbourhood lets each wall pattern be toggled
    let offsets = [(0, 1), (0, -1), (1, 0), (-1, 0)];
    let learner = Cell::new(2, 2);
    let pursuers = [
        Cell::new(3, 4),
        Cell::new(1, 4),
        Cell::new(2, 4),
        Cell::new(3, 0),
        Cell::new(1, 0),
        Cell::new(2, 0),
        Cell::new(4, 2),
        Cell::new(0, 2),
        learner,
    ];

    let mut seen = HashSet::new();
    for mask in 0..16u8 {
        let mut world = MockWorld::open(5, 5);
        for (bit, (dx, dy)) in offsets.iter().enumerate() {
            if mask & (1 << bit) == 0 {
                world.walls.insert(Cell::new(learner.x + dx, learner.y + dy));
            }
        }
        for pursuer in pursuers {
            let id = StateEncoder::encode(&world, learner, pursuer);
            assert_eq!(usize::from(mask), id.index() / 9);
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), StateId::COUNT);
}

#[test]
fn test_decode_inverts_encode() {
    for id in StateId::all() {
        assert_eq!(Observation::from_state_id(id).state_id(), id);
    }
}
