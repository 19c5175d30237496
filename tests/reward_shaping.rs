//! Reward shaping terms evaluated on small hand-built worlds

mod common;

use common::MockWorld;
use evader::{q_learning::RewardConfig, types::Cell};

#[test]
fn test_capture_overrides_other_terms() {
    let world = MockWorld::from_rows(&["#..", "..."]);
    let rewards = RewardConfig::default();
    // the destination is a corner and distance shrinks, yet only capture counts
    let reward = rewards.shape(&world, Cell::new(1, 1), Cell::new(0, 0), Cell::new(0, 0));
    assert_eq!(reward, -100.0);
}

#[test]
fn test_gain_in_open_field() {
    let world = MockWorld::open(9, 9);
    let rewards = RewardConfig::default();
    let reward = rewards.shape(&world, Cell::new(4, 4), Cell::new(4, 5), Cell::new(4, 1));
    assert_eq!(reward, 100.0);
}

#[test]
fn test_retreating_into_danger() {
    let world = MockWorld::open(9, 9);
    let rewards = RewardConfig::default();
    // distance 2 -> 2: no gain inside the danger radius
    let reward = rewards.shape(&world, Cell::new(4, 4), Cell::new(5, 5), Cell::new(4, 6));
    assert_eq!(reward, -110.0);
    // distance 4 -> 3: plain no-gain penalty
    let reward = rewards.shape(&world, Cell::new(4, 4), Cell::new(4, 3), Cell::new(4, 0));
    assert_eq!(reward, -10.0);
}

#[test]
fn test_wall_between_agents_earns_bonus() {
    let world = MockWorld::from_rows(&[".......", "...#...", "......."]);
    let rewards = RewardConfig::default();
    // from (1, 0) to (1, 1): distance 5 -> 4 and the wall at (3, 1) hides the pursuer
    let reward = rewards.shape(&world, Cell::new(1, 0), Cell::new(1, 1), Cell::new(5, 1));
    assert_eq!(reward, -10.0 + 20.0);
}

#[test]
fn test_corner_penalty() {
    let world = MockWorld::open(9, 9);
    let rewards = RewardConfig::default();
    let reward = rewards.shape(&world, Cell::new(1, 0), Cell::new(0, 0), Cell::new(8, 8));
    // gained one cell, lands in the world corner
    assert_eq!(reward, 100.0 - 50.0);
}

#[test]
fn test_custom_constants() {
    let world = MockWorld::open(9, 9);
    let rewards = RewardConfig {
        per_cell_gained: 7.0,
        ..RewardConfig::default()
    };
    let reward = rewards.shape(&world, Cell::new(4, 4), Cell::new(4, 5), Cell::new(4, 1));
    assert_eq!(reward, 7.0);
}
