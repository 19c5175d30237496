//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module: the grid world, the pursuer and table storage.
//! Following hexagonal architecture, adapters depend on domain ports, not
//! the other way around.

pub mod chaser;
pub mod grid_world;
pub mod in_memory_repository;
pub mod text_repository;

pub use chaser::BfsChaser;
pub use grid_world::GridWorld;
pub use in_memory_repository::InMemoryRepository;
pub use text_repository::TextFileRepository;
