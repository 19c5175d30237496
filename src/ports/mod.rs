//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning engine and its
//! collaborators. Following hexagonal architecture, these traits are owned by
//! the domain and implemented by adapters in the infrastructure layer.

pub mod navigator;
pub mod observer;
pub mod repository;
pub mod world;

pub use navigator::Navigator;
pub use observer::EpisodeObserver;
pub use repository::{LoadStatus, TableRepository};
pub use world::{Destination, World};
