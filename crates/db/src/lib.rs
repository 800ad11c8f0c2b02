//! Coordinator state for M4DB: geometries, materials, models and NEB paths.
//!
//! The [`Registry`] is the single source of truth the coordinator serves
//! from. It is held in memory and optionally mirrored to a JSON snapshot.

pub mod models;
pub mod registry;
pub mod repositories;

pub use registry::{Registry, SnapshotError};
