//! Configuration for the `m4db-worker` binary.

pub mod config;
