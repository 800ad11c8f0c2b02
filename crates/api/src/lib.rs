//! M4DB run coordinator library.
//!
//! Exposes the building blocks of the coordinator service (config, state,
//! error handling, routes) so integration tests and the binary entrypoint
//! can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
