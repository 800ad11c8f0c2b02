//! HTTP client for the M4DB run coordinator.
//!
//! [`CoordinatorClient`] speaks the coordinator's JSON protocol and retries
//! transient failures according to a [`RetryPolicy`]. Job runners depend on
//! the [`RunCoordinator`] trait rather than the concrete client.

pub mod api;
pub mod coordinator;
pub mod retry;

pub use api::{CoordinatorClient, CoordinatorError};
pub use coordinator::RunCoordinator;
pub use m4db_core::wire::RunPrerequisites;
pub use retry::RetryPolicy;
