//! Job execution for M4DB models.
//!
//! A [`runner::JobRunner`] drives one model from "may it run?" to a
//! finished archive: it waits a jittered delay, resolves the parent
//! dependency ([`resolver`]), spawns the solver ([`solver`]), interprets
//! the output and reports the results back to the coordinator.

pub mod config;
pub mod error;
pub mod jitter;
pub mod resolver;
pub mod runner;
pub mod solver;

pub use config::RunnerConfig;
pub use error::PipelineError;
pub use runner::{DeferReason, FinishedJob, JobOutcome, JobRunner};
