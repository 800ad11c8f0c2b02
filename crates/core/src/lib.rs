//! Domain logic shared by the M4DB coordinator and its job runners.
//!
//! Everything here is pure (no network, no registry access): running
//! statuses, initial magnetization variants, result quantities, the on-disk
//! layout, NEB endpoint validation, script rendering, archive handling,
//! solver output post-processing and the coordinator wire types.

pub mod archive;
pub mod directories;
pub mod error;
pub mod magnetization;
pub mod neb;
pub mod postprocessing;
pub mod quants;
pub mod running_status;
pub mod script;
pub mod types;
pub mod wire;
