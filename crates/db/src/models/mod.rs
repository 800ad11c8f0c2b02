//! Registry entities and their create DTOs.
//!
//! Each submodule contains a `Serialize` + `Deserialize` entity struct (the
//! snapshot form) and a `Deserialize` create DTO.

pub mod geometry;
pub mod material;
pub mod model;
pub mod neb;
