//! Table-level operations over [`Tables`](crate::registry::Tables).
//!
//! Repositories are stateless; the [`Registry`](crate::Registry) hands them
//! the tables under the appropriate lock.

mod geometry_repo;
mod material_repo;
mod model_repo;
mod neb_repo;

pub use geometry_repo::GeometryRepo;
pub use material_repo::MaterialRepo;
pub use model_repo::ModelRepo;
pub use neb_repo::NebRepo;
