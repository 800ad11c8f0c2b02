//! NEB endpoint consistency rules.
//!
//! A root NEB path (one that does not refine a parent path) interpolates
//! between two models of the same physical system: both endpoints must sit
//! on the same geometry and be made of the same materials. The check runs
//! once, before the NEB is persisted.

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::types::{DbId, UniqueId};

/// Default number of energy evaluations per path point.
pub const DEFAULT_NEB_MAX_ENERGY_EVALUATIONS: i64 = 10_000;

/// Default number of evaluations of the complete path.
pub const DEFAULT_NEB_MAX_PATH_EVALUATIONS: i64 = 5_000;

/// A material assigned to one submesh of an endpoint model.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMaterial {
    pub material_id: DbId,
    pub name: String,
    pub temperature: f64,
}

/// The parts of a model the NEB rules look at.
#[derive(Debug, Clone)]
pub struct NebEndpoint {
    pub unique_id: UniqueId,
    pub geometry_id: DbId,
    pub materials: Vec<EndpointMaterial>,
}

/// Validate the endpoints of a root NEB.
///
/// Checks, in order: same geometry, same number of materials, same set of
/// material identities.
pub fn validate_root_neb(start: &NebEndpoint, end: &NebEndpoint) -> Result<(), CoreError> {
    if start.geometry_id != end.geometry_id {
        return Err(CoreError::InvariantViolation(format!(
            "NEB does not have start/end models with same geometry \
             (start {} has geometry {}, end {} has geometry {})",
            start.unique_id, start.geometry_id, end.unique_id, end.geometry_id
        )));
    }

    if start.materials.len() != end.materials.len() {
        return Err(CoreError::InvariantViolation(format!(
            "NEB does not have start/end models with same material. \
             No of start model materials: {}, no. of end model materials: {}",
            describe(&start.materials),
            describe(&end.materials)
        )));
    }

    let start_ids: BTreeSet<DbId> = start.materials.iter().map(|m| m.material_id).collect();
    let end_ids: BTreeSet<DbId> = end.materials.iter().map(|m| m.material_id).collect();
    if start_ids != end_ids {
        return Err(CoreError::InvariantViolation(
            "NEB does not have start/end models with same material".to_string(),
        ));
    }

    Ok(())
}

fn describe(materials: &[EndpointMaterial]) -> String {
    materials
        .iter()
        .map(|m| format!("{} {}", m.name, m.temperature))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn magnetite(id: DbId, temperature: f64) -> EndpointMaterial {
        EndpointMaterial {
            material_id: id,
            name: "magnetite".to_string(),
            temperature,
        }
    }

    fn endpoint(geometry_id: DbId, materials: Vec<EndpointMaterial>) -> NebEndpoint {
        NebEndpoint {
            unique_id: uuid::Uuid::new_v4(),
            geometry_id,
            materials,
        }
    }

    #[test]
    fn matching_endpoints_validate() {
        let start = endpoint(7, vec![magnetite(1, 20.0), magnetite(2, 100.0)]);
        let end = endpoint(7, vec![magnetite(2, 100.0), magnetite(1, 20.0)]);
        assert!(validate_root_neb(&start, &end).is_ok());
    }

    #[test]
    fn different_geometry_is_rejected() {
        let start = endpoint(7, vec![magnetite(1, 20.0)]);
        let end = endpoint(8, vec![magnetite(1, 20.0)]);
        let err = validate_root_neb(&start, &end).unwrap_err();
        assert_matches!(err, CoreError::InvariantViolation(msg) if msg.contains("same geometry"));
    }

    #[test]
    fn different_material_count_is_rejected() {
        let start = endpoint(7, vec![magnetite(1, 20.0)]);
        let end = endpoint(7, vec![magnetite(1, 20.0), magnetite(2, 100.0)]);
        let err = validate_root_neb(&start, &end).unwrap_err();
        assert_matches!(err, CoreError::InvariantViolation(msg) if msg.contains("magnetite 100"));
    }

    #[test]
    fn different_material_set_is_rejected() {
        let start = endpoint(7, vec![magnetite(1, 20.0)]);
        let end = endpoint(7, vec![magnetite(3, 20.0)]);
        assert_matches!(
            validate_root_neb(&start, &end),
            Err(CoreError::InvariantViolation(_))
        );
    }

    #[test]
    fn geometry_is_checked_before_materials() {
        let start = endpoint(1, vec![magnetite(1, 20.0)]);
        let end = endpoint(2, vec![]);
        let err = validate_root_neb(&start, &end).unwrap_err();
        assert!(err.to_string().contains("same geometry"));
    }
}
