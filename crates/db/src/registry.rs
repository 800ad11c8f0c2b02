//! The coordinator's registry: every entity behind one async lock.
//!
//! Reads take the shared lock; every mutation takes the exclusive lock for
//! its whole check-then-write sequence, which is what makes the conditional
//! status update and NEB validation atomic. When a snapshot path is set,
//! each successful mutation rewrites the snapshot (temp file, then rename)
//! before the lock is released.

use std::collections::BTreeMap;
use std::path::PathBuf;

use m4db_core::error::CoreError;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::types::{DbId, UniqueId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::geometry::{CreateGeometry, Geometry};
use crate::models::material::{CreateMaterial, Material};
use crate::models::model::{CreateModel, Model, ModelRunContext};
use crate::models::neb::{CreateNeb, Neb};
use crate::repositories::{GeometryRepo, MaterialRepo, ModelRepo, NebRepo};

/// Errors loading or writing a registry snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The raw entity tables. Repositories operate on these under the lock.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Tables {
    pub(crate) last_id: DbId,
    pub(crate) geometries: BTreeMap<DbId, Geometry>,
    pub(crate) materials: BTreeMap<DbId, Material>,
    pub(crate) models: BTreeMap<UniqueId, Model>,
    pub(crate) nebs: BTreeMap<UniqueId, Neb>,
}

impl Tables {
    /// Allocate the next row id, shared across all tables.
    pub(crate) fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl Registry {
    /// A registry that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a snapshot-backed registry. A missing file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let path = path.into();
        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No registry snapshot, starting empty");
                Tables::default()
            }
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };
        tracing::info!(
            path = %path.display(),
            models = tables.models.len(),
            nebs = tables.nebs.len(),
            "Registry loaded",
        );
        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_path: Some(path),
        })
    }

    /// Write the current state to the snapshot path, if one is configured.
    pub async fn save(&self) -> Result<(), SnapshotError> {
        let tables = self.tables.read().await;
        self.persist(&tables).await
    }

    async fn persist(&self, tables: &Tables) -> Result<(), SnapshotError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(tables).map_err(|source| SnapshotError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| SnapshotError::Io {
            path: tmp.clone(),
            source,
        };
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Registry snapshot written");
        Ok(())
    }

    /// Run `op` under the write lock and persist on success.
    ///
    /// With a snapshot configured, `op` works on a copy that replaces the
    /// live tables only once the snapshot is written: a failed write leaves
    /// the registry as it was.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Tables) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut tables = self.tables.write().await;
        if self.snapshot_path.is_none() {
            return op(&mut tables);
        }
        let mut staged = tables.clone();
        let out = op(&mut staged)?;
        self.persist(&staged).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to persist registry snapshot");
            CoreError::Internal(e.to_string())
        })?;
        *tables = staged;
        Ok(out)
    }

    // -- geometries and materials --

    pub async fn insert_geometry(&self, input: CreateGeometry) -> Result<Geometry, CoreError> {
        self.mutate(|t| GeometryRepo::insert(t, input)).await
    }

    pub async fn insert_material(&self, input: CreateMaterial) -> Result<Material, CoreError> {
        self.mutate(|t| MaterialRepo::insert(t, input)).await
    }

    // -- models --

    pub async fn insert_model(&self, input: CreateModel) -> Result<Model, CoreError> {
        self.mutate(|t| ModelRepo::insert(t, input)).await
    }

    pub async fn find_model(&self, unique_id: &UniqueId) -> Result<Model, CoreError> {
        let tables = self.tables.read().await;
        ModelRepo::find(&tables, unique_id).cloned()
    }

    pub async fn model_status(&self, unique_id: &UniqueId) -> Result<RunningStatus, CoreError> {
        let tables = self.tables.read().await;
        ModelRepo::find(&tables, unique_id).map(|m| m.running_status)
    }

    /// Set a model's status, optionally only if it currently is `expected`.
    pub async fn set_model_status(
        &self,
        unique_id: &UniqueId,
        new_status: RunningStatus,
        expected: Option<RunningStatus>,
    ) -> Result<RunningStatus, CoreError> {
        self.mutate(|t| ModelRepo::set_status(t, unique_id, new_status, expected))
            .await
    }

    /// Merge `update` into a model's quants and return the merged set.
    pub async fn merge_model_quants(
        &self,
        unique_id: &UniqueId,
        update: &ModelQuants,
    ) -> Result<ModelQuants, CoreError> {
        self.mutate(|t| ModelRepo::merge_quants(t, unique_id, update))
            .await
    }

    pub async fn model_run_context(
        &self,
        unique_id: &UniqueId,
    ) -> Result<ModelRunContext, CoreError> {
        let tables = self.tables.read().await;
        ModelRepo::run_context(&tables, unique_id)
    }

    // -- NEBs --

    /// Validate and insert a NEB in one critical section.
    pub async fn insert_neb(&self, input: CreateNeb) -> Result<Neb, CoreError> {
        self.mutate(|t| NebRepo::insert(t, input)).await
    }

    pub async fn find_neb(&self, unique_id: &UniqueId) -> Result<Neb, CoreError> {
        let tables = self.tables.read().await;
        NebRepo::find(&tables, unique_id).cloned()
    }

    pub async fn neb_count(&self) -> usize {
        self.tables.read().await.nebs.len()
    }
}
