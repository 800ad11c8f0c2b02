//! The coordinator seam used by job runners.

use async_trait::async_trait;
use m4db_core::magnetization::InitialMagnetization;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::types::UniqueId;
use m4db_core::wire::RunPrerequisites;

use crate::api::{CoordinatorClient, CoordinatorError};

/// Operations a job runner performs against the coordinator.
#[async_trait]
pub trait RunCoordinator: Send + Sync {
    async fn get_running_status(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunningStatus, CoordinatorError>;

    async fn get_initial_magnetization(
        &self,
        unique_id: &UniqueId,
    ) -> Result<InitialMagnetization, CoordinatorError>;

    async fn get_run_prerequisites(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunPrerequisites, CoordinatorError>;

    /// Unconditional (last-write-wins) status update.
    async fn set_running_status(
        &self,
        unique_id: &UniqueId,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError>;

    /// Status update that fails with [`CoordinatorError::Conflict`] unless the
    /// current status is `expected`.
    async fn set_running_status_if(
        &self,
        unique_id: &UniqueId,
        expected: RunningStatus,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError>;

    /// Merge `quants` into the stored ones; returns the merged set.
    async fn set_quants(
        &self,
        unique_id: &UniqueId,
        quants: &ModelQuants,
    ) -> Result<ModelQuants, CoordinatorError>;
}

#[async_trait]
impl RunCoordinator for CoordinatorClient {
    async fn get_running_status(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunningStatus, CoordinatorError> {
        CoordinatorClient::get_running_status(self, unique_id).await
    }

    async fn get_initial_magnetization(
        &self,
        unique_id: &UniqueId,
    ) -> Result<InitialMagnetization, CoordinatorError> {
        CoordinatorClient::get_initial_magnetization(self, unique_id).await
    }

    async fn get_run_prerequisites(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunPrerequisites, CoordinatorError> {
        CoordinatorClient::get_run_prerequisites(self, unique_id).await
    }

    async fn set_running_status(
        &self,
        unique_id: &UniqueId,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError> {
        CoordinatorClient::set_running_status(self, unique_id, new_status).await
    }

    async fn set_running_status_if(
        &self,
        unique_id: &UniqueId,
        expected: RunningStatus,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError> {
        CoordinatorClient::set_running_status_if(self, unique_id, expected, new_status).await
    }

    async fn set_quants(
        &self,
        unique_id: &UniqueId,
        quants: &ModelQuants,
    ) -> Result<ModelQuants, CoordinatorError> {
        CoordinatorClient::set_quants(self, unique_id, quants).await
    }
}
