//! In-process coordinator and fake solvers for runner tests.

use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use m4db_client::{CoordinatorError, RunCoordinator, RunPrerequisites};
use m4db_core::archive::zip_directory;
use m4db_core::directories::{FileLayout, MAGNETIZATION_TECPLOT_FILE_NAME};
use m4db_core::magnetization::InitialMagnetization;
use m4db_core::quants::ModelQuants;
use m4db_core::running_status::RunningStatus;
use m4db_core::types::UniqueId;
use m4db_pipeline::{JobRunner, RunnerConfig};

/// Single-tetrahedron field with uniform magnetization along x.
pub const TECPLOT: &str = r#"TITLE = "magnetization"
VARIABLES = "X","Y","Z","Mx","My","Mz","Vx","Vy","Vz","H","RH","ADM"
ZONE T="1", N=4, E=1, F=FEPOINT, ET=TETRAHEDRON
0 0 0 1 0 0 0 0 0 0 0 0
1 0 0 1 0 0 0 0 0 0 0 0
0 1 0 1 0 0 0 0 0 0 0 0
0 0 1 1 0 0 0 0 0 0 0 0
1 2 3 4
"#;

pub const ENERGY_REPORT: &str = "\
 Energies in units of Kd V:   1.6023E-17
 E-Anis       -0.0021
 E-ext         0.0000
 E-Demag       0.1342
 E-Exch        0.4123
 E-Exch2       0.4120
 E-Exch3       0.4119
 E-Exch4       0.4125
 E-Tot         0.5444
";

pub const SENTINEL: &str = "Merrill script run complete";

#[derive(Default)]
struct Model {
    status: Option<RunningStatus>,
    initial: Option<InitialMagnetization>,
    prerequisites: Option<RunPrerequisites>,
    quants: ModelQuants,
}

/// Coordinator state held in memory, with a log of every write.
#[derive(Default)]
pub struct FakeCoordinator {
    models: Mutex<HashMap<UniqueId, Model>>,
    /// Writes in call order, e.g. `set-quants` or `status:running`.
    pub writes: Mutex<Vec<String>>,
    /// Status a competing runner sets just before our claim lands.
    pub steal_claim: Mutex<Option<RunningStatus>>,
}

impl FakeCoordinator {
    pub fn add(
        &self,
        unique_id: UniqueId,
        status: RunningStatus,
        initial: InitialMagnetization,
        prerequisites: Option<RunPrerequisites>,
    ) {
        self.models.lock().unwrap().insert(
            unique_id,
            Model {
                status: Some(status),
                initial: Some(initial),
                prerequisites,
                quants: ModelQuants::default(),
            },
        );
    }

    pub fn status(&self, unique_id: &UniqueId) -> RunningStatus {
        self.models.lock().unwrap()[unique_id].status.unwrap()
    }

    pub fn quants(&self, unique_id: &UniqueId) -> ModelQuants {
        self.models.lock().unwrap()[unique_id].quants.clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    fn with_model<T>(
        &self,
        unique_id: &UniqueId,
        f: impl FnOnce(&mut Model) -> Option<T>,
    ) -> Result<T, CoordinatorError> {
        let mut models = self.models.lock().unwrap();
        models
            .get_mut(unique_id)
            .and_then(f)
            .ok_or_else(|| CoordinatorError::NotFound {
                id: unique_id.to_string(),
            })
    }

    fn record(&self, write: String) {
        self.writes.lock().unwrap().push(write);
    }
}

#[async_trait]
impl RunCoordinator for FakeCoordinator {
    async fn get_running_status(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunningStatus, CoordinatorError> {
        self.with_model(unique_id, |m| m.status)
    }

    async fn get_initial_magnetization(
        &self,
        unique_id: &UniqueId,
    ) -> Result<InitialMagnetization, CoordinatorError> {
        self.with_model(unique_id, |m| m.initial.clone())
    }

    async fn get_run_prerequisites(
        &self,
        unique_id: &UniqueId,
    ) -> Result<RunPrerequisites, CoordinatorError> {
        self.with_model(unique_id, |m| m.prerequisites.clone())
    }

    async fn set_running_status(
        &self,
        unique_id: &UniqueId,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError> {
        self.record(format!("status:{new_status}"));
        self.with_model(unique_id, |m| {
            m.status = Some(new_status);
            m.status
        })
    }

    async fn set_running_status_if(
        &self,
        unique_id: &UniqueId,
        expected: RunningStatus,
        new_status: RunningStatus,
    ) -> Result<RunningStatus, CoordinatorError> {
        if let Some(stolen) = self.steal_claim.lock().unwrap().take() {
            self.with_model(unique_id, |m| {
                m.status = Some(stolen);
                m.status
            })?;
        }
        let current = self.with_model(unique_id, |m| m.status)?;
        if current != expected {
            return Err(CoordinatorError::Conflict(format!(
                "model {unique_id} is {current}, expected {expected}"
            )));
        }
        self.record(format!("claim:{new_status}"));
        self.with_model(unique_id, |m| {
            m.status = Some(new_status);
            m.status
        })
    }

    async fn set_quants(
        &self,
        unique_id: &UniqueId,
        quants: &ModelQuants,
    ) -> Result<ModelQuants, CoordinatorError> {
        self.record("set-quants".to_string());
        self.with_model(unique_id, |m| {
            m.quants.merge(quants);
            Some(m.quants.clone())
        })
    }
}

/// Scratch directories for one test: file store, working root and solvers.
pub struct Env {
    pub file_root: tempfile::TempDir,
    pub working_root: tempfile::TempDir,
    pub bin: tempfile::TempDir,
    pub coordinator: Arc<FakeCoordinator>,
}

impl Env {
    pub fn new() -> Self {
        Self {
            file_root: tempfile::tempdir().unwrap(),
            working_root: tempfile::tempdir().unwrap(),
            bin: tempfile::tempdir().unwrap(),
            coordinator: Arc::new(FakeCoordinator::default()),
        }
    }

    pub fn layout(&self) -> FileLayout {
        FileLayout::new(self.file_root.path())
    }

    pub fn runner(&self) -> JobRunner {
        let mut config = RunnerConfig::new(self.file_root.path());
        config.working_root = self.working_root.path().to_path_buf();
        config.jitter_min_secs = 0;
        config.jitter_max_secs = 0;
        JobRunner::new(self.coordinator.clone(), config)
    }

    /// Write a mesh file for a geometry and return its path.
    pub fn mesh(&self) -> PathBuf {
        let path = self
            .layout()
            .geometry_file_path(&uuid::Uuid::new_v4());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "25 0 0 1 0\nPatran mesh\n").unwrap();
        path
    }

    /// Write an executable bash script standing in for the solver.
    pub fn solver(&self, name: &str, body: &str) -> String {
        let path = self.bin.path().join(name);
        std::fs::write(&path, format!("#!/bin/bash\nset -e\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// A solver that writes the field to `field_file` and prints a full report.
    pub fn complete_solver(&self, field_file: &str) -> String {
        self.solver(
            "merrill-ok",
            &format!(
                "cat > {field_file} <<'TEC'\n{TECPLOT}TEC\ncat <<'OUT'\n{ENERGY_REPORT}{SENTINEL}\nOUT"
            ),
        )
    }

    pub fn prerequisites(
        &self,
        unique_id: &UniqueId,
        executable: &str,
        mesh: &Path,
        initial: &InitialMagnetization,
    ) -> RunPrerequisites {
        let layout = self.layout();
        let parent = initial.parent();
        RunPrerequisites {
            merrill_script: format!("! model {unique_id}\nEnd\n"),
            geometry_file_abs_path: mesh.to_path_buf(),
            model_dir_abs_path: layout.model_directory(unique_id),
            merrill_executable: executable.to_string(),
            initial_magnetization_type: initial.tag().to_string(),
            initial_magnetization_data_zip: parent.map(|p| layout.model_archive_path(&p)),
            initial_magnetization_finished: None,
            initial_magnetization_unique_id: parent,
        }
    }

    /// Store a finished parent's archive holding only a field file.
    pub fn store_parent_archive(&self, parent: &UniqueId) {
        let staging = tempfile::tempdir().unwrap();
        std::fs::write(staging.path().join(MAGNETIZATION_TECPLOT_FILE_NAME), TECPLOT).unwrap();
        let dir = self.layout().model_directory(parent);
        std::fs::create_dir_all(&dir).unwrap();
        zip_directory(staging.path(), &self.layout().model_archive_path(parent)).unwrap();
    }

    /// Whether any job working directory is left behind.
    pub fn working_root_is_empty(&self) -> bool {
        std::fs::read_dir(self.working_root.path())
            .unwrap()
            .next()
            .is_none()
    }
}
