//! On-disk layout of the M4DB file store.
//!
//! Model and geometry directories are keyed by unique id and sharded two
//! hex characters at a time, so no directory holds more than 256 entries:
//!
//! ```text
//! <file-root>/model/0f/3a/.../c1/data.zip
//! <file-root>/geometry/9b/e2/.../07/geometry.pat
//! ```

use std::path::{Path, PathBuf};

use crate::types::UniqueId;

/// Directory under the file root holding model archives.
pub const MODEL_DIRECTORY_NAME: &str = "model";

/// Directory under the file root holding geometry meshes.
pub const GEOMETRY_DIRECTORY_NAME: &str = "geometry";

/// Mesh input handed to the solver.
pub const GEOMETRY_PATRAN_FILE_NAME: &str = "geometry.pat";

/// Rendered solver script.
pub const MODEL_SCRIPT_FILE_NAME: &str = "model_script.merrill";

/// Captured solver standard output.
pub const MODEL_STDOUT_FILE_NAME: &str = "model_stdout.txt";

/// Captured solver standard error.
pub const MODEL_STDERR_FILE_NAME: &str = "model_stderr.txt";

/// Solver field output (single image).
pub const MAGNETIZATION_TECPLOT_FILE_NAME: &str = "magnetization.tec";

/// Solver field output when it writes several images.
pub const MAGNETIZATION_MULT_TECPLOT_FILE_NAME: &str = "magnetization_mult.tec";

/// JSON rendition of the loaded field output.
pub const MAGNETIZATION_JSON_FILE_NAME: &str = "magnetization.json";

/// Archive of everything a run produced.
pub const DATA_ZIP_FILE_NAME: &str = "data.zip";

/// The six files a successful run leaves in its archive.
pub const CANONICAL_RUN_FILES: [&str; 6] = [
    GEOMETRY_PATRAN_FILE_NAME,
    MODEL_SCRIPT_FILE_NAME,
    MODEL_STDOUT_FILE_NAME,
    MODEL_STDERR_FILE_NAME,
    MAGNETIZATION_TECPLOT_FILE_NAME,
    MAGNETIZATION_JSON_FILE_NAME,
];

/// Split a unique id into its shard path (`ab/cd/ef/...`).
pub fn uid_to_dir(unique_id: &UniqueId) -> PathBuf {
    let simple = unique_id.simple().to_string();
    simple
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect()
}

/// Resolves canonical paths below a file root.
#[derive(Debug, Clone)]
pub struct FileLayout {
    file_root: PathBuf,
}

impl FileLayout {
    pub fn new(file_root: impl Into<PathBuf>) -> Self {
        Self {
            file_root: file_root.into(),
        }
    }

    pub fn file_root(&self) -> &Path {
        &self.file_root
    }

    /// Destination directory of a model's archive.
    pub fn model_directory(&self, unique_id: &UniqueId) -> PathBuf {
        self.file_root
            .join(MODEL_DIRECTORY_NAME)
            .join(uid_to_dir(unique_id))
    }

    /// Canonical archive path of a model.
    pub fn model_archive_path(&self, unique_id: &UniqueId) -> PathBuf {
        self.model_directory(unique_id).join(DATA_ZIP_FILE_NAME)
    }

    pub fn geometry_directory(&self, unique_id: &UniqueId) -> PathBuf {
        self.file_root
            .join(GEOMETRY_DIRECTORY_NAME)
            .join(uid_to_dir(unique_id))
    }

    /// Canonical mesh file of a geometry.
    pub fn geometry_file_path(&self, unique_id: &UniqueId) -> PathBuf {
        self.geometry_directory(unique_id)
            .join(GEOMETRY_PATRAN_FILE_NAME)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
