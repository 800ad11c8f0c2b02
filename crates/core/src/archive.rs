//! Zip archives of job working directories.
//!
//! A run's working directory is flat: every regular file in it goes into a
//! single deflated `data.zip`. Unpacking reproduces the files byte for byte.
//! These are blocking calls; async callers wrap them in `spawn_blocking`.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Errors from archiving or unpacking a directory.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Zip every regular file directly inside `source_dir` into `archive_path`.
///
/// Entries are added in name order. If `archive_path` itself lives inside
/// `source_dir` it is skipped. Returns the entry names written.
pub fn zip_directory(source_dir: &Path, archive_path: &Path) -> Result<Vec<String>, ArchiveError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(source_dir).map_err(io_err(source_dir))? {
        let entry = entry.map_err(io_err(source_dir))?;
        let path = entry.path();
        if !entry.file_type().map_err(io_err(&path))?.is_file() || path.as_path() == archive_path {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let out = File::create(archive_path).map_err(io_err(archive_path))?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in &names {
        let path = source_dir.join(name);
        tracing::debug!(file = %path.display(), archive = %archive_path.display(), "Adding file to archive");
        writer.start_file(name.as_str(), options)?;
        let mut src = File::open(&path).map_err(io_err(&path))?;
        io::copy(&mut src, &mut writer).map_err(io_err(&path))?;
    }

    writer.finish()?;
    Ok(names)
}

/// Extract `archive_path` into `dest_dir`, creating it if needed.
pub fn unpack_archive(archive_path: &Path, dest_dir: &Path) -> Result<(), ArchiveError> {
    std::fs::create_dir_all(dest_dir).map_err(io_err(dest_dir))?;
    let file = File::open(archive_path).map_err(io_err(archive_path))?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(dest_dir)?;
    Ok(())
}

/// Names of the entries stored in `archive_path`.
pub fn archive_entries(archive_path: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(archive_path).map_err(io_err(archive_path))?;
    let archive = ZipArchive::new(file)?;
    let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
