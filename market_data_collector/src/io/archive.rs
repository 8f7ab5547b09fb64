//! Packs a directory of segment files into a gzip-compressed tarball.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use flate2::{Compression, GzBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to list {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to add {} to archive: {source}", .path.display())]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to finish tar stream: {0}")]
    FinishTar(#[source] std::io::Error),

    #[error("failed to write gzip data: {0}")]
    Compress(#[source] std::io::Error),
}

/// Tars every regular file under `root` (recursively, paths relative to `root`) and
/// gzips the result into `out`.
///
/// The tar stream is built in memory first, then compressed in one pass. `gz_name`
/// becomes the gzip header's file name and the header's mtime is the current time.
/// Returns `out` once the gzip trailer has been written.
pub fn write_tar_gz<W: Write>(root: &Path, out: W, gz_name: &str) -> Result<W, ArchiveError> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut builder = tar::Builder::new(Vec::new());
    builder.mode(tar::HeaderMode::Deterministic);
    for path in &files {
        let name = path.strip_prefix(root).unwrap_or(path);
        builder
            .append_path_with_name(path, name)
            .map_err(|source| ArchiveError::Append {
                path: path.clone(),
                source,
            })?;
    }
    let tar_bytes = builder.into_inner().map_err(ArchiveError::FinishTar)?;

    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0);
    let mut gz = GzBuilder::new()
        .filename(gz_name)
        .mtime(mtime)
        .write(out, Compression::default());
    gz.write_all(&tar_bytes).map_err(ArchiveError::Compress)?;
    gz.finish().map_err(ArchiveError::Compress)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ArchiveError> {
    let read_dir_err = |source| ArchiveError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let file_type = entry.file_type().map_err(read_dir_err)?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}
