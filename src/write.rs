//! Writes rendered pages to disk.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// A rendered page and the location it belongs at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub html: String,
}

/// Writes every file in `files`, creating parent directories as needed and
/// overwriting anything already there. Returns the written paths in order.
///
/// Writing isn't transactional: if it fails partway, the files before the
/// failing one have already been replaced. Rebuilding from scratch is always
/// safe since the output only depends on the input.
pub fn write_all(files: &[OutputFile]) -> Result<Vec<PathBuf>> {
    let mut seen_dirs: HashSet<&Path> = HashSet::new();
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        if let Some(dir) = file.path.parent() {
            if seen_dirs.insert(dir) {
                std::fs::create_dir_all(dir).map_err(|err| Error::OutputWrite {
                    path: dir.to_owned(),
                    err,
                })?;
            }
        }
        std::fs::write(&file.path, &file.html).map_err(|err| Error::OutputWrite {
            path: file.path.clone(),
            err,
        })?;
        tracing::debug!(path = %file.path.display(), "wrote page");
        written.push(file.path.clone());
    }
    Ok(written)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when an output file or directory can't be written.
    #[error("writing `{}`: {err}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}
