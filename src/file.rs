//! Discovery and loading of definition files.
//!
//! # Discovery
//!
//! [`find_definition_files`] walks the program tree and returns every file
//! named exactly `file_name`. Directories listed in `ignore_dirs` (build
//! output, VCS metadata) are pruned. Results are sorted, but the resolver
//! sorts again and does not rely on it.
//!
//! # Loading
//!
//! [`load_files`] reads each discovered file into `(path, content)` pairs for
//! the pure resolve pipeline. [`load_optional`] reads a file that may be
//! absent, such as the application file: a missing file is `None`, only
//! actual I/O errors (permissions, etc.) are propagated.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BoardfigError;

/// Recursively find files named `file_name` under `root`.
pub fn find_definition_files(
    root: &Path,
    file_name: &str,
    ignore_dirs: &[String],
) -> Result<Vec<PathBuf>, BoardfigError> {
    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let mut found = Vec::new();

    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || !e.file_type().is_dir()
            || !ignore_dirs.iter().any(|d| e.file_name() == d.as_str())
    }) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            BoardfigError::IoError {
                path,
                source: e.into(),
            }
        })?;
        if entry.file_type().is_file() && entry.file_name() == file_name {
            found.push(entry.into_path());
        }
    }

    found.sort();
    tracing::debug!(
        "Found {} '{}' file(s) under {}",
        found.len(),
        file_name,
        root.display()
    );
    Ok(found)
}

/// Read every path into `(path, content)` pairs.
pub fn load_files(paths: Vec<PathBuf>) -> Result<Vec<(PathBuf, String)>, BoardfigError> {
    paths
        .into_iter()
        .map(|path| match std::fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(e) => Err(BoardfigError::IoError { path, source: e }),
        })
        .collect()
}

/// Read a file that may not exist.
pub fn load_optional(path: &Path) -> Result<Option<(PathBuf, String)>, BoardfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some((path.to_path_buf(), content))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No application file at {}", path.display());
            Ok(None)
        }
        Err(e) => Err(BoardfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
