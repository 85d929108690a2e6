//! Extension-based routing

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::FileType;

/// Pick the handler for `path` from its suffix
///
/// Matching is case-insensitive. The file itself is never opened, so
/// routing succeeds for paths that do not exist yet.
pub fn route(path: &Path) -> Result<FileType> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    FileType::from_extension(&extension).ok_or_else(|| Error::UnsupportedFormat {
        path: path.to_path_buf(),
        extension,
    })
}

/// Whether `path` has a routable suffix
pub fn is_supported(path: &Path) -> bool {
    route(path).is_ok()
}

/// Collect routable files under `root`
///
/// A file path is returned as-is (supported or not, so the caller still
/// sees the routing error). For a directory, only its immediate entries are
/// scanned unless `recursive` is set. Files with unsupported suffixes found
/// while scanning are skipped. Results are sorted by path.
pub fn discover_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(root).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_supported(entry.path()) {
            files.push(entry.into_path());
        } else {
            tracing::debug!("Skipping unsupported file {}", entry.path().display());
        }
    }

    Ok(files)
}
