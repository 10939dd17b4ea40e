//! Log file discovery and heli identification
//!
//! Lists the rig logs in a data directory and pulls the free-text heli
//! identifier line out of a log's header.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Data directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read data directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Regular files in `dir` (not recursive) whose extension is `extension`,
/// sorted by path.
///
/// The extension is compared case-insensitively and without a leading dot.
pub fn discover_log_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotFound(dir.to_path_buf()));
    }

    let wanted = extension.trim_start_matches('.');
    let io_err = |source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted));
        if matches_ext && entry.file_type().map_err(io_err)?.is_file() {
            debug!(path = %path.display(), "Log file found");
            files.push(path);
        }
    }

    files.sort();
    info!(dir = %dir.display(), count = files.len(), "Log discovery complete");
    Ok(files)
}

/// First line mentioning "heli" (any case), trimmed.
pub fn heli_identifier(text: &str) -> Option<&str> {
    text.lines()
        .find(|line| line.to_lowercase().contains("heli"))
        .map(str::trim)
}
