//! Text file enumeration
//!
//! Recursively lists the `.txt`/`.text` files under a root directory,
//! following symbolic links. A root that is not a directory is returned
//! as-is, so a single file can be ingested regardless of its extension.

use crate::{QuerymillError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns true if the path names a regular file with a `.txt` or `.text`
/// extension (case-insensitive).
pub fn is_text_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let name = path.to_string_lossy().to_lowercase();
    name.ends_with(".txt") || name.ends_with(".text")
}

/// Lists the text files to ingest for the given root.
///
/// For a directory root, every matching file underneath it is returned in
/// path order. For any other existing root, the root itself is the single
/// entry. Unreadable directory entries are logged and skipped.
pub fn list_text_files(start: &Path) -> Result<Vec<PathBuf>> {
    if !start.exists() {
        return Err(QuerymillError::Input {
            path: start.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such path"),
        });
    }

    if !start.is_dir() {
        return Ok(vec![start.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(start).follow_links(true).sort_by_file_name() {
        match entry {
            Ok(entry) if is_text_file(entry.path()) => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!("skipping unreadable entry under {}: {}", start.display(), e),
        }
    }

    Ok(files)
}
