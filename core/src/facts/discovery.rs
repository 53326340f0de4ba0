use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List candidate service repositories: immediate sub-directories of
/// `repos_dir` (symlinks to directories included), hidden entries skipped,
/// sorted by name.
pub fn discover_repositories(repos_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    if !repos_dir.is_dir() {
        return Err(CoreError::NoRepositories(repos_dir.to_path_buf()));
    }

    let mut repos = Vec::new();
    for entry in WalkDir::new(repos_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .map_err(|err| CoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
        // Symlinked checkouts count; `Path::is_dir` follows the link.
        if !entry.path().is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        repos.push(entry.into_path());
    }

    if repos.is_empty() {
        return Err(CoreError::NoRepositories(repos_dir.to_path_buf()));
    }
    Ok(repos)
}
