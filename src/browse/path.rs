use std::fs;
use std::path::{Component, Path};

use super::LocatorError;

/// A path inside the repository, ready to be placed in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPath {
    /// `/`-separated, no leading separator; empty for the root itself
    pub relative: String,
    pub is_dir: bool,
}

/// Express `target` relative to `root`.
///
/// Both paths are canonicalized first, so symlinked checkouts and `..`
/// segments resolve to the same prefix. A missing target fails before any
/// URL is built.
pub fn repository_relative_path(
    root: &Path,
    target: &Path,
) -> Result<RepositoryPath, LocatorError> {
    let full = fs::canonicalize(target)
        .map_err(|_| LocatorError::PathNotFound(target.to_path_buf()))?;
    let root = fs::canonicalize(root).map_err(|_| LocatorError::PathNotFound(root.to_path_buf()))?;

    let stripped = full
        .strip_prefix(&root)
        .map_err(|_| LocatorError::OutsideRepository(full.clone()))?;

    if !root.join(stripped).exists() {
        return Err(LocatorError::PathNotFound(full));
    }

    let relative = stripped
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    Ok(RepositoryPath {
        relative,
        is_dir: full.is_dir(),
    })
}
