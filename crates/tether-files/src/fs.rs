//! Filesystem-backed file repository.

use std::fs;
use std::path::{Path, PathBuf};

use crate::FileRepository;

/// File repository rooted at a directory on disk.
///
/// Relative lookups are resolved against the root. Lookups that
/// resolve outside the root (via `..` segments) are rejected.
pub struct FsFiles {
    root: PathBuf,
}

impl FsFiles {
    /// Create a repository rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a repository-relative path to an absolute one,
    /// refusing paths that escape the root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let joined = self.root.join(path);
        let canonical = joined.canonicalize().ok()?;
        let root = self.root.canonicalize().ok()?;
        if canonical.starts_with(&root) {
            Some(canonical)
        } else {
            tracing::debug!(path, "lookup escapes repository root");
            None
        }
    }

    fn find_in(&self, dir: &Path, name: &str) -> Option<PathBuf> {
        let entries = fs::read_dir(dir).ok()?;

        // Sort for a deterministic match when several directories
        // contain a file with the requested name.
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                !p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            })
            .collect();
        entries.sort();

        for path in &entries {
            if path.is_file() && path.file_name().is_some_and(|n| n == name) {
                return Some(path.clone());
            }
        }
        for path in &entries {
            if path.is_dir()
                && let Some(found) = self.find_in(path, name)
            {
                return Some(found);
            }
        }
        None
    }
}

impl FileRepository for FsFiles {
    fn load_file(&self, path: &str) -> Option<String> {
        let resolved = self.resolve(path)?;
        match fs::read_to_string(&resolved) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(path, error = %e, "failed to read file");
                None
            }
        }
    }

    fn find_file_with_name(&self, name: &str) -> Option<String> {
        let found = self.find_in(&self.root, name)?;
        let root = self.root.canonicalize().ok()?;
        let relative = found.canonicalize().ok()?;
        relative
            .strip_prefix(&root)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
    }
}
