//! In-memory file repository for tests.

use std::collections::BTreeMap;

use crate::FileRepository;

/// Mock repository holding files in memory.
///
/// Built with the builder methods, read through [`FileRepository`].
///
/// # Example
///
/// ```
/// use tether_files::{FileRepository, MockFiles};
///
/// let repo = MockFiles::new()
///     .with_file("intro.md", "# Intro")
///     .with_file("src/main.rs", "fn main() {}");
///
/// assert!(repo.load_file("intro.md").is_some());
/// assert_eq!(repo.find_file_with_name("main.rs").as_deref(), Some("src/main.rs"));
/// ```
#[derive(Debug, Default)]
pub struct MockFiles {
    files: BTreeMap<String, String>,
}

impl MockFiles {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given path and content.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl FileRepository for MockFiles {
    fn load_file(&self, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn find_file_with_name(&self, name: &str) -> Option<String> {
        // BTreeMap iteration keeps the match deterministic.
        self.files
            .keys()
            .find(|path| path.rsplit('/').next() == Some(name))
            .cloned()
    }
}
