//! File repository abstraction for tether.
//!
//! The renderer never performs raw I/O. Everything it reads (page
//! markdown, referenced source files, the TOC listing) goes through
//! the [`FileRepository`] trait. Failures surface as `None` and are
//! logged at debug level; the rendering pipeline turns them into
//! visible inline placeholders instead of aborting a build.
//!
//! Two implementations are provided:
//! - [`FsFiles`]: reads from a root directory on disk
//! - [`MockFiles`]: in-memory repository for tests

mod fs;
mod mock;

pub use fs::FsFiles;
pub use mock::MockFiles;

/// Read-only file access for the rendering pipeline.
///
/// Implementations must be safe for concurrent reads: many pages may
/// render in parallel against one repository.
pub trait FileRepository: Send + Sync {
    /// Load a file's text content by repository-relative path.
    ///
    /// Returns `None` when the file does not exist or cannot be read.
    fn load_file(&self, path: &str) -> Option<String>;

    /// Find the repository-relative path of the first file with the
    /// given file name anywhere in the repository.
    ///
    /// Lookup order is deterministic (lexicographic by path) so that
    /// repeated renders resolve the same file.
    fn find_file_with_name(&self, name: &str) -> Option<String>;
}
