//! File selection filters applied before a task is submitted
//!
//! A filter receives every file discovered in a resource tree, in discovery
//! order, and returns the files that should be downloaded. It may drop,
//! reorder or pass entries through unchanged.

use crate::types::TaskFile;

/// 500 MiB
pub const DEFAULT_MIN_FILE_SIZE: u64 = 500 * 1024 * 1024;
/// 40 GiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 40 * 1024 * 1024 * 1024;

/// Strategy for choosing which files of a bundle to download
///
/// Any `Fn(Vec<TaskFile>) -> Vec<TaskFile>` closure is a filter:
///
/// ```
/// use xunlei_client::{FileFilter, TaskFile};
///
/// let only_mkv = |files: Vec<TaskFile>| -> Vec<TaskFile> {
///     files.into_iter().filter(|f| f.file_name.ends_with(".mkv")).collect()
/// };
/// let files = vec![
///     TaskFile { index: 0, file_name: "movie.mkv".into(), file_size: 10 },
///     TaskFile { index: 1, file_name: "readme.txt".into(), file_size: 1 },
/// ];
/// assert_eq!(only_mkv.filter(files).len(), 1);
/// ```
pub trait FileFilter: Send + Sync {
    /// Select the files to download
    fn filter(&self, files: Vec<TaskFile>) -> Vec<TaskFile>;
}

impl<F> FileFilter for F
where
    F: Fn(Vec<TaskFile>) -> Vec<TaskFile> + Send + Sync,
{
    fn filter(&self, files: Vec<TaskFile>) -> Vec<TaskFile> {
        self(files)
    }
}

/// Keeps files whose size lies within `[min_size, max_size]` (both inclusive)
///
/// Relative order of the kept files is preserved. The defaults (500 MiB to
/// 40 GiB) skip samples, subtitles and NFO files in typical video releases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeRangeFilter {
    /// Smallest size kept, in bytes
    pub min_size: u64,
    /// Largest size kept, in bytes
    pub max_size: u64,
}

impl SizeRangeFilter {
    /// Create a filter with explicit bounds
    pub fn new(min_size: u64, max_size: u64) -> Self {
        Self { min_size, max_size }
    }

    /// True when `size` is within the inclusive bounds
    pub fn accepts(&self, size: u64) -> bool {
        self.min_size <= size && size <= self.max_size
    }
}

impl Default for SizeRangeFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FILE_SIZE, DEFAULT_MAX_FILE_SIZE)
    }
}

impl FileFilter for SizeRangeFilter {
    fn filter(&self, files: Vec<TaskFile>) -> Vec<TaskFile> {
        files
            .into_iter()
            .filter(|f| self.accepts(f.file_size))
            .collect()
    }
}
