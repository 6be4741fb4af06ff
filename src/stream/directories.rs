//! Directory paths seen so far in the stream.

use std::collections::HashSet;

/// Set of paths known to be directories.
///
/// Git has no directory objects, so renames and deletes of these paths are
/// dropped from the output. Owned by the driver for the length of one run.
#[derive(Debug, Clone, Default)]
pub struct DirectorySet {
    paths: HashSet<String>,
}

impl DirectorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as a directory. Returns false if it was already known.
    pub fn insert(&mut self, path: &str) -> bool {
        self.paths.insert(path.to_string())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
