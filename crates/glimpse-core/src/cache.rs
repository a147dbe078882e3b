//! Local thumbnail cache path resolution.

use std::path::{Path, PathBuf};

/// Resolves where a persisted copy of a photo lives on disk.
///
/// This is pure path resolution; reading and writing the files is the
/// responsibility of whoever consumes the paths.
#[derive(Clone, Debug)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    /// Create a cache directory rooted at the given path.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The location for a photo's cached copy, `<root>/<id>.jpg`.
    pub fn photo_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.jpg", id))
    }
}
