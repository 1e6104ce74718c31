use std::path::{Path, PathBuf};

/// Paths inside a Python layer.
///
/// Both the bin-directory listing and the probe/delete calls resolve file
/// names through [`LayerPaths::bin_file`], so a name found by the glob always
/// maps to the same real path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPaths {
    root: PathBuf,
}

impl LayerPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    /// `<layer>/bin/<name>`
    pub fn bin_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.bin_dir().join(name)
    }
}
