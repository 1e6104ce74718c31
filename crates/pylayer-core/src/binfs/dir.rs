use std::path::{Path, PathBuf};

use super::{BinEntry, BinFs};

/// [`BinFs`] over a real directory.
#[derive(Debug, Clone)]
pub struct DirBinFs {
    root: PathBuf,
}

impl DirBinFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BinFs for DirBinFs {
    fn entries(&self) -> std::io::Result<Vec<BinEntry>> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            // Follows symlinks; a dangling link is a file, since it is exactly
            // the kind of broken shim the sweep looks for.
            let is_dir = entry.path().is_dir();
            entries.push(BinEntry { name, is_dir });
        }

        Ok(entries)
    }
}
