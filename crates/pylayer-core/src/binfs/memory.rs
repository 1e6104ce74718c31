use std::collections::BTreeMap;
use std::ffi::OsString;

use super::{BinEntry, BinFs};

/// In-memory [`BinFs`] built from slash-separated relative paths.
///
/// `MemoryBinFs::new(["pip3", "some-dir/pip"])` exposes a file `pip3` and a
/// directory `some-dir`; nothing below the first segment is visible.
#[derive(Debug, Clone, Default)]
pub struct MemoryBinFs {
    entries: BTreeMap<String, bool>,
}

impl MemoryBinFs {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = BTreeMap::new();
        for path in paths {
            let path = path.as_ref().trim_start_matches('/');
            match path.split_once('/') {
                Some((first, _)) => {
                    entries.insert(first.to_string(), true);
                }
                None => {
                    entries.entry(path.to_string()).or_insert(false);
                }
            }
        }
        Self { entries }
    }
}

impl BinFs for MemoryBinFs {
    fn entries(&self) -> std::io::Result<Vec<BinEntry>> {
        Ok(self
            .entries
            .iter()
            .map(|(name, is_dir)| BinEntry {
                name: OsString::from(name),
                is_dir: *is_dir,
            })
            .collect())
    }
}
