//! Environment passed to every subprocess of a cleanup.
//!
//! Built once from the ambient process environment, then shared read-only.
//! Keys and values are kept as raw `OsString`s so entries the cleanup does not
//! touch reach the child byte for byte.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::layer::LayerPaths;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: &str = ":";

pub const PATH: &str = "PATH";
pub const LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";

/// Ordered `KEY=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Snapshot of the current process environment.
    pub fn from_ambient() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Return a copy with `key` set to `value`.
    ///
    /// The key match is exact and case-sensitive. An existing entry keeps its
    /// position; a new one is appended.
    pub fn with_var(&self, key: &str, value: impl AsRef<OsStr>) -> Self {
        let value = value.as_ref().to_os_string();
        let mut vars = self.vars.clone();
        match vars.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => vars.push((OsString::from(key), value)),
        }
        Self { vars }
    }

    /// Return a copy with `dir` placed first in the path list stored in `key`.
    pub fn with_path_prepended(&self, key: &str, dir: &Path) -> Self {
        let mut value = dir.as_os_str().to_os_string();
        if let Some(existing) = self.get(key)
            && !existing.is_empty()
        {
            value.push(PATH_LIST_SEPARATOR);
            value.push(existing);
        }
        self.with_var(key, value)
    }
}

/// Environment with the layer's `bin` first on `PATH` and its `lib` first on
/// the dynamic library search path.
pub fn layer_environment(base: &Environment, layer: &LayerPaths) -> Environment {
    base.with_path_prepended(PATH, &layer.bin_dir())
        .with_path_prepended(LD_LIBRARY_PATH, &layer.lib_dir())
}
