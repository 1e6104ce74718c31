//! Read-only view of a layer's `bin` directory.
//!
//! Only top-level entries are visible. Globbing never descends into
//! subdirectories, so `some-dir/pip` is never a candidate for `pip*`.
//! Names are kept as raw `OsString`s so a shim with a non-UTF-8 name can
//! still be probed and deleted.

mod dir;
#[cfg(any(test, feature = "testing"))]
mod memory;

use std::ffi::OsString;

use glob::{MatchOptions, Pattern, PatternError};
use tracing::debug;

pub use dir::DirBinFs;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryBinFs;

/// One entry directly inside the bin directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinEntry {
    pub name: OsString,
    pub is_dir: bool,
}

impl BinEntry {
    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

pub trait BinFs {
    /// List the entries directly inside the directory, in any order.
    fn entries(&self) -> std::io::Result<Vec<BinEntry>>;
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Rewrite shell spellings that the `glob` crate rejects or reads differently.
///
/// Runs of `*` collapse to one, since names never contain `/` and `**` has no
/// extra meaning for a single path component. A class opened with `[^` is
/// negated, the same as `[!`. Class contents are copied untouched.
fn normalize_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        if in_class {
            out.push(c);
            if c == ']' {
                in_class = false;
            }
            continue;
        }

        match c {
            '*' => {
                out.push('*');
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
            }
            '[' => {
                out.push('[');
                in_class = true;
                if let Some(&negate) = chars.peek()
                    && (negate == '^' || negate == '!')
                {
                    chars.next();
                    out.push('!');
                }
                // `]` straight after the opener is a member, not the close
                if chars.peek() == Some(&']') {
                    chars.next();
                    out.push(']');
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Names of the non-directory entries matching `pattern`, sorted.
///
/// The pattern is compiled before the directory is read, so a malformed
/// pattern fails even when the directory is empty. A directory that cannot
/// be read has no matches. Non-UTF-8 names are matched on their lossy form
/// and returned unchanged.
pub fn glob_bin(fs: &dyn BinFs, pattern: &str) -> Result<Vec<OsString>, PatternError> {
    let pattern = Pattern::new(&normalize_pattern(pattern))?;

    let entries = match fs.entries() {
        Ok(entries) => entries,
        Err(e) => {
            debug!(
                event = "core.binfs.read_failed",
                pattern = %pattern,
                error = %e
            );
            return Ok(Vec::new());
        }
    };

    let mut names: Vec<OsString> = entries
        .into_iter()
        .filter(|entry| {
            !entry.is_dir && pattern.matches_with(&entry.name.to_string_lossy(), MATCH_OPTIONS)
        })
        .map(|entry| entry.name)
        .collect();
    names.sort();

    debug!(
        event = "core.binfs.glob_completed",
        pattern = %pattern,
        matches = names.len()
    );

    Ok(names)
}
