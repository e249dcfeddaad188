//! URL denylist
//!
//! A denylist is a set of non-empty lines read from a text file (by default
//! `.urlignore` in the working directory). A request is excluded when any
//! entry occurs anywhere in its `host[:port]`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::debug;

/// Default denylist file name, looked up in the working directory
pub const DEFAULT_FILE_NAME: &str = ".urlignore";

/// Set of URL fragments to exclude
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist {
    entries: BTreeSet<String>,
}

impl Denylist {
    /// Denylist excluding nothing
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from entries; empty entries are dropped
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Parse file contents: one entry per line, trailing whitespace removed
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().map(str::trim_end))
    }

    /// Read `path`; an unreadable file is an empty denylist
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "could not read denylist file");
                Self::empty()
            }
        }
    }

    /// Read [`DEFAULT_FILE_NAME`] from the working directory
    #[must_use]
    pub fn from_current_dir() -> Self {
        Self::from_path(DEFAULT_FILE_NAME)
    }

    /// Whether `netloc` contains any entry
    #[must_use]
    pub fn contains(&self, netloc: &str) -> bool {
        self.entries.iter().any(|entry| netloc.contains(entry.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
