//! Corpus scanner: enumerates active notes.
//!
//! A note is any file with the configured extension that does not sit under
//! the archive directory. The archive check is per path segment, so a note
//! named `archived-ideas.md` stays active while `archived/2025-01/x.md` does
//! not.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::provider::NoteProvider;

pub const DEFAULT_NOTE_EXTENSION: &str = "md";
pub const DEFAULT_ARCHIVE_DIR: &str = "archived";

#[derive(Debug, Clone)]
pub struct CorpusScanner {
    extension: String,
    archive_dir: String,
}

impl Default for CorpusScanner {
    fn default() -> Self {
        Self::new(DEFAULT_NOTE_EXTENSION, DEFAULT_ARCHIVE_DIR)
    }
}

impl CorpusScanner {
    pub fn new(extension: impl Into<String>, archive_dir: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn archive_dir(&self) -> &str {
        &self.archive_dir
    }

    pub fn is_note(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }

    /// True when any segment of `path` is the archive directory.
    pub fn is_archived(&self, path: &Path) -> bool {
        path.components()
            .any(|c| matches!(c, Component::Normal(seg) if seg == OsStr::new(&self.archive_dir)))
    }

    /// Lazily yields active notes below `dir` in provider walk order.
    pub fn notes<'a, P>(&'a self, provider: &'a P, dir: &Path) -> impl Iterator<Item = PathBuf> + 'a
    where
        P: NoteProvider + ?Sized,
    {
        provider
            .walk(dir)
            .filter(move |path| self.is_note(path) && !self.is_archived(path))
    }
}
