//! Read-only access to the note corpus.
//!
//! The [`NoteProvider`] trait is the only way the core engine touches the
//! corpus, enabling pluggable backends (the real filesystem in the
//! application crate, an in-memory map for tests).
//!
//! All paths passed to and returned from a provider are relative to the
//! corpus root. The empty path denotes the root itself.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`entry_kind`](NoteProvider::entry_kind) | Is a path a file, a directory, or absent |
//! | [`walk`](NoteProvider::walk) | Lazily enumerate files under a directory |
//! | [`read_lines`](NoteProvider::read_lines) | Read a note as UTF-8 lines |
//! | [`modified`](NoteProvider::modified) | Last-modified time of a note |

pub mod memory;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// What a corpus path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Abstract, read-only view of a note corpus.
pub trait NoteProvider {
    /// Returns the kind of entry at `path`, or `None` when it does not exist.
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    /// Lazily yields every file below `dir`, recursively.
    ///
    /// Entries are visited in lexicographic order at each directory level so
    /// repeated walks produce identical sequences. Unreadable entries are
    /// skipped. A missing `dir` yields nothing.
    fn walk<'a>(&'a self, dir: &Path) -> Box<dyn Iterator<Item = PathBuf> + 'a>;

    /// Reads a note as text lines (terminators stripped).
    ///
    /// Fails when the file is missing, unreadable, or not valid UTF-8.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>>;

    /// Last-modified time, when the backend knows it.
    fn modified(&self, path: &Path) -> Option<DateTime<Utc>>;
}
