//! In-memory [`NoteProvider`] for tests.
//!
//! Notes live in a `BTreeMap` keyed by corpus-relative path, so iteration
//! order is the same component-wise lexicographic order the filesystem
//! provider produces. Directories are implied by path prefixes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use super::{EntryKind, NoteProvider};

struct MemoryNote {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
}

/// In-memory corpus for tests.
#[derive(Default)]
pub struct InMemoryProvider {
    notes: BTreeMap<PathBuf, MemoryNote>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_note(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    /// Adds or replaces a UTF-8 note, stamped with the current time.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: &str) {
        self.insert_bytes(path, content.as_bytes().to_vec(), Utc::now());
    }

    /// Adds or replaces a note with raw bytes and an explicit mtime.
    pub fn insert_bytes(
        &mut self,
        path: impl Into<PathBuf>,
        bytes: Vec<u8>,
        modified: DateTime<Utc>,
    ) {
        self.notes
            .insert(path.into(), MemoryNote { bytes, modified });
    }

    pub fn remove(&mut self, path: impl AsRef<Path>) -> bool {
        self.notes.remove(path.as_ref()).is_some()
    }
}

impl NoteProvider for InMemoryProvider {
    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        if self.notes.contains_key(path) {
            return Some(EntryKind::File);
        }
        self.notes
            .keys()
            .any(|p| p.starts_with(path))
            .then_some(EntryKind::Dir)
    }

    fn walk<'a>(&'a self, dir: &Path) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        let dir = dir.to_path_buf();
        Box::new(
            self.notes
                .keys()
                .filter(move |p| p.starts_with(&dir))
                .cloned(),
        )
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let note = self
            .notes
            .get(path)
            .ok_or_else(|| anyhow!("note not found: {}", path.display()))?;
        let text = std::str::from_utf8(&note.bytes)
            .map_err(|e| anyhow!("{} is not valid UTF-8: {}", path.display(), e))?;
        Ok(text.lines().map(str::to_string).collect())
    }

    fn modified(&self, path: &Path) -> Option<DateTime<Utc>> {
        self.notes.get(path).map(|n| n.modified)
    }
}
