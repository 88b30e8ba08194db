//! Filesystem [`NoteProvider`] rooted at the configured corpus directory.
//!
//! Walks with `walkdir`, sorted by file name at every level, and drops
//! anything matching the exclude globs. Paths are reported relative to the
//! corpus root. Entries that cannot be read (permissions, races with the
//! archiver) are logged and skipped.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use memory_harness_core::{EntryKind, NoteProvider};

use crate::config::Config;

const DEFAULT_EXCLUDES: [&str; 2] = ["**/.git/**", "**/node_modules/**"];

pub struct FsProvider {
    root: PathBuf,
    excludes: GlobSet,
    follow_symlinks: bool,
}

impl FsProvider {
    pub fn new(
        root: impl Into<PathBuf>,
        exclude_globs: &[String],
        follow_symlinks: bool,
    ) -> Result<Self> {
        let mut patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect();
        patterns.extend(exclude_globs.iter().cloned());
        Ok(Self {
            root: root.into(),
            excludes: build_globset(&patterns)?,
            follow_symlinks,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let corpus = &config.corpus;
        Self::new(&corpus.root, &corpus.exclude_globs, corpus.follow_symlinks)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute (root-joined) form of a corpus-relative path.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        let rel = path.strip_prefix(&self.root).ok()?;
        (!self.excludes.is_match(rel)).then(|| rel.to_path_buf())
    }
}

impl NoteProvider for FsProvider {
    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let meta = std::fs::metadata(self.absolute(path)).ok()?;
        if meta.is_file() {
            Some(EntryKind::File)
        } else if meta.is_dir() {
            Some(EntryKind::Dir)
        } else {
            None
        }
    }

    fn walk<'a>(&'a self, dir: &Path) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        let start = self.absolute(dir);
        if !start.exists() {
            return Box::new(std::iter::empty());
        }
        let walker = WalkDir::new(start)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();
        Box::new(
            walker
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable path");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .filter_map(move |entry| self.relative(entry.path())),
        )
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let abs = self.absolute(path);
        let text = std::fs::read_to_string(&abs)
            .with_context(|| format!("Failed to read note: {}", abs.display()))?;
        Ok(text.lines().map(str::to_string).collect())
    }

    fn modified(&self, path: &Path) -> Option<DateTime<Utc>> {
        let modified = std::fs::metadata(self.absolute(path)).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}
