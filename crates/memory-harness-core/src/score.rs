//! Relevance scorer: expands scopes into notes and ranks them.
//!
//! # Scoring
//!
//! | Source | Score |
//! |--------|-------|
//! | File scope that exists | `1.0` |
//! | Note found by expanding a directory scope | `0.5` |
//! | Directory note, entity category, stem contains a queried name | `1.0` |
//! | Directory note, entity category, no name match | `0.8` |
//!
//! Candidates are merged across scopes (a repeated path keeps its first
//! position and its best score), stably sorted by score descending so ties
//! keep scope priority order, and truncated to `top_k`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::classify::HONORIFIC_RE;
use crate::models::{Category, ScopeKind, ScopePath, ScoredCandidate};
use crate::provider::{EntryKind, NoteProvider};
use crate::scan::CorpusScanner;

pub const FILE_SCOPE_SCORE: f64 = 1.0;
pub const BASE_SCORE: f64 = 0.5;
pub const ENTITY_CATEGORY_SCORE: f64 = 0.8;
pub const ENTITY_MATCH_SCORE: f64 = 1.0;

/// Pet names recognised without any configuration.
pub const DEFAULT_PET_NAMES: [&str; 2] = ["悠悠", "yoyo"];

/// Pulls candidate person/pet names out of a query.
#[derive(Debug, Clone)]
pub struct EntityMatcher {
    known_names: Vec<String>,
}

impl Default for EntityMatcher {
    fn default() -> Self {
        let names: Vec<String> = DEFAULT_PET_NAMES.iter().map(|n| n.to_string()).collect();
        Self::new(&names)
    }
}

impl EntityMatcher {
    pub fn new(known_names: &[String]) -> Self {
        let mut known_names: Vec<String> = known_names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        known_names.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then(a.cmp(b))
        });
        known_names.dedup();
        Self { known_names }
    }

    /// Known names mentioned in the query (longest first), then names
    /// captured by the honorific pattern in match order.
    pub fn extract(&self, query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        let mut names: Vec<String> = self
            .known_names
            .iter()
            .filter(|n| lower.contains(&n.to_lowercase()))
            .cloned()
            .collect();
        for caps in HONORIFIC_RE.captures_iter(query) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    scanner: CorpusScanner,
    entities: EntityMatcher,
}

impl RelevanceScorer {
    pub fn new(scanner: CorpusScanner, entities: EntityMatcher) -> Self {
        Self { scanner, entities }
    }

    /// Ranks the notes covered by `scopes` for `query`.
    ///
    /// Missing scope paths contribute nothing. Archived paths are never
    /// returned, even when a file scope names one directly.
    pub fn score<P>(
        &self,
        provider: &P,
        query: &str,
        category: Category,
        scopes: &[ScopePath],
        top_k: usize,
    ) -> Vec<ScoredCandidate>
    where
        P: NoteProvider + ?Sized,
    {
        let names = if category.is_entity_lookup() {
            self.entities.extract(query)
        } else {
            Vec::new()
        };
        debug!(%category, ?names, scopes = scopes.len(), "scoring scopes");

        let mut merged = Merged::default();
        for scope in scopes {
            match scope.kind {
                ScopeKind::File => {
                    if provider.entry_kind(&scope.path) == Some(EntryKind::File)
                        && !self.scanner.is_archived(&scope.path)
                    {
                        merged.push(scope.path.clone(), FILE_SCOPE_SCORE);
                    } else {
                        debug!(path = %scope.path.display(), "file scope not available");
                    }
                }
                ScopeKind::Dir => {
                    if provider.entry_kind(&scope.path) != Some(EntryKind::Dir) {
                        debug!(path = %scope.path.display(), "directory scope not available");
                        continue;
                    }
                    for path in self.scanner.notes(provider, &scope.path) {
                        let score = self.directory_score(&path, category, &names);
                        merged.push(path, score);
                    }
                }
            }
        }

        let mut ranked = merged.candidates;
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_k);
        ranked
    }

    fn directory_score(&self, path: &Path, category: Category, names: &[String]) -> f64 {
        if !category.is_entity_lookup() {
            return BASE_SCORE;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if names.iter().any(|n| stem.contains(&n.to_lowercase())) {
            ENTITY_MATCH_SCORE
        } else {
            ENTITY_CATEGORY_SCORE
        }
    }
}

/// Insertion-ordered candidates with one entry per path.
#[derive(Default)]
struct Merged {
    candidates: Vec<ScoredCandidate>,
    positions: HashMap<PathBuf, usize>,
}

impl Merged {
    fn push(&mut self, path: PathBuf, score: f64) {
        let score = score.clamp(0.0, 1.0);
        match self.positions.get(&path) {
            Some(&i) => {
                let existing = &mut self.candidates[i];
                existing.score = existing.score.max(score);
            }
            None => {
                self.positions.insert(path.clone(), self.candidates.len());
                self.candidates.push(ScoredCandidate { path, score });
            }
        }
    }
}
